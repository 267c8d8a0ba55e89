//! Square-indexed mailbox board: the cheapest possible representation that
//! still answers "what piece, if any, sits on this square" directly.

use std::fmt;

use anyhow::{bail, Context};
use itertools::Itertools;

use crate::chess::core::{Square, BOARD_SIZE, BOARD_WIDTH};

/// Symbol used for an empty square.
pub const EMPTY: char = ' ';

/// A 64-square mailbox: `board[square.index()]` is the piece symbol occupying
/// that square, or [`EMPTY`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [char; BOARD_SIZE as usize],
}

impl Board {
    /// An empty board.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            squares: [EMPTY; BOARD_SIZE as usize],
        }
    }

    /// Piece symbol occupying `square`, or [`EMPTY`].
    #[must_use]
    pub fn get_piece(&self, square: Square) -> char {
        self.squares[square.index()]
    }

    /// Owner of the piece on `square`, or `None` if empty.
    #[must_use]
    pub fn get_owner(&self, square: Square) -> Option<crate::chess::core::Player> {
        match self.get_piece(square) {
            EMPTY => None,
            symbol if symbol.is_ascii_uppercase() => Some(crate::chess::core::Player::White),
            _ => Some(crate::chess::core::Player::Black),
        }
    }

    /// Places `symbol` on `to`, clearing `from` (unless `from == to`).
    pub fn move_piece(&mut self, from: Square, to: Square, symbol: char) {
        if from != to {
            self.squares[from.index()] = EMPTY;
        }
        self.squares[to.index()] = symbol;
    }

    /// First square occupied by `symbol`.
    ///
    /// # Panics
    ///
    /// If no square holds `symbol`. A well-formed position always has
    /// exactly one of each king; calling this with a symbol that is not on
    /// the board is a programming error.
    #[must_use]
    pub fn find_piece(&self, symbol: char) -> Square {
        let index = self
            .squares
            .iter()
            .position(|&s| s == symbol)
            .unwrap_or_else(|| panic!("no square holds piece symbol '{symbol}'"));
        Square::try_from(index as u8).expect("mailbox index is always a valid square")
    }

    /// Parses FEN's board field (ranks top to bottom, separated by `/`,
    /// digits expanding to that many empty squares).
    pub fn set_position(&mut self, field: &str) -> anyhow::Result<()> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != BOARD_WIDTH as usize {
            bail!(
                "malformed board field: expected {BOARD_WIDTH} ranks, got {} in {field:?}",
                ranks.len()
            );
        }
        let mut squares = [EMPTY; BOARD_SIZE as usize];
        for (row, rank) in ranks.iter().enumerate() {
            let mut file = 0usize;
            for ch in rank.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                } else {
                    crate::chess::core::Piece::try_from(ch)
                        .with_context(|| format!("malformed board field {field:?}"))?;
                    if file >= BOARD_WIDTH as usize {
                        bail!("rank {rank:?} overflows the board in field {field:?}");
                    }
                    squares[row * BOARD_WIDTH as usize + file] = ch;
                    file += 1;
                }
            }
            if file != BOARD_WIDTH as usize {
                bail!("rank {rank:?} does not cover all {BOARD_WIDTH} files in field {field:?}");
            }
        }
        self.squares = squares;
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ranks = self
            .squares
            .chunks(BOARD_WIDTH as usize)
            .map(|rank| {
                rank.iter()
                    .map(|&symbol| symbol.to_string())
                    .collect::<Vec<_>>()
                    .into_iter()
                    .chunk_by(|s| s == " ")
                    .into_iter()
                    .map(|(is_empty, group)| {
                        if is_empty {
                            group.count().to_string()
                        } else {
                            group.collect::<String>()
                        }
                    })
                    .collect::<String>()
            })
            .join("/");
        write!(f, "{ranks}")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Board;
    use crate::chess::core::{Player, Square};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn starting_position_roundtrip() {
        let mut board = Board::empty();
        board.set_position(START_FEN).unwrap();
        assert_eq!(board.to_string(), START_FEN);
    }

    #[test]
    fn get_piece_and_owner() {
        let mut board = Board::empty();
        board.set_position(START_FEN).unwrap();
        assert_eq!(board.get_piece(Square::E1), 'K');
        assert_eq!(board.get_owner(Square::E1), Some(Player::White));
        assert_eq!(board.get_piece(Square::E8), 'k');
        assert_eq!(board.get_owner(Square::E8), Some(Player::Black));
        assert_eq!(board.get_piece(Square::E4), ' ');
        assert_eq!(board.get_owner(Square::E4), None);
    }

    #[test]
    fn move_piece() {
        let mut board = Board::empty();
        board.set_position(START_FEN).unwrap();
        board.move_piece(Square::E2, Square::E4, 'P');
        assert_eq!(board.get_piece(Square::E2), ' ');
        assert_eq!(board.get_piece(Square::E4), 'P');
    }

    #[test]
    fn find_piece() {
        let mut board = Board::empty();
        board.set_position(START_FEN).unwrap();
        assert_eq!(board.find_piece('K'), Square::E1);
        assert_eq!(board.find_piece('k'), Square::E8);
    }

    #[test]
    #[should_panic(expected = "no square holds piece symbol 'Q'")]
    fn find_piece_missing_panics() {
        let board = Board::empty();
        board.find_piece('Q');
    }

    #[test]
    fn malformed_field_rejected() {
        let mut board = Board::empty();
        assert!(board.set_position("not-a-fen").is_err());
        assert!(board.set_position("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP").is_err());
    }
}
