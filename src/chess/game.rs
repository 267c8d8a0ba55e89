//! The public entry point: a mutable chess position with move/FEN history,
//! a cached legal-move list, and repetition tracking.

use std::collections::HashMap;

use log::debug;

use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{Piece, PieceKind, Player, Square};
use crate::chess::movegen::{self, Status};
use crate::chess::moves;
use crate::chess::state::{CastlingRights, State};
use crate::error::IllegalMoveError;

/// The default starting position, FEN board field plus trailing state
/// fields.
pub const STARTING_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A chess position together with everything needed to answer "what are
/// the legal moves" and "what is the status" without re-deriving history.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    state: State,
    move_history: Vec<String>,
    fen_history: Vec<String>,
    repetitions: HashMap<String, u32>,
    move_cache: Option<Vec<String>>,
}

impl Game {
    /// Creates a game from `fen`, or the standard starting position if
    /// `None`.
    ///
    /// # Panics
    ///
    /// If an explicit `fen` is malformed. A caller passing untrusted text
    /// should validate it beforehand; this mirrors the fail-fast treatment
    /// this crate gives to every malformed-input case except illegal moves.
    #[must_use]
    pub fn new(fen: Option<&str>) -> Self {
        let mut game = Self {
            board: Board::empty(),
            state: State::starting(),
            move_history: Vec::new(),
            fen_history: Vec::new(),
            repetitions: HashMap::new(),
            move_cache: None,
        };
        game.reset(fen);
        game
    }

    /// Wipes all history, the repetition table and the move cache, then
    /// reseeds from `fen` (or the standard starting position).
    ///
    /// # Panics
    ///
    /// If an explicit `fen` is malformed.
    pub fn reset(&mut self, fen: Option<&str>) {
        self.move_history.clear();
        self.fen_history.clear();
        self.repetitions.clear();
        self.move_cache = None;
        let fen = fen.unwrap_or(STARTING_FEN);
        self.set_fen(fen)
            .unwrap_or_else(|err| panic!("malformed FEN {fen:?}: {err}"));
        // `set_fen` appends to now-empty histories, which is exactly what
        // a reset needs.
    }

    /// Replaces the board and state from `fen`, appending it to the FEN
    /// history and bumping the repetition counter. Does not clear history
    /// (use [`Self::reset`] for that).
    pub fn set_fen(&mut self, fen: &str) -> anyhow::Result<()> {
        let mut parts = fen.splitn(2, ' ');
        let board_field = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty FEN"))?;
        let rest = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("FEN {fen:?} is missing state fields"))?;
        let mut board = Board::empty();
        board.set_position(board_field)?;
        let state = State::parse(rest)?;

        self.board = board;
        self.state = state;
        self.move_cache = None;

        let canonical = self.get_fen();
        *self
            .repetitions
            .entry(self.board.to_string())
            .or_insert(0) += 1;
        self.fen_history.push(canonical);
        Ok(())
    }

    /// The current position as a full FEN string.
    #[must_use]
    pub fn get_fen(&self) -> String {
        format!("{} {}", self.board, self.state)
    }

    /// Applies `mv` (4- or 5-character move string). When `validate` is
    /// `true`, rejects anything not in the current legal-move list.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] if `validate` is `true` and the move is
    /// not legal, or if `mv` is malformed.
    pub fn apply_move(&mut self, mv: &str, validate: bool) -> Result<(), IllegalMoveError> {
        let illegal = || IllegalMoveError::new(mv, self.get_fen());

        let parsed = moves::parse(mv).map_err(|_| illegal())?;

        if validate {
            let king_square = self.board.find_piece(match self.state.player {
                Player::White => 'K',
                Player::Black => 'k',
            });
            let filter: Vec<Square> = if parsed.origin == king_square {
                vec![king_square]
            } else {
                vec![king_square, parsed.origin]
            };
            let legal = self.get_moves(None, Some(&filter));
            if !legal.iter().any(|candidate| candidate == mv) {
                return Err(illegal());
            }
        }

        let mover = self.board.get_piece(parsed.origin);
        let mover_kind = Piece::try_from(mover).expect("board always holds valid symbols").kind;
        let side = self.state.player;
        let captured = self.board.get_piece(parsed.destination);
        let is_en_passant_capture =
            mover_kind == PieceKind::Pawn && Some(parsed.destination) == self.state.en_passant;

        let mut rights = self.state.rights;
        rights.remove(CastlingRights::lost_at(parsed.origin));
        rights.remove(CastlingRights::lost_at(parsed.destination));

        let mut en_passant = None;
        if mover_kind == PieceKind::Pawn
            && (parsed.destination.index() as i16 - parsed.origin.index() as i16).abs() == 16
        {
            let mid = (parsed.origin.index() + parsed.destination.index()) / 2;
            en_passant = Square::try_from(mid as u8).ok();
        }

        let is_pawn_move_or_capture =
            mover_kind == PieceKind::Pawn || captured != ' ' || is_en_passant_capture;
        let ply = if is_pawn_move_or_capture { 0 } else { self.state.ply + 1 };
        let turn = if side == Player::Black {
            self.state.turn + 1
        } else {
            self.state.turn
        };

        let placed_symbol = parsed.promotion.map_or(mover, |kind| {
            let upper = match kind {
                PieceKind::Queen => 'Q',
                PieceKind::Rook => 'R',
                PieceKind::Bishop => 'B',
                PieceKind::Knight => 'N',
                PieceKind::King | PieceKind::Pawn => {
                    unreachable!("pawns only promote to queen, rook, bishop or knight")
                },
            };
            match side {
                Player::White => upper,
                Player::Black => upper.to_ascii_lowercase(),
            }
        });

        self.board
            .move_piece(parsed.origin, parsed.destination, placed_symbol);

        if mover_kind == PieceKind::King {
            self.castle_rook_if_applicable(side, parsed.origin, parsed.destination);
        }
        if is_en_passant_capture {
            let captured_square = match side {
                Player::White => Square::try_from(parsed.destination.index() as u8 + 8)
                    .expect("en passant destination is always on rank 6, capture square on rank 5"),
                Player::Black => Square::try_from(parsed.destination.index() as u8 - 8)
                    .expect("en passant destination is always on rank 3, capture square on rank 4"),
            };
            self.board.move_piece(captured_square, captured_square, ' ');
        }

        self.state = State {
            player: side.opponent(),
            rights,
            en_passant,
            ply,
            turn,
        };
        self.move_cache = None;
        self.move_history.push(mv.to_string());

        let board_field = self.board.to_string();
        *self.repetitions.entry(board_field).or_insert(0) += 1;
        self.fen_history.push(self.get_fen());

        debug!("applied {mv} -> {}", self.get_fen());
        Ok(())
    }

    fn castle_rook_if_applicable(&mut self, side: Player, origin: Square, destination: Square) {
        if !is_castling_king_move(side, origin, destination) {
            return;
        }
        let kingside_dest = match side {
            Player::White => Square::G1,
            Player::Black => Square::G8,
        };
        let kingside_right = match side {
            Player::White => CastlingRights::WHITE_KING,
            Player::Black => CastlingRights::BLACK_KING,
        };
        let queenside_right = match side {
            Player::White => CastlingRights::WHITE_QUEEN,
            Player::Black => CastlingRights::BLACK_QUEEN,
        };
        if destination == kingside_dest {
            if !self.state.rights.contains(kingside_right) {
                return;
            }
            let (rook_from, rook_to) = match side {
                Player::White => (Square::H1, Square::F1),
                Player::Black => (Square::H8, Square::F8),
            };
            let symbol = self.board.get_piece(rook_from);
            self.board.move_piece(rook_from, rook_to, symbol);
        } else {
            if !self.state.rights.contains(queenside_right) {
                return;
            }
            let (rook_from, rook_to) = match side {
                Player::White => (Square::A1, Square::D1),
                Player::Black => (Square::A8, Square::D8),
            };
            let symbol = self.board.get_piece(rook_from);
            self.board.move_piece(rook_from, rook_to, symbol);
        }
    }

    /// Legal moves for `side` (default: side to move), optionally filtered
    /// to pieces on `origin_filter`. Uses and populates the cache only when
    /// called with both defaults.
    pub fn get_moves(&mut self, side: Option<Player>, origin_filter: Option<&[Square]>) -> Vec<String> {
        if side.is_none() && origin_filter.is_none() {
            if let Some(cached) = &self.move_cache {
                return cached.clone();
            }
            let computed = movegen::legal_moves(&self.board, &self.state, None, None);
            self.move_cache = Some(computed.clone());
            return computed;
        }
        movegen::legal_moves(&self.board, &self.state, side, origin_filter)
    }

    /// Classifies the current position.
    #[must_use]
    pub fn status(&self) -> Status {
        let repeated = self
            .repetitions
            .get(&self.board.to_string())
            .is_some_and(|&count| count >= 3);
        movegen::status(&self.board, &self.state, repeated)
    }

    /// Concatenation of every non-empty square's symbol, in board order.
    /// Used to compare material between positions.
    #[must_use]
    pub fn material_string(&self) -> String {
        Square::iter()
            .map(|square| self.board.get_piece(square))
            .filter(|&symbol| symbol != ' ')
            .collect()
    }

    /// The FEN history, including the initial position.
    #[must_use]
    pub fn fen_history(&self) -> &[String] {
        &self.fen_history
    }

    /// The applied move history.
    #[must_use]
    pub fn move_history(&self) -> &[String] {
        &self.move_history
    }
}

fn is_castling_king_move(side: Player, origin: Square, destination: Square) -> bool {
    let home = match side {
        Player::White => Square::E1,
        Player::Black => Square::E8,
    };
    origin == home
        && (destination.index() as i16 - origin.index() as i16).abs() == 2
}
