//! The five trailing FEN fields: side to move, castling rights, en-passant
//! target, halfmove clock and fullmove number.

use std::fmt;

use anyhow::{bail, Context};
use bitflags::bitflags;

use crate::chess::core::{Player, Square};

bitflags! {
    /// Which castling moves are still available. Bits correspond to FEN's
    /// `KQkq` letters.
    ///
    /// Rights only ever get removed over the course of a game (when a king
    /// or rook moves, or a rook is captured on its home square): they never
    /// come back.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CastlingRights: u8 {
        /// White may castle kingside.
        const WHITE_KING = 0b0001;
        /// White may castle queenside.
        const WHITE_QUEEN = 0b0010;
        /// Black may castle kingside.
        const BLACK_KING = 0b0100;
        /// Black may castle queenside.
        const BLACK_QUEEN = 0b1000;
    }
}

impl CastlingRights {
    /// The right lost when a piece departs or arrives on `square`, if any.
    #[must_use]
    pub fn lost_at(square: Square) -> Self {
        match square {
            Square::A1 => Self::WHITE_QUEEN,
            Square::E1 => Self::WHITE_KING | Self::WHITE_QUEEN,
            Square::H1 => Self::WHITE_KING,
            Square::A8 => Self::BLACK_QUEEN,
            Square::E8 => Self::BLACK_KING | Self::BLACK_QUEEN,
            Square::H8 => Self::BLACK_KING,
            _ => Self::empty(),
        }
    }
}

impl TryFrom<&str> for CastlingRights {
    type Error = anyhow::Error;

    fn try_from(fen: &str) -> anyhow::Result<Self> {
        if fen == "-" {
            return Ok(Self::empty());
        }
        let mut rights = Self::empty();
        for ch in fen.chars() {
            rights |= match ch {
                'K' => Self::WHITE_KING,
                'Q' => Self::WHITE_QUEEN,
                'k' => Self::BLACK_KING,
                'q' => Self::BLACK_QUEEN,
                _ => bail!("unknown castling rights character '{ch}' in {fen:?}"),
            };
        }
        Ok(rights)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.contains(Self::WHITE_KING) {
            write!(f, "K")?;
        }
        if self.contains(Self::WHITE_QUEEN) {
            write!(f, "Q")?;
        }
        if self.contains(Self::BLACK_KING) {
            write!(f, "k")?;
        }
        if self.contains(Self::BLACK_QUEEN) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

/// The five trailing FEN fields, parsed into their natural Rust types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// Side to move.
    pub player: Player,
    /// Remaining castling rights.
    pub rights: CastlingRights,
    /// En-passant target square, if the previous move was a two-square pawn
    /// advance.
    pub en_passant: Option<Square>,
    /// Halfmove clock: halfmoves since the last capture or pawn move.
    pub ply: u32,
    /// Fullmove number, starting at 1.
    pub turn: u32,
}

impl State {
    /// The state at the start of a standard game.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            player: Player::White,
            rights: CastlingRights::all(),
            en_passant: None,
            ply: 0,
            turn: 1,
        }
    }

    /// Parses FEN fields 2 through 6 (space-separated, no board field).
    pub fn parse(fields: &str) -> anyhow::Result<Self> {
        let mut parts = fields.split_whitespace();
        let player = parts
            .next()
            .context("missing side-to-move field")?
            .try_into()?;
        let rights = parts
            .next()
            .context("missing castling rights field")?
            .try_into()?;
        let en_passant = match parts.next().context("missing en-passant field")? {
            "-" => None,
            square => Some(Square::try_from(square)?),
        };
        let ply = parts
            .next()
            .context("missing halfmove clock field")?
            .parse()
            .context("halfmove clock is not a number")?;
        let turn = parts
            .next()
            .context("missing fullmove number field")?
            .parse()
            .context("fullmove number is not a number")?;
        Ok(Self {
            player,
            rights,
            en_passant,
            ply,
            turn,
        })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        write!(
            f,
            "{} {} {} {} {}",
            self.player, self.rights, en_passant, self.ply, self.turn
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{CastlingRights, State};
    use crate::chess::core::{Player, Square};

    #[test]
    fn starting_state_roundtrip() {
        let state = State::starting();
        assert_eq!(state.to_string(), "w KQkq - 0 1");
        assert_eq!(State::parse(&state.to_string()).unwrap(), state);
    }

    #[test]
    fn castling_rights_parse_subset() {
        assert_eq!(
            CastlingRights::try_from("Kq").unwrap(),
            CastlingRights::WHITE_KING | CastlingRights::BLACK_QUEEN
        );
        assert_eq!(CastlingRights::try_from("-").unwrap(), CastlingRights::empty());
    }

    #[test]
    fn castling_rights_display_order_is_kqkq() {
        let rights = CastlingRights::BLACK_QUEEN | CastlingRights::WHITE_KING;
        assert_eq!(rights.to_string(), "Kq");
    }

    #[test]
    fn lost_at_corners_and_king_squares() {
        assert_eq!(CastlingRights::lost_at(Square::H1), CastlingRights::WHITE_KING);
        assert_eq!(
            CastlingRights::lost_at(Square::E1),
            CastlingRights::WHITE_KING | CastlingRights::WHITE_QUEEN
        );
        assert_eq!(CastlingRights::lost_at(Square::D4), CastlingRights::empty());
    }

    #[test]
    fn en_passant_field_roundtrip() {
        let state = State::parse("w - e3 0 1").unwrap();
        assert_eq!(state.en_passant, Some(Square::E3));
        assert_eq!(state.to_string(), "w - e3 0 1");
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(State::parse("x - - 0 1").is_err());
        assert!(State::parse("w - - notanumber 1").is_err());
    }

    #[test]
    fn player_roundtrip() {
        assert_eq!(Player::White.to_string(), "w");
        assert_eq!(Player::Black.to_string(), "b");
    }
}
