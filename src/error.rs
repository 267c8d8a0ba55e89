//! The one recoverable error this crate raises.

use thiserror::Error;

/// A move was rejected by [`crate::chess::game::Game::apply_move`].
///
/// This is the only error a caller should expect to recover from: every
/// other anomaly (a malformed FEN, an out-of-range square, a position with
/// the wrong number of kings) is a programming error and fails fast instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal move {mv:?} in position {fen:?}")]
pub struct IllegalMoveError {
    /// The move string the caller attempted to apply.
    pub mv: String,
    /// The FEN of the position the move was attempted against.
    pub fen: String,
}

impl IllegalMoveError {
    /// Creates a new error tying the offending move to the position it was
    /// attempted in.
    #[must_use]
    pub fn new(mv: impl Into<String>, fen: impl Into<String>) -> Self {
        Self {
            mv: mv.into(),
            fen: fen.into(),
        }
    }
}
