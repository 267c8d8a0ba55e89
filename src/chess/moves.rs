//! Move string parsing and formatting: two algebraic squares, optionally
//! followed by a lowercase promotion letter.

use anyhow::{bail, Context};

use crate::chess::core::{PieceKind, Square};

/// A move string, decomposed into its origin, destination and optional
/// promotion piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedMove {
    /// Square the moving piece starts on.
    pub origin: Square,
    /// Square the moving piece ends on.
    pub destination: Square,
    /// Piece to promote to, if this is a pawn reaching the back rank.
    pub promotion: Option<PieceKind>,
}

/// Parses a 4- or 5-character move string such as `"e2e4"` or `"a7a8q"`.
///
/// # Errors
///
/// If the string is shorter than 4 characters, the two square substrings are
/// not valid algebraic squares, or the trailing promotion letter is not one
/// of `b`, `n`, `r`, `q`.
pub fn parse(mv: &str) -> anyhow::Result<ParsedMove> {
    if mv.len() < 4 {
        bail!("move {mv:?} is too short: need at least 4 characters");
    }
    let lowercase = mv.to_ascii_lowercase();
    let origin = Square::try_from(&lowercase[0..2]).with_context(|| format!("in move {mv:?}"))?;
    let destination =
        Square::try_from(&lowercase[2..4]).with_context(|| format!("in move {mv:?}"))?;
    let promotion = match lowercase.get(4..5) {
        None | Some("") => None,
        Some("b") => Some(PieceKind::Bishop),
        Some("n") => Some(PieceKind::Knight),
        Some("r") => Some(PieceKind::Rook),
        Some("q") => Some(PieceKind::Queen),
        Some(other) => bail!("unknown promotion piece {other:?} in move {mv:?}"),
    };
    Ok(ParsedMove {
        origin,
        destination,
        promotion,
    })
}

/// Formats a move, appending the promotion letter (lowercase) if present.
#[must_use]
pub fn format(origin: Square, destination: Square, promotion: Option<PieceKind>) -> String {
    let mut mv = format!("{origin}{destination}");
    if let Some(kind) = promotion {
        mv.push(match kind {
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King | PieceKind::Pawn => {
                unreachable!("pawns only promote to bishop, knight, rook or queen")
            },
        });
    }
    mv
}
