//! Board primitives commonly used within [`crate::chess`].

use std::{fmt, mem};

use anyhow::bail;

/// Width (and height) of the board.
pub const BOARD_WIDTH: u8 = 8;
/// Total number of squares on the board.
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", (b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute(file as u8 - b'a') }),
            _ => bail!("unknown file: expected within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute(column) }),
            _ => bail!("unknown file: expected within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard, as a standard chess rank
/// number (one-based: rank 1 is `Rank::One`).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    /// Builds a rank from a zero-based "row", counting down from the top of
    /// the board (row 0 is rank 8, the row [`Square`]'s index 0 lives on).
    pub(in crate::chess) fn from_top_row(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute(BOARD_WIDTH - 1 - row) }),
            _ => bail!("unknown rank row: expected within 0..BOARD_WIDTH, got {row}"),
        }
    }

    /// Zero-based row counting down from the top of the board, inverse of
    /// [`Self::from_top_row`].
    pub(in crate::chess) fn top_row(self) -> u8 {
        BOARD_WIDTH - 1 - self as u8
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute(rank as u8 - b'1') }),
            _ => bail!("unknown rank: expected within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute(row) }),
            _ => bail!("unknown rank: expected within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// Board squares, indexed the way FEN's board field is read: left to right,
/// top to bottom, starting from the eighth rank.
///
/// ```
/// use castellan::chess::core::Square;
///
/// assert_eq!(Square::A8 as u8, 0);
/// assert_eq!(Square::E8 as u8, 4);
/// assert_eq!(Square::H8 as u8, 7);
/// assert_eq!(Square::A1 as u8, 8 * 7);
/// assert_eq!(Square::H1 as u8, 63);
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use castellan::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub fn new(file: File, rank: Rank) -> Self {
        unsafe { mem::transmute(file as u8 + rank.top_row() * BOARD_WIDTH) }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub fn rank(self) -> Rank {
        Rank::from_top_row(self as u8 / BOARD_WIDTH).expect("row is always within the board")
    }

    /// Index into a 64-element, a8-to-h1 ordered array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute(square_index) }),
            _ => bail!("unknown square index: needs to be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        if square.bytes().len() != 2 {
            bail!(
                "unknown square: should be two-char, got {square} with {} chars",
                square.bytes().len()
            );
        }
        let (file, rank) = (
            square.as_bytes()[0] as char,
            square.as_bytes()[1] as char,
        );
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("unknown player: expected 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Self::White => 'w',
                Self::Black => 'b',
            }
        )
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

/// Represents a specific piece owned by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    /// Algebraic notation symbol used in FEN. Uppercase for white, lowercase
    /// for black.
    #[must_use]
    pub fn algebraic_symbol(&self) -> char {
        let result = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.owner {
            Player::White => result.to_ascii_uppercase(),
            Player::Black => result,
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("unknown piece symbol: expected within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok(Self { owner, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.algebraic_symbol())
    }
}

/// Directions on the board from a perspective of White player.
///
/// Traditionally those are North (Up), West (Left), East (Right), South (Down)
/// and their combinations. However, using cardinal directions is unnecessarily
/// confusing, hence relative directions are more straightforward to use and
/// argue about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub(in crate::chess) enum Direction {
    UpLeft,
    Up,
    UpRight,
    Right,
    Left,
    DownLeft,
    Down,
    DownRight,
}

impl Square {
    /// Shifts a square one step in `direction`, returning `None` if the
    /// result would fall off the board.
    pub(in crate::chess) fn shift(self, direction: Direction) -> Option<Self> {
        match direction {
            Direction::UpLeft | Direction::Left | Direction::DownLeft => {
                if self.file() == File::A {
                    return None;
                }
            },
            Direction::UpRight | Direction::Right | Direction::DownRight => {
                if self.file() == File::H {
                    return None;
                }
            },
            _ => (),
        }
        // Square indices grow downward (towards rank 1), so "Up" subtracts a row.
        let shift: i8 = match direction {
            Direction::UpLeft => -(BOARD_WIDTH as i8) - 1,
            Direction::Up => -(BOARD_WIDTH as i8),
            Direction::UpRight => -(BOARD_WIDTH as i8) + 1,
            Direction::Right => 1,
            Direction::Left => -1,
            Direction::DownLeft => BOARD_WIDTH as i8 - 1,
            Direction::Down => BOARD_WIDTH as i8,
            Direction::DownRight => BOARD_WIDTH as i8 + 1,
        };
        let candidate = self as i8 + shift;
        if candidate < 0 {
            return None;
        }
        Self::try_from(candidate as u8).ok()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::{Direction, File, Player, Rank, Square, BOARD_SIZE, BOARD_WIDTH};

    #[test]
    fn rank_roundtrip() {
        for rank in Rank::iter() {
            let ch = rank.to_string().chars().next().unwrap();
            assert_eq!(Rank::try_from(ch).unwrap(), rank);
        }
    }

    #[test]
    fn file_roundtrip() {
        for file in File::iter() {
            let ch = file.to_string().chars().next().unwrap();
            assert_eq!(File::try_from(ch).unwrap(), file);
        }
    }

    #[test]
    #[should_panic(expected = "unknown rank: expected within '1'..='8', got '9'")]
    fn rank_from_incorrect_char() {
        Rank::try_from('9').unwrap();
    }

    #[test]
    #[should_panic(expected = "unknown file: expected within 0..BOARD_WIDTH, got 8")]
    fn file_from_incorrect_index() {
        File::try_from(BOARD_WIDTH).unwrap();
    }

    #[test]
    fn square_index_matches_fen_ordering() {
        assert_eq!(Square::A8 as u8, 0);
        assert_eq!(Square::H8 as u8, 7);
        assert_eq!(Square::A1 as u8, 56);
        assert_eq!(Square::H1 as u8, 63);
        assert_eq!(Square::E4 as u8, 36);
    }

    #[test]
    fn square_from_str() {
        assert_eq!(Square::try_from("e4").unwrap(), Square::E4);
        assert_eq!(Square::try_from("a8").unwrap(), Square::A8);
        assert_eq!(Square::try_from("h1").unwrap(), Square::H1);
    }

    #[test]
    #[should_panic(expected = "unknown square index: needs to be in 0..BOARD_SIZE, got 64")]
    fn square_from_incorrect_index() {
        Square::try_from(BOARD_SIZE).unwrap();
    }

    #[test]
    fn opponent() {
        assert_eq!(Player::White.opponent(), Player::Black);
        assert_eq!(Player::Black.opponent(), Player::White);
    }

    #[test]
    fn shift_towards_rank_one_increases_index() {
        assert_eq!(Square::E4.shift(Direction::Down), Some(Square::E3));
        assert_eq!(Square::E4.shift(Direction::Up), Some(Square::E5));
    }

    #[test]
    fn corner_shifts_off_board() {
        assert_eq!(Square::A8.shift(Direction::Up), None);
        assert_eq!(Square::A8.shift(Direction::Left), None);
        assert_eq!(Square::H1.shift(Direction::Down), None);
        assert_eq!(Square::H1.shift(Direction::Right), None);
    }
}
