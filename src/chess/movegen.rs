//! Legal move generation and game status classification.
//!
//! This is where the geometry tables ([`crate::chess::geometry`]), the board
//! ([`crate::chess::board`]) and the attack/pin resolver
//! ([`crate::chess::attacks`]) come together.

use std::collections::{HashMap, HashSet};
use std::fmt;

use strum::IntoEnumIterator;

use crate::chess::attacks::square_attacked;
use crate::chess::board::Board;
use crate::chess::core::{PieceKind, Player, Rank, Square};
use crate::chess::geometry::{self, KINGSIDE_CASTLE_RAY, QUEENSIDE_CASTLE_RAY};
use crate::chess::moves;
use crate::chess::state::{CastlingRights, State};

/// Classification of a position for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// No check, legal moves remain.
    Normal,
    /// Side to move's king is attacked, legal moves remain.
    Check,
    /// Side to move's king is attacked and no legal moves remain.
    Checkmate,
    /// Side to move's king is not attacked but no legal moves remain.
    Stalemate,
    /// Drawn by the 50-move rule, insufficient material, or threefold
    /// repetition.
    Draw,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::Check => "check",
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
        };
        write!(f, "{label}")
    }
}

fn king_symbol(side: Player) -> char {
    match side {
        Player::White => 'K',
        Player::Black => 'k',
    }
}

fn piece_kind(symbol: char) -> PieceKind {
    match symbol.to_ascii_uppercase() {
        'K' => PieceKind::King,
        'Q' => PieceKind::Queen,
        'R' => PieceKind::Rook,
        'B' => PieceKind::Bishop,
        'N' => PieceKind::Knight,
        'P' => PieceKind::Pawn,
        other => unreachable!("not a piece symbol: '{other}'"),
    }
}

fn midpoint(a: Square, b: Square) -> Square {
    Square::try_from(((a.index() + b.index()) / 2) as u8).expect("midpoint is always on board")
}

/// Returns `true` if moving the king from `origin` to `destination` would
/// not leave it attacked, by simulating the move on a scratch copy of the
/// board.
fn king_safe_at(board: &Board, origin: Square, destination: Square, side: Player) -> bool {
    let mut scratch = board.clone();
    let symbol = board.get_piece(origin);
    scratch.move_piece(origin, destination, symbol);
    !square_attacked(&scratch, destination, side, false).attacked
}

fn castling_right_for(side: Player, kingside: bool) -> CastlingRights {
    match (side, kingside) {
        (Player::White, true) => CastlingRights::WHITE_KING,
        (Player::White, false) => CastlingRights::WHITE_QUEEN,
        (Player::Black, true) => CastlingRights::BLACK_KING,
        (Player::Black, false) => CastlingRights::BLACK_QUEEN,
    }
}

#[allow(clippy::too_many_arguments)]
fn castling_legal(
    board: &Board,
    state: &State,
    side: Player,
    king_origin: Square,
    destination: Square,
    kingside: bool,
    currently_in_check: bool,
) -> bool {
    if currently_in_check {
        return false;
    }
    if !state.rights.contains(castling_right_for(side, kingside)) {
        return false;
    }
    let mid = midpoint(king_origin, destination);
    if board.get_piece(destination) != ' ' || board.get_piece(mid) != ' ' {
        return false;
    }
    if !kingside {
        let far = Square::try_from(destination.index() as u8 - 1)
            .expect("queenside far square stays on board");
        if board.get_piece(far) != ' ' {
            return false;
        }
    }
    !square_attacked(board, mid, side, false).attacked
}

struct Generator<'a> {
    board: &'a Board,
    state: &'a State,
    side: Player,
    currently_in_check: bool,
    attack_path: HashSet<Square>,
    pins: HashMap<Square, HashSet<Square>>,
    single_check: bool,
    moves: Vec<String>,
}

impl<'a> Generator<'a> {
    /// Pin/check-response filtering applicable to every piece but the king:
    /// a king never needs it, since it resolves check by stepping out of
    /// attack (checked via [`king_safe_at`]) rather than by blocking or
    /// capturing along the attacker's ray.
    fn emit_if_legal(&mut self, origin: Square, destination: Square) -> bool {
        if let Some(allowed) = self.pins.get(&origin) {
            if !allowed.contains(&destination) {
                return false;
            }
        }
        if self.single_check && !self.attack_path.contains(&destination) {
            return false;
        }
        true
    }

    fn push(&mut self, origin: Square, destination: Square, promotion: Option<PieceKind>) {
        self.moves
            .push(moves::format(origin, destination, promotion));
    }

    fn trace(&mut self, origin: Square, symbol: char, ray_index: usize, ray: &geometry::Ray) {
        let kind = piece_kind(symbol);

        if kind == PieceKind::King {
            self.trace_king(origin, ray_index, ray);
            return;
        }

        if kind == PieceKind::Pawn {
            self.trace_pawn(origin, ray);
            return;
        }

        for &destination in ray {
            let owner = self.board.get_owner(destination);
            if owner == Some(self.side) {
                break;
            }
            if self.emit_if_legal(origin, destination) {
                self.push(origin, destination, None);
            }
            if owner.is_some() {
                break;
            }
        }
    }

    /// A king ray holds a single adjacent step, except at
    /// [`KINGSIDE_CASTLE_RAY`]/[`QUEENSIDE_CASTLE_RAY`] on the king's home
    /// square, where it also holds the castling destination two squares
    /// further out.
    fn trace_king(&mut self, origin: Square, ray_index: usize, ray: &geometry::Ray) {
        let Some(&step) = ray.first() else {
            return;
        };
        if self.board.get_owner(step) != Some(self.side)
            && king_safe_at(self.board, origin, step, self.side)
        {
            self.push(origin, step, None);
        }

        let kingside = ray_index == KINGSIDE_CASTLE_RAY;
        let queenside = ray_index == QUEENSIDE_CASTLE_RAY;
        if !(kingside || queenside) || ray.len() < 2 {
            return;
        }
        let destination = ray[1];
        if castling_legal(
            self.board,
            self.state,
            self.side,
            origin,
            destination,
            kingside,
            self.currently_in_check,
        ) && king_safe_at(self.board, origin, destination, self.side)
        {
            self.push(origin, destination, None);
        }
    }

    fn trace_pawn(&mut self, origin: Square, ray: &geometry::Ray) {
        let is_diagonal = ray.first().is_some_and(|&sq| sq.file() != origin.file());
        let promotion_rank = match self.side {
            Player::White => Rank::Eight,
            Player::Black => Rank::One,
        };

        if !is_diagonal {
            for &destination in ray {
                if self.board.get_piece(destination) != ' ' {
                    break;
                }
                self.emit_pawn_destination(origin, destination, promotion_rank);
            }
            return;
        }

        let Some(&destination) = ray.first() else {
            return;
        };
        let owner = self.board.get_owner(destination);
        let is_en_passant = self.board.get_piece(destination) == ' '
            && self.state.en_passant == Some(destination);
        if owner == Some(self.side.opponent()) || is_en_passant {
            self.emit_pawn_destination(origin, destination, promotion_rank);
        }
    }

    fn emit_pawn_destination(&mut self, origin: Square, destination: Square, promotion_rank: Rank) {
        if !self.emit_if_legal(origin, destination) {
            return;
        }
        if destination.rank() == promotion_rank {
            for kind in [
                PieceKind::Queen,
                PieceKind::Rook,
                PieceKind::Bishop,
                PieceKind::Knight,
            ] {
                self.push(origin, destination, Some(kind));
            }
        } else {
            self.push(origin, destination, None);
        }
    }
}

/// Generates every legal move for `side` (default: the side to move),
/// optionally restricted to pieces on squares in `origin_filter`.
///
/// # Panics
///
/// If `origin_filter` is given but does not include the relevant king's
/// square: the generator's check and pin analysis is keyed on the king and
/// excluding it is a caller precondition violation.
#[must_use]
pub fn legal_moves(
    board: &Board,
    state: &State,
    side: Option<Player>,
    origin_filter: Option<&[Square]>,
) -> Vec<String> {
    let side = side.unwrap_or(state.player);
    let king_square = board.find_piece(king_symbol(side));

    if let Some(filter) = origin_filter {
        assert!(
            filter.contains(&king_square),
            "origin_filter must include the king's square"
        );
    }

    let king_attacks = square_attacked(board, king_square, side, true);
    let currently_in_check = king_attacks.attacked;
    let double_check = king_attacks.attackers.len() >= 2;
    let single_check = king_attacks.attackers.len() == 1;

    let attack_path: HashSet<Square> = king_attacks
        .attackers
        .iter()
        .flat_map(|attacker| attacker.ray.iter().copied())
        .collect();
    let pins: HashMap<Square, HashSet<Square>> = king_attacks
        .pins
        .iter()
        .map(|pin| (pin.square, pin.allowed.iter().copied().collect()))
        .collect();

    let origins: Vec<Square> = origin_filter.map_or_else(|| Square::iter().collect(), <[_]>::to_vec);

    let mut generator = Generator {
        board,
        state,
        side,
        currently_in_check,
        attack_path,
        pins,
        single_check,
        moves: Vec::new(),
    };

    let mut own_pieces: Vec<Square> = Vec::new();
    if origins.contains(&king_square) {
        own_pieces.push(king_square);
    }
    for &square in &origins {
        if square != king_square && board.get_owner(square) == Some(side) {
            own_pieces.push(square);
        }
    }

    for origin in own_pieces {
        let symbol = board.get_piece(origin);
        let is_king = piece_kind(symbol) == PieceKind::King;
        if double_check && !is_king {
            continue;
        }
        if single_check && !is_king && generator.pins.contains_key(&origin) {
            continue;
        }
        for (ray_index, ray) in geometry::moves().rays(symbol, origin).iter().enumerate() {
            generator.trace(origin, symbol, ray_index, ray);
        }
    }

    generator.moves
}

/// Returns `true` if neither side has enough material to deliver checkmate.
#[must_use]
pub fn insufficient_material(board: &Board) -> bool {
    let mut minor_pieces = HashMap::<Player, (u32, u32)>::new();
    for square in Square::iter() {
        let symbol = board.get_piece(square);
        if symbol == ' ' {
            continue;
        }
        let owner = board
            .get_owner(square)
            .expect("non-empty square always has an owner");
        match piece_kind(symbol) {
            PieceKind::King => {},
            PieceKind::Knight => minor_pieces.entry(owner).or_default().0 += 1,
            PieceKind::Bishop => minor_pieces.entry(owner).or_default().1 += 1,
            _ => return false,
        }
    }
    minor_pieces
        .values()
        .all(|&(knights, bishops)| !(knights >= 1 && bishops >= 1) && bishops < 2 && knights < 3)
}

/// Classifies the position for the side to move.
///
/// `threefold_repetition` must be computed by the caller (it depends on
/// history this module does not own).
#[must_use]
pub fn status(board: &Board, state: &State, threefold_repetition: bool) -> Status {
    if threefold_repetition {
        return Status::Draw;
    }
    let king_square = board.find_piece(king_symbol(state.player));
    let in_check = square_attacked(board, king_square, state.player, false).attacked;
    let has_moves = !legal_moves(board, state, None, None).is_empty();

    match (in_check, has_moves) {
        (true, false) => Status::Checkmate,
        (true, true) => Status::Check,
        (false, false) => Status::Stalemate,
        (false, true) => {
            if state.ply >= 100 || insufficient_material(board) {
                Status::Draw
            } else {
                Status::Normal
            }
        },
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{legal_moves, status, Status};
    use crate::chess::board::Board;
    use crate::chess::state::State;

    fn position(board_fen: &str, state_fields: &str) -> (Board, State) {
        let mut board = Board::empty();
        board.set_position(board_fen).unwrap();
        let state = State::parse(state_fields).unwrap();
        (board, state)
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let (board, state) = position(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "w KQkq - 0 1",
        );
        let mut moves = legal_moves(&board, &state, None, None);
        moves.sort();
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn en_passant_capture_is_the_only_move_from_its_square() {
        // Forward advance blocked by a knight on e6 so the only move left
        // from e5 is the en-passant capture.
        let (board, state) = position("8/8/4n3/3pP3/8/8/8/4K2k", "w - d6 0 1");
        let mut moves = legal_moves(
            &board,
            &state,
            None,
            Some(&[crate::chess::core::Square::E1, crate::chess::core::Square::E5]),
        );
        moves.retain(|mv| mv.starts_with("e5"));
        moves.sort();
        assert_eq!(moves, vec!["e5d6".to_string()]);
    }

    #[test]
    fn double_check_restricts_to_king_moves() {
        // Rook on e6 and knight on c2 both check the white king on e1.
        let (board, state) = position("4k3/8/4r3/8/8/8/2n5/4K3", "w - - 0 1");
        let moves = legal_moves(&board, &state, None, None);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|mv| mv.starts_with("e1")));
    }

    #[test]
    fn pinned_rook_may_only_move_along_pin_ray() {
        let (board, state) = position("4r3/8/8/8/8/8/4R3/4K3", "w - - 0 1");
        let moves = legal_moves(
            &board,
            &state,
            None,
            Some(&[crate::chess::core::Square::E1, crate::chess::core::Square::E2]),
        );
        let rook_moves: Vec<_> = moves.iter().filter(|mv| mv.starts_with("e2")).collect();
        assert!(!rook_moves.is_empty());
        assert!(rook_moves.iter().all(|mv| mv.chars().nth(2) == Some('e')));
    }

    #[test]
    fn checkmate_detected() {
        // Classic back-rank mate: white king boxed in by its own pawns,
        // black rook delivering check along the first rank.
        let (board, state) = position("k7/8/8/8/8/8/5PPP/4r1K1", "w - - 0 1");
        assert_eq!(status(&board, &state, false), Status::Checkmate);
    }

    #[test]
    fn stalemate_detected() {
        let (board, state) = position("7k/8/6Q1/8/8/8/8/6K1", "b - - 0 1");
        assert_eq!(status(&board, &state, false), Status::Stalemate);
    }

    #[test]
    fn fifty_move_rule_draws() {
        let (board, state) = position(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "w KQkq - 100 50",
        );
        assert_eq!(status(&board, &state, false), Status::Draw);
    }

    #[test]
    fn insufficient_material_king_and_bishop_draws() {
        let (board, state) = position("4k3/8/8/8/8/8/8/4KB2", "w - - 0 1");
        assert_eq!(status(&board, &state, false), Status::Draw);
    }

    #[test]
    fn king_knight_and_bishop_vs_king_is_sufficient() {
        let (board, state) = position("4k3/8/8/8/8/8/8/NB2K3", "w - - 0 1");
        assert_eq!(status(&board, &state, false), Status::Normal);
    }

    #[test]
    fn castling_illegal_through_attacked_transit_square() {
        // Both transit squares (d8 and f8) are swept by a white rook on the
        // same file, so neither black castling move is legal.
        let (board, state) = position("r3k2r/8/8/8/8/8/8/3RKR2", "b kq - 0 1");
        let moves = legal_moves(&board, &state, None, None);
        assert!(!moves.iter().any(|mv| mv == "e8c8"));
        assert!(!moves.iter().any(|mv| mv == "e8g8"));
    }

    #[test]
    fn castling_illegal_while_in_check() {
        let (board, state) = position("r3rk2/8/8/8/8/8/8/R3K2R", "w KQ - 0 1");
        let moves = legal_moves(&board, &state, None, None);
        assert!(!moves.iter().any(|mv| mv == "e1c1"));
        assert!(!moves.iter().any(|mv| mv == "e1g1"));
    }

    #[test]
    fn pinned_piece_disambiguation() {
        let (board, state) = position("1k2r3/4N3/1r1RK3/3BQPp1/2q3b1/4r3/8/8", "w - g6 0 1");
        let mut moves = legal_moves(&board, &state, None, None);
        moves.sort();
        let mut expected = vec![
            "e6f6", "e6f7", "e6d7", "d6c6", "d6b6", "d5c4", "e5e4", "e5e3",
        ];
        expected.sort_unstable();
        assert_eq!(moves, expected);
    }

    #[test]
    fn last_line_pawn_exposes_king_is_checkmate() {
        // White king on a1 is checked by the black pawn on b2; b1 and the
        // capture on b2 both fall within the black king's own reach from
        // c2, and a2 is swept by the bishop on f7's long diagonal.
        let (board, state) = position("8/5b2/8/6P1/8/p7/1pk5/K7", "w - - 0 51");
        assert_eq!(status(&board, &state, false), Status::Checkmate);
    }
}
