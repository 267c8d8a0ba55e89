//! Precomputed move geometry: the rays every piece could travel on an empty
//! board, and the rays from which every square could be attacked.
//!
//! Both tables are built once, the first time they are accessed, and kept
//! behind a process-wide [`std::sync::OnceLock`]. Nothing mutates them after
//! that, so sharing a `'static` reference across threads needs no locking.

use std::sync::OnceLock;

use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::chess::core::{Direction, File, Player, Rank, Square};

/// A single direction a piece could travel in, as the ordered list of
/// squares it passes through, nearest first.
pub type Ray = ArrayVec<Square, 7>;

const DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::UpRight,
    Direction::Right,
    Direction::DownRight,
    Direction::Down,
    Direction::DownLeft,
    Direction::Left,
    Direction::UpLeft,
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

fn offset(square: Square, file_delta: i8, rank_delta: i8) -> Option<Square> {
    let file = square.file() as i8 + file_delta;
    let rank_row = square.rank().top_row() as i8 - rank_delta;
    if !(0..8).contains(&file) || !(0..8).contains(&rank_row) {
        return None;
    }
    let file = File::try_from(file as u8).ok()?;
    let rank = Rank::from_top_row(rank_row as u8).ok()?;
    Some(Square::new(file, rank))
}

fn sliding_rays(square: Square) -> Vec<Ray> {
    DIRECTIONS
        .iter()
        .map(|&direction| {
            let mut ray = Ray::new();
            let mut current = square;
            while let Some(next) = current.shift(direction) {
                ray.push(next);
                current = next;
            }
            ray
        })
        .collect()
}

fn single_step_rays(offsets: &[(i8, i8)], square: Square) -> Vec<Ray> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| offset(square, df, dr))
        .map(|dest| {
            let mut ray = Ray::new();
            ray.push(dest);
            ray
        })
        .collect()
}

fn rook_rays(square: Square) -> Vec<Ray> {
    sliding_rays(square)
        .into_iter()
        .step_by(2)
        .collect()
}

fn bishop_rays(square: Square) -> Vec<Ray> {
    sliding_rays(square)
        .into_iter()
        .skip(1)
        .step_by(2)
        .collect()
}

fn queen_rays(square: Square) -> Vec<Ray> {
    sliding_rays(square)
}

fn knight_rays(square: Square) -> Vec<Ray> {
    single_step_rays(&KNIGHT_OFFSETS, square)
}

/// King step offsets, ordered so index 0 is the step taken for kingside
/// castling (right, towards the h-file) and index 4 is the step taken for
/// queenside castling (left, towards the a-file). [`add_castling_rays`]
/// relies on this ordering to reserve those two slots.
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Unlike [`single_step_rays`], this keeps one ray per offset even when the
/// offset falls off the board (as an empty ray), so the offset's position in
/// [`KING_OFFSETS`] always matches its index in the returned `Vec`.
fn king_rays(square: Square) -> Vec<Ray> {
    KING_OFFSETS
        .iter()
        .map(|&(file_delta, rank_delta)| {
            let mut ray = Ray::new();
            if let Some(dest) = offset(square, file_delta, rank_delta) {
                ray.push(dest);
            }
            ray
        })
        .collect()
}

/// Forward/capture rays for a pawn of the given colour, ignoring the current
/// board occupancy (as [`MOVES`] always does).
fn pawn_rays(owner: Player, square: Square) -> Vec<Ray> {
    let forward: i8 = match owner {
        Player::White => 1,
        Player::Black => -1,
    };
    let start_rank = match owner {
        Player::White => Rank::Two,
        Player::Black => Rank::Seven,
    };
    let mut rays = Vec::new();

    let mut advance = Ray::new();
    if let Some(one) = offset(square, 0, forward) {
        advance.push(one);
        if square.rank() == start_rank {
            if let Some(two) = offset(square, 0, forward * 2) {
                advance.push(two);
            }
        }
    }
    if !advance.is_empty() {
        rays.push(advance);
    }

    for file_delta in [-1, 1] {
        if let Some(capture) = offset(square, file_delta, forward) {
            let mut ray = Ray::new();
            ray.push(capture);
            rays.push(ray);
        }
    }
    rays
}

/// For a pawn belonging to `owner`, the two squares from which it could
/// capture on `target` — i.e. the rays radiating outward from a target
/// square along which such a pawn attacks, not the squares the pawn itself
/// attacks from `target`.
fn pawn_attacker_squares(owner: Player, target: Square) -> Vec<Ray> {
    // A pawn attacks diagonally forward, so the square it attacked *from* is
    // diagonally backward relative to its own direction of travel.
    let backward: i8 = match owner {
        Player::White => -1,
        Player::Black => 1,
    };
    [-1, 1]
        .into_iter()
        .filter_map(|file_delta| offset(target, file_delta, backward))
        .map(|dest| {
            let mut ray = Ray::new();
            ray.push(dest);
            ray
        })
        .collect()
}

/// Reserved ray index for the kingside castling destination within
/// `MOVES['k'|'K']`: the king's home-square ray in the rightward direction,
/// extended past the adjacent step to the castling destination.
pub const KINGSIDE_CASTLE_RAY: usize = 0;
/// Reserved ray index for the queenside castling destination within
/// `MOVES['k'|'K']`: the king's home-square ray in the leftward direction,
/// extended past the adjacent step to the castling destination.
pub const QUEENSIDE_CASTLE_RAY: usize = 4;

/// Every geometrically reachable destination for a piece symbol from a given
/// origin, on an otherwise empty board, grouped into rays. Indexed by
/// `[symbol][origin]`.
pub struct MoveTable(Vec<Vec<Vec<Ray>>>);

impl MoveTable {
    /// Rays available to `symbol` starting at `origin`.
    #[must_use]
    pub fn rays(&self, symbol: char, origin: Square) -> &[Ray] {
        &self.0[symbol_index(symbol)][origin.index()]
    }
}

/// For each defended colour and attacker piece symbol, the rays radiating
/// outward from a target square along which that attacker could strike.
/// Indexed by `[defender][attacker symbol][target]`.
pub struct AttackRayTable(Vec<Vec<Vec<Vec<Ray>>>>);

impl AttackRayTable {
    /// Rays along which `attacker` could reach `target`, when `defender` is
    /// the side being checked for attacks.
    #[must_use]
    pub fn rays(&self, defender: Player, attacker: char, target: Square) -> &[Ray] {
        &self.0[defender as usize][symbol_index(attacker)][target.index()]
    }
}

const SYMBOLS: [char; 12] = ['K', 'Q', 'R', 'B', 'N', 'P', 'k', 'q', 'r', 'b', 'n', 'p'];

fn symbol_index(symbol: char) -> usize {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .expect("piece symbol is always one of KQRBNPkqrbnp")
}

fn owner_of(symbol: char) -> Player {
    if symbol.is_ascii_uppercase() {
        Player::White
    } else {
        Player::Black
    }
}

fn build_moves() -> MoveTable {
    let mut table = Vec::with_capacity(SYMBOLS.len());
    for symbol in SYMBOLS {
        let owner = owner_of(symbol);
        let mut per_square = Vec::with_capacity(64);
        for square in Square::iter() {
            let mut rays = match symbol.to_ascii_uppercase() {
                'K' => king_rays(square),
                'Q' => queen_rays(square),
                'R' => rook_rays(square),
                'B' => bishop_rays(square),
                'N' => knight_rays(square),
                'P' => pawn_rays(owner, square),
                _ => unreachable!(),
            };
            if symbol.to_ascii_uppercase() == 'K' {
                add_castling_rays(owner, square, &mut rays);
            }
            per_square.push(rays);
        }
        table.push(per_square);
    }
    MoveTable(table)
}

/// Extends the home-square king rays at [`KINGSIDE_CASTLE_RAY`] and
/// [`QUEENSIDE_CASTLE_RAY`] past their adjacent step to the castling
/// destination two squares away, the way a sliding piece's ray extends past
/// its nearest square. A no-op for every square but the king's own home
/// square.
fn add_castling_rays(owner: Player, square: Square, rays: &mut [Ray]) {
    let home = match owner {
        Player::White => Square::E1,
        Player::Black => Square::E8,
    };
    if square != home {
        return;
    }
    let (kingside, queenside) = match owner {
        Player::White => (Square::G1, Square::C1),
        Player::Black => (Square::G8, Square::C8),
    };
    rays[KINGSIDE_CASTLE_RAY].push(kingside);
    rays[QUEENSIDE_CASTLE_RAY].push(queenside);
}

fn build_attack_rays() -> AttackRayTable {
    let mut by_defender = Vec::with_capacity(2);
    for defender in [Player::White, Player::Black] {
        let mut by_symbol = Vec::with_capacity(SYMBOLS.len());
        for symbol in SYMBOLS {
            let owner = owner_of(symbol);
            // A defender is only attacked by the opposing colour's pieces.
            let relevant = owner != defender;
            let mut per_square = Vec::with_capacity(64);
            for square in Square::iter() {
                let rays = if !relevant {
                    Vec::new()
                } else {
                    match symbol.to_ascii_uppercase() {
                        'K' => king_rays(square),
                        'Q' => queen_rays(square),
                        'R' => rook_rays(square),
                        'B' => bishop_rays(square),
                        'N' => knight_rays(square),
                        'P' => pawn_attacker_squares(owner, square),
                        _ => unreachable!(),
                    }
                };
                per_square.push(rays);
            }
            by_symbol.push(per_square);
        }
        by_defender.push(by_symbol);
    }
    AttackRayTable(by_defender)
}

static MOVES: OnceLock<MoveTable> = OnceLock::new();
static ATTACK_RAYS: OnceLock<AttackRayTable> = OnceLock::new();

/// Returns the process-wide move geometry table, building it on first use.
pub fn moves() -> &'static MoveTable {
    MOVES.get_or_init(build_moves)
}

/// Returns the process-wide attack-ray table, building it on first use.
pub fn attack_rays() -> &'static AttackRayTable {
    ATTACK_RAYS.get_or_init(build_attack_rays)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::{attack_rays, moves, KINGSIDE_CASTLE_RAY, QUEENSIDE_CASTLE_RAY, SYMBOLS};
    use crate::chess::core::{Player, Square};

    #[test]
    fn rays_sorted_by_distance() {
        for symbol in super::SYMBOLS {
            for square in strum::IntoEnumIterator::iter::<Square>() {
                for ray in moves().rays(symbol, square) {
                    let mut previous = 0i32;
                    for &sq in ray {
                        let distance = (sq.index() as i32 - square.index() as i32).abs();
                        assert!(distance >= previous, "ray not sorted by distance");
                        previous = distance;
                    }
                }
            }
        }
    }

    #[test]
    fn white_king_castling_rays_reserved() {
        let rays = moves().rays('K', Square::E1);
        assert_eq!(rays[KINGSIDE_CASTLE_RAY].as_slice(), [Square::F1, Square::G1]);
        assert_eq!(rays[QUEENSIDE_CASTLE_RAY].as_slice(), [Square::D1, Square::C1]);
    }

    #[test]
    fn black_king_castling_rays_reserved() {
        let rays = moves().rays('k', Square::E8);
        assert_eq!(rays[KINGSIDE_CASTLE_RAY].as_slice(), [Square::F8, Square::G8]);
        assert_eq!(rays[QUEENSIDE_CASTLE_RAY].as_slice(), [Square::D8, Square::C8]);
    }

    #[test]
    fn attack_rays_never_include_castling_destinations() {
        let rays = attack_rays().rays(Player::Black, 'K', Square::E1);
        for ray in rays {
            assert!(!ray.contains(&Square::G1));
            assert!(!ray.contains(&Square::C1));
        }
    }

    #[test]
    fn pawn_attack_rays_exclude_forward_advance() {
        let rays = attack_rays().rays(Player::Black, 'P', Square::E4);
        for ray in rays {
            assert!(!ray.contains(&Square::E3));
        }
    }

    #[test]
    fn knight_rays_are_single_square() {
        let rays = moves().rays('N', Square::D4);
        assert_eq!(rays.len(), 8);
        for ray in rays {
            assert_eq!(ray.len(), 1);
        }
    }

    proptest! {
        #[test]
        fn moves_rays_are_sorted_by_distance(origin_index in 0u8..64, symbol_index in 0usize..SYMBOLS.len()) {
            let origin = Square::try_from(origin_index).unwrap();
            let symbol = SYMBOLS[symbol_index];
            for ray in moves().rays(symbol, origin) {
                let mut previous = 0i32;
                for &sq in ray {
                    let distance = (sq.index() as i32 - origin.index() as i32).abs();
                    prop_assert!(distance >= previous);
                    previous = distance;
                }
            }
        }

        #[test]
        fn attack_rays_are_sorted_by_distance(
            target_index in 0u8..64,
            symbol_index in 0usize..SYMBOLS.len(),
            defender_is_white in any::<bool>(),
        ) {
            let target = Square::try_from(target_index).unwrap();
            let symbol = SYMBOLS[symbol_index];
            let defender = if defender_is_white { Player::White } else { Player::Black };
            for ray in attack_rays().rays(defender, symbol, target) {
                let mut previous = 0i32;
                for &sq in ray {
                    let distance = (sq.index() as i32 - target.index() as i32).abs();
                    prop_assert!(distance >= previous);
                    previous = distance;
                }
            }
        }
    }
}
