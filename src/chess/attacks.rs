//! Attack and pin resolution: is a square attacked, by what, and which
//! friendly pieces are pinned in the process.

use arrayvec::ArrayVec;

use crate::chess::board::Board;
use crate::chess::core::{Player, Square};
use crate::chess::geometry::{self, Ray};

/// An attacker threatening the target square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attacker {
    /// Square the attacking piece occupies.
    pub square: Square,
    /// The ray from the target square up to and including the attacker.
    pub ray: Ray,
}

/// A friendly piece pinned against the defended square by a sliding
/// attacker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    /// Square the pinned piece occupies.
    pub square: Square,
    /// Squares the pinned piece may still move to without exposing the
    /// defended square: the ray prefix up to and including the pinner.
    pub allowed: Ray,
}

/// Result of resolving attacks against one square.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attacks {
    /// Whether the square is attacked at all.
    pub attacked: bool,
    /// Attackers found, populated only when details were requested.
    pub attackers: Vec<Attacker>,
    /// Pins found, populated only when details were requested.
    pub pins: Vec<Pin>,
}

const WHITE_ATTACKER_SYMBOLS: [char; 6] = ['k', 'q', 'r', 'b', 'n', 'p'];
const BLACK_ATTACKER_SYMBOLS: [char; 6] = ['K', 'Q', 'R', 'B', 'N', 'P'];

/// Reports whether `target` is attacked when defended by `defender`, and
/// optionally the attackers and pins responsible.
///
/// When `get_details` is `false`, this returns as soon as the first attacker
/// is found, without computing pins.
#[must_use]
pub fn square_attacked(
    board: &Board,
    target: Square,
    defender: Player,
    get_details: bool,
) -> Attacks {
    let mut result = Attacks::default();
    let attacker_symbols = match defender {
        Player::White => WHITE_ATTACKER_SYMBOLS,
        Player::Black => BLACK_ATTACKER_SYMBOLS,
    };

    for symbol in attacker_symbols {
        for ray in geometry::attack_rays().rays(defender, symbol, target) {
            scan_ray(board, defender, symbol, ray, get_details, &mut result);
            if result.attacked && !get_details {
                return result;
            }
        }
    }
    result
}

fn scan_ray(
    board: &Board,
    defender: Player,
    attacker_symbol: char,
    ray: &Ray,
    get_details: bool,
    result: &mut Attacks,
) {
    let mut occupied = ray
        .iter()
        .enumerate()
        .filter(|(_, sq)| board.get_piece(**sq) != ' ');
    let Some((first_idx, &first_sq)) = occupied.next() else {
        return;
    };
    let occupant = board.get_piece(first_sq);

    if occupant == attacker_symbol {
        result.attacked = true;
        if get_details {
            result.attackers.push(Attacker {
                square: first_sq,
                ray: prefix(ray, first_idx),
            });
        }
        return;
    }

    if board.get_owner(first_sq) != Some(defender) {
        // Blocked by an opponent piece of a different type.
        return;
    }
    if !get_details {
        return;
    }

    // Candidate pin: keep walking past the friendly piece.
    let Some((second_idx, &second_sq)) = occupied.next() else {
        return;
    };
    if board.get_piece(second_sq) == attacker_symbol {
        result.pins.push(Pin {
            square: first_sq,
            allowed: prefix(ray, second_idx),
        });
    }
}

fn prefix(ray: &Ray, up_to: usize) -> Ray {
    ray.iter().take(up_to + 1).copied().collect::<ArrayVec<_, 7>>()
}
