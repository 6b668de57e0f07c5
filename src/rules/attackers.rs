//! The attack detector.
//!
//! One ray-scanning routine backs check detection, heroic promotion and the
//! commander-versus-commander rule: scan all eight rays outward from the
//! target square, flatten every stack encountered, and test each
//! constituent's capture rules against the distance, blocking and
//! air-defense constraints.

use crate::board_square::{Square, ALL_DIRECTIONS};
use crate::game_state::board::Board;
use crate::pieces::piece::{PieceColor, PieceType};
use crate::rules::air_defense::{AdStatus, AdTraversal};
use crate::rules::move_table::{capture_range_against, rule_for, SpecialRule, INFINITE_RANGE};

/// One piece found to be attacking a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attacker {
    pub square: Square,
    pub piece_type: PieceType,
    pub heroic: bool,
}

/// Every piece of `by` color attacking `target`, including constituents
/// carried inside stacks. Stay-capture and suicide-capture threats count:
/// either way the occupant of `target` would be removed.
pub fn attackers_to_square(board: &Board, target: Square, by: PieceColor) -> Vec<Attacker> {
    let target_piece = board.piece_at(target);
    let target_type = target_piece.map(|piece| piece.piece_type);
    let target_is_enemy_commander = target_piece
        .map(|piece| piece.piece_type == PieceType::Commander && piece.color != by)
        .unwrap_or(false);

    let mut attackers = Vec::new();
    for (d_file, d_rank) in ALL_DIRECTIONS {
        let diagonal = d_file != 0 && d_rank != 0;
        let mut blockers_between = 0usize;
        let mut distance = 1u8;
        while let Some(square) = target.offset(d_file * distance as i8, d_rank * distance as i8) {
            if let Some(occupant) = board.piece_at(square) {
                if occupant.color == by {
                    for constituent in occupant.flattened() {
                        if constituent_attacks(
                            board,
                            square,
                            target,
                            constituent.piece_type,
                            constituent.heroic,
                            by,
                            target_type,
                            target_is_enemy_commander,
                            diagonal,
                            distance,
                            blockers_between,
                        ) {
                            attackers.push(Attacker {
                                square,
                                piece_type: constituent.piece_type,
                                heroic: constituent.heroic,
                            });
                        }
                    }
                }
                blockers_between += 1;
            }
            distance += 1;
        }
    }
    attackers
}

/// Whether any piece of `by` color attacks `target`.
pub fn is_square_attacked(board: &Board, target: Square, by: PieceColor) -> bool {
    !attackers_to_square(board, target, by).is_empty()
}

#[allow(clippy::too_many_arguments)]
fn constituent_attacks(
    board: &Board,
    from: Square,
    target: Square,
    piece_type: PieceType,
    heroic: bool,
    by: PieceColor,
    target_type: Option<PieceType>,
    target_is_enemy_commander: bool,
    diagonal: bool,
    distance: u8,
    blockers_between: usize,
) -> bool {
    let rule = rule_for(piece_type, heroic);

    // Commander duel: any orthogonal distance, but never through a blocker.
    if rule.specials.contains(&SpecialRule::CommanderDuel)
        && target_is_enemy_commander
        && !diagonal
        && blockers_between == 0
    {
        return true;
    }

    let range = capture_range_against(&rule, target_type, diagonal);
    if range == 0 || (range != INFINITE_RANGE && distance > range) {
        return false;
    }
    if blockers_between > 0 && !rule.capture_ignores_blocking {
        return false;
    }
    if piece_type == PieceType::AirForce && !air_strike_reaches(board, from, target, by) {
        return false;
    }
    true
}

/// Walks the air-force strike path from the attacker to the target,
/// applying the zone-crossing rules. A path cut by a second zone is no
/// attack; ending inside a single zone is still an attack (the suicide
/// kind).
fn air_strike_reaches(board: &Board, from: Square, target: Square, by: PieceColor) -> bool {
    let defense = board.air_defense(by.opposite());
    let d_file = (target.file() as i16 - from.file() as i16).signum() as i8;
    let d_rank = (target.rank() as i16 - from.rank() as i16).signum() as i8;
    let mut traversal = AdTraversal::new();
    let mut square = from;
    loop {
        square = match square.offset(d_file, d_rank) {
            Some(next) => next,
            None => return false,
        };
        if traversal.advance(defense.covering(square)) == AdStatus::Blocked {
            return false;
        }
        if square == target {
            return true;
        }
    }
}

/// The flying-general exposure test: true when the two commanders stand on
/// the same file or rank with nothing between them. Symmetric and
/// independent of whose turn it is. A commander riding inside a stack is
/// shielded by its carrier and does not expose.
pub fn commanders_exposed(board: &Board) -> bool {
    let (Some(red), Some(blue)) = (
        board.commander_square(PieceColor::Red),
        board.commander_square(PieceColor::Blue),
    ) else {
        return false;
    };
    let red_outer = board.piece_at(red).map(|piece| piece.piece_type);
    let blue_outer = board.piece_at(blue).map(|piece| piece.piece_type);
    if red_outer != Some(PieceType::Commander) || blue_outer != Some(PieceType::Commander) {
        return false;
    }
    if red.file() != blue.file() && red.rank() != blue.rank() {
        return false;
    }
    let d_file = (blue.file() as i16 - red.file() as i16).signum() as i8;
    let d_rank = (blue.rank() as i16 - red.rank() as i16).signum() as i8;
    let mut square = red;
    loop {
        square = match square.offset(d_file, d_rank) {
            Some(next) => next,
            None => return false,
        };
        if square == blue {
            return true;
        }
        if board.piece_at(square).is_some() {
            return false;
        }
    }
}
