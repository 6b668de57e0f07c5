//! The static movement rule table.
//!
//! One row per piece type, adjusted for heroic status on lookup. All range,
//! blocking and zone behavior flows from this data; the only piece-specific
//! code branches allowed elsewhere are the named `SpecialRule`s.

use crate::pieces::piece::PieceType;

/// Sentinel for an unbounded sliding range.
pub const INFINITE_RANGE: u8 = u8::MAX;

/// Named exceptions that cannot be expressed as plain range data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialRule {
    /// The commander captures the enemy commander at any orthogonal
    /// distance, provided no piece stands between them.
    CommanderDuel,
    /// The navy's capture range is one longer against enemy navies than
    /// against any other target.
    NavyDualRange,
}

/// Movement/capture characteristics of one piece type.
///
/// Diagonal ranges of zero mean the piece cannot act diagonally at all;
/// otherwise diagonal and orthogonal ranges are independent (the missile
/// reaches two squares orthogonally but only one diagonally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRule {
    pub move_range: u8,
    pub capture_range: u8,
    pub diagonal_move_range: u8,
    pub diagonal_capture_range: u8,
    pub move_ignores_blocking: bool,
    pub capture_ignores_blocking: bool,
    pub heavy: bool,
    pub air_defense_level: u8,
    pub specials: &'static [SpecialRule],
}

const fn rule(
    move_range: u8,
    capture_range: u8,
    diagonal_move_range: u8,
    diagonal_capture_range: u8,
) -> MoveRule {
    MoveRule {
        move_range,
        capture_range,
        diagonal_move_range,
        diagonal_capture_range,
        move_ignores_blocking: false,
        capture_ignores_blocking: false,
        heavy: false,
        air_defense_level: 0,
        specials: &[],
    }
}

/// Base table, before heroic adjustment.
pub const fn base_rule(piece_type: PieceType) -> MoveRule {
    match piece_type {
        PieceType::Commander => MoveRule {
            specials: &[SpecialRule::CommanderDuel],
            ..rule(INFINITE_RANGE, 1, 0, 0)
        },
        PieceType::Infantry => rule(1, 1, 0, 0),
        PieceType::Tank => rule(2, 2, 0, 0),
        PieceType::Militia => rule(1, 1, 1, 1),
        PieceType::Engineer => rule(1, 1, 0, 0),
        PieceType::Artillery => MoveRule {
            capture_ignores_blocking: true,
            heavy: true,
            ..rule(3, 3, 3, 3)
        },
        PieceType::AntiAir => MoveRule {
            heavy: true,
            air_defense_level: 1,
            ..rule(1, 1, 0, 0)
        },
        PieceType::Missile => MoveRule {
            capture_ignores_blocking: true,
            heavy: true,
            air_defense_level: 2,
            ..rule(2, 2, 1, 1)
        },
        PieceType::AirForce => MoveRule {
            move_ignores_blocking: true,
            capture_ignores_blocking: true,
            ..rule(4, 4, 4, 4)
        },
        PieceType::Navy => MoveRule {
            capture_ignores_blocking: true,
            air_defense_level: 1,
            specials: &[SpecialRule::NavyDualRange],
            ..rule(4, 3, 4, 3)
        },
        PieceType::Headquarter => rule(0, 0, 0, 0),
    }
}

/// Heroic range bump: +1, except that a zero range becomes one and an
/// unbounded range stays unbounded.
const fn bump(range: u8) -> u8 {
    match range {
        0 => 1,
        INFINITE_RANGE => INFINITE_RANGE,
        n => n + 1,
    }
}

/// Rule row for a piece, with heroic adjustments applied: +1 to both
/// ranges, diagonal capability granted at the bumped ranges, and one extra
/// air-defense level.
pub fn rule_for(piece_type: PieceType, heroic: bool) -> MoveRule {
    let base = base_rule(piece_type);
    if !heroic {
        return base;
    }
    let move_range = bump(base.move_range);
    let capture_range = bump(base.capture_range);
    MoveRule {
        move_range,
        capture_range,
        diagonal_move_range: if base.diagonal_move_range > 0 {
            bump(base.diagonal_move_range)
        } else {
            move_range
        },
        diagonal_capture_range: if base.diagonal_capture_range > 0 {
            bump(base.diagonal_capture_range)
        } else {
            capture_range
        },
        air_defense_level: if base.air_defense_level > 0 {
            base.air_defense_level + 1
        } else {
            0
        },
        ..base
    }
}

/// Capture range of a rule against a specific target type along an
/// orthogonal or diagonal ray, applying `NavyDualRange`.
pub fn capture_range_against(
    rule: &MoveRule,
    target: Option<PieceType>,
    diagonal: bool,
) -> u8 {
    let base = if diagonal {
        rule.diagonal_capture_range
    } else {
        rule.capture_range
    };
    if base == 0 || base == INFINITE_RANGE {
        return base;
    }
    if rule.specials.contains(&SpecialRule::NavyDualRange) && target == Some(PieceType::Navy) {
        base + 1
    } else {
        base
    }
}
