//! The piece-combination oracle.
//!
//! Decides whether a group of pieces can form a single carrier/carried
//! stack, and which piece carries. Both stacking during deploys and
//! recombination go through `try_combine`; nothing else in the engine is
//! allowed to invent stacks.

use crate::pieces::piece::{Piece, PieceType};

/// Result of asking the oracle to merge a group of pieces.
///
/// `combined` is the stack that could be formed (or the lone input piece);
/// `uncombined` lists the pieces that found no slot. A fully successful
/// combination has an empty `uncombined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineOutcome {
    pub combined: Option<Piece>,
    pub uncombined: Vec<Piece>,
}

/// Carrier candidates in the order the oracle prefers them.
const CARRIER_PRIORITY: [PieceType; 4] = [
    PieceType::Navy,
    PieceType::AirForce,
    PieceType::Tank,
    PieceType::Engineer,
];

/// Cargo slot sets per carrier. The navy has two independent slots; the
/// others have one.
fn slot_sets(carrier: PieceType) -> &'static [&'static [PieceType]] {
    const HEAVY_CARGO: &[PieceType] = &[PieceType::Artillery, PieceType::AntiAir, PieceType::Missile];
    const FOOT_CARGO: &[PieceType] = &[
        PieceType::Commander,
        PieceType::Infantry,
        PieceType::Militia,
        PieceType::Engineer,
    ];
    const NAVY_DECK: &[PieceType] = &[PieceType::Tank, PieceType::AirForce];

    match carrier {
        PieceType::Navy => &[NAVY_DECK, FOOT_CARGO],
        PieceType::Tank | PieceType::AirForce => &[FOOT_CARGO],
        PieceType::Engineer => &[HEAVY_CARGO],
        _ => &[],
    }
}

/// Whether `carrier` has a slot that accepts `cargo` at all.
pub fn can_carry(carrier: PieceType, cargo: PieceType) -> bool {
    slot_sets(carrier)
        .iter()
        .any(|slot| slot.contains(&cargo))
}

/// Attempts to merge the given pieces (stacks allowed; they are flattened
/// first) into one stack.
///
/// The oracle picks the highest-priority carrier present and greedily fills
/// its slots; pieces without a slot are returned in `uncombined`. All
/// pieces must share a color or everything is rejected.
pub fn try_combine(pieces: &[Piece]) -> CombineOutcome {
    let mut singles: Vec<Piece> = Vec::new();
    for piece in pieces {
        singles.push(piece.without_cargo());
        for carried in &piece.carried {
            singles.push(carried.without_cargo());
        }
    }

    if singles.is_empty() {
        return CombineOutcome {
            combined: None,
            uncombined: Vec::new(),
        };
    }
    if singles.len() == 1 {
        return CombineOutcome {
            combined: Some(singles.remove(0)),
            uncombined: Vec::new(),
        };
    }
    if singles.iter().any(|piece| piece.color != singles[0].color) {
        return CombineOutcome {
            combined: None,
            uncombined: singles,
        };
    }

    let carrier_index = CARRIER_PRIORITY.iter().find_map(|candidate| {
        singles
            .iter()
            .position(|piece| piece.piece_type == *candidate)
    });
    let Some(carrier_index) = carrier_index else {
        return CombineOutcome {
            combined: None,
            uncombined: singles,
        };
    };

    let mut carrier = singles.remove(carrier_index);
    let slots = slot_sets(carrier.piece_type);
    let mut slot_used = vec![false; slots.len()];
    let mut uncombined = Vec::new();

    for piece in singles {
        let slot = slots.iter().enumerate().find(|(index, allowed)| {
            !slot_used[*index] && allowed.contains(&piece.piece_type)
        });
        match slot {
            Some((index, _)) => {
                slot_used[index] = true;
                carrier.carried.push(piece);
            }
            None => uncombined.push(piece),
        }
    }

    carrier.normalize();
    CombineOutcome {
        combined: Some(carrier),
        uncombined,
    }
}

/// Whether the whole group merges into one stack with nothing left over.
pub fn can_combine_fully(pieces: &[Piece]) -> bool {
    combined_of(pieces).is_some()
}

/// The stack formed by a fully successful combination, or `None`.
pub fn combined_of(pieces: &[Piece]) -> Option<Piece> {
    let outcome = try_combine(pieces);
    if outcome.uncombined.is_empty() {
        outcome.combined
    } else {
        None
    }
}
