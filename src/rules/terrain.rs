//! Static terrain classification and the heavy-zone river restriction.
//!
//! Files `a` and `b` are open water, file `c` is the coast (navy and land
//! pieces both allowed), everything east of it is land. The river splits the
//! land into a lower half (ranks 1-6) and an upper half (ranks 7-12),
//! connected by bridges on files `f` and `h`.

use crate::board_square::Square;
use crate::pieces::piece::PieceType;

/// Terrain class of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Water,
    Land,
    Mixed,
}

/// Which river half a square belongs to, for the heavy-piece crossing rule.
/// Water files carry no zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeavyZone {
    None,
    UpperHalf,
    LowerHalf,
}

/// Zero-based indices of the bridge files (`f` and `h`).
pub const BRIDGE_FILES: [u8; 2] = [5, 7];

/// Terrain class of a square. Pure data, no piece knowledge.
pub fn terrain_at(square: Square) -> Terrain {
    match square.file() {
        0 | 1 => Terrain::Water,
        2 => Terrain::Mixed,
        _ => Terrain::Land,
    }
}

/// Heavy-zone half of a square.
pub fn heavy_zone_at(square: Square) -> HeavyZone {
    if terrain_at(square) == Terrain::Water {
        return HeavyZone::None;
    }
    if square.rank() < 6 {
        HeavyZone::LowerHalf
    } else {
        HeavyZone::UpperHalf
    }
}

/// Whether a piece of the given type may stand on the square.
pub fn can_occupy(piece_type: PieceType, square: Square) -> bool {
    match terrain_at(square) {
        Terrain::Mixed => true,
        Terrain::Water => piece_type == PieceType::Navy,
        Terrain::Land => piece_type != PieceType::Navy,
    }
}

/// Whether a heavy piece is barred from *moving* between the two squares.
/// Crossing the river is only allowed along a bridge file; captures are
/// exempt from this rule and must not be routed through here.
pub fn heavy_move_blocked(from: Square, to: Square) -> bool {
    let from_zone = heavy_zone_at(from);
    let to_zone = heavy_zone_at(to);
    if from_zone == HeavyZone::None || to_zone == HeavyZone::None || from_zone == to_zone {
        return false;
    }
    !(from.file() == to.file() && BRIDGE_FILES.contains(&from.file()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn terrain_layout() {
        assert_eq!(terrain_at(sq("a5")), Terrain::Water);
        assert_eq!(terrain_at(sq("b12")), Terrain::Water);
        assert_eq!(terrain_at(sq("c3")), Terrain::Mixed);
        assert_eq!(terrain_at(sq("d3")), Terrain::Land);
        assert_eq!(terrain_at(sq("k1")), Terrain::Land);
    }

    #[test]
    fn occupancy_rules() {
        assert!(can_occupy(PieceType::Navy, sq("a4")));
        assert!(can_occupy(PieceType::Navy, sq("c4")));
        assert!(!can_occupy(PieceType::Navy, sq("d4")));
        assert!(can_occupy(PieceType::Tank, sq("c4")));
        assert!(!can_occupy(PieceType::Tank, sq("b4")));
        assert!(!can_occupy(PieceType::AirForce, sq("a4")));
    }

    #[test]
    fn heavy_zone_halves_and_bridges() {
        assert_eq!(heavy_zone_at(sq("d6")), HeavyZone::LowerHalf);
        assert_eq!(heavy_zone_at(sq("d7")), HeavyZone::UpperHalf);
        assert_eq!(heavy_zone_at(sq("a6")), HeavyZone::None);

        // Crossing away from a bridge is blocked.
        assert!(heavy_move_blocked(sq("d6"), sq("d7")));
        assert!(heavy_move_blocked(sq("e6"), sq("d7")));
        // Crossing along a bridge file is open.
        assert!(!heavy_move_blocked(sq("f6"), sq("f7")));
        assert!(!heavy_move_blocked(sq("h6"), sq("h8")));
        // A diagonal step onto a bridge file still crosses open water.
        assert!(heavy_move_blocked(sq("e6"), sq("f7")));
        // Moves within one half are unrestricted.
        assert!(!heavy_move_blocked(sq("d5"), sq("d6")));
        assert!(!heavy_move_blocked(sq("g8"), sq("g12")));
    }
}
