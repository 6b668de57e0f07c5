//! Piece identity: color, type, heroic status and one-level stacks.

/// Side of a piece. Red moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Red,
    Blue,
}

impl PieceColor {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceColor::Red => 0,
            PieceColor::Blue => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            PieceColor::Red => PieceColor::Blue,
            PieceColor::Blue => PieceColor::Red,
        }
    }
}

/// The eleven piece types of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Commander,
    Infantry,
    Tank,
    Militia,
    Engineer,
    Artillery,
    AntiAir,
    Missile,
    AirForce,
    Navy,
    Headquarter,
}

impl PieceType {
    pub const ALL: [PieceType; 11] = [
        PieceType::Commander,
        PieceType::Infantry,
        PieceType::Tank,
        PieceType::Militia,
        PieceType::Engineer,
        PieceType::Artillery,
        PieceType::AntiAir,
        PieceType::Missile,
        PieceType::AirForce,
        PieceType::Navy,
        PieceType::Headquarter,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceType::Commander => 0,
            PieceType::Infantry => 1,
            PieceType::Tank => 2,
            PieceType::Militia => 3,
            PieceType::Engineer => 4,
            PieceType::Artillery => 5,
            PieceType::AntiAir => 6,
            PieceType::Missile => 7,
            PieceType::AirForce => 8,
            PieceType::Navy => 9,
            PieceType::Headquarter => 10,
        }
    }

    /// Upper-case notation letter for this type.
    pub const fn letter(self) -> char {
        match self {
            PieceType::Commander => 'C',
            PieceType::Infantry => 'I',
            PieceType::Tank => 'T',
            PieceType::Militia => 'M',
            PieceType::Engineer => 'E',
            PieceType::Artillery => 'A',
            PieceType::AntiAir => 'G',
            PieceType::Missile => 'S',
            PieceType::AirForce => 'F',
            PieceType::Navy => 'N',
            PieceType::Headquarter => 'H',
        }
    }

    /// Parses a notation letter of either case.
    pub fn from_letter(letter: char) -> Option<PieceType> {
        match letter.to_ascii_uppercase() {
            'C' => Some(PieceType::Commander),
            'I' => Some(PieceType::Infantry),
            'T' => Some(PieceType::Tank),
            'M' => Some(PieceType::Militia),
            'E' => Some(PieceType::Engineer),
            'A' => Some(PieceType::Artillery),
            'G' => Some(PieceType::AntiAir),
            'S' => Some(PieceType::Missile),
            'F' => Some(PieceType::AirForce),
            'N' => Some(PieceType::Navy),
            'H' => Some(PieceType::Headquarter),
            _ => None,
        }
    }
}

/// A piece on the board. The `carried` list is at most one level deep:
/// carried pieces never carry anything themselves, and every member of a
/// stack shares the carrier's color.
///
/// `carried` is kept sorted by type index so that two stacks assembled along
/// different routes compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: PieceColor,
    pub heroic: bool,
    pub carried: Vec<Piece>,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: PieceColor) -> Self {
        Piece {
            piece_type,
            color,
            heroic: false,
            carried: Vec::new(),
        }
    }

    pub fn heroic(piece_type: PieceType, color: PieceColor) -> Self {
        Piece {
            piece_type,
            color,
            heroic: true,
            carried: Vec::new(),
        }
    }

    /// Whether this piece currently carries others.
    #[inline]
    pub fn is_stack(&self) -> bool {
        !self.carried.is_empty()
    }

    /// The piece itself plus everything it carries.
    pub fn flattened(&self) -> Vec<&Piece> {
        let mut out = Vec::with_capacity(1 + self.carried.len());
        out.push(self);
        out.extend(self.carried.iter());
        out
    }

    /// Number of individual pieces in this stack (1 for a single piece).
    #[inline]
    pub fn flattened_count(&self) -> usize {
        1 + self.carried.len()
    }

    /// A copy of this piece without its cargo.
    pub fn without_cargo(&self) -> Piece {
        Piece {
            piece_type: self.piece_type,
            color: self.color,
            heroic: self.heroic,
            carried: Vec::new(),
        }
    }

    /// Restores the canonical cargo ordering (heaviest type first) after a
    /// mutation, so stacks assembled along different routes compare equal.
    pub fn normalize(&mut self) {
        self.carried
            .sort_by_key(|piece| std::cmp::Reverse(piece.piece_type.index()));
    }

    /// Notation letter in the case matching the color (upper red, lower
    /// blue), without the heroic marker.
    pub fn letter(&self) -> char {
        match self.color {
            PieceColor::Red => self.piece_type.letter(),
            PieceColor::Blue => self.piece_type.letter().to_ascii_lowercase(),
        }
    }
}
