//! Square indexing over the padded board grid.
//!
//! The playing area is 11 files (`a`..`k`) by 12 ranks (`1`..`12`), stored
//! inside a 16-wide grid so that the file and rank of a square are single
//! shift/mask operations and off-board detection needs no division.

use crate::errors::EngineError;

/// Number of playable files (`a`..`k`).
pub const BOARD_FILES: u8 = 11;
/// Number of playable ranks (`1`..`12`).
pub const BOARD_RANKS: u8 = 12;
/// Width of the padded grid backing the board.
pub const GRID_WIDTH: u8 = 16;
/// Total slots in the padded grid (`16 * 12`).
pub const GRID_SIZE: usize = (GRID_WIDTH as usize) * (BOARD_RANKS as usize);

/// A square of the playing area, stored as `rank * 16 + file`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

/// The four orthogonal direction deltas as `(d_file, d_rank)`.
pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
/// The four diagonal direction deltas as `(d_file, d_rank)`.
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
/// All eight ray directions, orthogonals first.
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

impl Square {
    /// Builds a square from zero-based file and rank indices.
    pub fn from_file_rank(file: u8, rank: u8) -> Result<Self, EngineError> {
        if file >= BOARD_FILES || rank >= BOARD_RANKS {
            return Err(EngineError::InvalidSquare(format!(
                "file {file}, rank {rank}"
            )));
        }
        Ok(Square(rank * GRID_WIDTH + file))
    }

    /// Rebuilds a square from a raw padded-grid index.
    pub fn from_index(index: usize) -> Result<Self, EngineError> {
        let raw = index as u8;
        if index >= GRID_SIZE || (raw & 0x0F) >= BOARD_FILES {
            return Err(EngineError::InvalidSquare(format!("index {index}")));
        }
        Ok(Square(raw))
    }

    /// Zero-based file index (`0` == file `a`).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 0x0F
    }

    /// Zero-based rank index (`0` == rank `1`).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// Raw index into the padded grid.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Offsets the square by a file/rank delta, or `None` when the result
    /// falls off the playing area.
    pub fn offset(self, d_file: i8, d_rank: i8) -> Option<Square> {
        let file = self.file() as i16 + d_file as i16;
        let rank = self.rank() as i16 + d_rank as i16;
        if file < 0 || file >= BOARD_FILES as i16 || rank < 0 || rank >= BOARD_RANKS as i16 {
            return None;
        }
        Some(Square((rank as u8) * GRID_WIDTH + file as u8))
    }

    /// Chebyshev distance to another square.
    pub fn chebyshev_distance(self, other: Square) -> u8 {
        let df = (self.file() as i16 - other.file() as i16).unsigned_abs() as u8;
        let dr = (self.rank() as i16 - other.rank() as i16).unsigned_abs() as u8;
        df.max(dr)
    }

    /// Converts to algebraic notation (for example `a1`, `k12`).
    pub fn to_algebraic(self) -> String {
        format!("{}{}", char::from(b'a' + self.file()), self.rank() + 1)
    }

    /// Parses algebraic notation (for example `e4`, `k12`).
    pub fn from_algebraic(text: &str) -> Result<Self, EngineError> {
        let bytes = text.as_bytes();
        if bytes.len() < 2 || bytes.len() > 3 {
            return Err(EngineError::InvalidSquare(text.to_string()));
        }
        let file_byte = bytes[0];
        if !(b'a'..b'a' + BOARD_FILES).contains(&file_byte) {
            return Err(EngineError::InvalidSquare(text.to_string()));
        }
        let rank: u8 = text[1..]
            .parse::<u8>()
            .map_err(|_| EngineError::InvalidSquare(text.to_string()))?;
        if rank < 1 || rank > BOARD_RANKS {
            return Err(EngineError::InvalidSquare(text.to_string()));
        }
        Square::from_file_rank(file_byte - b'a', rank - 1)
    }

    /// Iterates every playable square, rank by rank from `a1`.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_RANKS).flat_map(|rank| {
            (0..BOARD_FILES).map(move |file| Square(rank * GRID_WIDTH + file))
        })
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl std::fmt::Debug for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
