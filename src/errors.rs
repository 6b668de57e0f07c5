//! Errors used throughout the rules engine.
//!
//! This module defines the canonical error type returned by game logic,
//! parsing utilities, move generation and the command engine. The enum
//! `EngineError` is used as the single error type across the crate to
//! simplify propagation and matching.
//!
//! Usage guidelines:
//! - Parsing and input-related variants (`InvalidSquare`, `InvalidFen`,
//!   `InvalidSan`, `NoSuchMove`, `AmbiguousMove`) are recoverable and
//!   suitable for presenting to end users.
//! - `StackCombinationFailure` and `NoActiveDeploySession` are domain-level
//!   errors: the requested operation is rejected as a whole and the position
//!   is left untouched.
//! - `DeploySessionInvariantViolation` and `TerrainViolation` indicate a bug
//!   in move generation or the command engine. They are never produced by
//!   well-formed input; callers should treat them as fatal.

/// Unified error type for the rules engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A coordinate was outside the 11-file by 12-rank board, or an
    /// algebraic square string could not be parsed.
    #[error("invalid square: '{0}'")]
    InvalidSquare(String),

    /// A position notation string was malformed. The payload describes the
    /// offending field or token.
    #[error("invalid position notation: {0}")]
    InvalidFen(String),

    /// A move notation string could not be tokenized.
    #[error("invalid move notation: '{0}'")]
    InvalidSan(String),

    /// A move request matched no legal move. Surfaced to the caller; the
    /// position is unchanged.
    #[error("no legal move matches '{0}'")]
    NoSuchMove(String),

    /// A move request matched more than one legal move. The payload carries
    /// the notation of every candidate so the caller can disambiguate.
    #[error("'{notation}' is ambiguous: matches {} legal moves", .candidates.len())]
    AmbiguousMove {
        notation: String,
        candidates: Vec<String>,
    },

    /// The piece-combination oracle rejected a requested grouping. The
    /// operation that needed the grouping is rejected as a whole.
    #[error("pieces cannot combine into one stack: {0}")]
    StackCombinationFailure(String),

    /// Piece accounting failed when closing a deploy session: moved pieces
    /// plus staying pieces did not cover the original stack. Indicates a
    /// generator or command-engine bug.
    #[error("deploy session at {square} lost track of pieces: {moved} moved + {staying} staying != {original} original")]
    DeploySessionInvariantViolation {
        square: String,
        moved: usize,
        staying: usize,
        original: usize,
    },

    /// A piece was about to be placed on, or left standing on, terrain it
    /// cannot occupy. Generation must prevent this; reaching it at execution
    /// time is a programming error.
    #[error("{piece} cannot stand on {terrain} terrain at {square}")]
    TerrainViolation {
        piece: String,
        terrain: String,
        square: String,
    },

    /// A piece was about to be placed on a square that already holds one.
    /// The board never merges stacks implicitly; combination goes through
    /// the oracle.
    #[error("square {0} is already occupied")]
    SquareOccupied(String),

    /// A piece was expected on a square that is empty.
    #[error("square {0} is empty")]
    EmptySquare(String),

    /// A deploy-session operation was requested while no session is active.
    #[error("no deploy session is active")]
    NoActiveDeploySession,

    /// An undo was requested with an empty history.
    #[error("nothing to undo")]
    NothingToUndo,

    /// A move was submitted after the game ended (commander captured).
    #[error("the game is over")]
    GameOver,
}
