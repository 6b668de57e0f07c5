//! Undo history: one entry per executed command, carrying the pre-move
//! snapshot that is restored verbatim when the entry is popped.

use crate::board_square::Square;
use crate::commands::move_command::MoveCommand;
use crate::game_state::deploy_session::DeploySession;
use crate::pieces::piece::PieceColor;

/// State captured immediately before a command executes. The board itself
/// is restored by the command's own inverse; the snapshot covers everything
/// the command does not own: turn, clocks, the deploy session and the
/// repetition trail length.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub commander_squares: [Option<Square>; 2],
    pub turn: PieceColor,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub deploy_session: Option<DeploySession>,
    pub repetition_len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub command: MoveCommand,
    pub snapshot: Snapshot,
}
