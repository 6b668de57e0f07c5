//! The in-progress multi-step deploy turn.
//!
//! A session exists only while a stack is being split up. It is created by
//! the command engine when a deploy-flagged move executes with no session
//! active, grows by one recorded action per deploy step, and is destroyed
//! either by completion (every original piece accounted for) or by explicit
//! cancellation. The session is plain data: all mutation goes through
//! command actions so that undo sees every change.

use crate::board_square::Square;
use crate::move_generation::moves::Move;
use crate::pieces::piece::{Piece, PieceColor, PieceType};

#[derive(Debug, Clone, PartialEq)]
pub struct DeploySession {
    /// Square of the stack being deployed.
    pub stack_square: Square,
    /// Side whose turn the deploy belongs to; restored on cancellation.
    pub turn: PieceColor,
    /// The full stack as it stood before the first deploy step.
    pub original_piece: Piece,
    /// Deploy moves recorded so far, oldest first.
    pub actions: Vec<Move>,
    /// Pieces declared to stay behind; `None` until a commit declares them.
    pub stay_pieces: Option<Vec<Piece>>,
}

impl DeploySession {
    pub fn new(stack_square: Square, turn: PieceColor, original_piece: Piece) -> Self {
        DeploySession {
            stack_square,
            turn,
            original_piece,
            actions: Vec::new(),
            stay_pieces: None,
        }
    }

    /// Individual pieces in the original stack.
    pub fn original_count(&self) -> usize {
        self.original_piece.flattened_count()
    }

    /// Individual pieces accounted for by recorded actions.
    pub fn moved_count(&self) -> usize {
        self.actions
            .iter()
            .map(|action| action.piece.flattened_count())
            .sum()
    }

    /// Individual pieces declared to stay behind.
    pub fn staying_count(&self) -> usize {
        self.stay_pieces
            .as_ref()
            .map(|pieces| pieces.len())
            .unwrap_or(0)
    }

    /// The completion test run after every deploy action: each original
    /// piece is either the subject of an action or declared staying.
    pub fn is_complete(&self) -> bool {
        self.moved_count() + self.staying_count() == self.original_count()
    }

    /// Types of every piece that has already acted this session. Stacks are
    /// small and never hold two pieces of one type, so types identify
    /// pieces.
    pub fn acted_types(&self) -> Vec<PieceType> {
        self.actions
            .iter()
            .flat_map(|action| {
                action
                    .piece
                    .flattened()
                    .iter()
                    .map(|piece| piece.piece_type)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Squares holding pieces deployed earlier this session; these are the
    /// recombination targets for not-yet-moved stack members. Subjects of
    /// stay captures never left the stack and suicide subjects are gone.
    pub fn deployed_destinations(&self) -> Vec<Square> {
        let mut out = Vec::new();
        for action in &self.actions {
            if action.subject_relocates() && !out.contains(&action.to) {
                out.push(action.to);
            }
        }
        out
    }
}
