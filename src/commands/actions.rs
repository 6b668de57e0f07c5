//! Atomic, independently reversible state changes.
//!
//! Every move command is an ordered list of these actions. Each action
//! carries the values needed to reverse itself exactly, but resolves the
//! *current* board and session through the context passed in at the moment
//! it executes or undoes — never through references captured earlier.

use crate::board_square::Square;
use crate::errors::EngineError;
use crate::game_state::board::Board;
use crate::game_state::deploy_session::DeploySession;
use crate::move_generation::moves::Move;
use crate::pieces::piece::{Piece, PieceColor, PieceType};

/// The mutable engine state an action operates on.
pub struct ActionContext<'a> {
    pub board: &'a mut Board,
    pub session: &'a mut Option<DeploySession>,
    pub turn: &'a mut PieceColor,
}

/// One reversible step of a move command.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Remove the piece (or whole stack) standing on a square.
    RemovePiece { square: Square, piece: Piece },
    /// Place a piece on an empty square.
    PlacePiece { square: Square, piece: Piece },
    /// Swap the piece on a square for another (stack combination).
    ReplacePiece {
        square: Square,
        before: Piece,
        after: Piece,
    },
    /// Take a sub-group out of a stack, leaving the remainder (or nothing).
    SplitStack {
        square: Square,
        original: Piece,
        remainder: Option<Piece>,
    },
    /// Flip the heroic flag of one constituent on a square.
    SetHeroic {
        square: Square,
        piece_type: PieceType,
        before: bool,
        after: bool,
    },
    /// Start a deploy session for the stack on `square`.
    OpenDeploySession {
        square: Square,
        original: Piece,
        turn: PieceColor,
    },
    /// Append one deploy move to the active session's action log.
    RecordDeployAction { action: Move },
    /// Declare which pieces stay behind when a session is committed.
    DeclareStayPieces {
        before: Option<Vec<Piece>>,
        after: Vec<Piece>,
    },
    /// Clear the active session, keeping a copy for the inverse.
    CloseDeploySession { session: DeploySession },
    /// Hand the move to the other side.
    SwitchTurn,
}

impl Action {
    pub fn apply(&self, context: &mut ActionContext<'_>) -> Result<(), EngineError> {
        match self {
            Action::RemovePiece { square, .. } => {
                context.board.remove_piece(*square)?;
                Ok(())
            }
            Action::PlacePiece { square, piece } => {
                context.board.place_piece(*square, piece.clone())
            }
            Action::ReplacePiece { square, after, .. } => {
                context.board.replace_piece(*square, after.clone())?;
                Ok(())
            }
            Action::SplitStack {
                square, remainder, ..
            } => {
                match remainder {
                    Some(remainder) => {
                        context.board.replace_piece(*square, remainder.clone())?;
                    }
                    None => {
                        context.board.remove_piece(*square)?;
                    }
                }
                Ok(())
            }
            Action::SetHeroic {
                square,
                piece_type,
                after,
                ..
            } => {
                context.board.set_heroic(*square, *piece_type, *after)?;
                Ok(())
            }
            Action::OpenDeploySession {
                square,
                original,
                turn,
            } => {
                *context.session = Some(DeploySession::new(*square, *turn, original.clone()));
                Ok(())
            }
            Action::RecordDeployAction { action } => {
                let session = context
                    .session
                    .as_mut()
                    .ok_or(EngineError::NoActiveDeploySession)?;
                session.actions.push(action.clone());
                Ok(())
            }
            Action::DeclareStayPieces { after, .. } => {
                let session = context
                    .session
                    .as_mut()
                    .ok_or(EngineError::NoActiveDeploySession)?;
                session.stay_pieces = Some(after.clone());
                Ok(())
            }
            Action::CloseDeploySession { .. } => {
                if context.session.is_none() {
                    return Err(EngineError::NoActiveDeploySession);
                }
                *context.session = None;
                Ok(())
            }
            Action::SwitchTurn => {
                *context.turn = context.turn.opposite();
                Ok(())
            }
        }
    }

    pub fn undo(&self, context: &mut ActionContext<'_>) -> Result<(), EngineError> {
        match self {
            Action::RemovePiece { square, piece } => {
                context.board.place_piece(*square, piece.clone())
            }
            Action::PlacePiece { square, .. } => {
                context.board.remove_piece(*square)?;
                Ok(())
            }
            Action::ReplacePiece { square, before, .. } => {
                context.board.replace_piece(*square, before.clone())?;
                Ok(())
            }
            Action::SplitStack {
                square,
                original,
                remainder,
            } => {
                match remainder {
                    Some(_) => {
                        context.board.replace_piece(*square, original.clone())?;
                    }
                    None => {
                        context.board.place_piece(*square, original.clone())?;
                    }
                }
                Ok(())
            }
            Action::SetHeroic {
                square,
                piece_type,
                before,
                ..
            } => {
                context.board.set_heroic(*square, *piece_type, *before)?;
                Ok(())
            }
            Action::OpenDeploySession { .. } => {
                *context.session = None;
                Ok(())
            }
            Action::RecordDeployAction { .. } => {
                let session = context
                    .session
                    .as_mut()
                    .ok_or(EngineError::NoActiveDeploySession)?;
                session.actions.pop();
                Ok(())
            }
            Action::DeclareStayPieces { before, .. } => {
                let session = context
                    .session
                    .as_mut()
                    .ok_or(EngineError::NoActiveDeploySession)?;
                session.stay_pieces = before.clone();
                Ok(())
            }
            Action::CloseDeploySession { session } => {
                *context.session = Some(session.clone());
                Ok(())
            }
            Action::SwitchTurn => {
                *context.turn = context.turn.opposite();
                Ok(())
            }
        }
    }
}
