//! Move commands: flag-driven action lists with exact inverses.
//!
//! A command turns one move (or a session commit) into an ordered list of
//! atomic actions. Which actions compose a command is a pure function of
//! the move's flag bits; the data they carry is read from the board at the
//! moment the command executes. `undo` replays the inverses in reverse
//! order, which is also how a failed execution rolls itself back.

use tracing::debug;

use crate::board_square::Square;
use crate::commands::actions::{Action, ActionContext};
use crate::errors::EngineError;
use crate::game_state::board::Board;
use crate::game_state::deploy_session::DeploySession;
use crate::move_generation::moves::Move;
use crate::pieces::combination::combined_of;
use crate::pieces::piece::{Piece, PieceColor, PieceType};
use crate::rules::attackers::attackers_to_square;

/// What a command does when executed.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// Execute one move (deploy steps included).
    Move(Move),
    /// Commit the active deploy session, declaring the remainder as staying.
    CommitSession { stay: Vec<Piece> },
}

/// An executed (or executable) command plus its recorded action list.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    pub kind: CommandKind,
    actions: Vec<Action>,
}

impl MoveCommand {
    pub fn from_move(mv: Move) -> Self {
        MoveCommand {
            kind: CommandKind::Move(mv),
            actions: Vec::new(),
        }
    }

    pub fn commit_session(stay: Vec<Piece>) -> Self {
        MoveCommand {
            kind: CommandKind::CommitSession { stay },
            actions: Vec::new(),
        }
    }

    /// The move this command executes, if it is a move command.
    pub fn mv(&self) -> Option<&Move> {
        match &self.kind {
            CommandKind::Move(mv) => Some(mv),
            CommandKind::CommitSession { .. } => None,
        }
    }

    /// Whether executing this command switched the turn (committed a full
    /// move rather than an intermediate deploy step).
    pub fn switched_turn(&self) -> bool {
        self.actions
            .iter()
            .any(|action| matches!(action, Action::SwitchTurn))
    }

    /// Whether this command removed any piece from the enemy.
    pub fn captured_something(&self) -> bool {
        match &self.kind {
            CommandKind::Move(mv) => mv.captures(),
            CommandKind::CommitSession { .. } => false,
        }
    }

    /// Runs the command. All-or-nothing: a failure undoes every action
    /// already applied and leaves the state untouched.
    pub fn execute(
        &mut self,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        self.actions.clear();
        let kind = self.kind.clone();
        let result = match kind {
            CommandKind::Move(mv) => self.execute_move(&mv, board, session, turn),
            CommandKind::CommitSession { stay } => {
                self.execute_commit(stay, board, session, turn)
            }
        };
        if let Err(error) = result {
            let mut context = ActionContext {
                board,
                session,
                turn,
            };
            for action in self.actions.iter().rev() {
                // Rollback of a half-applied command; an inverse can only
                // fail here if the command engine itself is broken.
                action
                    .undo(&mut context)
                    .expect("rollback of a partially applied command must succeed");
            }
            self.actions.clear();
            return Err(error);
        }
        debug!(actions = self.actions.len(), "command executed");
        Ok(())
    }

    /// Reverses the whole command, newest action first.
    pub fn undo(
        &mut self,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        let mut context = ActionContext {
            board,
            session,
            turn,
        };
        for action in self.actions.iter().rev() {
            action.undo(&mut context)?;
        }
        Ok(())
    }

    fn push_apply(
        &mut self,
        action: Action,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        {
            let mut context = ActionContext {
                board,
                session,
                turn,
            };
            action.apply(&mut context)?;
        }
        self.actions.push(action);
        Ok(())
    }

    fn execute_move(
        &mut self,
        mv: &Move,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        // A deploy step against an empty session opens one for the stack.
        if mv.is_deploy() && session.is_none() {
            let original = board
                .piece_at(mv.from)
                .cloned()
                .ok_or_else(|| EngineError::EmptySquare(mv.from.to_algebraic()))?;
            self.push_apply(
                Action::OpenDeploySession {
                    square: mv.from,
                    original,
                    turn: *turn,
                },
                board,
                session,
                turn,
            )?;
        }

        // 1. Capture removal (all three capturing kinds).
        if mv.captures() {
            let captured = board
                .piece_at(mv.to)
                .cloned()
                .ok_or_else(|| EngineError::EmptySquare(mv.to.to_algebraic()))?;
            self.push_apply(
                Action::RemovePiece {
                    square: mv.to,
                    piece: captured,
                },
                board,
                session,
                turn,
            )?;
        }

        // 2. Origin removal, unless the subject stays (stay capture).
        let mut relocated_subject = None;
        if mv.subject_relocates() || mv.is_suicide_capture() {
            if mv.is_deploy() {
                let original = board
                    .piece_at(mv.from)
                    .cloned()
                    .ok_or_else(|| EngineError::EmptySquare(mv.from.to_algebraic()))?;
                let remainder = stack_remainder(&original, &mv.piece)?;
                self.push_apply(
                    Action::SplitStack {
                        square: mv.from,
                        original,
                        remainder,
                    },
                    board,
                    session,
                    turn,
                )?;
                relocated_subject = Some(mv.piece.clone());
            } else {
                let piece = board
                    .piece_at(mv.from)
                    .cloned()
                    .ok_or_else(|| EngineError::EmptySquare(mv.from.to_algebraic()))?;
                self.push_apply(
                    Action::RemovePiece {
                        square: mv.from,
                        piece: piece.clone(),
                    },
                    board,
                    session,
                    turn,
                )?;
                relocated_subject = Some(piece);
            }
        }

        // 3. Destination placement.
        if mv.is_combination() {
            let occupant = board
                .piece_at(mv.to)
                .cloned()
                .ok_or_else(|| EngineError::EmptySquare(mv.to.to_algebraic()))?;
            let subject = relocated_subject
                .clone()
                .expect("combination moves always relocate the subject");
            let merged = combined_of(&[subject, occupant.clone()]).ok_or_else(|| {
                EngineError::StackCombinationFailure(format!(
                    "recombination at {}",
                    mv.to.to_algebraic()
                ))
            })?;
            self.push_apply(
                Action::ReplacePiece {
                    square: mv.to,
                    before: occupant,
                    after: merged,
                },
                board,
                session,
                turn,
            )?;
        } else if mv.subject_relocates() {
            let subject = relocated_subject
                .clone()
                .expect("relocating moves always lift a subject");
            self.push_apply(
                Action::PlacePiece {
                    square: mv.to,
                    piece: subject,
                },
                board,
                session,
                turn,
            )?;
        }

        // 4. Heroic promotion, inside the same command so it shares the
        //    same undo.
        self.promote_attackers(mv.color, board, session, turn)?;

        // 5. Session bookkeeping and turn switching.
        if mv.is_deploy() {
            self.push_apply(
                Action::RecordDeployAction { action: mv.clone() },
                board,
                session,
                turn,
            )?;
            let complete = session
                .as_ref()
                .map(|s| s.is_complete())
                .unwrap_or(false);
            if complete {
                let closing = session.as_ref().cloned().unwrap();
                debug!(square = %closing.stack_square, "deploy session complete");
                self.push_apply(
                    Action::CloseDeploySession { session: closing },
                    board,
                    session,
                    turn,
                )?;
                self.push_apply(Action::SwitchTurn, board, session, turn)?;
            }
        } else {
            self.push_apply(Action::SwitchTurn, board, session, turn)?;
        }
        Ok(())
    }

    fn execute_commit(
        &mut self,
        stay: Vec<Piece>,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        let before = match session.as_ref() {
            Some(session) => session.stay_pieces.clone(),
            None => return Err(EngineError::NoActiveDeploySession),
        };
        self.push_apply(
            Action::DeclareStayPieces {
                before,
                after: stay,
            },
            board,
            session,
            turn,
        )?;

        let current = session.as_ref().expect("session still open");
        if !current.is_complete() {
            return Err(EngineError::DeploySessionInvariantViolation {
                square: current.stack_square.to_algebraic(),
                moved: current.moved_count(),
                staying: current.staying_count(),
                original: current.original_count(),
            });
        }
        let closing = current.clone();
        debug!(square = %closing.stack_square, "deploy session committed");
        self.push_apply(
            Action::CloseDeploySession { session: closing },
            board,
            session,
            turn,
        )?;
        self.push_apply(Action::SwitchTurn, board, session, turn)?;
        Ok(())
    }

    /// Promotes every currently non-heroic piece of `color` that attacks the
    /// enemy commander after the base actions have run.
    fn promote_attackers(
        &mut self,
        color: PieceColor,
        board: &mut Board,
        session: &mut Option<DeploySession>,
        turn: &mut PieceColor,
    ) -> Result<(), EngineError> {
        let Some(commander) = board.commander_square(color.opposite()) else {
            return Ok(());
        };
        let promotions: Vec<(Square, PieceType)> = attackers_to_square(board, commander, color)
            .into_iter()
            .filter(|attacker| !attacker.heroic)
            .map(|attacker| (attacker.square, attacker.piece_type))
            .collect();
        for (square, piece_type) in promotions {
            self.push_apply(
                Action::SetHeroic {
                    square,
                    piece_type,
                    before: false,
                    after: true,
                },
                board,
                session,
                turn,
            )?;
        }
        Ok(())
    }
}

/// What is left of `original` once `subject` is lifted out, re-merged by
/// the oracle. `None` when the subject takes the whole stack with it.
fn stack_remainder(original: &Piece, subject: &Piece) -> Result<Option<Piece>, EngineError> {
    let mut rest: Vec<Piece> = original
        .flattened()
        .into_iter()
        .map(|piece| piece.without_cargo())
        .collect();
    for taken in subject.flattened() {
        match rest
            .iter()
            .position(|piece| piece.piece_type == taken.piece_type)
        {
            Some(index) => {
                rest.remove(index);
            }
            None => {
                return Err(EngineError::StackCombinationFailure(format!(
                    "{:?} is not part of the stack",
                    taken.piece_type
                )))
            }
        }
    }
    if rest.is_empty() {
        return Ok(None);
    }
    combined_of(&rest)
        .map(Some)
        .ok_or_else(|| EngineError::StackCombinationFailure("stack remainder".to_string()))
}
