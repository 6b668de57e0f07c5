//! The engine façade: one mutable position and every operation on it.
//!
//! `Position` owns the board, the side to move, the clocks, the deploy
//! session, the undo history and the legal-move cache. All mutation flows
//! through move commands so that apply and undo stay exact mirror images.

use std::cell::RefCell;

use tracing::debug;

use crate::board_square::Square;
use crate::commands::move_command::MoveCommand;
use crate::errors::EngineError;
use crate::game_state::board::Board;
use crate::game_state::deploy_session::DeploySession;
use crate::game_state::history::{HistoryEntry, Snapshot};
use crate::move_generation::generator::{generate_pseudo_legal, MoveFilter};
use crate::move_generation::move_cache::MoveCache;
use crate::move_generation::moves::Move;
use crate::pieces::combination::combined_of;
use crate::pieces::piece::{Piece, PieceColor};
use crate::rules::attackers::{commanders_exposed, is_square_attacked};
use crate::utils::fen;

/// Opening position: navies on the water files, the commander behind the
/// artillery line, three ranks per side.
pub const STARTING_POSITION_FEN: &str =
    "3ascha3/nnftge1t3/3mi1im3/11/11/11/11/11/11/3MI1IM3/NNFTGE1T3/3ASCHA3 r - - 0 1";

/// Number of cached legal-move queries kept alive at once.
const MOVE_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Position {
    pub board: Board,
    pub turn: PieceColor,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub(crate) deploy_session: Option<DeploySession>,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) repetition_keys: Vec<String>,
    cache: RefCell<MoveCache>,
}

impl PartialEq for Position {
    /// State equality: board (derived indices included), turn, clocks and
    /// deploy session. History, the repetition trail and cache contents are
    /// bookkeeping, not position identity.
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.deploy_session == other.deploy_session
    }
}

impl Position {
    /// An empty board with red to move. Mostly useful for tests and
    /// position setup.
    pub fn empty() -> Self {
        Position::from_parts(Board::empty(), PieceColor::Red, 0, 1, None)
    }

    pub fn new_game() -> Self {
        Position::from_fen(STARTING_POSITION_FEN).expect("starting position notation must parse")
    }

    pub fn from_fen(text: &str) -> Result<Self, EngineError> {
        fen::parse_fen(text)
    }

    pub fn to_fen(&self) -> String {
        fen::write_fen(self)
    }

    /// Builds a position from parsed parts and seeds the repetition trail.
    pub(crate) fn from_parts(
        board: Board,
        turn: PieceColor,
        halfmove_clock: u16,
        fullmove_number: u16,
        deploy_session: Option<DeploySession>,
    ) -> Self {
        let mut position = Position {
            board,
            turn,
            halfmove_clock,
            fullmove_number,
            deploy_session,
            history: Vec::new(),
            repetition_keys: Vec::new(),
            cache: RefCell::new(MoveCache::new(MOVE_CACHE_CAPACITY)),
        };
        let key = fen::repetition_key(&position);
        position.repetition_keys.push(key);
        position
    }

    pub fn deploy_session(&self) -> Option<&DeploySession> {
        self.deploy_session.as_ref()
    }

    /// The game ends when either commander has been captured.
    pub fn is_game_over(&self) -> bool {
        self.board.commander_square(PieceColor::Red).is_none()
            || self.board.commander_square(PieceColor::Blue).is_none()
    }

    /// The side that captured the enemy commander, if any.
    pub fn winner(&self) -> Option<PieceColor> {
        match (
            self.board.commander_square(PieceColor::Red),
            self.board.commander_square(PieceColor::Blue),
        ) {
            (None, Some(_)) => Some(PieceColor::Blue),
            (Some(_), None) => Some(PieceColor::Red),
            _ => None,
        }
    }

    /// Pseudo-legal candidates, before the self-check filter.
    pub fn pseudo_legal_moves(&self, filter: &MoveFilter) -> Vec<Move> {
        generate_pseudo_legal(&self.board, self.turn, self.deploy_session.as_ref(), filter)
    }

    /// Every legal move for the side to move. A move is legal when, after
    /// execution, the mover's own commander is neither attacked nor exposed
    /// to the enemy commander. Results are memoized per position and
    /// filter.
    pub fn legal_moves(&self, filter: &MoveFilter) -> Vec<Move> {
        if self.board.commander_square(self.turn).is_none() {
            return Vec::new();
        }
        let key = format!("{}|{}", self.to_fen(), filter.cache_key());
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit;
        }

        let candidates = self.pseudo_legal_moves(filter);
        // Probing runs on a scratch copy of the mutable state so the cache
        // and history never see the make/unmake churn.
        let mut scratch_board = self.board.clone();
        let mut scratch_session = self.deploy_session.clone();
        let mut scratch_turn = self.turn;
        let mut legal = Vec::new();
        for candidate in candidates {
            let mut command = MoveCommand::from_move(candidate.clone());
            if command
                .execute(&mut scratch_board, &mut scratch_session, &mut scratch_turn)
                .is_err()
            {
                continue;
            }
            let safe = commander_is_safe(&scratch_board, self.turn);
            command
                .undo(&mut scratch_board, &mut scratch_session, &mut scratch_turn)
                .expect("legality probe undo must succeed");
            if safe {
                legal.push(candidate);
            }
        }

        self.cache.borrow_mut().insert(key, legal.clone());
        legal
    }

    /// Applies a move. The request is matched against the legal-move list;
    /// anything else is rejected with `NoSuchMove`/`AmbiguousMove`.
    pub fn apply_move(&mut self, request: &Move) -> Result<(), EngineError> {
        if self.is_game_over() {
            return Err(EngineError::GameOver);
        }
        let resolved = self.resolve_move(request)?;
        self.run_command(MoveCommand::from_move(resolved))
    }

    /// Parses extended move notation and applies the matching legal move.
    pub fn apply_san(&mut self, text: &str) -> Result<Move, EngineError> {
        if self.is_game_over() {
            return Err(EngineError::GameOver);
        }
        let mv = crate::utils::san::parse_move(self, text)?;
        self.run_command(MoveCommand::from_move(mv.clone()))?;
        Ok(mv)
    }

    /// Undoes the most recent not-yet-undone command and restores the
    /// pre-move snapshot verbatim.
    pub fn undo_move(&mut self) -> Result<(), EngineError> {
        let mut entry = self.history.pop().ok_or(EngineError::NothingToUndo)?;
        entry
            .command
            .undo(&mut self.board, &mut self.deploy_session, &mut self.turn)?;
        self.turn = entry.snapshot.turn;
        self.halfmove_clock = entry.snapshot.halfmove_clock;
        self.fullmove_number = entry.snapshot.fullmove_number;
        self.deploy_session = entry.snapshot.deploy_session.clone();
        self.repetition_keys.truncate(entry.snapshot.repetition_len);
        self.cache.borrow_mut().invalidate();
        Ok(())
    }

    /// Runs a whole deploy turn: each move in order, then a commit that
    /// declares whatever did not act as staying. All-or-nothing.
    pub fn deploy_move(&mut self, moves: &[Move]) -> Result<(), EngineError> {
        let mut applied = 0usize;
        let mut failure = None;
        for mv in moves {
            if !mv.is_deploy() {
                failure = Some(EngineError::NoSuchMove(format!(
                    "{} is not a deploy move",
                    describe_move(mv)
                )));
                break;
            }
            match self.apply_move(mv) {
                Ok(()) => applied += 1,
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }
        if failure.is_none() && self.deploy_session.is_some() {
            if let Err(error) = self.commit_deploy_session() {
                failure = Some(error);
            }
        }
        if let Some(error) = failure {
            for _ in 0..applied {
                self.undo_move()
                    .expect("rolling back a failed deploy batch must succeed");
            }
            return Err(error);
        }
        Ok(())
    }

    /// Ends the active deploy turn early: every not-yet-acted piece in the
    /// stack is declared staying, the session closes and the turn switches.
    pub fn commit_deploy_session(&mut self) -> Result<(), EngineError> {
        let session = self
            .deploy_session
            .as_ref()
            .ok_or(EngineError::NoActiveDeploySession)?;
        let stay = self.remaining_session_pieces(session);
        self.run_command(MoveCommand::commit_session(stay))
    }

    /// Abandons the active deploy turn: every recorded action is reversed,
    /// the session is discarded and the turn stays with the deploying side.
    pub fn cancel_deploy_session(&mut self) -> Result<(), EngineError> {
        if self.deploy_session.is_none() {
            return Err(EngineError::NoActiveDeploySession);
        }
        debug!("deploy session cancelled");
        // Steps recorded in this process have history entries with exact
        // inverses; unwind those first.
        loop {
            let belongs = match (self.deploy_session.as_ref(), self.history.last()) {
                (Some(session), Some(entry)) => entry
                    .command
                    .mv()
                    .map(|mv| mv.is_deploy() && mv.from == session.stack_square)
                    .unwrap_or(false),
                _ => false,
            };
            if !belongs {
                break;
            }
            self.undo_move()?;
            if self.deploy_session.is_none() {
                return Ok(());
            }
        }
        // Anything left came from a restored notation string; reverse it
        // structurally from the session's own action log.
        if let Some(session) = self.deploy_session.clone() {
            self.structural_cancel(&session)?;
        }
        Ok(())
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        match self.board.commander_square(self.turn) {
            Some(square) => is_square_attacked(&self.board, square, self.turn.opposite()),
            None => false,
        }
    }

    /// Check with no legal reply.
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves(&MoveFilter::all()).is_empty()
    }

    /// Draw by the fifty-move rule (100 halfmoves without a capture) or by
    /// threefold repetition of the position notation.
    pub fn is_draw(&self) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }
        let current = fen::repetition_key(self);
        self.repetition_keys
            .iter()
            .filter(|key| **key == current)
            .count()
            >= 3
    }

    /// Shared command execution path: snapshot, execute, clocks,
    /// repetition trail, history, cache.
    fn run_command(&mut self, mut command: MoveCommand) -> Result<(), EngineError> {
        let snapshot = self.snapshot();
        command.execute(&mut self.board, &mut self.deploy_session, &mut self.turn)?;

        if command.switched_turn() {
            let captured_this_turn = command.captured_something()
                || snapshot
                    .deploy_session
                    .as_ref()
                    .map(|session| session.actions.iter().any(|action| action.captures()))
                    .unwrap_or(false);
            self.halfmove_clock = if captured_this_turn {
                0
            } else {
                self.halfmove_clock + 1
            };
            if snapshot.turn == PieceColor::Blue {
                self.fullmove_number += 1;
            }
        }

        let switched = command.switched_turn();
        self.history.push(HistoryEntry { command, snapshot });
        if switched {
            let key = fen::repetition_key(self);
            self.repetition_keys.push(key);
        }
        self.cache.borrow_mut().invalidate();
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            commander_squares: [
                self.board.commander_square(PieceColor::Red),
                self.board.commander_square(PieceColor::Blue),
            ],
            turn: self.turn,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            deploy_session: self.deploy_session.clone(),
            repetition_len: self.repetition_keys.len(),
        }
    }

    /// Matches a request against the legal-move list: exact match first,
    /// then a relaxed match on origin/destination/flags/subject shape.
    fn resolve_move(&self, request: &Move) -> Result<Move, EngineError> {
        let legal = self.legal_moves(&MoveFilter::all());
        if let Some(exact) = legal.iter().find(|candidate| *candidate == request) {
            return Ok(exact.clone());
        }
        let matches: Vec<&Move> = legal
            .iter()
            .filter(|candidate| {
                candidate.from == request.from
                    && candidate.to == request.to
                    && candidate.flags == request.flags
                    && candidate.piece.piece_type == request.piece.piece_type
                    && candidate.piece.flattened_count() == request.piece.flattened_count()
            })
            .collect();
        match matches.len() {
            0 => Err(EngineError::NoSuchMove(describe_move(request))),
            1 => Ok(matches[0].clone()),
            _ => Err(EngineError::AmbiguousMove {
                notation: describe_move(request),
                candidates: matches.iter().map(|mv| describe_move(mv)).collect(),
            }),
        }
    }

    /// The pieces of the session stack that have not acted yet, with their
    /// current flags.
    fn remaining_session_pieces(&self, session: &DeploySession) -> Vec<Piece> {
        let Some(stack) = self.board.piece_at(session.stack_square) else {
            return Vec::new();
        };
        let mut singles: Vec<Piece> = stack
            .flattened()
            .into_iter()
            .map(|piece| piece.without_cargo())
            .collect();
        for acted in session.acted_types() {
            if let Some(index) = singles
                .iter()
                .position(|piece| piece.piece_type == acted)
            {
                singles.remove(index);
            }
        }
        singles
    }

    /// Reverses session actions that have no history entries (a session
    /// restored from notation), newest first. Heroic promotions earned
    /// during the restored steps are unknown and therefore survive.
    fn structural_cancel(&mut self, session: &DeploySession) -> Result<(), EngineError> {
        for mv in session.actions.iter().rev() {
            if mv.is_suicide_capture() {
                self.return_to_stack(session.stack_square, stack_singles(&mv.piece))?;
                if let Some(captured) = &mv.captured {
                    self.board.place_piece(mv.to, captured.clone())?;
                }
            } else if mv.is_stay_capture() {
                if let Some(captured) = &mv.captured {
                    self.board.place_piece(mv.to, captured.clone())?;
                }
            } else {
                let at_destination = self.board.remove_piece(mv.to)?;
                let mut singles = stack_singles(&at_destination);
                let mut subject_singles = Vec::new();
                for taken in mv.piece.flattened() {
                    let index = singles
                        .iter()
                        .position(|piece| piece.piece_type == taken.piece_type)
                        .ok_or_else(|| {
                            EngineError::StackCombinationFailure(
                                "cancelled deploy subject missing from its destination"
                                    .to_string(),
                            )
                        })?;
                    subject_singles.push(singles.remove(index));
                }
                if !singles.is_empty() {
                    let rest = combined_of(&singles).ok_or_else(|| {
                        EngineError::StackCombinationFailure(
                            "cancelled recombination target".to_string(),
                        )
                    })?;
                    self.board.place_piece(mv.to, rest)?;
                }
                self.return_to_stack(session.stack_square, subject_singles)?;
                if let Some(captured) = &mv.captured {
                    self.board.place_piece(mv.to, captured.clone())?;
                }
            }
        }
        self.deploy_session = None;
        self.cache.borrow_mut().invalidate();
        Ok(())
    }

    fn return_to_stack(
        &mut self,
        square: Square,
        mut pieces: Vec<Piece>,
    ) -> Result<(), EngineError> {
        if let Some(existing) = self.board.piece_at(square).cloned() {
            pieces.push(existing);
            let merged = combined_of(&pieces).ok_or_else(|| {
                EngineError::StackCombinationFailure("deploy cancellation".to_string())
            })?;
            self.board.replace_piece(square, merged)?;
        } else {
            let merged = combined_of(&pieces).ok_or_else(|| {
                EngineError::StackCombinationFailure("deploy cancellation".to_string())
            })?;
            self.board.place_piece(square, merged)?;
        }
        Ok(())
    }
}

/// Commander neither captured, attacked, nor exposed after a probe.
fn commander_is_safe(board: &Board, color: PieceColor) -> bool {
    let Some(square) = board.commander_square(color) else {
        return false;
    };
    !is_square_attacked(board, square, color.opposite()) && !commanders_exposed(board)
}

fn stack_singles(piece: &Piece) -> Vec<Piece> {
    piece
        .flattened()
        .into_iter()
        .map(|constituent| constituent.without_cargo())
        .collect()
}

fn describe_move(mv: &Move) -> String {
    format!(
        "{}{}{}{}",
        mv.piece.piece_type.letter(),
        mv.from.to_algebraic(),
        mv.separator(),
        mv.to.to_algebraic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::moves::{FLAG_DEPLOY, FLAG_NORMAL};
    use crate::pieces::piece::PieceType;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn place(position: &mut Position, name: &str, piece_type: PieceType, color: PieceColor) {
        position
            .board
            .place_piece(sq(name), Piece::new(piece_type, color))
            .unwrap();
    }

    /// Minimal playable scaffold: both commanders far apart off shared
    /// lines.
    fn scaffold() -> Position {
        let mut position = Position::empty();
        place(&mut position, "d1", PieceType::Commander, PieceColor::Red);
        place(&mut position, "k12", PieceType::Commander, PieceColor::Blue);
        position
    }

    #[test]
    fn apply_then_undo_restores_full_equality() {
        let mut position = scaffold();
        place(&mut position, "f4", PieceType::Tank, PieceColor::Red);
        place(&mut position, "f6", PieceType::Militia, PieceColor::Blue);
        let before = position.clone();

        let mv = position
            .legal_moves(&MoveFilter::from_square(sq("f4")))
            .into_iter()
            .find(|mv| mv.to == sq("f6"))
            .expect("tank capture should be legal");
        position.apply_move(&mv).unwrap();
        assert_ne!(position, before);

        position.undo_move().unwrap();
        assert_eq!(position, before);
        assert_eq!(position.to_fen(), before.to_fen());
    }

    #[test]
    fn legal_moves_never_leave_own_commander_attacked_or_exposed() {
        let mut position = Position::empty();
        place(&mut position, "f2", PieceType::Commander, PieceColor::Red);
        place(&mut position, "f9", PieceType::Commander, PieceColor::Blue);
        place(&mut position, "f5", PieceType::Infantry, PieceColor::Red);

        // The blocking infantry may not step aside: that would expose the
        // commanders to each other.
        let moves = position.legal_moves(&MoveFilter::from_square(sq("f5")));
        assert!(moves.iter().all(|mv| mv.to.file() == 5));

        // And every remaining legal move keeps the commander safe.
        for mv in position.legal_moves(&MoveFilter::all()) {
            let mut probe = position.clone();
            probe.apply_move(&mv).unwrap();
            assert!(commander_is_safe(&probe.board, PieceColor::Red));
        }
    }

    #[test]
    fn exposure_scenario_with_and_without_blocker() {
        let mut position = Position::empty();
        place(&mut position, "f2", PieceType::Commander, PieceColor::Red);
        place(&mut position, "f9", PieceType::Commander, PieceColor::Blue);
        place(&mut position, "f5", PieceType::Infantry, PieceColor::Red);
        assert!(!crate::rules::attackers::commanders_exposed(&position.board));

        position.board.remove_piece(sq("f5")).unwrap();
        assert!(crate::rules::attackers::commanders_exposed(&position.board));
    }

    #[test]
    fn deploy_turn_with_undo_at_every_step() {
        let mut position = scaffold();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
            Piece::new(PieceType::Infantry, PieceColor::Red),
        ])
        .unwrap();
        position.board.place_piece(sq("c6"), stack).unwrap();
        let before = position.clone();

        let tank_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| {
                mv.is_deploy()
                    && mv.piece.piece_type == PieceType::Tank
                    && mv.piece.flattened_count() == 1
                    && mv.to == sq("d6")
            })
            .expect("tank deploy to d6");
        position.apply_move(&tank_out).unwrap();
        assert!(position.deploy_session().is_some());
        assert_eq!(position.turn, PieceColor::Red);

        // Mid-session the only moves are further deploys from c6.
        assert!(position
            .legal_moves(&MoveFilter::all())
            .iter()
            .all(|mv| mv.is_deploy() && mv.from == sq("c6")));

        let infantry_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| mv.piece.piece_type == PieceType::Infantry && mv.to == sq("c7"))
            .expect("infantry deploy to c7");
        position.apply_move(&infantry_out).unwrap();
        assert!(position.deploy_session().is_some());

        // Single-step undo restores the one-action session exactly.
        position.undo_move().unwrap();
        assert_eq!(position.deploy_session().unwrap().actions.len(), 1);

        position.apply_move(&infantry_out).unwrap();
        let navy_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| mv.piece.piece_type == PieceType::Navy && mv.to == sq("b6"))
            .expect("navy deploy to b6");
        position.apply_move(&navy_out).unwrap();

        // All three pieces accounted for: session closed, turn switched.
        assert!(position.deploy_session().is_none());
        assert_eq!(position.turn, PieceColor::Blue);

        // Unwinding the whole turn restores the original position.
        position.undo_move().unwrap();
        position.undo_move().unwrap();
        position.undo_move().unwrap();
        assert_eq!(position, before);
    }

    #[test]
    fn commit_declares_the_rest_as_staying() {
        let mut position = scaffold();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
        ])
        .unwrap();
        position.board.place_piece(sq("c6"), stack).unwrap();

        let tank_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| mv.is_deploy() && mv.piece.piece_type == PieceType::Tank)
            .unwrap();
        position.apply_move(&tank_out).unwrap();
        position.commit_deploy_session().unwrap();
        assert!(position.deploy_session().is_none());
        assert_eq!(position.turn, PieceColor::Blue);
        assert_eq!(
            position.board.piece_at(sq("c6")).unwrap().piece_type,
            PieceType::Navy
        );

        // Undo brings back the mid-session state, then the untouched stack.
        position.undo_move().unwrap();
        assert_eq!(position.deploy_session().unwrap().actions.len(), 1);
        position.undo_move().unwrap();
        assert!(position.deploy_session().is_none());
        assert_eq!(position.board.piece_at(sq("c6")).unwrap().flattened_count(), 2);
    }

    #[test]
    fn cancel_restores_the_stack_and_keeps_the_turn() {
        let mut position = scaffold();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
            Piece::new(PieceType::Infantry, PieceColor::Red),
        ])
        .unwrap();
        position.board.place_piece(sq("c6"), stack).unwrap();
        let before = position.clone();

        let deploys: Vec<Move> = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .filter(|mv| mv.is_deploy() && mv.piece.flattened_count() == 1)
            .collect();
        let tank_out = deploys
            .iter()
            .find(|mv| mv.piece.piece_type == PieceType::Tank)
            .unwrap();
        position.apply_move(tank_out).unwrap();
        let infantry_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| mv.piece.piece_type == PieceType::Infantry && !mv.is_combination())
            .unwrap();
        position.apply_move(&infantry_out).unwrap();

        position.cancel_deploy_session().unwrap();
        assert_eq!(position, before);
        assert_eq!(position.turn, PieceColor::Red);
    }

    #[test]
    fn deploy_batch_is_all_or_nothing() {
        let mut position = scaffold();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
        ])
        .unwrap();
        position.board.place_piece(sq("c6"), stack).unwrap();
        let before = position.clone();

        let tank_out = position
            .legal_moves(&MoveFilter::all())
            .into_iter()
            .find(|mv| mv.is_deploy() && mv.piece.piece_type == PieceType::Tank)
            .unwrap();
        // Second entry is garbage: the whole batch must roll back.
        let bogus = Move::new(
            sq("c6"),
            sq("k1"),
            Piece::new(PieceType::Navy, PieceColor::Red),
            FLAG_DEPLOY,
        );
        let err = position.deploy_move(&[tank_out.clone(), bogus]).unwrap_err();
        assert!(matches!(err, EngineError::NoSuchMove(_)));
        assert_eq!(position, before);

        // A valid batch runs to completion and switches the turn.
        position.deploy_move(&[tank_out]).unwrap();
        assert!(position.deploy_session().is_none());
        assert_eq!(position.turn, PieceColor::Blue);
    }

    #[test]
    fn checkmate_in_a_cornered_position() {
        let mut position = Position::empty();
        // Blue commander boxed on k12: the tank on k10 checks it and covers
        // k11, the tank on i12 covers j12, and neither is close enough to
        // be captured back.
        place(&mut position, "k10", PieceType::Tank, PieceColor::Red);
        place(&mut position, "i12", PieceType::Tank, PieceColor::Red);
        place(&mut position, "k12", PieceType::Commander, PieceColor::Blue);
        place(&mut position, "d1", PieceType::Commander, PieceColor::Red);
        position.turn = PieceColor::Blue;

        assert!(position.is_check());
        assert!(position.is_checkmate());
    }

    #[test]
    fn fifty_move_and_repetition_draws() {
        let mut position = scaffold();
        position.halfmove_clock = 100;
        assert!(position.is_draw());

        let mut position = scaffold();
        place(&mut position, "f5", PieceType::Tank, PieceColor::Red);
        place(&mut position, "f8", PieceType::Tank, PieceColor::Blue);
        // Round-trip through notation so the repetition trail starts from
        // the fully set-up position.
        let mut position = Position::from_fen(&position.to_fen()).unwrap();
        assert!(!position.is_draw());
        // Shuffle both tanks back and forth twice: the start position
        // occurs three times (initial plus two returns).
        for _ in 0..2 {
            for (from, to) in [("f5", "f6"), ("f8", "f7"), ("f6", "f5"), ("f7", "f8")] {
                let mv = position
                    .legal_moves(&MoveFilter::from_square(sq(from)))
                    .into_iter()
                    .find(|mv| mv.to == sq(to) && mv.flags == FLAG_NORMAL)
                    .unwrap();
                position.apply_move(&mv).unwrap();
            }
        }
        assert!(position.is_draw());
    }

    #[test]
    fn game_over_blocks_further_moves() {
        let mut position = scaffold();
        position.board.remove_piece(sq("k12")).unwrap();
        assert!(position.is_game_over());
        assert_eq!(position.winner(), Some(PieceColor::Red));
        let mv = Move::new(
            sq("d1"),
            sq("d2"),
            Piece::new(PieceType::Commander, PieceColor::Red),
            FLAG_NORMAL,
        );
        assert!(matches!(
            position.apply_move(&mv),
            Err(EngineError::GameOver)
        ));
    }
}
