//! Pseudo-legal move generation.
//!
//! For every stack the generator produces carrier moves under the carrier's
//! own rules, deploy moves for each combinable sub-group under the
//! sub-group's rules, and — while a deploy session is active — recombination
//! moves onto pieces deployed earlier in the session. Rays are walked
//! square by square so that blocking, terrain traversal, the river rule and
//! the air-defense crossing rules can all be applied incrementally.

use crate::board_square::{Square, ALL_DIRECTIONS};
use crate::game_state::board::Board;
use crate::game_state::deploy_session::DeploySession;
use crate::move_generation::moves::{
    Move, FLAG_CAPTURE, FLAG_COMBINATION, FLAG_DEPLOY, FLAG_NORMAL, FLAG_STAY_CAPTURE,
    FLAG_SUICIDE_CAPTURE,
};
use crate::pieces::combination::combined_of;
use crate::pieces::piece::{Piece, PieceColor, PieceType};
use crate::rules::air_defense::{AdStatus, AdTraversal};
use crate::rules::move_table::{
    capture_range_against, rule_for, SpecialRule, INFINITE_RANGE,
};
use crate::rules::terrain::{can_occupy, heavy_move_blocked, terrain_at, Terrain};

/// Optional narrowing of generation output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveFilter {
    /// Only moves starting from this square.
    pub from: Option<Square>,
    /// Only moves whose subject's outer type matches.
    pub piece_type: Option<PieceType>,
}

impl MoveFilter {
    pub fn all() -> Self {
        MoveFilter::default()
    }

    pub fn from_square(square: Square) -> Self {
        MoveFilter {
            from: Some(square),
            piece_type: None,
        }
    }

    /// Stable textual form for cache keys.
    pub fn cache_key(&self) -> String {
        format!(
            "{}/{}",
            self.from
                .map(|sq| sq.to_algebraic())
                .unwrap_or_else(|| "*".to_string()),
            self.piece_type
                .map(|pt| pt.letter().to_string())
                .unwrap_or_else(|| "*".to_string()),
        )
    }

    fn admits(&self, mv: &Move) -> bool {
        self.from.map(|sq| sq == mv.from).unwrap_or(true)
            && self
                .piece_type
                .map(|pt| pt == mv.piece.piece_type)
                .unwrap_or(true)
    }
}

/// Generates every pseudo-legal move for `turn`. While a deploy session is
/// active only the session stack may act, the moves are deploy-flagged, and
/// recombination targets come from the session's earlier actions.
pub fn generate_pseudo_legal(
    board: &Board,
    turn: PieceColor,
    session: Option<&DeploySession>,
    filter: &MoveFilter,
) -> Vec<Move> {
    let mut out = Vec::new();
    match session {
        Some(session) => generate_session_moves(board, session, &mut out),
        None => {
            for (square, piece) in board.pieces() {
                if piece.color != turn {
                    continue;
                }
                generate_stack_moves(board, square, piece, &mut out);
            }
        }
    }
    out.retain(|mv| filter.admits(mv));
    out
}

/// Moves for one stack outside a deploy session: the whole stack under the
/// carrier's rules, plus deploy openings for every proper sub-group.
fn generate_stack_moves(board: &Board, square: Square, piece: &Piece, out: &mut Vec<Move>) {
    generate_subject_moves(board, square, piece, FLAG_NORMAL, &[], out);
    if piece.is_stack() {
        generate_deploy_moves(board, square, piece, &[], None, out);
    }
}

/// Moves while a session is active: deploys of the not-yet-acted remainder,
/// including recombination onto earlier deployments.
fn generate_session_moves(board: &Board, session: &DeploySession, out: &mut Vec<Move>) {
    let Some(stack) = board.piece_at(session.stack_square) else {
        return;
    };
    generate_deploy_moves(
        board,
        session.stack_square,
        stack,
        &session.acted_types(),
        Some(session),
        out,
    );
}

/// Enumerates combinable sub-groups of the stack and generates deploy moves
/// for each. A sub-group is eligible when the oracle fully combines it, the
/// remainder left on the square (if any) also fully combines, and that
/// remainder may stand on the stack square's terrain.
fn generate_deploy_moves(
    board: &Board,
    square: Square,
    stack: &Piece,
    acted: &[PieceType],
    session: Option<&DeploySession>,
    out: &mut Vec<Move>,
) {
    let current: Vec<Piece> = stack
        .flattened()
        .into_iter()
        .map(|piece| piece.without_cargo())
        .collect();

    // Pieces that already acted this session are off limits; match them out
    // of the current stack by type.
    let mut available: Vec<usize> = (0..current.len()).collect();
    for acted_type in acted {
        if let Some(position) = available
            .iter()
            .position(|&index| current[index].piece_type == *acted_type)
        {
            available.remove(position);
        }
    }
    if available.is_empty() {
        return;
    }

    let recombination_targets: Vec<Square> = session
        .map(|session| session.deployed_destinations())
        .unwrap_or_default();

    let subset_count = 1usize << available.len();
    for mask in 1..subset_count {
        let chosen: Vec<usize> = available
            .iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, &index)| index)
            .collect();

        // Outside a session the full stack moving together is the ordinary
        // carrier move, not a deploy.
        if session.is_none() && chosen.len() == current.len() {
            continue;
        }

        let subject_pieces: Vec<Piece> =
            chosen.iter().map(|&index| current[index].clone()).collect();
        let Some(subject) = combined_of(&subject_pieces) else {
            continue;
        };

        let remainder_pieces: Vec<Piece> = (0..current.len())
            .filter(|index| !chosen.contains(index))
            .map(|index| current[index].clone())
            .collect();
        if !remainder_pieces.is_empty() {
            let Some(remainder) = combined_of(&remainder_pieces) else {
                continue;
            };
            if !can_occupy(remainder.piece_type, square) {
                continue;
            }
        }

        let targets = if subject.flattened_count() == 1 {
            recombination_targets.as_slice()
        } else {
            &[]
        };
        generate_subject_moves(board, square, &subject, FLAG_DEPLOY, targets, out);
    }
}

/// Ray-walks one moving subject (single piece, sub-group, or whole stack)
/// and emits its moves. Terrain, blocking, the river rule and air-defense
/// crossings are all judged against the subject's own outer type.
fn generate_subject_moves(
    board: &Board,
    from: Square,
    subject: &Piece,
    flags_base: u8,
    recombination_targets: &[Square],
    out: &mut Vec<Move>,
) {
    let rule = rule_for(subject.piece_type, subject.heroic);
    let is_air_force = subject.piece_type == PieceType::AirForce;
    let enemy_defense = board.air_defense(subject.color.opposite());

    for (d_file, d_rank) in ALL_DIRECTIONS {
        let diagonal = d_file != 0 && d_rank != 0;
        let move_range = if diagonal {
            rule.diagonal_move_range
        } else {
            rule.move_range
        };
        let max_capture = max_capture_range(&rule, subject.piece_type, diagonal);
        let walk_limit = walk_limit(move_range, max_capture);
        if walk_limit == Some(0) {
            continue;
        }

        let mut traversal = AdTraversal::new();
        let mut passed_piece = false;
        let mut terrain_cut = false;
        let mut distance: u8 = 1;
        loop {
            if let Some(limit) = walk_limit {
                if distance > limit {
                    break;
                }
            }
            let Some(square) = from.offset(d_file * distance as i8, d_rank * distance as i8)
            else {
                break;
            };
            let ad_status = if is_air_force {
                traversal.advance(enemy_defense.covering(square))
            } else {
                AdStatus::Clear
            };
            if ad_status == AdStatus::Blocked {
                break;
            }

            match board.piece_at(square) {
                Some(occupant) if occupant.color == subject.color => {
                    if recombination_targets.contains(&square)
                        && movement_reaches(
                            &rule, move_range, distance, passed_piece, terrain_cut,
                        )
                        && !(rule.heavy && heavy_move_blocked(from, square))
                    {
                        // The merged stack's carrier must be able to stand on
                        // the target square; beyond that, no extra checks.
                        let merged = combined_of(&[subject.clone(), occupant.clone()]);
                        if merged
                            .map(|stack| can_occupy(stack.piece_type, square))
                            .unwrap_or(false)
                        {
                            out.push(Move::new(
                                from,
                                square,
                                subject.clone(),
                                flags_base | FLAG_COMBINATION,
                            ));
                        }
                    }
                    passed_piece = true;
                    if !rule.move_ignores_blocking && !rule.capture_ignores_blocking {
                        break;
                    }
                }
                Some(occupant) => {
                    let duel = rule.specials.contains(&SpecialRule::CommanderDuel)
                        && occupant.piece_type == PieceType::Commander
                        && !diagonal
                        && !passed_piece;
                    let capture_range =
                        capture_range_against(&rule, Some(occupant.piece_type), diagonal);
                    let in_range = duel
                        || (capture_range != 0
                            && (capture_range == INFINITE_RANGE || distance <= capture_range));
                    let blocked = passed_piece && !rule.capture_ignores_blocking && !duel;
                    if in_range && !blocked {
                        emit_capture(
                            from, square, subject, occupant, flags_base, is_air_force, ad_status,
                            out,
                        );
                    }
                    passed_piece = true;
                    if !rule.move_ignores_blocking && !rule.capture_ignores_blocking {
                        break;
                    }
                }
                None => {
                    let landing_ok = can_occupy(subject.piece_type, square);
                    if landing_ok
                        && movement_reaches(&rule, move_range, distance, passed_piece, terrain_cut)
                        && !(rule.heavy && heavy_move_blocked(from, square))
                        && ad_status != AdStatus::InsideZone
                    {
                        out.push(Move::new(from, square, subject.clone(), flags_base));
                    }
                    if !landing_ok && !rule.move_ignores_blocking {
                        terrain_cut = true;
                    }
                }
            }
            distance += 1;
        }
    }
}

fn movement_reaches(
    rule: &crate::rules::move_table::MoveRule,
    move_range: u8,
    distance: u8,
    passed_piece: bool,
    terrain_cut: bool,
) -> bool {
    if move_range == 0 {
        return false;
    }
    if move_range != INFINITE_RANGE && distance > move_range {
        return false;
    }
    if passed_piece && !rule.move_ignores_blocking {
        return false;
    }
    !terrain_cut
}

fn emit_capture(
    from: Square,
    square: Square,
    subject: &Piece,
    occupant: &Piece,
    flags_base: u8,
    is_air_force: bool,
    ad_status: AdStatus,
    out: &mut Vec<Move>,
) {
    if is_air_force && ad_status == AdStatus::InsideZone {
        out.push(
            Move::new(from, square, subject.clone(), flags_base | FLAG_SUICIDE_CAPTURE)
                .with_capture(occupant.clone()),
        );
        return;
    }
    if can_occupy(subject.piece_type, square) {
        out.push(
            Move::new(from, square, subject.clone(), flags_base | FLAG_CAPTURE)
                .with_capture(occupant.clone()),
        );
        // An air force striking a navy on the coast can also hit and return
        // instead of occupying the square.
        if is_air_force
            && occupant.piece_type == PieceType::Navy
            && terrain_at(square) == Terrain::Mixed
        {
            out.push(
                Move::new(from, square, subject.clone(), flags_base | FLAG_STAY_CAPTURE)
                    .with_capture(occupant.clone()),
            );
        }
    } else {
        out.push(
            Move::new(from, square, subject.clone(), flags_base | FLAG_STAY_CAPTURE)
                .with_capture(occupant.clone()),
        );
    }
}

/// Longest capture range the rule can have on this ray, for sizing the walk.
fn max_capture_range(
    rule: &crate::rules::move_table::MoveRule,
    piece_type: PieceType,
    diagonal: bool,
) -> u8 {
    if rule.specials.contains(&SpecialRule::CommanderDuel) && !diagonal {
        return INFINITE_RANGE;
    }
    let base = if diagonal {
        rule.diagonal_capture_range
    } else {
        rule.capture_range
    };
    if base == 0 || base == INFINITE_RANGE {
        return base;
    }
    if piece_type == PieceType::Navy {
        base + 1
    } else {
        base
    }
}

fn walk_limit(move_range: u8, capture_range: u8) -> Option<u8> {
    if move_range == INFINITE_RANGE || capture_range == INFINITE_RANGE {
        None
    } else {
        Some(move_range.max(capture_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::moves::FLAG_DEPLOY;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn place(board: &mut Board, name: &str, piece_type: PieceType, color: PieceColor) {
        board
            .place_piece(sq(name), Piece::new(piece_type, color))
            .unwrap();
    }

    fn moves_from(board: &Board, name: &str) -> Vec<Move> {
        generate_pseudo_legal(
            board,
            board.piece_at(sq(name)).unwrap().color,
            None,
            &MoveFilter::from_square(sq(name)),
        )
    }

    #[test]
    fn infantry_walks_one_square_orthogonally() {
        let mut board = Board::empty();
        place(&mut board, "f6", PieceType::Infantry, PieceColor::Red);
        let moves = moves_from(&board, "f6");
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().all(|mv| mv.flags == FLAG_NORMAL));
    }

    #[test]
    fn heroic_infantry_gains_range_and_diagonals() {
        let mut board = Board::empty();
        board
            .place_piece(sq("f6"), Piece::heroic(PieceType::Infantry, PieceColor::Red))
            .unwrap();
        let moves = moves_from(&board, "f6");
        // Range two in eight directions on open land.
        assert_eq!(moves.len(), 16);
    }

    #[test]
    fn tank_is_blocked_by_the_first_piece() {
        let mut board = Board::empty();
        place(&mut board, "f6", PieceType::Tank, PieceColor::Red);
        place(&mut board, "f7", PieceType::Infantry, PieceColor::Red);
        let moves = moves_from(&board, "f6");
        assert!(moves.iter().all(|mv| mv.to != sq("f7") && mv.to != sq("f8")));
    }

    #[test]
    fn artillery_captures_over_a_blocker_but_cannot_move_past_it() {
        let mut board = Board::empty();
        place(&mut board, "f4", PieceType::Artillery, PieceColor::Red);
        place(&mut board, "f5", PieceType::Infantry, PieceColor::Red);
        place(&mut board, "f7", PieceType::Militia, PieceColor::Blue);
        let moves = moves_from(&board, "f4");
        assert!(moves
            .iter()
            .any(|mv| mv.to == sq("f7") && mv.is_capture()));
        assert!(moves.iter().all(|mv| mv.to != sq("f6")));
    }

    #[test]
    fn heavy_piece_crosses_the_river_only_on_bridges() {
        let mut board = Board::empty();
        place(&mut board, "e6", PieceType::Artillery, PieceColor::Red);
        let moves = moves_from(&board, "e6");
        // No move may end in the upper half: e6 is not on a bridge file.
        assert!(moves.iter().all(|mv| mv.to.rank() < 6));

        let mut board = Board::empty();
        place(&mut board, "f6", PieceType::Artillery, PieceColor::Red);
        let moves = moves_from(&board, "f6");
        assert!(moves.iter().any(|mv| mv.to == sq("f7")));
        assert!(moves.iter().any(|mv| mv.to == sq("f9")));
        // The diagonal crossing leaves the bridge and stays barred.
        assert!(moves.iter().all(|mv| mv.to != sq("e7") && mv.to != sq("g7")));
    }

    #[test]
    fn heavy_piece_still_captures_across_the_river() {
        let mut board = Board::empty();
        place(&mut board, "e6", PieceType::Artillery, PieceColor::Red);
        place(&mut board, "e8", PieceType::Tank, PieceColor::Blue);
        let moves = moves_from(&board, "e6");
        assert!(moves
            .iter()
            .any(|mv| mv.to == sq("e8") && mv.is_capture()));
    }

    #[test]
    fn navy_cannot_sail_onto_land_but_shells_it() {
        let mut board = Board::empty();
        place(&mut board, "b5", PieceType::Navy, PieceColor::Red);
        place(&mut board, "e5", PieceType::Tank, PieceColor::Blue);
        let moves = moves_from(&board, "b5");
        // Movement stays on water/coast files.
        assert!(moves
            .iter()
            .filter(|mv| mv.flags == FLAG_NORMAL)
            .all(|mv| mv.to.file() <= 2));
        // The tank three files inland is shelled without relocating.
        assert!(moves
            .iter()
            .any(|mv| mv.to == sq("e5") && mv.is_stay_capture()));
    }

    #[test]
    fn navy_boards_coast_squares_and_takes_navies_at_four() {
        let mut board = Board::empty();
        place(&mut board, "a5", PieceType::Navy, PieceColor::Red);
        place(&mut board, "a9", PieceType::Navy, PieceColor::Blue);
        let moves = moves_from(&board, "a5");
        assert!(moves
            .iter()
            .any(|mv| mv.to == sq("a9") && mv.is_capture() && !mv.is_stay_capture()));
        assert!(moves.iter().any(|mv| mv.to == sq("c5") && mv.flags == FLAG_NORMAL));
    }

    #[test]
    fn commander_slides_far_but_captures_close() {
        let mut board = Board::empty();
        place(&mut board, "f2", PieceType::Commander, PieceColor::Red);
        place(&mut board, "f8", PieceType::Infantry, PieceColor::Blue);
        let moves = moves_from(&board, "f2");
        // Slides up to f7 but cannot take the infantry six squares out.
        assert!(moves.iter().any(|mv| mv.to == sq("f7") && mv.flags == FLAG_NORMAL));
        assert!(moves.iter().all(|mv| !(mv.to == sq("f8") && mv.captures())));

        // The enemy commander at the same distance is a legal duel capture.
        let mut board = Board::empty();
        place(&mut board, "f2", PieceType::Commander, PieceColor::Red);
        place(&mut board, "f8", PieceType::Commander, PieceColor::Blue);
        let moves = moves_from(&board, "f2");
        assert!(moves
            .iter()
            .any(|mv| mv.to == sq("f8") && mv.is_capture()));
    }

    #[test]
    fn air_force_suicide_capture_inside_a_single_zone() {
        let mut board = Board::empty();
        place(&mut board, "f2", PieceType::AirForce, PieceColor::Red);
        place(&mut board, "f5", PieceType::AntiAir, PieceColor::Blue);
        let moves = moves_from(&board, "f2");
        // f4 and f6 are inside the zone: no plain moves may end there.
        assert!(moves.iter().all(|mv| mv.to != sq("f4") || mv.captures()));
        // The defender itself is hit as a suicide capture.
        let strike: Vec<&Move> = moves.iter().filter(|mv| mv.to == sq("f5")).collect();
        assert_eq!(strike.len(), 1);
        assert!(strike[0].is_suicide_capture());
    }

    #[test]
    fn air_force_ray_is_cut_by_a_second_zone() {
        let mut board = Board::empty();
        place(&mut board, "f1", PieceType::AirForce, PieceColor::Red);
        place(&mut board, "e3", PieceType::AntiAir, PieceColor::Blue);
        place(&mut board, "g5", PieceType::AntiAir, PieceColor::Blue);
        // Walking north: f3 is in e3's zone, f5 enters g5's zone and cuts.
        let moves = moves_from(&board, "f1");
        assert!(moves.iter().all(|mv| !(mv.to == sq("f5") || mv.to == sq("f6"))));
    }

    #[test]
    fn stack_deploy_openings_cover_combinable_subgroups() {
        let mut board = Board::empty();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
            Piece::new(PieceType::Infantry, PieceColor::Red),
        ])
        .unwrap();
        board.place_piece(sq("c6"), stack).unwrap();
        let moves = moves_from(&board, "c6");

        let deploys: Vec<&Move> = moves.iter().filter(|mv| mv.is_deploy()).collect();
        assert!(!deploys.is_empty());
        // Tank deploys east onto land under its own rules.
        assert!(deploys
            .iter()
            .any(|mv| mv.piece.piece_type == PieceType::Tank && mv.to == sq("e6")));
        // Tank-with-infantry deploys as a sub-group.
        assert!(deploys
            .iter()
            .any(|mv| mv.piece.piece_type == PieceType::Tank && mv.piece.flattened_count() == 2));
        // Navy-with-tank leaving infantry behind would strand the infantry
        // on open water if c6 were water; on the coast it is allowed.
        assert!(deploys
            .iter()
            .any(|mv| mv.piece.piece_type == PieceType::Navy && mv.piece.flattened_count() == 2));
        // Whole-stack deploy subgroup is not emitted outside a session.
        assert!(deploys.iter().all(|mv| mv.piece.flattened_count() < 3));
        // The carrier also has its plain whole-stack moves.
        assert!(moves
            .iter()
            .any(|mv| !mv.is_deploy() && mv.piece.flattened_count() == 3));
    }

    #[test]
    fn water_stack_cannot_strand_land_pieces() {
        let mut board = Board::empty();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
        ])
        .unwrap();
        board.place_piece(sq("b6"), stack).unwrap();
        let moves = moves_from(&board, "b6");
        // The navy may not deploy away alone: the tank cannot hold open water.
        assert!(moves
            .iter()
            .filter(|mv| mv.is_deploy())
            .all(|mv| mv.piece.piece_type != PieceType::Navy));
        // The tank may deploy off the ship onto the coast.
        assert!(moves
            .iter()
            .any(|mv| mv.is_deploy()
                && mv.piece.piece_type == PieceType::Tank
                && mv.to.file() == 2));
    }

    #[test]
    fn session_offers_recombination_onto_deployed_piece() {
        let mut board = Board::empty();
        let stack = combined_of(&[
            Piece::new(PieceType::Navy, PieceColor::Red),
            Piece::new(PieceType::Tank, PieceColor::Red),
            Piece::new(PieceType::Infantry, PieceColor::Red),
        ])
        .unwrap();
        board.place_piece(sq("c6"), stack.clone()).unwrap();

        // Simulate a session whose first action deployed the tank to d6.
        let mut session = DeploySession::new(sq("c6"), PieceColor::Red, stack);
        let tank = Piece::new(PieceType::Tank, PieceColor::Red);
        session
            .actions
            .push(Move::new(sq("c6"), sq("d6"), tank.clone(), FLAG_DEPLOY));
        board
            .replace_piece(
                sq("c6"),
                combined_of(&[
                    Piece::new(PieceType::Navy, PieceColor::Red),
                    Piece::new(PieceType::Infantry, PieceColor::Red),
                ])
                .unwrap(),
            )
            .unwrap();
        board.place_piece(sq("d6"), tank).unwrap();

        let moves =
            generate_pseudo_legal(&board, PieceColor::Red, Some(&session), &MoveFilter::all());
        // Every move is a deploy-flagged action from the session stack.
        assert!(moves.iter().all(|mv| mv.is_deploy() && mv.from == sq("c6")));
        // The tank already acted: nothing moves it again.
        assert!(moves.iter().all(|mv| mv.piece.piece_type != PieceType::Tank));
        // The infantry can board the deployed tank.
        assert!(moves.iter().any(|mv| {
            mv.is_combination()
                && mv.piece.piece_type == PieceType::Infantry
                && mv.to == sq("d6")
        }));
    }
}
