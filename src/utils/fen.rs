//! Extended position notation.
//!
//! Six space-separated fields: piece placement over twelve `/`-separated
//! ranks (digit runs for empty squares, `(...)` for a carrier with its
//! cargo, `+` marking the next piece heroic), the active color (`r`/`b`),
//! two `-` placeholders, the halfmove clock and the fullmove number. An
//! in-progress deploy turn appends `DEPLOY <square>:<stay>|<actions>`,
//! where `<actions>` is the comma-separated session log
//! (`subject` `>x_@&` `destination` and `*captured` for capturing steps).

use crate::board_square::{Square, BOARD_FILES, BOARD_RANKS};
use crate::errors::EngineError;
use crate::game_state::board::Board;
use crate::game_state::deploy_session::DeploySession;
use crate::game_state::position::Position;
use crate::move_generation::moves::{
    Move, FLAG_CAPTURE, FLAG_COMBINATION, FLAG_DEPLOY, FLAG_STAY_CAPTURE, FLAG_SUICIDE_CAPTURE,
};
use crate::pieces::combination::combined_of;
use crate::pieces::piece::{Piece, PieceColor, PieceType};

/// Serializes a position, deploy segment included.
pub fn write_fen(position: &Position) -> String {
    let mut out = String::new();
    out.push_str(&placement_field(&position.board));
    out.push(' ');
    out.push(color_char(position.turn));
    out.push_str(" - - ");
    out.push_str(&position.halfmove_clock.to_string());
    out.push(' ');
    out.push_str(&position.fullmove_number.to_string());
    if let Some(session) = position.deploy_session() {
        out.push(' ');
        out.push_str(&deploy_segment(session));
    }
    out
}

/// The notation prefix that identifies a position for repetition purposes:
/// placement, side to move and any deploy segment — clocks excluded so a
/// repeated position can actually compare equal.
pub fn repetition_key(position: &Position) -> String {
    let mut key = String::new();
    key.push_str(&placement_field(&position.board));
    key.push(' ');
    key.push(color_char(position.turn));
    if let Some(session) = position.deploy_session() {
        key.push(' ');
        key.push_str(&deploy_segment(session));
    }
    key
}

/// Parses a position, deploy segment included.
pub fn parse_fen(text: &str) -> Result<Position, EngineError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 6 {
        return Err(EngineError::InvalidFen(format!(
            "expected 6 fields, got {}",
            fields.len()
        )));
    }

    let board = parse_placement(fields[0])?;
    let turn = parse_color(fields[1])?;
    for placeholder in [fields[2], fields[3]] {
        if placeholder != "-" {
            return Err(EngineError::InvalidFen(format!(
                "unexpected placeholder field '{placeholder}'"
            )));
        }
    }
    let halfmove_clock: u16 = fields[4]
        .parse()
        .map_err(|_| EngineError::InvalidFen(format!("bad halfmove clock '{}'", fields[4])))?;
    let fullmove_number: u16 = fields[5]
        .parse()
        .map_err(|_| EngineError::InvalidFen(format!("bad fullmove number '{}'", fields[5])))?;

    let deploy_session = match fields.get(6) {
        None => None,
        Some(&"DEPLOY") => {
            let segment = fields
                .get(7)
                .ok_or_else(|| EngineError::InvalidFen("DEPLOY without a segment".to_string()))?;
            Some(parse_deploy_segment(segment, &board, turn)?)
        }
        Some(other) => {
            return Err(EngineError::InvalidFen(format!(
                "unexpected trailing field '{other}'"
            )))
        }
    };

    Ok(Position::from_parts(
        board,
        turn,
        halfmove_clock,
        fullmove_number,
        deploy_session,
    ))
}

fn color_char(color: PieceColor) -> char {
    match color {
        PieceColor::Red => 'r',
        PieceColor::Blue => 'b',
    }
}

fn parse_color(field: &str) -> Result<PieceColor, EngineError> {
    match field {
        "r" => Ok(PieceColor::Red),
        "b" => Ok(PieceColor::Blue),
        other => Err(EngineError::InvalidFen(format!("bad color field '{other}'"))),
    }
}

fn placement_field(board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..BOARD_RANKS).rev() {
        let mut empty_run = 0u8;
        for file in 0..BOARD_FILES {
            let square = Square::from_file_rank(file, rank).expect("loop stays on the board");
            match board.piece_at(square) {
                Some(piece) => {
                    if empty_run > 0 {
                        out.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    out.push_str(&render_piece(piece));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }
        if rank > 0 {
            out.push('/');
        }
    }
    out
}

/// Renders a piece or stack: `T`, `+c`, `(NTI)`, `(N+ti)`.
fn render_piece(piece: &Piece) -> String {
    if piece.is_stack() {
        let mut out = String::from("(");
        out.push_str(&render_single(piece));
        for carried in &piece.carried {
            out.push_str(&render_single(carried));
        }
        out.push(')');
        out
    } else {
        render_single(piece)
    }
}

fn render_single(piece: &Piece) -> String {
    if piece.heroic {
        format!("+{}", piece.letter())
    } else {
        piece.letter().to_string()
    }
}

fn parse_placement(field: &str) -> Result<Board, EngineError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != BOARD_RANKS as usize {
        return Err(EngineError::InvalidFen(format!(
            "expected {BOARD_RANKS} ranks, got {}",
            ranks.len()
        )));
    }
    let mut board = Board::empty();
    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = BOARD_RANKS - 1 - row as u8;
        let mut file: u8 = 0;
        let mut chars = rank_text.chars().peekable();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() {
                let mut run = 0u8;
                while let Some(&digit) = chars.peek() {
                    if !digit.is_ascii_digit() {
                        break;
                    }
                    run = run * 10 + digit.to_digit(10).unwrap() as u8;
                    if run > BOARD_FILES {
                        return Err(EngineError::InvalidFen(format!(
                            "empty run too long in rank '{rank_text}'"
                        )));
                    }
                    chars.next();
                }
                file += run;
            } else {
                let piece = parse_piece_spec(&mut chars)
                    .ok_or_else(|| EngineError::InvalidFen(format!("bad rank '{rank_text}'")))?;
                if file >= BOARD_FILES {
                    return Err(EngineError::InvalidFen(format!(
                        "rank '{rank_text}' overflows the board"
                    )));
                }
                let square = Square::from_file_rank(file, rank)?;
                board
                    .place_piece(square, piece)
                    .map_err(|error| EngineError::InvalidFen(error.to_string()))?;
                file += 1;
            }
        }
        if file != BOARD_FILES {
            return Err(EngineError::InvalidFen(format!(
                "rank '{rank_text}' covers {file} files"
            )));
        }
    }
    Ok(board)
}

/// Parses `T`, `+c` or a `(...)` stack group from a character stream.
fn parse_piece_spec(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Piece> {
    match chars.peek()? {
        '(' => {
            chars.next();
            let mut members = Vec::new();
            while let Some(&next) = chars.peek() {
                if next == ')' {
                    chars.next();
                    if members.is_empty() {
                        return None;
                    }
                    let mut carrier: Piece = members.remove(0);
                    carrier.carried = members;
                    carrier.normalize();
                    return Some(carrier);
                }
                members.push(parse_single(chars)?);
            }
            None
        }
        _ => parse_single(chars),
    }
}

fn parse_single(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Piece> {
    let mut heroic = false;
    if chars.peek() == Some(&'+') {
        heroic = true;
        chars.next();
    }
    let letter = chars.next()?;
    let piece_type = PieceType::from_letter(letter)?;
    let color = if letter.is_ascii_uppercase() {
        PieceColor::Red
    } else {
        PieceColor::Blue
    };
    let mut piece = Piece::new(piece_type, color);
    piece.heroic = heroic;
    Some(piece)
}

fn deploy_segment(session: &DeploySession) -> String {
    let mut out = String::new();
    out.push_str(&session.stack_square.to_algebraic());
    out.push(':');
    if let Some(stay) = &session.stay_pieces {
        for piece in stay {
            out.push_str(&render_single(piece));
        }
    }
    out.push('|');
    let actions: Vec<String> = session.actions.iter().map(action_entry).collect();
    out.push_str(&actions.join(","));
    out
}

fn action_entry(mv: &Move) -> String {
    let mut out = render_piece(&mv.piece);
    out.push(mv.separator());
    out.push_str(&mv.to.to_algebraic());
    if let Some(captured) = &mv.captured {
        out.push('*');
        out.push_str(&render_piece(captured));
    }
    out
}

fn parse_deploy_segment(
    segment: &str,
    board: &Board,
    turn: PieceColor,
) -> Result<DeploySession, EngineError> {
    let (square_text, rest) = segment
        .split_once(':')
        .ok_or_else(|| EngineError::InvalidFen(format!("bad deploy segment '{segment}'")))?;
    let stack_square = Square::from_algebraic(square_text)?;
    let (stay_text, actions_text) = rest
        .split_once('|')
        .ok_or_else(|| EngineError::InvalidFen(format!("bad deploy segment '{segment}'")))?;

    let mut stay_pieces = Vec::new();
    let mut stay_chars = stay_text.chars().peekable();
    while stay_chars.peek().is_some() {
        let piece = parse_single(&mut stay_chars)
            .ok_or_else(|| EngineError::InvalidFen(format!("bad stay list '{stay_text}'")))?;
        stay_pieces.push(piece);
    }

    let mut actions = Vec::new();
    for entry in actions_text.split(',').filter(|entry| !entry.is_empty()) {
        actions.push(parse_action_entry(entry, stack_square)?);
    }
    if actions.is_empty() {
        return Err(EngineError::InvalidFen(
            "deploy segment with no recorded actions".to_string(),
        ));
    }

    // Rebuild the original stack: what still sits on the square plus every
    // subject that left it (stay-capture subjects never left).
    let mut originals: Vec<Piece> = Vec::new();
    if let Some(stack) = board.piece_at(stack_square) {
        originals.extend(stack.flattened().into_iter().map(|piece| piece.without_cargo()));
    }
    for action in &actions {
        if action.subject_relocates() || action.is_suicide_capture() {
            originals.extend(
                action
                    .piece
                    .flattened()
                    .into_iter()
                    .map(|piece| piece.without_cargo()),
            );
        }
    }
    let original_piece = combined_of(&originals).ok_or_else(|| {
        EngineError::InvalidFen("deploy segment does not describe one stack".to_string())
    })?;
    if original_piece.color != turn {
        return Err(EngineError::InvalidFen(
            "deploy session does not belong to the side to move".to_string(),
        ));
    }

    let mut session = DeploySession::new(stack_square, turn, original_piece);
    session.actions = actions;
    session.stay_pieces = if stay_pieces.is_empty() {
        None
    } else {
        Some(stay_pieces)
    };
    Ok(session)
}

fn parse_action_entry(entry: &str, stack_square: Square) -> Result<Move, EngineError> {
    let mut chars = entry.chars().peekable();
    let subject = parse_piece_spec(&mut chars)
        .ok_or_else(|| EngineError::InvalidFen(format!("bad deploy action '{entry}'")))?;
    let separator = chars
        .next()
        .ok_or_else(|| EngineError::InvalidFen(format!("bad deploy action '{entry}'")))?;
    let flags = FLAG_DEPLOY
        | match separator {
            '>' => 0,
            'x' => FLAG_CAPTURE,
            '_' => FLAG_STAY_CAPTURE,
            '@' => FLAG_SUICIDE_CAPTURE,
            '&' => FLAG_COMBINATION,
            other => {
                return Err(EngineError::InvalidFen(format!(
                    "bad deploy separator '{other}'"
                )))
            }
        };

    let mut destination = String::new();
    while let Some(&next) = chars.peek() {
        if next == '*' {
            break;
        }
        destination.push(next);
        chars.next();
    }
    let to = Square::from_algebraic(&destination)?;

    let captured = if chars.peek() == Some(&'*') {
        chars.next();
        Some(
            parse_piece_spec(&mut chars)
                .ok_or_else(|| EngineError::InvalidFen(format!("bad capture in '{entry}'")))?,
        )
    } else {
        None
    };

    let mut mv = Move::new(stack_square, to, subject, flags);
    mv.captured = captured;
    Ok(mv)
}
