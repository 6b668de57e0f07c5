//! Extended move notation.
//!
//! `[+]<letter><origin><sep><dest>[^|#]` — the leading `+` marks a heroic
//! subject, the letter is omitted for a plain infantry move, and the
//! separator encodes the move kind: `-` move, `x` capture, `_` stay
//! capture, `@` suicide capture, `>` deploy, `&` combination. Parsing is by
//! matching against the legal-move list, so anything the engine would not
//! play is rejected with `NoSuchMove` or `AmbiguousMove`.

use crate::board_square::Square;
use crate::errors::EngineError;
use crate::game_state::position::Position;
use crate::move_generation::generator::MoveFilter;
use crate::move_generation::moves::Move;
use crate::pieces::piece::PieceType;

const SEPARATORS: [char; 6] = ['-', 'x', '_', '@', '>', '&'];

/// Renders a move in extended notation, origin included.
pub fn format_move(mv: &Move) -> String {
    let mut out = String::new();
    if mv.piece.heroic {
        out.push('+');
    }
    if mv.piece.piece_type != PieceType::Infantry || mv.piece.is_stack() {
        out.push(mv.piece.piece_type.letter());
    }
    out.push_str(&mv.from.to_algebraic());
    out.push(mv.separator());
    out.push_str(&mv.to.to_algebraic());
    out
}

/// Renders a move with its check/checkmate suffix, probing the position
/// after the move on a scratch copy.
pub fn format_move_with_state(position: &Position, mv: &Move) -> String {
    let mut out = format_move(mv);
    let mut probe = position.clone();
    if probe.apply_move(mv).is_ok() {
        if probe.is_checkmate() {
            out.push('#');
        } else if probe.is_check() {
            out.push('^');
        }
    }
    out
}

/// Parses extended notation by matching it against the legal moves of the
/// position.
pub fn parse_move(position: &Position, text: &str) -> Result<Move, EngineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidSan(text.to_string()));
    }
    let mut body = trimmed.trim_end_matches(['^', '#']);

    let mut require_heroic = false;
    if let Some(rest) = body.strip_prefix('+') {
        require_heroic = true;
        body = rest;
    }

    let mut chars = body.chars().peekable();
    let piece_type = match chars.peek() {
        Some(&letter) if letter.is_ascii_uppercase() => {
            let parsed = PieceType::from_letter(letter)
                .ok_or_else(|| EngineError::InvalidSan(text.to_string()))?;
            chars.next();
            parsed
        }
        _ => PieceType::Infantry,
    };
    let rest: String = chars.collect();

    let (origin, separator, destination) = match rest.find(SEPARATORS) {
        Some(index) => {
            let (head, tail) = rest.split_at(index);
            let mut tail_chars = tail.chars();
            let separator = tail_chars.next().expect("split index is on a separator");
            let origin = if head.is_empty() {
                None
            } else {
                Some(Square::from_algebraic(head)?)
            };
            (origin, Some(separator), tail_chars.as_str().to_string())
        }
        None => (None, None, rest),
    };
    if destination.is_empty() {
        return Err(EngineError::InvalidSan(text.to_string()));
    }
    let to = Square::from_algebraic(&destination)?;

    let legal = position.legal_moves(&MoveFilter::all());
    let matches: Vec<&Move> = legal
        .iter()
        .filter(|candidate| {
            candidate.to == to
                && candidate.piece.piece_type == piece_type
                && origin.map(|sq| sq == candidate.from).unwrap_or(true)
                && candidate.separator() == separator.unwrap_or('-')
                && (!require_heroic || candidate.piece.heroic)
        })
        .collect();

    match matches.len() {
        0 => Err(EngineError::NoSuchMove(trimmed.to_string())),
        1 => Ok(matches[0].clone()),
        _ => Err(EngineError::AmbiguousMove {
            notation: trimmed.to_string(),
            candidates: matches.iter().map(|mv| format_move(mv)).collect(),
        }),
    }
}
