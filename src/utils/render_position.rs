//! Terminal-oriented board renderer.
//!
//! Creates a human-readable view of a position for debugging, tests and
//! the CLI. Red pieces print upper-case, blue lower-case; a trailing `*`
//! marks a stack, `+` a heroic piece; empty squares show their terrain.

use crate::board_square::{Square, BOARD_FILES, BOARD_RANKS};
use crate::game_state::position::Position;
use crate::rules::terrain::{terrain_at, Terrain};

/// Render the board to a string for terminal output, rank 12 at the top.
pub fn render_position(position: &Position) -> String {
    let mut out = String::new();

    out.push_str("    ");
    for file in 0..BOARD_FILES {
        out.push(char::from(b'a' + file));
        out.push(' ');
        out.push(' ');
    }
    out.push('\n');

    for rank in (0..BOARD_RANKS).rev() {
        out.push_str(&format!("{:>2}  ", rank + 1));
        for file in 0..BOARD_FILES {
            let square = Square::from_file_rank(file, rank).expect("loop stays on the board");
            match position.board.piece_at(square) {
                Some(piece) => {
                    out.push(piece.letter());
                    if piece.is_stack() {
                        out.push('*');
                    } else if piece.heroic {
                        out.push('+');
                    } else {
                        out.push(' ');
                    }
                }
                None => {
                    let mark = match terrain_at(square) {
                        Terrain::Water => '~',
                        Terrain::Mixed => ':',
                        Terrain::Land => '·',
                    };
                    out.push(mark);
                    out.push(' ');
                }
            }
            out.push(' ');
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "turn: {:?}  halfmove: {}  move: {}",
        position.turn, position.halfmove_clock, position.fullmove_number
    ));
    if let Some(session) = position.deploy_session() {
        out.push_str(&format!(
            "\ndeploying from {} ({} step{})",
            session.stack_square.to_algebraic(),
            session.actions.len(),
            if session.actions.len() == 1 { "" } else { "s" }
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_starting_position() {
        let rendered = render_position(&Position::new_game());
        // 12 board rows plus header and status line.
        assert_eq!(rendered.lines().count(), 14);
        assert!(rendered.contains('C'));
        assert!(rendered.contains('c'));
        assert!(rendered.contains('~'));
    }
}
