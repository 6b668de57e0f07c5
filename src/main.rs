//! Interactive command-line front end for the rules engine.
//!
//! Reads one command per line: a move in extended notation, or one of
//! `new`, `fen [string]`, `moves`, `undo`, `commit`, `cancel`, `board`,
//! `quit`.

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use commander_chess::game_state::position::Position;
use commander_chess::move_generation::generator::MoveFilter;
use commander_chess::utils::render_position::render_position;
use commander_chess::utils::san::format_move_with_state;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut position = Position::new_game();
    println!("{}", render_position(&position));
    print_prompt();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let input = line.trim();
        if input.is_empty() {
            print_prompt();
            continue;
        }

        let mut parts = input.split_whitespace();
        match parts.next().unwrap_or_default() {
            "quit" | "exit" => break,
            "new" => {
                position = Position::new_game();
                println!("{}", render_position(&position));
            }
            "fen" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("{}", position.to_fen());
                } else {
                    match Position::from_fen(&rest.join(" ")) {
                        Ok(parsed) => {
                            position = parsed;
                            println!("{}", render_position(&position));
                        }
                        Err(error) => println!("error: {error}"),
                    }
                }
            }
            "moves" => {
                let moves = position.legal_moves(&MoveFilter::all());
                if moves.is_empty() {
                    println!("(no legal moves)");
                } else {
                    let rendered: Vec<String> = moves
                        .iter()
                        .map(|mv| format_move_with_state(&position, mv))
                        .collect();
                    println!("{}", rendered.join(" "));
                }
            }
            "undo" => match position.undo_move() {
                Ok(()) => println!("{}", render_position(&position)),
                Err(error) => println!("error: {error}"),
            },
            "commit" => match position.commit_deploy_session() {
                Ok(()) => println!("{}", render_position(&position)),
                Err(error) => println!("error: {error}"),
            },
            "cancel" => match position.cancel_deploy_session() {
                Ok(()) => println!("{}", render_position(&position)),
                Err(error) => println!("error: {error}"),
            },
            "board" => println!("{}", render_position(&position)),
            _ => match position.apply_san(input) {
                Ok(_) => {
                    println!("{}", render_position(&position));
                    if position.is_checkmate() {
                        println!("checkmate");
                    } else if position.is_check() {
                        println!("check");
                    } else if position.is_draw() {
                        println!("draw");
                    }
                }
                Err(error) => println!("error: {error}"),
            },
        }
        print_prompt();
    }
}

fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
