//! Random self-play demo: plays one seeded match and prints the moves,
//! the outcome and the final board.
//!
//! Usage: `self_play [seed] [max_plies]`

use std::env;
use std::io;

use tracing_subscriber::EnvFilter;

use commander_chess::game_state::position::Position;
use commander_chess::utils::match_harness::{play_random_match, MatchConfig};
use commander_chess::utils::render_position::render_position;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| std::process::id() as u64);
    let max_plies: u32 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(600);

    let record = play_random_match(&MatchConfig { max_plies, seed });
    for line in &record.log {
        println!("{line}");
    }
    println!();
    for (index, chunk) in record.moves.chunks(8).enumerate() {
        println!("{:>4}  {}", index * 8 + 1, chunk.join(" "));
    }
    println!();
    let final_position =
        Position::from_fen(&record.final_fen).expect("self-play always ends in a valid position");
    println!("{}", render_position(&final_position));
    println!("outcome: {:?}", record.outcome);
}
