use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use commander_chess::game_state::position::{Position, STARTING_POSITION_FEN};
use commander_chess::move_generation::generator::MoveFilter;

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
}

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: STARTING_POSITION_FEN,
    },
    BenchCase {
        name: "open_middlegame",
        fen: "3ascha3/nn1tge1t3/3mi1im3/2f8/11/5T5/4F6/2(NTI)8/11/3MI1IM3/NN2GE1T3/3ASCHA3 r - - 12 14",
    },
    BenchCase {
        name: "sparse_endgame",
        fen: "11/6c4/11/2n8/11/11/5T5/2F8/11/11/3C7/11 r - - 40 61",
    },
];

fn bench_legal_move_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("legal_moves");
    for case in CASES {
        let position = Position::from_fen(case.fen).expect("bench case must parse");
        group.bench_with_input(BenchmarkId::from_parameter(case.name), &position, |b, p| {
            b.iter(|| {
                // Fresh clone so the memoization cache never short-circuits
                // the measurement.
                let probe = p.clone();
                black_box(probe.legal_moves(&MoveFilter::all()).len())
            })
        });
    }
    group.finish();
}

fn bench_apply_undo_walk(c: &mut Criterion) {
    c.bench_function("apply_undo_walk", |b| {
        b.iter(|| {
            let mut position = Position::new_game();
            let mut plies = 0usize;
            for _ in 0..12 {
                let moves = position.legal_moves(&MoveFilter::all());
                let Some(mv) = moves.first().cloned() else {
                    break;
                };
                position.apply_move(&mv).expect("legal move applies");
                plies += 1;
            }
            for _ in 0..plies {
                position.undo_move().expect("undo succeeds");
            }
            black_box(position.to_fen())
        })
    });
}

criterion_group!(benches, bench_legal_move_generation, bench_apply_undo_walk);
criterion_main!(benches);
