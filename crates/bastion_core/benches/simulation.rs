//! Tick loop benchmarks for bastion_core.
//!
//! Run with: `cargo bench -p bastion_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use bastion_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn battle_in_progress(difficulty: Difficulty) -> Match {
    let mut game = Match::new(MatchConfig::default(), difficulty, 42);
    let _ = game.apply_command(PlayerCommand::AdvanceBuildPhase);
    // Let the first wave close in on the walls.
    for _ in 0..400 {
        game.tick(DEFAULT_TICK_MS);
    }
    game
}

/// Single ticks against the first wave at each difficulty.
pub fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for difficulty in [Difficulty::Easy, Difficulty::Hard] {
        let game = battle_in_progress(difficulty);
        group.bench_function(format!("{difficulty:?}"), |b| {
            b.iter_batched(
                || game.clone(),
                |mut game| black_box(game.tick(DEFAULT_TICK_MS)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// A full second of simulated battle.
pub fn second_of_battle(c: &mut Criterion) {
    let game = battle_in_progress(Difficulty::Medium);
    c.bench_function("battle_62_ticks", |b| {
        b.iter_batched(
            || game.clone(),
            |mut game| {
                for _ in 0..62 {
                    black_box(game.tick(DEFAULT_TICK_MS));
                }
                game.state_hash()
            },
            BatchSize::SmallInput,
        );
    });
}

/// Obstruction checks against the default wall ring.
pub fn line_of_sight(c: &mut Criterion) {
    let game = Match::new(MatchConfig::default(), Difficulty::Easy, 1);
    let from = Vec2Fixed::from_ints(20, 30);
    let to = game.command_center().map_or(Vec2Fixed::ZERO, Structure::center);
    c.bench_function("path_blocked", |b| {
        b.iter(|| bastion_core::targeting::path_blocked(black_box(from), black_box(to), &game.view()));
    });
}

criterion_group!(benches, tick_benchmark, second_of_battle, line_of_sight);
criterion_main!(benches);
