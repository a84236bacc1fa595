//! Criterion benchmarks for the taproot simulation engine.
//!
//! Three benchmark groups:
//! - `open_field_tick`: a 64x36 grid with a row of roots marching toward
//!   a water edge -- measures the steady-state cost of one move cycle.
//! - `full_run`: the same grid stepped from construction to the end of
//!   the run, including retirement bookkeeping.
//! - `cluttered_field_run`: a 16x9 field dense with scenery and
//!   competing roots -- measures deflection and collision handling.

use criterion::{criterion_group, criterion_main, Criterion};
use taproot_core::engine::{Engine, RunConfig};
use taproot_core::test_utils::layers_from_sketch;

// ===========================================================================
// Level builders
// ===========================================================================

/// A 64x36 field (multiplier 4): grass everywhere, the bottom row water,
/// and a root stub travelling south in every fourth column of row 0.
fn build_march_level() -> (Vec<Vec<i32>>, Vec<Vec<i32>>) {
    let cols = 64;
    let rows = 36;
    let mut terrain = vec![vec![0; cols]; rows];
    let mut contents = vec![vec![-1; cols]; rows];
    for cell in &mut terrain[rows - 1] {
        *cell = 3;
    }
    for x in (0..cols).step_by(4) {
        contents[0][x] = 10;
    }
    (terrain, contents)
}

fn build_march_engine() -> Engine {
    let (terrain, contents) = build_march_level();
    let config = RunConfig {
        tile_multiplier: 4,
        ..RunConfig::default()
    };
    Engine::new(&terrain, &contents, config).expect("bench level is well-formed")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn open_field_tick(c: &mut Criterion) {
    c.bench_function("open_field_tick", |b| {
        let mut engine = build_march_engine();
        b.iter(|| {
            if engine.is_ended() {
                engine = build_march_engine();
            }
            engine.step();
            engine.step();
        });
    });
}

fn full_run(c: &mut Criterion) {
    c.bench_function("full_run", |b| {
        b.iter(|| {
            let mut engine = build_march_engine();
            let mut budget = 10_000u32;
            while !engine.is_ended() && budget > 0 {
                engine.step();
                budget -= 1;
            }
            engine.arrived_count()
        });
    });
}

fn cluttered_field_run(c: &mut Criterion) {
    let (terrain, contents) = layers_from_sketch(
        "v . . R . . . . . . . . . . . w
         . . . . . T . . . . . . . . . w
         > . . . . . . . R . . . . . . w
         . . . . . . . . . . . . . . . w
         . . T . . . . v . . . . R . . w
         . . . . . . . . . . . . . . . w
         > . . . . R . . . . T . . . . w
         . . . . . . . . . . . . . . . w
         ^ . . . . . . . . . . . . . . w",
    );
    c.bench_function("cluttered_field_run", |b| {
        b.iter(|| {
            let mut engine =
                Engine::new(&terrain, &contents, RunConfig::default()).expect("well-formed");
            let mut budget = 2_000u32;
            while !engine.is_ended() && budget > 0 {
                engine.step();
                budget -= 1;
            }
            engine.arrived_count()
        });
    });
}

criterion_group!(benches, open_field_tick, full_run, cluttered_field_run);
criterion_main!(benches);
