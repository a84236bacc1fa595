//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.
//!
//! Levels are written as ASCII sketches, one character per cell,
//! whitespace separated. The sketch is placed in the top-left corner of a
//! 16x9 grass field (tile multiplier 1), so scenarios that rely on
//! stranding must fence themselves in with rocks or water.
//!
//! | char | cell |
//! |------|------|
//! | `.`  | grass |
//! | `o`  | soil |
//! | `s`  | sand |
//! | `w`  | water |
//! | `T`  | tree on grass |
//! | `R`  | rock on grass (fixed variant) |
//! | `^`  | root stub travelling north |
//! | `>`  | root stub travelling east |
//! | `v`  | root stub travelling south |
//! | `<`  | root stub travelling west |

use crate::engine::{Engine, RunConfig, TickReport};
use crate::event::Event;

/// Expand a sketch into full terrain and contents layers (16x9).
pub fn layers_from_sketch(sketch: &str) -> (Vec<Vec<i32>>, Vec<Vec<i32>>) {
    let mut terrain = vec![vec![0; 16]; 9];
    let mut contents = vec![vec![-1; 16]; 9];

    let rows: Vec<Vec<char>> = sketch
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| {
                    assert_eq!(token.chars().count(), 1, "bad sketch token {token:?}");
                    token.chars().next().unwrap()
                })
                .collect()
        })
        .collect();
    assert!(rows.len() <= 9, "sketch has more than 9 rows");

    for (y, row) in rows.iter().enumerate() {
        assert!(row.len() <= 16, "sketch row {y} has more than 16 cells");
        for (x, &cell) in row.iter().enumerate() {
            let (terrain_code, contents_code) = match cell {
                '.' => (0, -1),
                'o' => (1, -1),
                's' => (2, -1),
                'w' => (3, -1),
                'T' => (0, 0),
                'R' => (0, 2),
                // Stubs record their entry edge; the agent travels the
                // opposite way.
                'v' => (0, 10),
                '<' => (0, 11),
                '^' => (0, 12),
                '>' => (0, 13),
                other => panic!("unknown sketch cell {other:?}"),
            };
            terrain[y][x] = terrain_code;
            contents[y][x] = contents_code;
        }
    }

    (terrain, contents)
}

/// Build an engine from a sketch. The config's tile multiplier is
/// overridden to 1 to match the sketch field.
pub fn engine_from_sketch(sketch: &str, config: RunConfig) -> Engine {
    let (terrain, contents) = layers_from_sketch(sketch);
    let config = RunConfig {
        tile_multiplier: 1,
        ..config
    };
    Engine::new(&terrain, &contents, config).expect("sketch produced a malformed level")
}

/// Run one full move cycle: a PLAN tick then a COMMIT tick.
pub fn step_move(engine: &mut Engine) -> (TickReport, TickReport) {
    let plan = engine.step();
    let commit = engine.step();
    (plan, commit)
}

/// Step until the run ends, collecting every event in order. Panics if
/// the run outlives `max_moves` full move cycles.
pub fn run_to_end(engine: &mut Engine, max_moves: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..max_moves {
        let (plan, commit) = step_move(engine);
        events.extend(plan.events);
        events.extend(commit.events);
        if engine.is_ended() {
            return events;
        }
    }
    panic!("simulation did not end within {max_moves} moves");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sketch_pads_to_full_field() {
        let (terrain, contents) = layers_from_sketch("w");
        assert_eq!(terrain.len(), 9);
        assert!(terrain.iter().all(|row| row.len() == 16));
        assert_eq!(terrain[0][0], 3);
        assert_eq!(terrain[0][1], 0);
        assert_eq!(contents[0][0], -1);
    }

    #[test]
    fn stub_chars_encode_entry_edges() {
        let (_, contents) = layers_from_sketch("v < ^ >");
        assert_eq!(&contents[0][..4], &[10, 11, 12, 13]);
    }

    #[test]
    #[should_panic(expected = "unknown sketch cell")]
    fn unknown_cells_are_rejected() {
        layers_from_sketch("?");
    }
}
