//! Taproot Core -- the root-growth simulation engine.
//!
//! Roots spread across a rectangular tile grid, one cell per move,
//! steering by a per-tile-kind turn preference table and leaving a
//! connected trail behind them. A root wins by reaching water and loses
//! by running out of legal moves.
//!
//! # Two-Phase Tick
//!
//! Each call to [`engine::Engine::step`] advances the turn counter by one
//! and runs one of the two alternating phases:
//!
//! 1. **PLAN** (even turns) -- Every active root, in ascending id order,
//!    resolves a candidate next cell against the pre-tick grid: a
//!    bounded clockwise scan finds where its heading leads, the behavior
//!    table re-steers it when the ground ahead changes kind, and an
//!    obstacle-aware rescan reroutes around blocked cells. The winner of
//!    a contested cell is the lowest id; the claim is recorded by
//!    flipping the destination's obstacle flag.
//! 2. **COMMIT** (odd turns) -- Every claimed move is applied atomically:
//!    the destination slot gets its replacement trail tile, the vacated
//!    cell's foreground becomes the connector shape joining its entry
//!    and exit edges, arrivals are scored, and retired roots leave the
//!    schedule. Events buffered during both phases are delivered.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Scheduler and single owner of all mutable
//!   simulation state.
//! - [`grid::Grid`] -- Owning 2D tile container, built once per run from
//!   two integer code layers.
//! - [`tile::Tile`] -- Value-like per-cell snapshot (terrain, contents,
//!   obstacle flag, asset tokens).
//! - [`behavior::BehaviorTable`] -- Tile kind to turn preference
//!   configuration.
//! - [`root::Root`] -- One growing branch.
//! - [`trail`] -- Pure connector-shape and entry-edge geometry.
//! - [`event::EventBus`] -- Buffered typed events with passive listeners.
//! - [`serialize`] -- Versioned mid-run snapshots via bitcode.

pub mod behavior;
pub mod coord;
pub mod direction;
pub mod engine;
pub mod event;
pub mod grid;
pub mod query;
pub mod rng;
pub mod root;
pub mod serialize;
pub mod tile;
pub mod trail;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
