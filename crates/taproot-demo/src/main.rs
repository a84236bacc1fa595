//! Headless terminal demo: loads a level, drives the tick cadence, and
//! renders the grid as text after every commit.
//!
//! The engine itself knows nothing about time; this binary is the
//! external driver that sleeps between ticks. Arrival and stranding
//! announcements go through the event bus the way an audio layer would
//! subscribe; frame rendering reads the tile snapshots.
//!
//! Usage: `taproot-demo [path/to/level.ron]` (defaults to the bundled
//! garden level).

use std::env;
use std::error::Error;
use std::path::Path;
use std::thread;
use std::time::Duration;

use taproot_core::behavior::BehaviorTable;
use taproot_core::engine::{Engine, TickPhase};
use taproot_core::event::{Event, EventKind};
use taproot_core::query::TileSnapshot;
use taproot_core::tile::TileAsset;
use taproot_level::{load_level, parse_level, Level};

const GARDEN: &str = include_str!("../levels/garden.ron");
const TICK_DELAY: Duration = Duration::from_millis(120);
const COSMETIC_SEED: u64 = 0xA11CE;

fn main() -> Result<(), Box<dyn Error>> {
    let level = match env::args().nth(1) {
        Some(path) => load_level(Path::new(&path))?,
        None => parse_level(GARDEN)?,
    };
    run(&level)?;
    Ok(())
}

fn run(level: &Level) -> Result<(), Box<dyn Error>> {
    let mut engine = level.spawn(BehaviorTable::standard(), COSMETIC_SEED)?;
    println!(
        "level \"{}\": {}x{} tiles, {} roots growing",
        level.name,
        engine.grid().width(),
        engine.grid().height(),
        engine.spawned_count(),
    );

    engine.event_bus.on(
        EventKind::RootArrived,
        Box::new(|event| {
            if let Event::RootArrived { root, .. } = event {
                println!("  {root} reached water");
            }
        }),
    );
    engine.event_bus.on(
        EventKind::RootStranded,
        Box::new(|event| {
            if let Event::RootStranded { root, .. } = event {
                println!("  {root} has nowhere left to grow");
            }
        }),
    );

    while !engine.is_ended() {
        let report = engine.step();
        if report.phase == TickPhase::Commit && !report.diffs.is_empty() {
            render(&engine);
            thread::sleep(TICK_DELAY);
        }
    }

    println!(
        "run over: {}/{} roots reached water (best this session: {})",
        engine.arrived_count(),
        engine.spawned_count(),
        engine.high_score(),
    );
    Ok(())
}

fn render(engine: &Engine) {
    let width = engine.grid().width() as usize;
    let mut frame = String::new();
    for (index, tile) in engine.tile_snapshots().iter().enumerate() {
        frame.push(glyph(tile));
        if (index + 1) % width == 0 {
            frame.push('\n');
        }
    }
    println!("turn {}", engine.turn());
    print!("{frame}");
}

fn glyph(tile: &TileSnapshot) -> char {
    match tile.foreground {
        Some(TileAsset::RootsTd) => '│',
        Some(TileAsset::RootsLr) => '─',
        Some(TileAsset::RootsTr) => '└',
        Some(TileAsset::RootsTl) => '┘',
        Some(TileAsset::RootsDr) => '┌',
        Some(TileAsset::RootsDl) => '┐',
        Some(TileAsset::RootsTc) => '╵',
        Some(TileAsset::RootsRc) => '╶',
        Some(TileAsset::RootsDc) => '╷',
        Some(TileAsset::RootsLc) => '╴',
        Some(TileAsset::Tree) => 'T',
        Some(
            TileAsset::Rock1 | TileAsset::Rock2 | TileAsset::Rock3 | TileAsset::Rock4,
        ) => '#',
        _ => match tile.background {
            TileAsset::Water1 | TileAsset::Water2 => '~',
            TileAsset::Soil1 | TileAsset::Soil2 => ',',
            TileAsset::Sand1 | TileAsset::Sand2 => ':',
            _ => '.',
        },
    }
}
