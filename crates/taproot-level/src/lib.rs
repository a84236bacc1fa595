//! Level loading for the taproot engine.
//!
//! A level file is a RON manifest carrying the run name, the tile
//! multiplier, and the two layers as CSV blocks (comma-separated integer
//! codes, one row per line):
//!
//! ```ron
//! (
//!     name: "garden",
//!     tile_multiplier: 1,
//!     terrain: "0,0,3\n0,1,3\n...",
//!     contents: "13,,\n,0,\n...",
//! )
//! ```
//!
//! An empty CSV cell means "nothing here" (code -1). This module only
//! validates syntax; shape validation (rectangularity, multiplier
//! agreement) stays with grid construction, which rejects malformed
//! layers before a run can start.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use taproot_core::behavior::BehaviorTable;
use taproot_core::engine::{Engine, RunConfig};
use taproot_core::grid::MalformedLevel;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while reading a level file.
#[derive(Debug, thiserror::Error)]
pub enum LevelLoadError {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The manifest is not valid RON.
    #[error("manifest parse error: {0}")]
    Manifest(#[from] ron::error::SpannedError),

    /// A CSV cell is not an integer code.
    #[error("{layer} layer row {row}, column {column}: bad cell {token:?}")]
    BadCell {
        layer: &'static str,
        row: usize,
        column: usize,
        token: String,
    },
}

/// Attach the file path to an error message where useful.
#[derive(Debug, thiserror::Error)]
#[error("level {path}: {source}")]
pub struct LevelFileError {
    pub path: PathBuf,
    #[source]
    pub source: LevelLoadError,
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// RON shape of a level manifest.
#[derive(Debug, Deserialize)]
struct LevelData {
    name: String,
    tile_multiplier: u32,
    terrain: String,
    contents: String,
}

/// A parsed level, ready to feed grid construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub name: String,
    pub tile_multiplier: u32,
    pub terrain: Vec<Vec<i32>>,
    pub contents: Vec<Vec<i32>>,
}

impl Level {
    /// Build an engine for this level.
    pub fn spawn(&self, behavior: BehaviorTable, seed: u64) -> Result<Engine, MalformedLevel> {
        Engine::new(
            &self.terrain,
            &self.contents,
            RunConfig {
                tile_multiplier: self.tile_multiplier,
                behavior,
                seed,
            },
        )
    }
}

/// Parse a level manifest from RON source.
pub fn parse_level(source: &str) -> Result<Level, LevelLoadError> {
    let data: LevelData = ron::from_str(source)?;
    Ok(Level {
        terrain: parse_layer("terrain", &data.terrain)?,
        contents: parse_layer("contents", &data.contents)?,
        name: data.name,
        tile_multiplier: data.tile_multiplier,
    })
}

/// Read and parse a level manifest from disk.
pub fn load_level(path: &Path) -> Result<Level, LevelFileError> {
    let wrap = |source: LevelLoadError| LevelFileError {
        path: path.to_path_buf(),
        source,
    };
    let text = std::fs::read_to_string(path).map_err(|e| wrap(e.into()))?;
    parse_level(&text).map_err(wrap)
}

/// Parse one CSV block into rows of integer codes. Blank lines are
/// skipped; an empty cell is the "nothing" code -1.
fn parse_layer(layer: &'static str, source: &str) -> Result<Vec<Vec<i32>>, LevelLoadError> {
    let mut rows = Vec::new();
    for (row, line) in source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
    {
        let mut cells = Vec::new();
        for (column, token) in line.split(',').map(str::trim).enumerate() {
            let code = if token.is_empty() {
                -1
            } else {
                token.parse().map_err(|_| LevelLoadError::BadCell {
                    layer,
                    row,
                    column,
                    token: token.to_string(),
                })?
            };
            cells.push(code);
        }
        rows.push(cells);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_rows(rows: usize, cols: usize, fill: &str) -> String {
        let row = vec![fill; cols].join(",");
        vec![row; rows].join("\n")
    }

    fn manifest(terrain: &str, contents: &str) -> String {
        format!(
            "(name: \"test\", tile_multiplier: 1, terrain: \"{}\", contents: \"{}\")",
            terrain.replace('\n', "\\n"),
            contents.replace('\n', "\\n"),
        )
    }

    #[test]
    fn parses_a_manifest() {
        let source = manifest(&csv_rows(9, 16, "0"), &csv_rows(9, 16, ""));
        let level = parse_level(&source).unwrap();
        assert_eq!(level.name, "test");
        assert_eq!(level.tile_multiplier, 1);
        assert_eq!(level.terrain.len(), 9);
        assert_eq!(level.terrain[0].len(), 16);
        assert_eq!(level.contents[3][7], -1);
    }

    #[test]
    fn empty_cells_become_nothing() {
        let rows = parse_layer("contents", "13,,0\n,2,").unwrap();
        assert_eq!(rows, vec![vec![13, -1, 0], vec![-1, 2, -1]]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_layer("terrain", "0,1\n\n2,3\n").unwrap();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn bad_cells_report_their_position() {
        let err = parse_layer("terrain", "0,1\n2,x").unwrap_err();
        match err {
            LevelLoadError::BadCell {
                layer,
                row,
                column,
                token,
            } => {
                assert_eq!(layer, "terrain");
                assert_eq!(row, 1);
                assert_eq!(column, 1);
                assert_eq!(token, "x");
            }
            other => panic!("expected BadCell, got: {other:?}"),
        }
    }

    #[test]
    fn bad_ron_is_a_manifest_error() {
        assert!(matches!(
            parse_level("(name: \"broken\""),
            Err(LevelLoadError::Manifest(_))
        ));
    }

    #[test]
    fn spawned_engine_sees_the_stubs() {
        let mut contents = csv_rows(9, 16, "");
        // First row: a stub travelling east at x=0.
        contents.replace_range(0..0, "13");
        let source = manifest(&csv_rows(9, 16, "0"), &contents);
        let level = parse_level(&source).unwrap();
        let engine = level.spawn(BehaviorTable::standard(), 0).unwrap();
        assert_eq!(engine.spawned_count(), 1);
    }

    #[test]
    fn shape_validation_is_the_grids_job() {
        // 8 rows only: parses fine here, rejected at spawn.
        let source = manifest(&csv_rows(8, 16, "0"), &csv_rows(8, 16, ""));
        let level = parse_level(&source).unwrap();
        assert!(matches!(
            level.spawn(BehaviorTable::standard(), 0),
            Err(MalformedLevel::WrongDimensions { .. })
        ));
    }
}
