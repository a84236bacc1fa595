//! The tile grid: built once per run from two parallel code layers.
//!
//! Construction is synchronous and fully validated: it either returns a
//! ready grid (plus the root seeds found in the contents layer) or fails
//! with [`MalformedLevel`] before any tick can execute. No partial grid is
//! ever exposed.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::direction::Direction;
use crate::rng::SimRng;
use crate::tile::Tile;

/// Grid width is the tile multiplier times this.
pub const WIDTH_FACTOR: u32 = 16;
/// Grid height is the tile multiplier times this.
pub const HEIGHT_FACTOR: u32 = 9;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that reject a level before a grid is built.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MalformedLevel {
    /// The tile multiplier must be at least 1.
    #[error("tile multiplier must be positive")]
    ZeroMultiplier,

    /// A layer has no rows or no columns.
    #[error("{layer} layer is empty")]
    EmptyLayer { layer: &'static str },

    /// A layer's rows are not all the same length.
    #[error("{layer} layer row {row} has {found} columns, expected {expected}")]
    RaggedLayer {
        layer: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The two layers disagree in shape.
    #[error(
        "terrain layer is {terrain_cols}x{terrain_rows} but contents layer is {contents_cols}x{contents_rows}"
    )]
    LayerMismatch {
        terrain_cols: usize,
        terrain_rows: usize,
        contents_cols: usize,
        contents_rows: usize,
    },

    /// The layers do not match the multiplier-derived grid size.
    #[error("layers are {cols}x{rows} but multiplier {multiplier} requires {expected_cols}x{expected_rows}")]
    WrongDimensions {
        multiplier: u32,
        expected_cols: usize,
        expected_rows: usize,
        cols: usize,
        rows: usize,
    },
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A root stub found in the contents layer: where the agent starts and the
/// heading it is travelling in (the opposite of the stub's entry edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSeed {
    pub coord: Coord,
    pub direction: Direction,
}

/// Result of building a grid from level layers.
#[derive(Debug)]
pub struct GridBuild {
    pub grid: Grid,
    /// Seeds in row-major scan order; the engine assigns ids in this order.
    pub seeds: Vec<RootSeed>,
}

/// Rectangular owning container of tiles, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Build a grid from a terrain layer and a contents layer (row-major,
    /// y outer / x inner). Both layers must be rectangular, equal in
    /// shape, and sized `multiplier x 16` by `multiplier x 9`.
    pub fn from_layers(
        terrain: &[Vec<i32>],
        contents: &[Vec<i32>],
        multiplier: u32,
        rng: &mut SimRng,
    ) -> Result<GridBuild, MalformedLevel> {
        if multiplier == 0 {
            return Err(MalformedLevel::ZeroMultiplier);
        }
        let (terrain_cols, terrain_rows) = layer_shape("terrain", terrain)?;
        let (contents_cols, contents_rows) = layer_shape("contents", contents)?;
        if (terrain_cols, terrain_rows) != (contents_cols, contents_rows) {
            return Err(MalformedLevel::LayerMismatch {
                terrain_cols,
                terrain_rows,
                contents_cols,
                contents_rows,
            });
        }
        let expected_cols = (multiplier * WIDTH_FACTOR) as usize;
        let expected_rows = (multiplier * HEIGHT_FACTOR) as usize;
        if (terrain_cols, terrain_rows) != (expected_cols, expected_rows) {
            return Err(MalformedLevel::WrongDimensions {
                multiplier,
                expected_cols,
                expected_rows,
                cols: terrain_cols,
                rows: terrain_rows,
            });
        }

        let mut tiles = Vec::with_capacity(expected_cols * expected_rows);
        let mut seeds = Vec::new();
        for (y, (terrain_row, contents_row)) in terrain.iter().zip(contents).enumerate() {
            for (x, (&terrain_code, &contents_code)) in
                terrain_row.iter().zip(contents_row).enumerate()
            {
                let coord = Coord::new(x as i32, y as i32);
                let tile = Tile::from_codes(coord, terrain_code, contents_code, rng);
                if let Some(edge) = tile.contents().entry_edge() {
                    // A stub entered from the north is a root travelling south.
                    seeds.push(RootSeed {
                        coord,
                        direction: edge.opposite(),
                    });
                }
                tiles.push(tile);
            }
        }

        Ok(GridBuild {
            grid: Grid {
                width: expected_cols as u32,
                height: expected_rows as u32,
                tiles,
            },
            seeds,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a coordinate lies inside the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// The tile at an in-bounds coordinate. Panics on out-of-bounds
    /// access: scans bounds-check through [`Grid::get`] first, so an
    /// out-of-range index here is a programming error.
    pub fn tile(&self, coord: Coord) -> &Tile {
        &self.tiles[self.index(coord)]
    }

    /// The tile at a coordinate, or `None` when off-grid.
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        if self.contains(coord) {
            Some(&self.tiles[self.index(coord)])
        } else {
            None
        }
    }

    /// Iterate all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Overwrite the slot at the tile's own coordinate.
    pub(crate) fn replace(&mut self, tile: Tile) {
        let index = self.index(tile.coord());
        self.tiles[index] = tile;
    }

    /// Flip the obstacle flag in place (destination claims during PLAN).
    pub(crate) fn set_obstacle(&mut self, coord: Coord, obstacle: bool) {
        let index = self.index(coord);
        self.tiles[index].set_obstacle(obstacle);
    }

    fn index(&self, coord: Coord) -> usize {
        debug_assert!(self.contains(coord), "coordinate {coord} is off-grid");
        coord.y as usize * self.width as usize + coord.x as usize
    }
}

fn layer_shape(
    layer: &'static str,
    rows: &[Vec<i32>],
) -> Result<(usize, usize), MalformedLevel> {
    let Some(first) = rows.first() else {
        return Err(MalformedLevel::EmptyLayer { layer });
    };
    if first.is_empty() {
        return Err(MalformedLevel::EmptyLayer { layer });
    }
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != first.len() {
            return Err(MalformedLevel::RaggedLayer {
                layer,
                row,
                expected: first.len(),
                found: cells.len(),
            });
        }
    }
    Ok((first.len(), rows.len()))
}
