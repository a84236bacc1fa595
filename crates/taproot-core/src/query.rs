//! Read-only query API for inspecting simulation state.
//!
//! Provides snapshot types that aggregate engine state into convenient
//! views for rendering, UI, and audio consumers. All types are owned
//! copies -- no references into internal engine storage.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::direction::Direction;
use crate::root::{Root, RootId, RootState};
use crate::tile::{Contents, Terrain, Tile, TileAsset};

/// A per-tick change to one cell's presentation. `None` means the layer
/// did not change this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDiff {
    pub coord: Coord,
    pub background: Option<TileAsset>,
    pub foreground: Option<TileAsset>,
}

/// An owned, read-only view of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSnapshot {
    pub coord: Coord,
    pub terrain: Terrain,
    pub contents: Contents,
    pub is_obstacle: bool,
    pub background: TileAsset,
    pub foreground: Option<TileAsset>,
}

impl From<&Tile> for TileSnapshot {
    fn from(tile: &Tile) -> Self {
        Self {
            coord: tile.coord(),
            terrain: tile.terrain(),
            contents: tile.contents(),
            is_obstacle: tile.is_obstacle(),
            background: tile.background(),
            foreground: tile.foreground(),
        }
    }
}

/// An owned, read-only view of one root agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSnapshot {
    pub id: RootId,
    pub starting: Coord,
    pub previous: Coord,
    pub current: Coord,
    pub direction: Direction,
    pub state: RootState,
    /// Destination claimed during PLAN, if a commit is outstanding.
    pub pending_to: Option<Coord>,
}

impl From<&Root> for RootSnapshot {
    fn from(root: &Root) -> Self {
        Self {
            id: root.id(),
            starting: root.starting(),
            previous: root.previous(),
            current: root.current(),
            direction: root.direction(),
            state: root.state(),
            pending_to: root.pending().map(|p| p.tile.coord()),
        }
    }
}
