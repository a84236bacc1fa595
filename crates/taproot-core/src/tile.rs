//! Per-cell state: terrain, contents, obstacle flag, and asset tokens.
//!
//! Tiles are value-like snapshots. The grid replaces a whole tile when a
//! root enters a cell; the only field ever flipped in place is the
//! obstacle flag, which the scheduler sets when it claims a cell as a
//! pending destination.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::direction::Direction;
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Ground type of a cell, fixed at grid build time. Water is the sink the
/// roots are trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Grass,
    Soil,
    Sand,
    Water,
}

impl Terrain {
    /// Decode a terrain layer cell. Unrecognized codes fall back to grass,
    /// never an error.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Terrain::Soil,
            2 => Terrain::Sand,
            3 => Terrain::Water,
            _ => Terrain::Grass,
        }
    }
}

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// What occupies a cell on top of its terrain.
///
/// A `RootFrom*` value records the edge through which the trail segment in
/// this cell was entered; the connector shape is derived from that edge
/// when a second edge is added (the root moves on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contents {
    Nothing,
    Tree,
    Rock,
    RootFromNorth,
    RootFromEast,
    RootFromSouth,
    RootFromWest,
}

impl Contents {
    /// The trail contents recording an entry through `edge`.
    pub fn entered_from(edge: Direction) -> Self {
        match edge {
            Direction::North => Contents::RootFromNorth,
            Direction::East => Contents::RootFromEast,
            Direction::South => Contents::RootFromSouth,
            Direction::West => Contents::RootFromWest,
        }
    }

    /// The recorded entry edge, if this is a trail segment.
    pub fn entry_edge(self) -> Option<Direction> {
        match self {
            Contents::RootFromNorth => Some(Direction::North),
            Contents::RootFromEast => Some(Direction::East),
            Contents::RootFromSouth => Some(Direction::South),
            Contents::RootFromWest => Some(Direction::West),
            _ => None,
        }
    }

    /// Whether this is any of the four trail segment values.
    pub fn is_root(self) -> bool {
        self.entry_edge().is_some()
    }
}

// ---------------------------------------------------------------------------
// Behavior kind
// ---------------------------------------------------------------------------

/// Categorical classification of a tile for turn-preference lookups.
/// Contents override terrain: a tree on grass classifies as `Tree`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BehaviorKind {
    Grass,
    Soil,
    Sand,
    Water,
    Tree,
    Rock,
    Roots,
}

impl BehaviorKind {
    fn from_terrain(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Grass => BehaviorKind::Grass,
            Terrain::Soil => BehaviorKind::Soil,
            Terrain::Sand => BehaviorKind::Sand,
            Terrain::Water => BehaviorKind::Water,
        }
    }
}

// ---------------------------------------------------------------------------
// Asset tokens
// ---------------------------------------------------------------------------

/// Opaque asset tokens handed to the rendering collaborator. Discriminants
/// are the cell indices of the game's tilesheet; the simulation never
/// interprets them beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileAsset {
    Grass1 = 0,
    Grass2 = 1,
    Sand1 = 2,
    Sand2 = 3,
    RootsTd = 4,
    RootsLr = 5,
    Rock1 = 9,
    Rock2 = 10,
    Rock3 = 11,
    Rock4 = 12,
    Soil1 = 13,
    Soil2 = 14,
    RootsDr = 17,
    RootsDl = 18,
    RootsLc = 19,
    Tree = 24,
    Water1 = 26,
    Water2 = 27,
    RootsTr = 30,
    RootsTl = 31,
    RootsRc = 32,
    RootsTc = 33,
    RootsDc = 34,
}

impl TileAsset {
    /// Index of this token in the tilesheet.
    pub fn sheet_index(self) -> u8 {
        self as u8
    }

    /// The end-cap token for a trail entered through `edge`.
    pub fn cap(edge: Direction) -> Self {
        match edge {
            Direction::North => TileAsset::RootsTc,
            Direction::East => TileAsset::RootsRc,
            Direction::South => TileAsset::RootsDc,
            Direction::West => TileAsset::RootsLc,
        }
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One cell of the grid.
///
/// Between ticks: `is_obstacle == (contents != Nothing)`. During a PLAN
/// phase the scheduler may flip the obstacle flag on a claimed destination
/// ahead of the COMMIT that writes the replacement tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    coord: Coord,
    terrain: Terrain,
    contents: Contents,
    is_obstacle: bool,
    background: TileAsset,
    foreground: Option<TileAsset>,
}

impl Tile {
    /// Build a tile from one terrain layer cell and one contents layer
    /// cell. The RNG is consulted only for cosmetic variant picks.
    ///
    /// Contents codes: 0 = tree, 1 = rock (random variant), 2..=5 = rock
    /// with a fixed variant, 10..=13 = trail stubs entered from
    /// north/east/south/west. Anything else is an empty cell.
    pub fn from_codes(coord: Coord, terrain_code: i32, contents_code: i32, rng: &mut SimRng) -> Self {
        let terrain = Terrain::from_code(terrain_code);
        let background = match terrain {
            Terrain::Grass => pick_variant(rng, TileAsset::Grass1, TileAsset::Grass2),
            Terrain::Soil => pick_variant(rng, TileAsset::Soil1, TileAsset::Soil2),
            Terrain::Sand => pick_variant(rng, TileAsset::Sand1, TileAsset::Sand2),
            Terrain::Water => TileAsset::Water1,
        };

        let (contents, foreground) = match contents_code {
            0 => (Contents::Tree, Some(TileAsset::Tree)),
            1 => (Contents::Rock, Some(rock_variant(rng.below(4)))),
            2..=5 => (Contents::Rock, Some(rock_variant((contents_code - 2) as u32))),
            10 => (Contents::RootFromNorth, Some(TileAsset::cap(Direction::North))),
            11 => (Contents::RootFromEast, Some(TileAsset::cap(Direction::East))),
            12 => (Contents::RootFromSouth, Some(TileAsset::cap(Direction::South))),
            13 => (Contents::RootFromWest, Some(TileAsset::cap(Direction::West))),
            _ => (Contents::Nothing, None),
        };

        Self {
            coord,
            terrain,
            contents,
            is_obstacle: contents != Contents::Nothing,
            background,
            foreground,
        }
    }

    /// Build the replacement tile written when a root enters a cell. The
    /// terrain and background of the replaced tile are preserved; the
    /// contents record the entry edge and the foreground starts as the
    /// matching end cap until the root moves on.
    pub fn trail(coord: Coord, terrain: Terrain, entered_from: Direction, background: TileAsset) -> Self {
        Self {
            coord,
            terrain,
            contents: Contents::entered_from(entered_from),
            is_obstacle: true,
            background,
            foreground: Some(TileAsset::cap(entered_from)),
        }
    }

    /// Copy of this tile with a different foreground token.
    pub fn with_foreground(mut self, foreground: TileAsset) -> Self {
        self.foreground = Some(foreground);
        self
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn contents(&self) -> Contents {
        self.contents
    }

    pub fn is_obstacle(&self) -> bool {
        self.is_obstacle
    }

    pub fn background(&self) -> TileAsset {
        self.background
    }

    pub fn foreground(&self) -> Option<TileAsset> {
        self.foreground
    }

    /// Full classification: contents override terrain.
    pub fn behavior_kind(&self) -> BehaviorKind {
        match self.contents {
            Contents::Tree => BehaviorKind::Tree,
            Contents::Rock => BehaviorKind::Rock,
            c if c.is_root() => BehaviorKind::Roots,
            _ => BehaviorKind::from_terrain(self.terrain),
        }
    }

    /// Classification ignoring trail contents (trees and rocks still
    /// override). Two cells of the same ground kind are "the same ground"
    /// for direction re-evaluation, so a root does not re-deflect every
    /// tick merely because it is sitting on its own trail.
    pub fn ground_kind(&self) -> BehaviorKind {
        match self.contents {
            Contents::Tree => BehaviorKind::Tree,
            Contents::Rock => BehaviorKind::Rock,
            _ => BehaviorKind::from_terrain(self.terrain),
        }
    }

    pub(crate) fn set_obstacle(&mut self, obstacle: bool) {
        self.is_obstacle = obstacle;
    }
}

fn pick_variant(rng: &mut SimRng, first: TileAsset, second: TileAsset) -> TileAsset {
    if rng.one_in(4) { first } else { second }
}

fn rock_variant(index: u32) -> TileAsset {
    match index {
        0 => TileAsset::Rock1,
        1 => TileAsset::Rock2,
        2 => TileAsset::Rock3,
        _ => TileAsset::Rock4,
    }
}
