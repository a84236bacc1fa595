//! Trail connector geometry.
//!
//! When a root vacates a cell, the cell's trail segment gains a second
//! edge: the one the root left through. The connector shape drawn there is
//! a pure function of the recorded entry edge and the direction of the
//! departing move. The letters name the tilesheet's connector family:
//! T = top, D = down, L = left, R = right.

use crate::coord::Coord;
use crate::direction::Direction;
use crate::tile::{Contents, TileAsset};

/// Connector shape for a trail segment with both edges known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TrailShape {
    /// Vertical through piece.
    Td,
    /// Horizontal through piece.
    Lr,
    Tr,
    Tl,
    Dr,
    Dl,
}

impl TrailShape {
    /// The tilesheet token for this shape.
    pub fn asset(self) -> TileAsset {
        match self {
            TrailShape::Td => TileAsset::RootsTd,
            TrailShape::Lr => TileAsset::RootsLr,
            TrailShape::Tr => TileAsset::RootsTr,
            TrailShape::Tl => TileAsset::RootsTl,
            TrailShape::Dr => TileAsset::RootsDr,
            TrailShape::Dl => TileAsset::RootsDl,
        }
    }
}

/// Resolve the connector for a vacated cell.
///
/// `entered_from` is the edge recorded when the root entered the cell;
/// `moving` is the geometric direction toward the neighbor the root is
/// leaving for. The four (entered_from, moving) pairs where the root would
/// exit through its entry edge cannot occur -- a root never reverses.
pub fn connector(entered_from: Direction, moving: Direction) -> TrailShape {
    match (moving, entered_from) {
        (Direction::South, Direction::North) => TrailShape::Td,
        (Direction::South, Direction::East) => TrailShape::Dl,
        (Direction::South, Direction::West) => TrailShape::Dr,

        (Direction::North, Direction::South) => TrailShape::Td,
        (Direction::North, Direction::East) => TrailShape::Tr,
        (Direction::North, Direction::West) => TrailShape::Tl,

        (Direction::East, Direction::North) => TrailShape::Dr,
        (Direction::East, Direction::South) => TrailShape::Tr,
        (Direction::East, Direction::West) => TrailShape::Lr,

        (Direction::West, Direction::North) => TrailShape::Dl,
        (Direction::West, Direction::South) => TrailShape::Tl,
        (Direction::West, Direction::East) => TrailShape::Lr,

        _ => unreachable!("trail exits through its entry edge"),
    }
}

/// The edge a move from `from` to `to` enters the destination through:
/// the reverse of the travel direction. The two cells must be adjacent
/// along exactly one axis.
pub fn entry_edge(from: Coord, to: Coord) -> Direction {
    debug_assert_eq!(
        (to.x - from.x).abs() + (to.y - from.y).abs(),
        1,
        "move from {from} to {to} is not a unit step"
    );
    if to.y > from.y {
        Direction::North
    } else if to.y < from.y {
        Direction::South
    } else if to.x > from.x {
        Direction::West
    } else {
        Direction::East
    }
}

/// The contents value recorded at the destination of a move.
pub fn entry_contents(from: Coord, to: Coord) -> Contents {
    Contents::entered_from(entry_edge(from, to))
}
