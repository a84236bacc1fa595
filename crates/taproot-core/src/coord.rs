//! Grid coordinates.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// A position on the tile grid. Compared by value, never mutated after
/// creation. Coordinates inside a built grid are non-negative; signed
/// components let a scan step off the edge and be rejected by bounds
/// checks instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one cell away along `direction`.
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}
