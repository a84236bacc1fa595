//! Cardinal headings and turn arithmetic.
//!
//! Directions form a cyclic ordinal (north = 0, east = 1, south = 2,
//! west = 3); turning is addition mod 4. The grid's y axis grows
//! southward, matching row-major level layers.

use serde::{Deserialize, Serialize};

use crate::behavior::Turn;

/// A cardinal heading on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four headings in ordinal order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Ordinal index, 0..4.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Heading for an ordinal index (taken mod 4).
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index % 4)]
    }

    /// Apply a turn preference: left is one step counter-clockwise,
    /// right one step clockwise, ahead is the identity.
    pub fn turned(self, turn: Turn) -> Self {
        let index = i16::from(self.index()) + i16::from(turn.offset());
        Self::from_index(index.rem_euclid(4) as u8)
    }

    /// Rotate one step clockwise.
    pub fn rotated_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// The reverse heading.
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Unit displacement for one step along this heading.
    /// y grows southward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_arithmetic_wraps() {
        assert_eq!(Direction::North.turned(Turn::Left), Direction::West);
        assert_eq!(Direction::West.turned(Turn::Right), Direction::North);
        assert_eq!(Direction::South.turned(Turn::Ahead), Direction::South);
    }

    #[test]
    fn clockwise_cycle_returns_home() {
        let mut d = Direction::East;
        for _ in 0..4 {
            d = d.rotated_cw();
        }
        assert_eq!(d, Direction::East);
    }

    #[test]
    fn opposites() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::South.opposite(), Direction::North);
        assert_eq!(Direction::West.opposite(), Direction::East);
    }

    #[test]
    fn deltas_are_unit_steps() {
        for d in Direction::ALL {
            let (dx, dy) = d.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }
}
