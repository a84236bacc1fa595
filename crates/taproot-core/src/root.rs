//! Root agents: the growing branches.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::coord::Coord;
use crate::direction::Direction;
use crate::tile::Tile;

new_key_type! {
    /// Storage key for a root in the engine's agent map.
    pub struct RootKey;
}

/// Stable identity of a root. Assigned sequentially in spawn order and
/// never reused; ascending id is the scheduler's tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RootId(pub u32);

impl std::fmt::Display for RootId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

/// Where a root is in its lifecycle. Flagged roots stay in the agent map
/// until the commit phase's bookkeeping removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootState {
    Growing,
    Stranded,
    Arrived,
}

/// A move resolved during PLAN, applied during COMMIT: the fully built
/// replacement tile for the destination plus the heading that reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    pub tile: Tile,
    pub direction: Direction,
}

/// One growing branch. Occupies exactly one cell; the cells behind it are
/// trail segments owned by the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    id: RootId,
    starting: Coord,
    previous: Coord,
    current: Coord,
    direction: Direction,
    pending: Option<PendingMove>,
    state: RootState,
}

impl Root {
    /// A freshly spawned root sitting on its stub cell.
    pub fn new(id: RootId, start: Coord, direction: Direction) -> Self {
        Self {
            id,
            starting: start,
            previous: start,
            current: start,
            direction,
            pending: None,
            state: RootState::Growing,
        }
    }

    pub fn id(&self) -> RootId {
        self.id
    }

    pub fn starting(&self) -> Coord {
        self.starting
    }

    pub fn previous(&self) -> Coord {
        self.previous
    }

    pub fn current(&self) -> Coord {
        self.current
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> RootState {
        self.state
    }

    /// The destination claimed for the next commit, if any.
    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub(crate) fn set_pending(&mut self, pending: PendingMove) {
        self.pending = Some(pending);
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingMove> {
        self.pending.take()
    }

    pub(crate) fn set_state(&mut self, state: RootState) {
        self.state = state;
    }

    /// Commit a move: the current cell becomes the previous one.
    pub(crate) fn advance(&mut self, to: Coord, direction: Direction) {
        self.previous = self.current;
        self.current = to;
        self.direction = direction;
    }
}
