//! Turn preferences: how a root reacts to the kind of tile ahead.
//!
//! The table is configuration, not per-agent state. It may be swapped
//! between runs but is read-only while the engine is ticking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tile::BehaviorKind;

/// A turn preference relative to the current heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Left,
    Ahead,
    Right,
}

impl Turn {
    /// Signed ordinal offset applied to a heading: left = -1, ahead = 0,
    /// right = +1.
    pub fn offset(self) -> i8 {
        match self {
            Turn::Left => -1,
            Turn::Ahead => 0,
            Turn::Right => 1,
        }
    }
}

/// Maps each tile behavior kind to the turn a root takes when it is about
/// to enter ground of that kind. A kind absent from the table means
/// "no declared preference" and resolves to [`Turn::Ahead`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorTable {
    prefs: BTreeMap<BehaviorKind, Turn>,
}

impl BehaviorTable {
    /// An empty table: every kind resolves to ahead.
    pub fn empty() -> Self {
        Self {
            prefs: BTreeMap::new(),
        }
    }

    /// The standard policy: plain ground and water are crossed straight,
    /// trees deflect left, rocks deflect right, and existing trails
    /// deflect left.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.set(BehaviorKind::Grass, Turn::Ahead);
        table.set(BehaviorKind::Soil, Turn::Ahead);
        table.set(BehaviorKind::Sand, Turn::Ahead);
        table.set(BehaviorKind::Water, Turn::Ahead);
        table.set(BehaviorKind::Tree, Turn::Left);
        table.set(BehaviorKind::Rock, Turn::Right);
        table.set(BehaviorKind::Roots, Turn::Left);
        table
    }

    /// Set the preference for one kind.
    pub fn set(&mut self, kind: BehaviorKind, turn: Turn) {
        self.prefs.insert(kind, turn);
    }

    /// Look up the preference for a kind. A miss is [`Turn::Ahead`].
    pub fn turn_for(&self, kind: BehaviorKind) -> Turn {
        self.prefs.get(&kind).copied().unwrap_or(Turn::Ahead)
    }
}

impl Default for BehaviorTable {
    fn default() -> Self {
        Self::standard()
    }
}
