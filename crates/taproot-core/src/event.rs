//! Typed event system with pre-allocated ring buffers.
//!
//! Events are emitted during the PLAN and COMMIT phases and delivered in
//! batch during the tick's bookkeeping step. Each event type has its own
//! [`EventBuffer`] ring buffer with a configurable capacity.
//!
//! # Subscribers
//!
//! Passive listeners only: read-only callbacks for audio, score displays,
//! and analytics. Collaborators that need the events by value read them
//! from the tick report instead.
//!
//! # Suppression
//!
//! Event types can be suppressed via [`EventBus::suppress`], which
//! prevents any recording or delivery for that type.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::root::RootId;
use crate::tile::Terrain;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the turn counter at which they
/// occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A root committed a move onto a new cell. The terrain is what the
    /// audio collaborator keys its step sounds from.
    RootAdvanced {
        root: RootId,
        to: Coord,
        terrain: Terrain,
        turn: u64,
    },

    /// A root reached water.
    RootArrived { root: RootId, turn: u64 },

    /// A root found no legal move in any of its four rotations.
    RootStranded { root: RootId, turn: u64 },

    /// The active set became empty; the run is over.
    SimulationEnded {
        success_count: u32,
        total_roots: u32,
        turn: u64,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RootAdvanced,
    RootArrived,
    RootStranded,
    SimulationEnded,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 4;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::RootAdvanced { .. } => EventKind::RootAdvanced,
            Event::RootArrived { .. } => EventKind::RootArrived,
            Event::RootStranded { .. } => EventKind::RootStranded,
            Event::SimulationEnded { .. } => EventKind::SimulationEnded,
        }
    }

    /// The turn counter stamped on this event.
    pub fn turn(&self) -> u64 {
        match self {
            Event::RootAdvanced { turn, .. }
            | Event::RootArrived { turn, .. }
            | Event::RootStranded { turn, .. }
            | Event::SimulationEnded { turn, .. } => *turn,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer -- pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of events currently stored.
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
}

impl EventBuffer {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total events written since creation (including dropped).
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of events dropped because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.len as u64)
    }

    /// Iterate over events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head points at the next write slot, which is the oldest entry
            self.head
        };
        (0..self.len).filter_map(move |offset| {
            self.events[(start + offset) % self.capacity()].as_ref()
        })
    }

    /// Clear all events.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener receives delivered events read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Per-kind buffered event delivery with passive listeners.
pub struct EventBus {
    default_capacity: usize,
    buffers: Vec<Option<EventBuffer>>,
    listeners: Vec<Vec<Listener>>,
    suppressed: [bool; EVENT_KIND_COUNT],
}

impl EventBus {
    /// Create a bus whose per-kind buffers hold `default_capacity` events.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            default_capacity,
            buffers: (0..EVENT_KIND_COUNT).map(|_| None).collect(),
            listeners: (0..EVENT_KIND_COUNT).map(|_| Vec::new()).collect(),
            suppressed: [false; EVENT_KIND_COUNT],
        }
    }

    /// Suppress an event kind: no recording, no delivery.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Record an event for delivery at the next [`EventBus::deliver`].
    pub fn emit(&mut self, event: Event) {
        let index = event.kind().index();
        if self.suppressed[index] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[index]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a passive listener for one event kind.
    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.listeners[kind.index()].push(listener);
    }

    /// Deliver every buffered event to its kind's listeners, oldest first,
    /// then clear the buffers.
    pub fn deliver(&mut self) {
        for index in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[index].as_mut() else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }
            for event in buffer.iter() {
                for listener in &mut self.listeners[index] {
                    listener(event);
                }
            }
            buffer.clear();
        }
    }

    /// Events currently buffered for a kind (not yet delivered).
    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("default_capacity", &self.default_capacity)
            .field(
                "listener_counts",
                &self.listeners.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .field("suppressed", &self.suppressed)
            .finish()
    }
}
