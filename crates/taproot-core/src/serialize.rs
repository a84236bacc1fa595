//! Versioned snapshot codec for a run in progress.
//!
//! Encodes the engine's behavioral state (grid, agents, counters, RNG)
//! with `bitcode` behind a small magic + version header, so a host can
//! capture a run between ticks and restore it later in the same session.
//! Event listeners are not part of a snapshot; a restored engine starts
//! with a fresh [`EventBus`].
//!
//! The format is versioned for forward evolution: a decoder seeing a
//! version it does not understand refuses rather than misreading.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::behavior::BehaviorTable;
use crate::engine::Engine;
use crate::event::EventBus;
use crate::grid::Grid;
use crate::rng::SimRng;
use crate::root::Root;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Leading bytes of every snapshot.
const MAGIC: [u8; 4] = *b"TPRT";

/// Errors raised by snapshot encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The buffer does not start with the snapshot magic.
    #[error("not a snapshot: bad magic")]
    BadMagic,

    /// The buffer is shorter than the fixed header.
    #[error("snapshot truncated: {len} bytes")]
    Truncated { len: usize },

    /// The snapshot was written by an unknown format version.
    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    /// Payload (de)serialization failed.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bitcode::Error),
}

/// The serialized body. Roots are stored in schedule (ascending id)
/// order; the slot keys themselves are rebuilt on restore.
#[derive(Serialize, Deserialize)]
struct SnapshotPayload {
    turn: u64,
    ended: bool,
    spawned: u32,
    arrived: u32,
    stranded: u32,
    high_score: u32,
    grid: Grid,
    roots: Vec<Root>,
    behavior: BehaviorTable,
    rng: SimRng,
}

impl Engine {
    /// Encode the current behavioral state.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        let payload = SnapshotPayload {
            turn: self.turn,
            ended: self.ended,
            spawned: self.spawned,
            arrived: self.arrived,
            stranded: self.stranded,
            high_score: self.high_score,
            grid: self.grid.clone(),
            roots: self.roots().cloned().collect(),
            behavior: self.behavior.clone(),
            rng: self.rng.clone(),
        };
        let body = bitcode::serialize(&payload)?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + 2 + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Restore an engine from [`Engine::snapshot`] bytes.
    pub fn restore(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < MAGIC.len() + 2 {
            return Err(SnapshotError::Truncated { len: bytes.len() });
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: version,
                supported: SNAPSHOT_VERSION,
            });
        }
        let payload: SnapshotPayload = bitcode::deserialize(&bytes[MAGIC.len() + 2..])?;

        let mut roots = SlotMap::with_key();
        let mut schedule = Vec::with_capacity(payload.roots.len());
        for root in payload.roots {
            schedule.push(roots.insert(root));
        }

        Ok(Engine {
            grid: payload.grid,
            behavior: payload.behavior,
            roots,
            schedule,
            turn: payload.turn,
            ended: payload.ended,
            spawned: payload.spawned,
            arrived: payload.arrived,
            stranded: payload.stranded,
            high_score: payload.high_score,
            rng: payload.rng,
            event_bus: EventBus::default(),
            tick_events: Vec::new(),
            diffs: Vec::new(),
        })
    }
}
