//! The simulation engine: owns the grid and the root agents and
//! orchestrates the two-phase tick.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A [`Grid`] of tiles (single writer: the scheduler)
//! - The root agents, keyed by [`RootKey`], plus a schedule in ascending
//!   id order (the tie-break order)
//! - The [`BehaviorTable`] (read-only while ticking)
//! - Run counters (spawned / arrived / stranded) and the cross-run high
//!   score
//! - An [`EventBus`] for typed simulation events
//!
//! # Two-Phase Tick
//!
//! The turn counter increments on every call to [`Engine::step`]. Even
//! turns run **PLAN**: every active root resolves a candidate next cell
//! against the pre-tick grid and claims it by flipping the destination's
//! obstacle flag, so later roots in the same phase see the cell as
//! blocked. Odd turns run **COMMIT**: every claimed move is applied --
//! the destination slot is overwritten with the replacement trail tile,
//! the vacated cell's foreground becomes the connector shape for its two
//! edges, and arrivals/strandings are retired from the schedule. No
//! root's commit can ever observe another root's half-applied move.
//!
//! Tick cadence belongs to the caller; the engine knows nothing about
//! wall-clock time.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::behavior::BehaviorTable;
use crate::coord::Coord;
use crate::direction::Direction;
use crate::event::{Event, EventBus};
use crate::grid::{Grid, MalformedLevel, RootSeed};
use crate::query::{RootSnapshot, TileDiff, TileSnapshot};
use crate::rng::SimRng;
use crate::root::{PendingMove, Root, RootId, RootKey, RootState};
use crate::tile::{Terrain, Tile};
use crate::trail;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Parameters for one run. The behavior table and seed are fixed for the
/// run's duration; the multiplier scales the grid to 16m x 9m.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub tile_multiplier: u32,
    pub behavior: BehaviorTable,
    /// Seed for cosmetic variant picks. Two runs with the same layers and
    /// seed render identically; behavior never depends on it.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tile_multiplier: 1,
            behavior: BehaviorTable::standard(),
            seed: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick reporting
// ---------------------------------------------------------------------------

/// Which half of the move cycle a tick executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickPhase {
    Plan,
    Commit,
}

/// What one tick did: the presentation diffs for the rendering
/// collaborator and the tick's events by value. The same events also go
/// through the engine's [`EventBus`].
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Turn counter value of the executed tick.
    pub turn: u64,
    pub phase: TickPhase,
    pub diffs: Vec<TileDiff>,
    pub events: Vec<Event>,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for divergence checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
/// Cosmetic asset picks are excluded, so two runs that differ only in
/// their variant seed hash alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine. See the module docs for the tick model.
#[derive(Debug)]
pub struct Engine {
    pub(crate) grid: Grid,
    pub(crate) behavior: BehaviorTable,
    pub(crate) roots: SlotMap<RootKey, Root>,
    /// Agent keys in ascending id order; the PLAN/COMMIT iteration order.
    pub(crate) schedule: Vec<RootKey>,
    pub(crate) turn: u64,
    pub(crate) ended: bool,
    pub(crate) spawned: u32,
    pub(crate) arrived: u32,
    pub(crate) stranded: u32,
    /// Best arrival count across runs on this engine.
    pub(crate) high_score: u32,
    pub(crate) rng: SimRng,

    /// Typed event bus for simulation events.
    pub event_bus: EventBus,

    pub(crate) tick_events: Vec<Event>,
    pub(crate) diffs: Vec<TileDiff>,
}

impl Engine {
    /// Build an engine for one run from the two level layers.
    ///
    /// Fails with [`MalformedLevel`] before any state is exposed; a root
    /// agent is spawned for every trail stub in the contents layer, ids
    /// assigned in row-major scan order.
    pub fn new(
        terrain: &[Vec<i32>],
        contents: &[Vec<i32>],
        config: RunConfig,
    ) -> Result<Self, MalformedLevel> {
        let RunConfig {
            tile_multiplier,
            behavior,
            seed,
        } = config;
        let mut rng = SimRng::new(seed);
        let build = Grid::from_layers(terrain, contents, tile_multiplier, &mut rng)?;
        let mut engine = Self {
            grid: build.grid,
            behavior,
            roots: SlotMap::with_key(),
            schedule: Vec::new(),
            turn: 0,
            ended: false,
            spawned: 0,
            arrived: 0,
            stranded: 0,
            high_score: 0,
            rng,
            event_bus: EventBus::default(),
            tick_events: Vec::new(),
            diffs: Vec::new(),
        };
        engine.spawn_seeds(&build.seeds);
        Ok(engine)
    }

    /// Start a new run on this engine: fresh grid, fresh agents, run
    /// counters reset. The high score, behavior table, listeners, and
    /// cosmetic RNG stream carry over. On error the previous run's state
    /// is left untouched apart from the RNG stream.
    pub fn load_level(
        &mut self,
        terrain: &[Vec<i32>],
        contents: &[Vec<i32>],
        tile_multiplier: u32,
    ) -> Result<(), MalformedLevel> {
        let build = Grid::from_layers(terrain, contents, tile_multiplier, &mut self.rng)?;
        self.grid = build.grid;
        self.roots.clear();
        self.schedule.clear();
        self.turn = 0;
        self.ended = false;
        self.spawned = 0;
        self.arrived = 0;
        self.stranded = 0;
        self.tick_events.clear();
        self.diffs.clear();
        self.spawn_seeds(&build.seeds);
        Ok(())
    }

    /// Swap the behavior table. Configuration for the *next* run; calling
    /// this mid-run changes subsequent lookups and forfeits determinism
    /// against a run that never did.
    pub fn set_behavior(&mut self, table: BehaviorTable) {
        self.behavior = table;
    }

    fn spawn_seeds(&mut self, seeds: &[RootSeed]) {
        for seed in seeds {
            let id = RootId(self.spawned);
            let key = self.roots.insert(Root::new(id, seed.coord, seed.direction));
            self.schedule.push(key);
            self.spawned += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn behavior(&self) -> &BehaviorTable {
        &self.behavior
    }

    /// The turn counter: number of ticks executed so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// The phase the next [`Engine::step`] call will run.
    pub fn next_phase(&self) -> TickPhase {
        if self.turn % 2 == 0 {
            TickPhase::Plan
        } else {
            TickPhase::Commit
        }
    }

    /// Whether the active set has emptied and the run is over.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn spawned_count(&self) -> u32 {
        self.spawned
    }

    pub fn arrived_count(&self) -> u32 {
        self.arrived
    }

    pub fn stranded_count(&self) -> u32 {
        self.stranded
    }

    /// Roots still growing (flagged roots are excluded even before the
    /// commit bookkeeping physically removes them).
    pub fn active_count(&self) -> u32 {
        self.schedule
            .iter()
            .filter(|&&key| self.roots[key].state() == RootState::Growing)
            .count() as u32
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Iterate the remaining agents in schedule (ascending id) order.
    pub fn roots(&self) -> impl Iterator<Item = &Root> {
        self.schedule.iter().map(|&key| &self.roots[key])
    }

    /// Owned views of every tile, row-major.
    pub fn tile_snapshots(&self) -> Vec<TileSnapshot> {
        self.grid.iter().map(TileSnapshot::from).collect()
    }

    /// Owned views of the remaining agents.
    pub fn root_snapshots(&self) -> Vec<RootSnapshot> {
        self.roots().map(RootSnapshot::from).collect()
    }

    /// Deterministic digest of behavioral state. Two engines fed the same
    /// layers, table, and tick count agree here regardless of cosmetic
    /// seeds.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_u32(self.grid.width());
        hash.write_u32(self.grid.height());
        for tile in self.grid.iter() {
            hash.write_u8(tile.terrain() as u8);
            hash.write_u8(tile.contents() as u8);
            hash.write_u8(tile.is_obstacle() as u8);
        }
        for root in self.roots() {
            hash.write_u32(root.id().0);
            hash.write_u32(root.current().x as u32);
            hash.write_u32(root.current().y as u32);
            hash.write_u8(root.direction().index());
        }
        hash.write_u64(self.turn);
        hash.write_u32(self.spawned);
        hash.write_u32(self.arrived);
        hash.write_u32(self.stranded);
        hash.finish()
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one tick. Alternates PLAN and COMMIT on the turn counter;
    /// a step after the run has ended is a no-op that reports nothing and
    /// leaves the counter alone.
    pub fn step(&mut self) -> TickReport {
        let phase = self.next_phase();
        if self.ended {
            return TickReport {
                turn: self.turn,
                phase,
                diffs: Vec::new(),
                events: Vec::new(),
            };
        }

        self.diffs.clear();
        self.tick_events.clear();
        match phase {
            TickPhase::Plan => self.phase_plan(),
            TickPhase::Commit => self.phase_commit(),
        }

        let turn = self.turn;
        self.turn += 1;
        self.event_bus.deliver();
        TickReport {
            turn,
            phase,
            diffs: std::mem::take(&mut self.diffs),
            events: std::mem::take(&mut self.tick_events),
        }
    }

    // -----------------------------------------------------------------------
    // PLAN
    // -----------------------------------------------------------------------

    fn phase_plan(&mut self) {
        for i in 0..self.schedule.len() {
            let key = self.schedule[i];
            self.plan_root(key);
        }
    }

    fn plan_root(&mut self, key: RootKey) {
        let root = &self.roots[key];
        if root.state() != RootState::Growing {
            return;
        }
        let current = root.current();
        let heading = root.direction();

        let current_tile = self.grid.tile(current);
        if current_tile.terrain() == Terrain::Water {
            // On the sink already (a stub can spawn there): score it and
            // let the commit bookkeeping retire it.
            self.arrive(key);
            return;
        }
        let current_ground = current_tile.ground_kind();

        // First scan: where does the current heading lead, obstacles
        // ignored. Only an off-grid heading rotates here.
        let Some((ahead, ahead_heading)) = self.scan_any(current, heading) else {
            self.strand(key);
            return;
        };

        let ahead_tile = self.grid.tile(ahead);
        let (dest, dest_heading) = if ahead_tile.ground_kind() != current_ground {
            // The ground changes: consult the table once for the new
            // heading, then rescan with obstacle avoidance.
            let turn = self.behavior.turn_for(ahead_tile.behavior_kind());
            let rerouted = heading.turned(turn);
            match self.scan_open(current, rerouted) {
                Some(found) => found,
                None => {
                    self.strand(key);
                    return;
                }
            }
        } else if ahead_tile.is_obstacle() {
            // Same ground but occupied (a trail segment, or a cell claimed
            // earlier this phase): nothing triggers a reroute.
            self.strand(key);
            return;
        } else {
            (ahead, ahead_heading)
        };

        // Claim the destination: build the replacement tile now and flip
        // the obstacle flag on the live cell so later ids this phase see
        // the cell as taken. The grid slot itself is written at commit.
        let dest_tile = self.grid.tile(dest);
        let entered = trail::entry_edge(current, dest);
        let pending_tile = Tile::trail(dest, dest_tile.terrain(), entered, dest_tile.background());
        self.grid.set_obstacle(dest, true);
        self.roots[key].set_pending(PendingMove {
            tile: pending_tile,
            direction: dest_heading,
        });
    }

    /// Nearest in-bounds cell from `from`, starting at `heading` and
    /// rotating clockwise when a heading points off-grid. No obstacle
    /// avoidance. Bounded to the four rotations.
    fn scan_any(&self, from: Coord, heading: Direction) -> Option<(Coord, Direction)> {
        let mut d = heading;
        for _ in 0..4 {
            let c = from.stepped(d);
            if self.grid.contains(c) {
                return Some((c, d));
            }
            d = d.rotated_cw();
        }
        None
    }

    /// Obstacle-aware scan. A blocked in-bounds target deflects the
    /// heading by that target's own table preference (a trail deflects a
    /// crossing root the same way it would mid-route); an off-grid
    /// heading rotates clockwise. Bounded to four attempts, so a
    /// preference of ahead against a blocked cell burns the budget and
    /// strands rather than spinning.
    fn scan_open(&self, from: Coord, heading: Direction) -> Option<(Coord, Direction)> {
        let mut d = heading;
        for _ in 0..4 {
            let c = from.stepped(d);
            match self.grid.get(c) {
                Some(tile) if !tile.is_obstacle() => return Some((c, d)),
                Some(tile) => d = d.turned(self.behavior.turn_for(tile.behavior_kind())),
                None => d = d.rotated_cw(),
            }
        }
        None
    }

    fn strand(&mut self, key: RootKey) {
        let root = &mut self.roots[key];
        root.set_state(RootState::Stranded);
        let id = root.id();
        self.stranded += 1;
        self.emit(Event::RootStranded {
            root: id,
            turn: self.turn,
        });
    }

    fn arrive(&mut self, key: RootKey) {
        let root = &mut self.roots[key];
        root.set_state(RootState::Arrived);
        let id = root.id();
        self.arrived += 1;
        if self.arrived > self.high_score {
            self.high_score = self.arrived;
        }
        self.emit(Event::RootArrived {
            root: id,
            turn: self.turn,
        });
    }

    // -----------------------------------------------------------------------
    // COMMIT
    // -----------------------------------------------------------------------

    fn phase_commit(&mut self) {
        for i in 0..self.schedule.len() {
            let key = self.schedule[i];
            self.commit_root(key);
        }
        self.retire_flagged();
    }

    fn commit_root(&mut self, key: RootKey) {
        let Some(pending) = self.roots[key].take_pending() else {
            return;
        };
        let (id, from) = {
            let root = &self.roots[key];
            (root.id(), root.current())
        };
        let to = pending.tile.coord();
        let moving = pending.direction;

        // The vacated cell's trail gains its exit edge: swap in the same
        // tile with the connector foreground.
        let vacated = self.grid.tile(from).clone();
        let entered = match vacated.contents().entry_edge() {
            Some(edge) => edge,
            None => unreachable!("a moving root always stands on a trail segment"),
        };
        let connector_asset = trail::connector(entered, moving).asset();
        self.grid.replace(vacated.with_foreground(connector_asset));
        self.diffs.push(TileDiff {
            coord: from,
            background: None,
            foreground: Some(connector_asset),
        });

        // Destination: the replacement tile built at claim time.
        let terrain = pending.tile.terrain();
        let head_asset = pending.tile.foreground();
        self.grid.replace(pending.tile);
        self.diffs.push(TileDiff {
            coord: to,
            background: None,
            foreground: head_asset,
        });

        self.roots[key].advance(to, moving);
        self.emit(Event::RootAdvanced {
            root: id,
            to,
            terrain,
            turn: self.turn,
        });

        if terrain == Terrain::Water {
            self.arrive(key);
        }
    }

    /// Drop every root flagged this cycle; end the run when none remain.
    fn retire_flagged(&mut self) {
        let roots = &mut self.roots;
        self.schedule.retain(|&key| {
            if roots[key].state() == RootState::Growing {
                true
            } else {
                roots.remove(key);
                false
            }
        });
        if self.schedule.is_empty() && !self.ended {
            self.ended = true;
            self.emit(Event::SimulationEnded {
                success_count: self.arrived,
                total_roots: self.spawned,
                turn: self.turn,
            });
        }
    }

    fn emit(&mut self, event: Event) {
        self.tick_events.push(event.clone());
        self.event_bus.emit(event);
    }
}
