//! End-to-end scenarios for the two-phase turn model: arrivals, behavior
//! deflection, contested claims, trail blocking, and malformed levels.

use taproot_core::behavior::{BehaviorTable, Turn};
use taproot_core::coord::Coord;
use taproot_core::direction::Direction;
use taproot_core::engine::{Engine, RunConfig, TickPhase};
use taproot_core::event::Event;
use taproot_core::grid::MalformedLevel;
use taproot_core::root::RootId;
use taproot_core::test_utils::{engine_from_sketch, layers_from_sketch, run_to_end, step_move};
use taproot_core::tile::{BehaviorKind, Contents, TileAsset};

fn config_with(behavior: BehaviorTable) -> RunConfig {
    RunConfig {
        behavior,
        ..RunConfig::default()
    }
}

// ===========================================================================
// Straight to water
// ===========================================================================

#[test]
fn root_one_cell_from_water_arrives_in_two_ticks() {
    let mut engine = engine_from_sketch("> w", RunConfig::default());

    let plan = engine.step();
    assert_eq!(plan.phase, TickPhase::Plan);
    assert!(plan.events.is_empty());
    let planned = engine.root_snapshots().into_iter().next().unwrap();
    assert_eq!(planned.pending_to, Some(Coord::new(1, 0)));

    let commit = engine.step();
    assert_eq!(commit.phase, TickPhase::Commit);

    // The arrival retires the root in the same commit, so the water cell
    // is observed through the move event.
    assert!(commit.events.iter().any(|e| matches!(
        e,
        Event::RootAdvanced {
            root: RootId(0),
            to: Coord { x: 1, y: 0 },
            ..
        }
    )));
    assert_eq!(engine.arrived_count(), 1);
    assert!(engine.root_snapshots().is_empty());
    assert!(commit.events.iter().any(|e| matches!(
        e,
        Event::RootArrived {
            root: RootId(0),
            ..
        }
    )));
    assert!(commit.events.iter().any(|e| matches!(
        e,
        Event::SimulationEnded {
            success_count: 1,
            total_roots: 1,
            ..
        }
    )));
}

#[test]
fn arrival_updates_the_high_score_across_runs() {
    let mut engine = engine_from_sketch("> w", RunConfig::default());
    run_to_end(&mut engine, 4);
    assert_eq!(engine.high_score(), 1);

    // A rerun that strands everything keeps the old best.
    let (terrain, contents) = layers_from_sketch(
        "R R R
         R > R
         R R R",
    );
    engine.load_level(&terrain, &contents, 1).unwrap();
    assert_eq!(engine.arrived_count(), 0);
    run_to_end(&mut engine, 4);
    assert_eq!(engine.arrived_count(), 0);
    assert_eq!(engine.high_score(), 1);
}

#[test]
fn commit_diffs_carry_connector_and_head_cap() {
    let mut engine = engine_from_sketch("> w", RunConfig::default());
    let (_, commit) = step_move(&mut engine);

    // Vacated stub (entered west, exiting east) becomes the horizontal
    // through piece; the freshly entered cell shows the west end cap.
    let vacated = commit
        .diffs
        .iter()
        .find(|d| d.coord == Coord::new(0, 0))
        .unwrap();
    assert_eq!(vacated.foreground, Some(TileAsset::RootsLr));
    assert_eq!(vacated.background, None);

    let head = commit
        .diffs
        .iter()
        .find(|d| d.coord == Coord::new(1, 0))
        .unwrap();
    assert_eq!(head.foreground, Some(TileAsset::RootsLc));
}

// ===========================================================================
// Behavior deflection
// ===========================================================================

#[test]
fn rock_ahead_rotates_clockwise_once() {
    // Standard table: rock prefers right. The candidate recomputation
    // happens with the post-rotation heading.
    let mut engine = engine_from_sketch("> R", RunConfig::default());
    step_move(&mut engine);

    let root = engine.roots().next().unwrap();
    assert_eq!(root.direction(), Direction::South);
    assert_eq!(root.current(), Coord::new(0, 1));
}

#[test]
fn tree_ahead_deflects_left() {
    // Left from east is north; the stub sits one row down so north is
    // open.
    let mut engine = engine_from_sketch(
        ". .
         > T",
        RunConfig::default(),
    );
    step_move(&mut engine);

    let root = engine.roots().next().unwrap();
    assert_eq!(root.direction(), Direction::North);
    assert_eq!(root.current(), Coord::new(0, 0));
}

#[test]
fn table_misses_mean_ahead() {
    // An empty table: soil and water transitions all resolve to ahead.
    let mut engine = engine_from_sketch("> o o w", config_with(BehaviorTable::empty()));
    let events = run_to_end(&mut engine, 8);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RootArrived {
            root: RootId(0),
            ..
        }
    )));
    assert_eq!(engine.arrived_count(), 1);
}

#[test]
fn reevaluation_skipped_while_ground_stays_the_same() {
    // Grass all the way with a rock-averse table: the root still walks
    // straight east because no ground change ever re-consults the table.
    let mut table = BehaviorTable::empty();
    table.set(BehaviorKind::Grass, Turn::Right);
    let mut engine = engine_from_sketch("> . . .", config_with(table));

    for _ in 0..3 {
        step_move(&mut engine);
    }
    let root = engine.roots().next().unwrap();
    assert_eq!(root.current(), Coord::new(3, 0));
    assert_eq!(root.direction(), Direction::East);
}

// ===========================================================================
// Contested claims
// ===========================================================================

#[test]
fn contested_cell_goes_to_the_lower_id() {
    // Both roots resolve (1,1) in the same PLAN. Row-major spawn order
    // makes the southbound root id 0; it wins. The loser sees the claim
    // as an obstacle on unchanged ground, so nothing reroutes it.
    let mut engine = engine_from_sketch(
        ". v .
         > . .
         . . .",
        RunConfig::default(),
    );

    let plan = engine.step();
    let pending: Vec<_> = engine
        .root_snapshots()
        .into_iter()
        .map(|r| (r.id, r.pending_to))
        .collect();
    assert_eq!(pending[0], (RootId(0), Some(Coord::new(1, 1))));
    assert_eq!(pending[1], (RootId(1), None));
    assert!(plan.events.iter().any(|e| matches!(
        e,
        Event::RootStranded {
            root: RootId(1),
            ..
        }
    )));

    engine.step();
    let roots: Vec<_> = engine.root_snapshots();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, RootId(0));
    assert_eq!(roots[0].current, Coord::new(1, 1));
    assert_eq!(engine.stranded_count(), 1);
}

#[test]
fn contested_claim_loser_reroutes_within_its_budget() {
    // The southbound root (id 0, kept on soil) claims (0,1) without any
    // table lookup. The eastbound root's ground changes (grass -> sand),
    // so it re-steers left toward the claimed soil cell, finds it
    // blocked, deflects right off it per the soil preference, and lands
    // on the sand cell it originally faced.
    let (mut terrain, contents) = layers_from_sketch(
        "v .
         o .
         > s",
    );
    terrain[0][0] = 1; // stub starts on soil so no re-steer fires

    let mut table = BehaviorTable::standard();
    table.set(BehaviorKind::Sand, Turn::Left);
    table.set(BehaviorKind::Soil, Turn::Right);
    let mut engine = Engine::new(
        &terrain,
        &contents,
        RunConfig {
            behavior: table,
            ..RunConfig::default()
        },
    )
    .unwrap();

    let plan = engine.step();
    assert!(plan.events.is_empty(), "nobody strands: {:?}", plan.events);
    let pending: Vec<_> = engine
        .root_snapshots()
        .into_iter()
        .map(|r| (r.id, r.pending_to))
        .collect();
    assert_eq!(pending[0], (RootId(0), Some(Coord::new(0, 1))));
    assert_eq!(pending[1], (RootId(1), Some(Coord::new(1, 2))));

    engine.step();
    let roots = engine.root_snapshots();
    assert_eq!(roots[0].current, Coord::new(0, 1));
    assert_eq!(roots[1].current, Coord::new(1, 2));
    assert_eq!(roots[1].direction, Direction::East);
}

#[test]
fn no_two_roots_ever_share_a_pending_destination() {
    // Five roots converging on the same open middle; after every PLAN
    // the claimed destinations are pairwise distinct.
    let mut engine = engine_from_sketch(
        ". v . v .
         > . . . .
         . . . . .
         > . . . .
         . ^ . . .",
        RunConfig::default(),
    );

    let mut guard = 0;
    while !engine.is_ended() {
        let report = engine.step();
        if report.phase == TickPhase::Plan {
            let mut claimed: Vec<Coord> = engine
                .root_snapshots()
                .iter()
                .filter_map(|r| r.pending_to)
                .collect();
            claimed.sort();
            let before = claimed.len();
            claimed.dedup();
            assert_eq!(claimed.len(), before, "duplicate claim");
        }
        guard += 1;
        assert!(guard < 1000, "run did not end");
    }
}

// ===========================================================================
// Trail blocking and stranding
// ===========================================================================

#[test]
fn committed_trail_blocks_a_crossing_root_on_same_ground() {
    // Root 0 grows south down column 2 and walls it off; root 1 marches
    // east along row 4 and reaches water before the wall matters for
    // it. Root 0 then runs into root 1's trail on plain grass: no ground
    // change, no reroute, stranded.
    let mut engine = engine_from_sketch(
        ". . v .
         . . . .
         . . . .
         . . . .
         > . . w",
        RunConfig::default(),
    );

    let events = run_to_end(&mut engine, 20);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RootArrived {
            root: RootId(1),
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RootStranded {
            root: RootId(0),
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::SimulationEnded {
            success_count: 1,
            total_roots: 2,
            ..
        }
    )));
}

#[test]
fn fully_fenced_root_strands_on_its_first_plan() {
    let mut engine = engine_from_sketch(
        "R R R
         R > R
         R R R",
        RunConfig::default(),
    );

    let plan = engine.step();
    assert!(plan.events.iter().any(|e| matches!(
        e,
        Event::RootStranded {
            root: RootId(0),
            ..
        }
    )));
    assert_eq!(engine.active_count(), 0);

    engine.step();
    assert!(engine.is_ended());
    assert_eq!(engine.stranded_count(), 1);
    assert_eq!(engine.root_snapshots().len(), 0);
}

#[test]
fn stub_spawned_on_water_scores_immediately() {
    let (terrain, mut contents) = layers_from_sketch("w");
    contents[0][0] = 13;
    let mut engine = Engine::new(&terrain, &contents, RunConfig::default()).unwrap();

    let events = run_to_end(&mut engine, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::RootArrived {
            root: RootId(0),
            ..
        }
    )));
    assert_eq!(engine.arrived_count(), 1);
}

// ===========================================================================
// Malformed levels
// ===========================================================================

#[test]
fn mismatched_layer_rows_fail_construction() {
    let terrain = vec![vec![0; 16]; 10];
    let contents = vec![vec![-1; 16]; 9];
    let err = Engine::new(&terrain, &contents, RunConfig::default()).unwrap_err();
    assert!(matches!(err, MalformedLevel::LayerMismatch { .. }));
}

#[test]
fn level_files_reject_mismatched_layers_before_any_tick() {
    let terrain_csv = vec![vec!["0"; 16].join(","); 10].join("\\n");
    let contents_csv = vec![vec![""; 16].join(","); 9].join("\\n");
    let source = format!(
        "(name: \"broken\", tile_multiplier: 1, terrain: \"{terrain_csv}\", contents: \"{contents_csv}\")"
    );
    let level = taproot_level::parse_level(&source).unwrap();
    assert!(matches!(
        level.spawn(BehaviorTable::standard(), 0),
        Err(MalformedLevel::LayerMismatch { .. })
    ));
}

// ===========================================================================
// Trail shapes on the grid
// ===========================================================================

#[test]
fn corners_record_the_turn_geometry() {
    // East then south around a rock: the corner cell is entered from the
    // west and exited south, which draws the Dr elbow.
    let mut engine = engine_from_sketch(
        "> . R
         . . .",
        RunConfig::default(),
    );
    step_move(&mut engine); // (0,0) -> (1,0)
    step_move(&mut engine); // (1,0) -> (1,1), deflected right by the rock

    let corner = engine.grid().tile(Coord::new(1, 0));
    assert_eq!(corner.contents(), Contents::RootFromWest);
    assert_eq!(corner.foreground(), Some(TileAsset::RootsDr));

    let head = engine.grid().tile(Coord::new(1, 1));
    assert_eq!(head.contents(), Contents::RootFromNorth);
    assert_eq!(head.foreground(), Some(TileAsset::RootsTc));
}
