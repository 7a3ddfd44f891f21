//! Placement engine - tile geometry, overlap and the bounds state machine
//!
//! The engine owns the ring of tile slots, the current bounds and the moving
//! tile. Each tick [`PlacementEngine::advance`] swings the active tile along
//! its free axis; [`PlacementEngine::attempt_place`] commits it against the
//! tile below.
//!
//! # State machine
//!
//! ```text
//! Moving --attempt_place--> Locked --spawn--> Moving
//!    \
//!     `--bound <= 0--> GameOver (until reset)
//! ```
//!
//! # Placement rules
//!
//! With `delta = last_anchor[axis] - active[axis]`:
//!
//! - `|delta| <= error_margin`: perfect. The tile snaps onto the previous
//!   anchor, combo grows, bounds are untouched (or regrow, if enabled).
//! - otherwise the bound on `axis` shrinks by `|delta|`. A bound at or below
//!   zero ends the run. A surviving tile is trimmed to the overlap and the
//!   overhang is handed to the fragment pool.
//!
//! Every committed anchor is rounded to `snap_decimals` so drift cannot
//! accumulate over hundreds of layers.

use arrayvec::ArrayVec;

use crate::config::StackConfig;
use crate::pool::{FragmentHandle, FragmentPool};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// The active tile is swinging and can be placed.
    Moving,
    /// A placement is being committed.
    Locked,
    /// Terminal until [`PlacementEngine::reset`].
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Perfect,
    /// Misaligned; `cut` was removed from the constrained axis.
    Trimmed { cut: f32 },
}

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementReport {
    pub alignment: Alignment,
    /// Axis the committed tile was constrained on.
    pub axis: MoveAxis,
    /// The committed tile.
    pub placed: Tile,
    pub score: u32,
    pub combo: u32,
    pub bounds: Extent,
    /// Cut-off piece, if the pool had one to give.
    pub fragment: Option<FragmentHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureReason {
    /// The constrained bound would have dropped to `remaining` (<= 0).
    BoundsExhausted { axis: MoveAxis, remaining: f32 },
    /// Non-finite input or result; treated like an exhausted bound.
    DegenerateGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// Inside the debounce window after the previous placement.
    Cooldown,
    /// The engine is not in [`EngineState::Moving`].
    NotMoving,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceOutcome {
    Placed(PlacementReport),
    Ignored(IgnoreReason),
    GameOver(FailureReason),
}

impl PlaceOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlaceOutcome::Placed(_))
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, PlaceOutcome::GameOver(_))
    }
}

/// Round `value` to `decimals` digits.
pub fn snap(value: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (value * scale).round() / scale
}

#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: StackConfig,
    tiles: ArrayVec<Tile, MAX_STACK_DEPTH>,
    active_slot: usize,
    bounds: Extent,
    axis: MoveAxis,
    last_anchor: Point2,
    /// Fixed coordinate on the axis constrained by the previous placement.
    secondary: f32,
    /// Oscillation angle; keeps running across tiles.
    phase: f32,
    score: u32,
    combo: u32,
    state: EngineState,
}

impl PlacementEngine {
    /// Build an engine in the starting layout.
    ///
    /// `config` is expected to have passed [`StackConfig::validate`]; the
    /// ring depth is clamped to `1..=MAX_STACK_DEPTH` regardless.
    pub fn new(config: StackConfig) -> Self {
        let mut engine = Self {
            config,
            tiles: ArrayVec::new(),
            active_slot: 0,
            bounds: Extent::square(config.bounds_size),
            axis: config.initial_axis,
            last_anchor: Point2::ORIGIN,
            secondary: 0.0,
            phase: 0.0,
            score: 0,
            combo: 0,
            state: EngineState::Moving,
        };
        engine.reset();
        engine
    }

    /// Return to the starting layout: full bounds, zero score, every slot
    /// stacked under the first active tile.
    ///
    /// The active tile (layer 0) takes the last slot and slot `i` below it
    /// holds layer `-(i + 1)`, so counting the active slot down always lands
    /// on the lowest layer in the ring.
    pub fn reset(&mut self) {
        let depth = self.config.stack_depth.clamp(1, MAX_STACK_DEPTH);
        let full = Extent::square(self.config.bounds_size);

        self.tiles.clear();
        for slot in 0..depth {
            let layer = if slot + 1 == depth { 0 } else { -(slot as i32 + 1) };
            self.tiles.push(Tile::new(layer, full, self.config.initial_axis));
        }

        self.active_slot = depth - 1;
        self.bounds = full;
        self.axis = self.config.initial_axis;
        self.last_anchor = Point2::ORIGIN;
        self.secondary = 0.0;
        self.phase = 0.0;
        self.score = 0;
        self.combo = 0;
        self.state = EngineState::Moving;
    }

    /// Swing the active tile. No-op unless moving.
    pub fn advance(&mut self, dt_secs: f32) {
        if self.state != EngineState::Moving || !dt_secs.is_finite() || dt_secs < 0.0 {
            return;
        }
        self.phase = (self.phase + dt_secs * self.config.tile_speed) % std::f32::consts::TAU;
        let offset = self.phase.sin() * self.config.swing_amplitude();
        self.place_active_at(offset);
    }

    /// Put the active tile at `offset` on its free axis without moving the
    /// oscillation clock. Used by scripted drivers and replays.
    pub fn seek_active(&mut self, offset: f32) -> bool {
        if self.state != EngineState::Moving || !offset.is_finite() {
            return false;
        }
        self.place_active_at(offset);
        true
    }

    fn place_active_at(&mut self, offset: f32) {
        let axis = self.axis;
        let secondary = self.secondary;
        let tile = &mut self.tiles[self.active_slot];
        tile.anchor.set(axis, offset);
        tile.anchor.set(axis.other(), secondary);
    }

    /// Commit the active tile against the previous one.
    pub fn attempt_place(&mut self, pool: &mut FragmentPool) -> PlaceOutcome {
        if self.state != EngineState::Moving {
            return PlaceOutcome::Ignored(IgnoreReason::NotMoving);
        }

        let axis = self.axis;
        let decimals = self.config.snap_decimals;
        let active = self.tiles[self.active_slot];
        let position = active.anchor.get(axis);
        let reference = self.last_anchor.get(axis);
        let delta = reference - position;

        if !delta.is_finite() {
            return self.fail(FailureReason::DegenerateGeometry);
        }

        let mut committed = active;
        committed.occupied_axis = axis;
        let mut fragment = None;

        let alignment = if delta.abs() <= self.config.error_margin {
            if self.config.bounds_regrowth && self.combo as f32 > self.config.combo_start_gain {
                let grown = (self.bounds.get(axis) + self.config.stack_bounds_gain)
                    .min(self.config.bounds_size);
                self.bounds.set(axis, grown);
                committed.extent.set(axis, grown);
            }
            self.combo += 1;
            committed.anchor = Point2::new(
                snap(self.last_anchor.x, decimals),
                snap(self.last_anchor.z, decimals),
            );
            Alignment::Perfect
        } else {
            self.combo = 0;
            let cut = delta.abs();
            let remaining = self.bounds.get(axis) - cut;

            if !remaining.is_finite() {
                return self.fail(FailureReason::DegenerateGeometry);
            }
            if remaining <= 0.0 {
                return self.fail(FailureReason::BoundsExhausted { axis, remaining });
            }

            let center = (reference + position) / 2.0;
            if !center.is_finite() {
                return self.fail(FailureReason::DegenerateGeometry);
            }

            self.bounds.set(axis, remaining);
            committed.extent.set(axis, remaining);

            // The overhang sits past the trimmed tile on the side it slid out to.
            let side = if position > reference { 1.0 } else { -1.0 };
            let mut piece_anchor = committed.anchor;
            piece_anchor.set(axis, position + side * remaining / 2.0);
            let mut piece_extent = committed.extent;
            piece_extent.set(axis, cut);
            fragment = pool.acquire(piece_anchor, committed.layer, piece_extent);

            committed.anchor.set(axis, snap(center, decimals));
            committed.anchor.set(axis.other(), snap(self.last_anchor.get(axis.other()), decimals));
            Alignment::Trimmed { cut }
        };

        if !committed.extent.is_positive() || !committed.anchor.is_finite() {
            if let Some(handle) = fragment {
                pool.release(handle);
            }
            return self.fail(FailureReason::DegenerateGeometry);
        }

        self.state = EngineState::Locked;
        self.tiles[self.active_slot] = committed;
        self.secondary = committed.anchor.get(axis);
        self.axis = axis.other();
        self.score += 1;
        self.spawn_next(committed.anchor);

        PlaceOutcome::Placed(PlacementReport {
            alignment,
            axis,
            placed: committed,
            score: self.score,
            combo: self.combo,
            bounds: self.bounds,
            fragment,
        })
    }

    fn fail(&mut self, reason: FailureReason) -> PlaceOutcome {
        self.state = EngineState::GameOver;
        PlaceOutcome::GameOver(reason)
    }

    /// Recycle the oldest slot as the next active tile.
    fn spawn_next(&mut self, committed_anchor: Point2) {
        debug_assert_eq!(self.state, EngineState::Locked);

        self.last_anchor = committed_anchor;
        self.active_slot = match self.active_slot {
            0 => self.tiles.len() - 1,
            n => n - 1,
        };
        self.tiles[self.active_slot] = Tile::new(self.score as i32, self.bounds, self.axis);
        self.state = EngineState::Moving;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == EngineState::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn bounds(&self) -> Extent {
        self.bounds
    }

    pub fn axis(&self) -> MoveAxis {
        self.axis
    }

    /// Anchor of the last committed tile; the alignment reference.
    pub fn last_anchor(&self) -> Point2 {
        self.last_anchor
    }

    /// Signed distance the active tile must still travel to align perfectly.
    pub fn active_delta(&self) -> f32 {
        self.last_anchor.get(self.axis) - self.active_tile().anchor.get(self.axis)
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn active_tile(&self) -> &Tile {
        &self.tiles[self.active_slot]
    }

    /// Every slot of the ring, in storage order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExhaustionPolicy;

    const EPS: f32 = 1e-4;

    fn engine() -> (PlacementEngine, FragmentPool) {
        let config = StackConfig::default();
        (PlacementEngine::new(config), FragmentPool::from_config(&config))
    }

    fn place_with_delta(engine: &mut PlacementEngine, pool: &mut FragmentPool, delta: f32) -> PlaceOutcome {
        let target = engine.last_anchor().get(engine.axis()) - delta;
        assert!(engine.seek_active(target));
        engine.attempt_place(pool)
    }

    #[test]
    fn test_new_engine_layout() {
        let (engine, _) = engine();
        assert_eq!(engine.state(), EngineState::Moving);
        assert_eq!(engine.tiles().len(), STACK_DEPTH);
        assert_eq!(engine.active_slot(), STACK_DEPTH - 1);
        assert_eq!(engine.active_tile().layer, 0);
        assert_eq!(engine.tiles()[0].layer, -1);
        assert_eq!(engine.tiles()[STACK_DEPTH - 2].layer, -(STACK_DEPTH as i32 - 1));
        assert_eq!(engine.bounds(), Extent::square(BOUNDS_SIZE));
        assert_eq!(engine.axis(), MoveAxis::Horizontal);
    }

    #[test]
    fn test_advance_swings_along_free_axis() {
        let (mut engine, _) = engine();
        // Quarter period puts the tile at the peak.
        let quarter = std::f32::consts::FRAC_PI_2 / TILE_SPEED;
        engine.advance(quarter);
        let tile = engine.active_tile();
        assert!((tile.anchor.x - BOUNDS_SIZE / 2.0).abs() < EPS);
        assert_eq!(tile.anchor.z, 0.0);
    }

    #[test]
    fn test_advance_ignores_bad_dt() {
        let (mut engine, _) = engine();
        engine.advance(f32::NAN);
        engine.advance(-1.0);
        assert_eq!(engine.active_tile().anchor, Point2::ORIGIN);
    }

    #[test]
    fn test_perfect_placement() {
        let (mut engine, mut pool) = engine();
        let outcome = place_with_delta(&mut engine, &mut pool, 0.05);

        let PlaceOutcome::Placed(report) = outcome else {
            panic!("expected placement, got {:?}", outcome);
        };
        assert_eq!(report.alignment, Alignment::Perfect);
        assert_eq!(report.combo, 1);
        assert_eq!(report.score, 1);
        assert_eq!(report.bounds, Extent::square(BOUNDS_SIZE));
        assert_eq!(report.placed.anchor, Point2::ORIGIN);
        assert_eq!(report.fragment, None);
        assert_eq!(engine.axis(), MoveAxis::Vertical);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_misaligned_placement_trims_and_spawns_fragment() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 0.05);

        let outcome = place_with_delta(&mut engine, &mut pool, 0.5);
        let PlaceOutcome::Placed(report) = outcome else {
            panic!("expected placement, got {:?}", outcome);
        };
        assert_eq!(report.axis, MoveAxis::Vertical);
        assert!(matches!(report.alignment, Alignment::Trimmed { cut } if (cut - 0.5).abs() < EPS));
        assert_eq!(report.combo, 0);
        assert_eq!(report.score, 2);
        assert!((report.bounds.depth - 3.0).abs() < EPS);
        assert_eq!(report.bounds.width, BOUNDS_SIZE);

        // Overlap centre of z=0 and z=-0.5.
        assert!((report.placed.anchor.z + 0.25).abs() < EPS);
        assert!((report.placed.extent.depth - 3.0).abs() < EPS);

        let frag = pool.get(report.fragment.unwrap()).unwrap();
        assert!((frag.extent.depth - 0.5).abs() < EPS);
        assert_eq!(frag.extent.width, BOUNDS_SIZE);
        // Overhang spans z in [-2.25, -1.75].
        assert!((frag.anchor.z + 2.0).abs() < EPS);
        assert_eq!(frag.layer, 1);
    }

    #[test]
    fn test_overhang_on_positive_side() {
        let (mut engine, mut pool) = engine();
        let PlaceOutcome::Placed(report) = place_with_delta(&mut engine, &mut pool, -1.0) else {
            panic!("expected placement");
        };
        let frag = pool.get(report.fragment.unwrap()).unwrap();
        // Active at x=1 over [-0.75, 2.75]; previous covers up to 1.75.
        assert!((frag.anchor.x - 2.25).abs() < EPS);
        assert!((report.placed.anchor.x - 0.5).abs() < EPS);
    }

    #[test]
    fn test_game_over_when_bound_exhausted() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 0.05);
        place_with_delta(&mut engine, &mut pool, 0.5);

        let outcome = place_with_delta(&mut engine, &mut pool, 3.5);
        assert!(matches!(
            outcome,
            PlaceOutcome::GameOver(FailureReason::BoundsExhausted {
                axis: MoveAxis::Horizontal,
                ..
            })
        ));
        assert!(engine.is_game_over());
        assert_eq!(engine.score(), 2);
        // Bounds keep their last valid value.
        assert_eq!(engine.bounds().width, BOUNDS_SIZE);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn test_game_over_is_terminal_until_reset() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 4.0);
        assert!(engine.is_game_over());

        assert_eq!(
            engine.attempt_place(&mut pool),
            PlaceOutcome::Ignored(IgnoreReason::NotMoving)
        );
        let before = *engine.active_tile();
        engine.advance(0.5);
        assert_eq!(*engine.active_tile(), before);
        assert!(!engine.seek_active(0.0));

        engine.reset();
        assert_eq!(engine.state(), EngineState::Moving);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.bounds(), Extent::square(BOUNDS_SIZE));
    }

    #[test]
    fn test_nan_position_is_degenerate() {
        let (mut engine, mut pool) = engine();
        engine.tiles[engine.active_slot].anchor.x = f32::NAN;
        assert_eq!(
            engine.attempt_place(&mut pool),
            PlaceOutcome::GameOver(FailureReason::DegenerateGeometry)
        );
        assert!(engine.is_game_over());
    }

    #[test]
    fn test_ring_slots_wrap() {
        let config = StackConfig {
            stack_depth: 3,
            ..StackConfig::default()
        };
        let mut engine = PlacementEngine::new(config);
        let mut pool = FragmentPool::from_config(&config);

        let mut slots = Vec::new();
        for _ in 0..4 {
            slots.push(engine.active_slot());
            place_with_delta(&mut engine, &mut pool, 0.0);
        }
        assert_eq!(slots, vec![2, 1, 0, 2]);
        assert_eq!(engine.active_tile().layer, 4);
    }

    fn sorted_layers(engine: &PlacementEngine) -> Vec<i32> {
        let mut layers: Vec<i32> = engine.tiles().iter().map(|t| t.layer).collect();
        layers.sort_unstable();
        layers
    }

    #[test]
    fn test_ring_recycles_lowest_layer() {
        let depth = 4;
        let config = StackConfig {
            stack_depth: depth,
            ..StackConfig::default()
        };
        let mut engine = PlacementEngine::new(config);
        let mut pool = FragmentPool::from_config(&config);
        assert_eq!(sorted_layers(&engine), vec![-3, -2, -1, 0]);

        for _ in 0..(2 * depth + 1) {
            let lowest = *sorted_layers(&engine).first().unwrap();
            let recycled = engine.tiles()[match engine.active_slot() {
                0 => depth - 1,
                n => n - 1,
            }]
            .layer;
            assert_eq!(recycled, lowest);

            assert!(place_with_delta(&mut engine, &mut pool, 0.0).is_placed());

            let score = engine.score() as i32;
            let expected: Vec<i32> = (score - (depth as i32 - 1)..=score).collect();
            assert_eq!(sorted_layers(&engine), expected);
            assert_eq!(engine.active_tile().layer, score);
        }
    }

    #[test]
    fn test_single_slot_ring() {
        let config = StackConfig {
            stack_depth: 1,
            ..StackConfig::default()
        };
        let mut engine = PlacementEngine::new(config);
        let mut pool = FragmentPool::from_config(&config);
        assert_eq!(sorted_layers(&engine), vec![0]);
        place_with_delta(&mut engine, &mut pool, 0.0);
        assert_eq!(engine.active_slot(), 0);
        assert_eq!(sorted_layers(&engine), vec![1]);
    }

    #[test]
    fn test_spawned_tile_uses_current_bounds() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 1.0);

        let tile = engine.active_tile();
        assert_eq!(tile.layer, 1);
        assert_eq!(tile.anchor, Point2::ORIGIN);
        assert!((tile.extent.width - 2.5).abs() < EPS);
        assert_eq!(tile.occupied_axis, MoveAxis::Vertical);
    }

    #[test]
    fn test_secondary_position_carried() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 1.0);
        // Horizontal commit at x=-0.5 fixes x for the vertical tile.
        engine.advance(0.1);
        assert!((engine.active_tile().anchor.x + 0.5).abs() < EPS);
    }

    #[test]
    fn test_committed_anchor_is_rounded() {
        let (mut engine, mut pool) = engine();
        let PlaceOutcome::Placed(report) = place_with_delta(&mut engine, &mut pool, 0.123_456) else {
            panic!("expected placement");
        };
        let x = report.placed.anchor.x;
        assert_eq!(x, snap(x, 2));
        assert!((x + 0.06).abs() < EPS);
    }

    #[test]
    fn test_regrowth_when_enabled() {
        let config = StackConfig {
            bounds_regrowth: true,
            combo_start_gain: 1.0,
            ..StackConfig::default()
        };
        let mut engine = PlacementEngine::new(config);
        let mut pool = FragmentPool::from_config(&config);

        // Vertical trim so the later perfect vertical placements have room to regrow.
        place_with_delta(&mut engine, &mut pool, 0.0);
        place_with_delta(&mut engine, &mut pool, 1.0);
        assert!((engine.bounds().depth - 2.5).abs() < EPS);

        // combo 0 -> 1 -> 2 : no regrowth yet (combo must exceed 1 before the commit).
        place_with_delta(&mut engine, &mut pool, 0.0);
        place_with_delta(&mut engine, &mut pool, 0.0);
        assert!((engine.bounds().depth - 2.5).abs() < EPS);

        // combo 2 > 1 on a horizontal commit: width already full, stays clamped.
        place_with_delta(&mut engine, &mut pool, 0.0);
        assert_eq!(engine.bounds().width, BOUNDS_SIZE);

        // Vertical commit with combo 3 regrows depth.
        let PlaceOutcome::Placed(report) = place_with_delta(&mut engine, &mut pool, 0.0) else {
            panic!("expected placement");
        };
        assert!((report.bounds.depth - 2.75).abs() < EPS);
        assert!((report.placed.extent.depth - 2.75).abs() < EPS);
    }

    #[test]
    fn test_no_regrowth_by_default() {
        let (mut engine, mut pool) = engine();
        place_with_delta(&mut engine, &mut pool, 1.0);
        for _ in 0..10 {
            place_with_delta(&mut engine, &mut pool, 0.0);
        }
        assert!((engine.bounds().width - 2.5).abs() < EPS);
        assert_eq!(engine.combo(), 10);
    }

    #[test]
    fn test_rejecting_pool_does_not_block_placement() {
        let config = StackConfig {
            pool_initial_size: 0,
            pool_expansion_size: 0,
            on_exhausted: ExhaustionPolicy::Reject,
            ..StackConfig::default()
        };
        let mut engine = PlacementEngine::new(config);
        let mut pool = FragmentPool::from_config(&config);

        let outcome = place_with_delta(&mut engine, &mut pool, 0.5);
        let PlaceOutcome::Placed(report) = outcome else {
            panic!("expected placement, got {:?}", outcome);
        };
        assert_eq!(report.fragment, None);
        assert!((engine.bounds().width - 3.0).abs() < EPS);
    }

    #[test]
    fn test_active_delta_tracks_offset() {
        let (mut engine, _) = engine();
        engine.seek_active(0.75);
        assert!((engine.active_delta() + 0.75).abs() < EPS);
    }

    #[test]
    fn test_snap() {
        assert_eq!(snap(1.234, 2), 1.23);
        assert_eq!(snap(-0.255, 1), -0.3);
        assert_eq!(snap(2.0, 0), 2.0);
    }
}
