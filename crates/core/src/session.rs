//! Session module - the tick/input orchestrator
//!
//! [`StackSession`] wires the engine, the fragment pool, the score tracker and
//! the record store together. A host calls [`StackSession::advance`] once per
//! frame and [`StackSession::attempt_place`] when the player presses the place
//! input; everything else is reported through subscribed observers.

use crate::config::{ConfigError, StackConfig};
use crate::engine::{EngineState, IgnoreReason, PlaceOutcome, PlacementEngine};
use crate::events::{EventBus, StackObserver, SubscriptionId};
use crate::pool::FragmentPool;
use crate::records::{MemoryStore, RecordStore, Records};
use crate::scoring::{ScoreRecord, ScoreTracker};
use crate::snapshot::StackSnapshot;
use crate::types::StackEvent;

pub struct StackSession {
    config: StackConfig,
    engine: PlacementEngine,
    pool: FragmentPool,
    tracker: ScoreTracker,
    bus: EventBus,
    store: Box<dyn RecordStore>,
    /// Seconds until the next press is accepted.
    cooldown_secs: f32,
    /// Completed resets since construction.
    run: u32,
}

impl std::fmt::Debug for StackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackSession")
            .field("engine", &self.engine)
            .field("pool", &self.pool)
            .field("tracker", &self.tracker)
            .field("bus", &self.bus)
            .field("cooldown_secs", &self.cooldown_secs)
            .field("run", &self.run)
            .finish()
    }
}

impl StackSession {
    /// Session with an in-memory record store.
    pub fn new(config: StackConfig) -> Result<Self, ConfigError> {
        Self::with_store(config, Box::new(MemoryStore::default()))
    }

    /// Session backed by `store`. Unreadable records start from zero.
    pub fn with_store(config: StackConfig, mut store: Box<dyn RecordStore>) -> Result<Self, ConfigError> {
        config.validate()?;

        let records = match store.load() {
            Ok(records) => records,
            Err(e) => {
                log::warn!("could not load records, starting from zero: {}", e);
                Records::default()
            }
        };

        Ok(Self {
            config,
            engine: PlacementEngine::new(config),
            pool: FragmentPool::from_config(&config),
            tracker: ScoreTracker::new(records),
            bus: EventBus::new(),
            store,
            cooldown_secs: 0.0,
            run: 0,
        })
    }

    /// Advance every clock by `dt_secs`. Non-finite or negative steps are ignored.
    pub fn advance(&mut self, dt_secs: f32) {
        if !dt_secs.is_finite() || dt_secs < 0.0 {
            return;
        }
        self.cooldown_secs = (self.cooldown_secs - dt_secs).max(0.0);
        self.pool.tick(dt_secs);
        self.engine.advance(dt_secs);
    }

    /// Handle one press of the place input.
    pub fn attempt_place(&mut self) -> PlaceOutcome {
        if self.engine.state() != EngineState::Moving {
            return PlaceOutcome::Ignored(IgnoreReason::NotMoving);
        }
        if self.cooldown_secs > 0.0 {
            return PlaceOutcome::Ignored(IgnoreReason::Cooldown);
        }
        self.cooldown_secs = self.config.input_cooldown_secs;

        let outcome = self.engine.attempt_place(&mut self.pool);
        match outcome {
            PlaceOutcome::Placed(report) => {
                if let Some(fragment) = report.fragment.and_then(|h| self.pool.get(h)) {
                    self.bus.emit(StackEvent::FragmentSpawned {
                        anchor: fragment.anchor,
                        layer: fragment.layer,
                        extent: fragment.extent,
                    });
                }
                self.tracker
                    .record_placement(report.score, report.combo, &mut self.bus);
            }
            PlaceOutcome::GameOver(reason) => {
                log::debug!("placement failed: {:?}", reason);
                if let Some(records) = self.tracker.record_game_over(&mut self.bus) {
                    self.persist(&records);
                }
            }
            PlaceOutcome::Ignored(_) => {}
        }
        outcome
    }

    /// Start a new run. Records and observers are kept.
    pub fn reset(&mut self) {
        self.engine.reset();
        if self.config.reclaim_fragments_on_reset {
            let reclaimed = self.pool.reclaim_all();
            log::debug!("reclaimed {} fragments on reset", reclaimed);
        }
        self.cooldown_secs = 0.0;
        self.run += 1;
        self.tracker.reset(&mut self.bus);
    }

    /// Zero both high-water marks, persist them and start a new run.
    pub fn clear_records(&mut self) -> Records {
        let records = self.tracker.clear_records();
        self.persist(&records);
        self.reset();
        records
    }

    fn persist(&mut self, records: &Records) {
        if let Err(e) = self.store.save(records) {
            log::warn!("could not save records: {}", e);
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn StackObserver>) -> SubscriptionId {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn StackObserver>> {
        self.bus.unsubscribe(id)
    }

    /// Move the active tile to `offset` on its free axis. See
    /// [`PlacementEngine::seek_active`].
    pub fn seek_active(&mut self, offset: f32) -> bool {
        self.engine.seek_active(offset)
    }

    pub fn snapshot_into(&self, out: &mut StackSnapshot) {
        let record = self.tracker.record();

        out.tiles.clear();
        out.tiles.extend(self.engine.tiles().iter().copied());
        out.active_slot = self.engine.active_slot();
        out.active = *self.engine.active_tile();
        out.last_anchor = self.engine.last_anchor();
        out.bounds = self.engine.bounds();
        out.axis = self.engine.axis();
        out.state = self.engine.state();
        out.score = self.engine.score();
        out.combo = self.engine.combo();
        out.best_combo = record.best_combo;
        out.high_score = record.high_score;
        out.high_combo = record.high_combo;
        out.is_new_record = record.is_new_record;
        out.active_fragments = self.pool.active_count();
        out.cooldown_secs = self.cooldown_secs;
    }

    pub fn snapshot(&self) -> StackSnapshot {
        let mut snap = StackSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    pub fn pool(&self) -> &FragmentPool {
        &self.pool
    }

    pub fn score_record(&self) -> ScoreRecord {
        self.tracker.record()
    }

    pub fn records(&self) -> Records {
        self.tracker.records()
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn combo(&self) -> u32 {
        self.engine.combo()
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    pub fn cooldown_secs(&self) -> f32 {
        self.cooldown_secs
    }

    pub fn run(&self) -> u32 {
        self.run
    }
}
