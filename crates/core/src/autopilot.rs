//! Autopilot - a scripted player for headless runs and soak tests
//!
//! Each tile the autopilot picks an aim point within `±jitter` of perfect
//! alignment, then presses on the first tick where the tile's signed distance
//! to perfect crosses that aim. With zero jitter it still misses by up to one
//! tick of travel, so runs end eventually.

use crate::engine::{EngineState, PlaceOutcome};
use crate::rng::SimpleRng;
use crate::session::StackSession;

/// Result of one autopilot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub score: u32,
    pub best_combo: u32,
    pub ticks: u64,
    /// False when the tick limit stopped the run first.
    pub game_over: bool,
    pub new_record: bool,
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: SimpleRng,
    jitter: f32,
    aim: f32,
    /// Score when the current aim was picked; a change means a new tile.
    aimed_at: Option<u32>,
    prev_gap: Option<f32>,
}

impl Autopilot {
    pub fn new(seed: u32, jitter: f32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            jitter: if jitter.is_finite() { jitter.abs() } else { 0.0 },
            aim: 0.0,
            aimed_at: None,
            prev_gap: None,
        }
    }

    pub fn jitter(&self) -> f32 {
        self.jitter
    }

    /// Decide whether to press this tick. Call after [`StackSession::advance`].
    pub fn should_place(&mut self, session: &StackSession) -> bool {
        let engine = session.engine();
        if engine.state() != EngineState::Moving {
            self.prev_gap = None;
            return false;
        }

        if self.aimed_at != Some(engine.score()) {
            self.aimed_at = Some(engine.score());
            // Keep the aim inside the swing or the tile never crosses it.
            let last = engine.last_anchor().get(engine.axis());
            let reach = session.config().swing_amplitude() * 0.9;
            self.aim = self
                .rng
                .next_signed(self.jitter)
                .clamp(last - reach, last + reach);
            self.prev_gap = None;
        }

        let gap = engine.active_delta() - self.aim;
        let crossed = match self.prev_gap {
            Some(prev) => (prev <= 0.0 && gap >= 0.0) || (prev >= 0.0 && gap <= 0.0),
            None => false,
        };
        self.prev_gap = Some(gap);

        crossed && session.cooldown_secs() <= 0.0
    }

    /// Drive `session` from its current state until game over or `max_ticks`.
    pub fn play_run(&mut self, session: &mut StackSession, dt_secs: f32, max_ticks: u64) -> RunSummary {
        let mut ticks = 0;
        while ticks < max_ticks && !session.is_game_over() {
            session.advance(dt_secs);
            ticks += 1;
            if self.should_place(session) {
                if let PlaceOutcome::GameOver(_) = session.attempt_place() {
                    break;
                }
            }
        }

        let record = session.score_record();
        RunSummary {
            score: session.score(),
            best_combo: record.best_combo,
            ticks,
            game_over: session.is_game_over(),
            new_record: record.is_new_record,
        }
    }
}
