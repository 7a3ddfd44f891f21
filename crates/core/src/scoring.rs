//! Scoring module - score, combo and high-water marks
//!
//! The placement engine decides what happened; this module turns it into the
//! numbers the player sees:
//! - score and combo are mirrored from every successful placement
//! - milestone (`score % 5 == 0`) and combo effect (`combo % 3 == 0`, combo > 0)
//!   are derived flags, carrying no state of their own
//! - high score / high combo only ever rise and outlive [`ScoreTracker::reset`]
//! - the new-record flag compares the final score with the high score as it
//!   stood before the run

use crate::events::EventBus;
use crate::records::Records;
use crate::types::{StackEvent, COMBO_EFFECT_EVERY, MILESTONE_EVERY};

/// Snapshot of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreRecord {
    pub current_score: u32,
    pub current_combo: u32,
    /// Longest combo reached in the current run.
    pub best_combo: u32,
    pub high_score: u32,
    pub high_combo: u32,
    pub is_new_record: bool,
}

/// Effect triggers derived from one placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementFlags {
    pub milestone: bool,
    pub combo_effect: bool,
}

/// Score milestone check.
pub fn is_milestone(score: u32) -> bool {
    score > 0 && score % MILESTONE_EVERY == 0
}

/// Combo effect check.
pub fn is_combo_effect(combo: u32) -> bool {
    combo > 0 && combo % COMBO_EFFECT_EVERY == 0
}

#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    record: ScoreRecord,
    game_over_reported: bool,
}

impl ScoreTracker {
    pub fn new(records: Records) -> Self {
        Self {
            record: ScoreRecord {
                high_score: records.high_score,
                high_combo: records.high_combo,
                ..ScoreRecord::default()
            },
            game_over_reported: false,
        }
    }

    pub fn record(&self) -> ScoreRecord {
        self.record
    }

    pub fn records(&self) -> Records {
        Records {
            high_score: self.record.high_score,
            high_combo: self.record.high_combo,
        }
    }

    /// Mirror a successful placement and notify, in order: score, combo,
    /// milestone, combo milestone.
    pub fn record_placement(&mut self, score: u32, combo: u32, bus: &mut EventBus) -> PlacementFlags {
        self.record.current_score = score;
        self.record.current_combo = combo;
        self.record.best_combo = self.record.best_combo.max(combo);

        bus.emit(StackEvent::ScoreChanged(score));
        bus.emit(StackEvent::ComboChanged(combo));

        let flags = PlacementFlags {
            milestone: is_milestone(score),
            combo_effect: is_combo_effect(combo),
        };
        if flags.milestone {
            bus.emit(StackEvent::Milestone(score));
        }
        if flags.combo_effect {
            bus.emit(StackEvent::ComboMilestone(combo));
        }
        flags
    }

    /// Close the run: update high-water marks and announce game over.
    ///
    /// Only the first call per run does anything. Returns the new records when
    /// either mark moved, so the caller can persist them.
    pub fn record_game_over(&mut self, bus: &mut EventBus) -> Option<Records> {
        if self.game_over_reported {
            return None;
        }
        self.game_over_reported = true;

        let before = self.records();
        let r = &mut self.record;
        r.is_new_record = r.current_score > before.high_score;
        r.high_score = r.high_score.max(r.current_score);
        r.high_combo = r.high_combo.max(r.best_combo);

        let new_record = r.is_new_record;

        let after = self.records();
        if new_record {
            log::info!("new high score: {} (was {})", after.high_score, before.high_score);
        }
        log::info!(
            "game over at score {} (best combo {})",
            self.record.current_score,
            self.record.best_combo
        );

        bus.emit(StackEvent::GameOver);

        (after != before).then_some(after)
    }

    /// Start a new run. High-water marks are kept.
    pub fn reset(&mut self, bus: &mut EventBus) {
        self.record = ScoreRecord {
            high_score: self.record.high_score,
            high_combo: self.record.high_combo,
            ..ScoreRecord::default()
        };
        self.game_over_reported = false;

        bus.emit(StackEvent::ScoreChanged(0));
        bus.emit(StackEvent::ComboChanged(0));
    }

    /// Forget the high-water marks. Returns the zeroed records for persisting.
    pub fn clear_records(&mut self) -> Records {
        self.record.high_score = 0;
        self.record.high_combo = 0;
        self.record.is_new_record = false;
        self.records()
    }

    pub fn game_over_reported(&self) -> bool {
        self.game_over_reported
    }
}
