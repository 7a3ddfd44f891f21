//! Core stacking logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the tower-stacking game and nothing that
//! draws, plays sounds or reads input devices. A host drives it with two
//! calls:
//!
//! - [`StackSession::advance`] once per frame with the elapsed seconds
//! - [`StackSession::attempt_place`] whenever the place input is pressed
//!
//! and learns about the results through [`StackObserver`]s or by pulling a
//! [`StackSnapshot`].
//!
//! # Module Structure
//!
//! - [`engine`]: tile oscillation, overlap check, trimming and the bounds state machine
//! - [`pool`]: reusable cut-off fragments with timed auto-return
//! - [`schedule`]: deadline-ordered deferred tasks drained by the tick loop
//! - [`scoring`]: score/combo mirroring, milestones and high-water marks
//! - [`events`]: observer registration and in-order notification
//! - [`records`]: persisted high score / high combo and the store trait
//! - [`config`]: tuning, mode presets, env overrides and validation
//! - [`session`]: the orchestrator tying the above together
//! - [`snapshot`]: allocation-free read-only view for renderers
//! - [`autopilot`] / [`rng`]: a deterministic scripted player
//!
//! # Game Rules
//!
//! | Rule | Value (Normal) |
//! |------|----------------|
//! | Perfect tolerance | `|delta| <= 0.1` |
//! | Starting bounds | 3.5 x 3.5 |
//! | Input cooldown | 0.2 s after an accepted press |
//! | Fragment lifetime | 2.0 s |
//! | Score milestone | every 5 placements |
//! | Combo effect | every 3 consecutive perfects |
//!
//! # Example
//!
//! ```
//! use stack_tower_core::{PlaceOutcome, StackConfig, StackSession};
//!
//! let mut session = StackSession::new(StackConfig::default()).unwrap();
//!
//! // The first tile starts right on top of the base.
//! let outcome = session.attempt_place();
//! assert!(matches!(outcome, PlaceOutcome::Placed(_)));
//! assert_eq!(session.score(), 1);
//! assert_eq!(session.combo(), 1);
//!
//! // Let the next tile swing for a while.
//! for _ in 0..30 {
//!     session.advance(1.0 / 60.0);
//! }
//! ```

pub mod autopilot;
pub mod config;
pub mod engine;
pub mod events;
pub mod pool;
pub mod records;
pub mod rng;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use stack_tower_types as types;

// Re-export commonly used types for convenience
pub use autopilot::{Autopilot, RunSummary};
pub use config::{ConfigError, ExhaustionPolicy, StackConfig};
pub use engine::{
    Alignment, EngineState, FailureReason, IgnoreReason, PlaceOutcome, PlacementEngine,
    PlacementReport,
};
pub use events::{EventBus, StackObserver, SubscriptionId};
pub use pool::{Fragment, FragmentHandle, FragmentPool};
pub use records::{MemoryStore, RecordStore, Records, StoreError};
pub use rng::SimpleRng;
pub use schedule::{TaskId, TaskList};
pub use scoring::{PlacementFlags, ScoreRecord, ScoreTracker};
pub use session::StackSession;
pub use snapshot::StackSnapshot;
