//! Core types module - shared data structures and constants
//!
//! This module defines the plain data shared by the placement engine, the
//! score tracker and whatever renders or persists them. Nothing here owns
//! behaviour beyond small accessors, so the types are usable from any layer
//! (simulation core, UI, persistence).
//!
//! # Geometry
//!
//! The stack lives on the horizontal `x`/`z` plane; height is an integer
//! layer index. A tile moving [`MoveAxis::Horizontal`] slides along `x` and,
//! when placed, constrains its `width`. A [`MoveAxis::Vertical`] tile slides
//! along `z` and constrains its `depth`.
//!
//! # Tuning Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BOUNDS_SIZE` | 3.5 | Initial and maximum bound per axis |
//! | `ERROR_MARGIN` | 0.1 | Perfect-alignment tolerance (Normal mode) |
//! | `TILE_SPEED` | 2.5 | Angular speed of the oscillation (rad/s) |
//! | `STACK_BOUNDS_GAIN` | 0.25 | Regrowth per perfect placement, when enabled |
//! | `COMBO_START_GAIN` | 3.0 | Combo that must be exceeded before regrowth |
//! | `FRAGMENT_LIFETIME_SECS` | 2.0 | Seconds before a fragment returns to the pool |
//! | `INPUT_COOLDOWN_SECS` | 0.2 | Debounce window after a successful placement |
//! | `SNAP_DECIMALS` | 2 | Decimal digits kept when snapping anchors |
//!
//! # Examples
//!
//! ```
//! use stack_tower_types::{Extent, MoveAxis, Point2, BOUNDS_SIZE};
//!
//! let axis = MoveAxis::Horizontal;
//! assert_eq!(axis.other(), MoveAxis::Vertical);
//!
//! let mut p = Point2::ORIGIN;
//! p.set(axis, 1.25);
//! assert_eq!(p.x, 1.25);
//! assert_eq!(p.get(MoveAxis::Vertical), 0.0);
//!
//! let bounds = Extent::square(BOUNDS_SIZE);
//! assert_eq!(bounds.get(MoveAxis::Vertical), 3.5);
//! ```

use serde::{Deserialize, Serialize};

/// Initial and maximum bound on each axis.
pub const BOUNDS_SIZE: f32 = 3.5;

/// Perfect-alignment tolerance (Normal mode).
pub const ERROR_MARGIN: f32 = 0.1;

/// Perfect-alignment tolerance (Easy mode).
pub const EASY_ERROR_MARGIN: f32 = 0.2;

/// Angular speed of the active tile's oscillation, in radians per second.
pub const TILE_SPEED: f32 = 2.5;

/// Bound regained per perfect placement once the combo threshold is passed (Normal mode).
pub const STACK_BOUNDS_GAIN: f32 = 0.25;

/// Regrowth gain (Easy mode).
pub const EASY_STACK_BOUNDS_GAIN: f32 = 0.4;

/// Combo that must be exceeded before regrowth kicks in (Normal mode).
pub const COMBO_START_GAIN: f32 = 3.0;

/// Regrowth combo threshold (Easy mode).
pub const EASY_COMBO_START_GAIN: f32 = 5.0;

/// Lifetime of a cut-off fragment before it returns to the pool.
pub const FRAGMENT_LIFETIME_SECS: f32 = 2.0;

/// Debounce window after each successful placement.
pub const INPUT_COOLDOWN_SECS: f32 = 0.2;

/// Fragments created up front.
pub const POOL_INITIAL_SIZE: usize = 10;

/// Fragments added each time a growable pool runs dry.
pub const POOL_EXPANSION_SIZE: usize = 5;

/// Default number of ring-buffer slots (visual stack depth).
pub const STACK_DEPTH: usize = 16;

/// Hard capacity of the tile ring buffer.
pub const MAX_STACK_DEPTH: usize = 64;

/// Decimal digits kept when snapping committed anchors.
pub const SNAP_DECIMALS: u32 = 2;

/// A score multiple of this triggers a milestone.
pub const MILESTONE_EVERY: u32 = 5;

/// A combo multiple of this triggers a combo effect.
pub const COMBO_EFFECT_EVERY: u32 = 3;


/// Axis along which the active tile currently slides.
///
/// Alternates after every successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveAxis {
    /// Slides along `x`, constrains `width`.
    #[default]
    Horizontal,
    /// Slides along `z`, constrains `depth`.
    Vertical,
}

impl MoveAxis {
    /// The axis that will be active after the next successful placement.
    pub fn other(self) -> Self {
        match self {
            MoveAxis::Horizontal => MoveAxis::Vertical,
            MoveAxis::Vertical => MoveAxis::Horizontal,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" | "x" => Some(MoveAxis::Horizontal),
            "vertical" | "z" => Some(MoveAxis::Vertical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoveAxis::Horizontal => "horizontal",
            MoveAxis::Vertical => "vertical",
        }
    }
}

/// Position on the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub z: f32,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Coordinate along `axis` (`x` for horizontal, `z` for vertical).
    pub fn get(&self, axis: MoveAxis) -> f32 {
        match axis {
            MoveAxis::Horizontal => self.x,
            MoveAxis::Vertical => self.z,
        }
    }

    pub fn set(&mut self, axis: MoveAxis, value: f32) {
        match axis {
            MoveAxis::Horizontal => self.x = value,
            MoveAxis::Vertical => self.z = value,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

/// Horizontal footprint of a tile or fragment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    /// Size along `x`.
    pub width: f32,
    /// Size along `z`.
    pub depth: f32,
}

impl Extent {
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    pub fn square(size: f32) -> Self {
        Self {
            width: size,
            depth: size,
        }
    }

    /// Size along `axis` (`width` for horizontal, `depth` for vertical).
    pub fn get(&self, axis: MoveAxis) -> f32 {
        match axis {
            MoveAxis::Horizontal => self.width,
            MoveAxis::Vertical => self.depth,
        }
    }

    pub fn set(&mut self, axis: MoveAxis, value: f32) {
        match axis {
            MoveAxis::Horizontal => self.width = value,
            MoveAxis::Vertical => self.depth = value,
        }
    }

    /// True when both sides are finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.depth.is_finite() && self.width > 0.0 && self.depth > 0.0
    }
}

/// A placed or active slab.
///
/// Tiles live in a fixed ring of slots; a slot is rewritten, never dropped,
/// when it scrolls off the bottom of the visible stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Height in the stack (0 is the first active tile, the base sits below it).
    pub layer: i32,
    pub anchor: Point2,
    pub extent: Extent,
    /// Axis this tile moves on (while active) or was last constrained on.
    pub occupied_axis: MoveAxis,
}

impl Tile {
    pub fn new(layer: i32, extent: Extent, occupied_axis: MoveAxis) -> Self {
        Self {
            layer,
            anchor: Point2::ORIGIN,
            extent,
            occupied_axis,
        }
    }
}

/// Difficulty presets.
///
/// - **Normal**: tight tolerance, slow regrowth
/// - **Easy**: double tolerance, larger regrowth after a longer combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Normal,
    Easy,
}

impl GameMode {
    /// Parse mode from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "easy" => Some(GameMode::Easy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "normal",
            GameMode::Easy => "easy",
        }
    }
}

/// Notification emitted by the simulation core.
///
/// Consumers (UI text, particle effects, audio) subscribe to these instead of
/// polling. Per commit they arrive as: fragment, score, combo, milestone,
/// combo milestone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackEvent {
    ScoreChanged(u32),
    ComboChanged(u32),
    /// Terminal failure of the current run. Fires once per run.
    GameOver,
    /// Score reached a multiple of [`MILESTONE_EVERY`].
    Milestone(u32),
    /// Combo reached a multiple of [`COMBO_EFFECT_EVERY`].
    ComboMilestone(u32),
    /// A cut-off piece was spawned from the fragment pool.
    FragmentSpawned {
        anchor: Point2,
        layer: i32,
        extent: Extent,
    },
}
