//! Tuning for a stacking session.
//!
//! Defaults match Normal mode. Values can be overridden from `STACK_*`
//! environment variables or loaded from a JSON file by the store crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::*;

/// What the fragment pool does when every handle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Create `pool_expansion_size` fresh handles.
    #[default]
    Grow,
    /// Hand out nothing; the fragment is simply not spawned.
    Reject,
}

impl ExhaustionPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grow" => Some(ExhaustionPolicy::Grow),
            "reject" => Some(ExhaustionPolicy::Reject),
            _ => None,
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and non-negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("stack_depth must be within 1..={max} (got {value})")]
    StackDepth { value: usize, max: usize },
    #[error("pool_expansion_size must be at least 1 when the pool grows")]
    ZeroExpansion,
    #[error("snap_decimals must be at most 6 (got {0})")]
    SnapDecimals(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Alignment tolerance for a perfect placement.
    pub error_margin: f32,
    /// Initial and maximum bound per axis.
    pub bounds_size: f32,
    /// Angular speed of the active tile (rad/s).
    pub tile_speed: f32,
    /// Regrow the constrained bound on long perfect combos.
    pub bounds_regrowth: bool,
    pub stack_bounds_gain: f32,
    pub combo_start_gain: f32,
    pub fragment_lifetime_secs: f32,
    pub input_cooldown_secs: f32,
    pub pool_initial_size: usize,
    pub pool_expansion_size: usize,
    pub on_exhausted: ExhaustionPolicy,
    /// Force in-flight fragments back into the pool on reset.
    pub reclaim_fragments_on_reset: bool,
    /// Ring-buffer slots (visual stack depth).
    pub stack_depth: usize,
    pub initial_axis: MoveAxis,
    pub snap_decimals: u32,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            error_margin: ERROR_MARGIN,
            bounds_size: BOUNDS_SIZE,
            tile_speed: TILE_SPEED,
            bounds_regrowth: false,
            stack_bounds_gain: STACK_BOUNDS_GAIN,
            combo_start_gain: COMBO_START_GAIN,
            fragment_lifetime_secs: FRAGMENT_LIFETIME_SECS,
            input_cooldown_secs: INPUT_COOLDOWN_SECS,
            pool_initial_size: POOL_INITIAL_SIZE,
            pool_expansion_size: POOL_EXPANSION_SIZE,
            on_exhausted: ExhaustionPolicy::Grow,
            reclaim_fragments_on_reset: false,
            stack_depth: STACK_DEPTH,
            initial_axis: MoveAxis::Horizontal,
            snap_decimals: SNAP_DECIMALS,
        }
    }
}

impl StackConfig {
    /// Preset for a difficulty mode.
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Normal => Self::default(),
            GameMode::Easy => Self {
                error_margin: EASY_ERROR_MARGIN,
                stack_bounds_gain: EASY_STACK_BOUNDS_GAIN,
                combo_start_gain: EASY_COMBO_START_GAIN,
                ..Self::default()
            },
        }
    }

    /// Apply the tolerance and regrowth values of `mode`, keeping everything else.
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        let preset = Self::for_mode(mode);
        self.error_margin = preset.error_margin;
        self.stack_bounds_gain = preset.stack_bounds_gain;
        self.combo_start_gain = preset.combo_start_gain;
        self
    }

    /// Peak offset of the oscillating tile from the stack centre.
    pub fn swing_amplitude(&self) -> f32 {
        self.bounds_size * 0.5
    }

    /// Overlay `STACK_*` environment variables on top of `self`.
    pub fn overlay_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; unparsable values keep the current setting.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(v: Option<String>) -> Option<T> {
            v.and_then(|s| s.trim().parse().ok())
        }

        if let Some(mode) = lookup("STACK_MODE").and_then(|s| GameMode::from_str(s.trim())) {
            self = self.with_mode(mode);
        }

        self.error_margin = parse(lookup("STACK_ERROR_MARGIN")).unwrap_or(self.error_margin);
        self.bounds_size = parse(lookup("STACK_BOUNDS_SIZE")).unwrap_or(self.bounds_size);
        self.tile_speed = parse(lookup("STACK_TILE_SPEED")).unwrap_or(self.tile_speed);
        self.bounds_regrowth = lookup("STACK_BOUNDS_REGROWTH")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(self.bounds_regrowth);
        self.stack_bounds_gain =
            parse(lookup("STACK_BOUNDS_GAIN")).unwrap_or(self.stack_bounds_gain);
        self.combo_start_gain = parse(lookup("STACK_COMBO_START_GAIN")).unwrap_or(self.combo_start_gain);
        self.fragment_lifetime_secs =
            parse(lookup("STACK_FRAGMENT_LIFETIME")).unwrap_or(self.fragment_lifetime_secs);
        self.input_cooldown_secs =
            parse(lookup("STACK_INPUT_COOLDOWN")).unwrap_or(self.input_cooldown_secs);
        self.pool_initial_size = parse(lookup("STACK_POOL_INITIAL")).unwrap_or(self.pool_initial_size);
        self.pool_expansion_size =
            parse(lookup("STACK_POOL_EXPANSION")).unwrap_or(self.pool_expansion_size);
        self.on_exhausted = lookup("STACK_POOL_POLICY")
            .and_then(|s| ExhaustionPolicy::from_str(s.trim()))
            .unwrap_or(self.on_exhausted);
        self.stack_depth = parse(lookup("STACK_DEPTH")).unwrap_or(self.stack_depth);
        self.initial_axis = lookup("STACK_INITIAL_AXIS")
            .and_then(|s| MoveAxis::from_str(s.trim()))
            .unwrap_or(self.initial_axis);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NotPositive { field, value })
            }
        }
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Negative { field, value })
            }
        }

        non_negative("error_margin", self.error_margin)?;
        positive("bounds_size", self.bounds_size)?;
        positive("tile_speed", self.tile_speed)?;
        non_negative("stack_bounds_gain", self.stack_bounds_gain)?;
        non_negative("combo_start_gain", self.combo_start_gain)?;
        positive("fragment_lifetime_secs", self.fragment_lifetime_secs)?;
        non_negative("input_cooldown_secs", self.input_cooldown_secs)?;

        if self.stack_depth == 0 || self.stack_depth > MAX_STACK_DEPTH {
            return Err(ConfigError::StackDepth {
                value: self.stack_depth,
                max: MAX_STACK_DEPTH,
            });
        }
        if self.on_exhausted == ExhaustionPolicy::Grow && self.pool_expansion_size == 0 {
            return Err(ConfigError::ZeroExpansion);
        }
        if self.snap_decimals > 6 {
            return Err(ConfigError::SnapDecimals(self.snap_decimals));
        }
        Ok(())
    }
}
