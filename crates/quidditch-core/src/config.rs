//! Match configuration and fixed rule constants.
//!
//! Tunables live on [`MatchConfig`] and can be loaded from JSON. The scoring
//! and rating rules are fixed; they are plain constants.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// Points credited to a chaser bucket for a goal.
pub const GOAL_POINTS: f64 = 10.0;

/// Points credited to the seeker bucket for a confirmed snitch catch.
pub const SNITCH_POINTS: f64 = 150.0;

/// Rating every player starts a match with.
pub const INITIAL_RATING: f64 = 6.0;

/// Lower bound of the performance rating band.
pub const MIN_RATING: f64 = 0.0;

/// Upper bound of the performance rating band.
pub const MAX_RATING: f64 = 10.0;

/// Reaction skill assumed for a side that fields no Seeker.
pub const DEFAULT_SEEKER_REACTION: f64 = 50.0;

/// Snitch bonus at kick-off, before any decay.
pub const SNITCH_BASE_BONUS: f64 = 3.0;

/// Amount the snitch bonus drops per elapsed decay window.
pub const SNITCH_BONUS_DECAY: f64 = 0.5;

/// Length of one snitch bonus decay window, in minutes.
pub const SNITCH_DECAY_WINDOW: u32 = 20;

/// Tunable parameters of a match.
///
/// # Example
///
/// ```
/// use quidditch_core::config::MatchConfig;
///
/// let config = MatchConfig::default();
/// assert_eq!(config.max_minute, 90);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// The scheduler is cancelled once the clock reaches this minute.
    pub max_minute: u32,
    /// Snitch trigger chance gained per elapsed minute.
    pub snitch_rate_per_minute: f64,
    /// Upper bound of the snitch trigger chance.
    pub snitch_chance_cap: f64,
    /// Scheduler cadence in milliseconds.
    pub tick_period_ms: u64,
    /// How long each narrative line stays on screen, in milliseconds.
    pub line_duration_ms: u64,
    /// First minute at which the time penalty may apply.
    pub penalty_start_minute: u32,
    /// The penalty applies on minutes divisible by this value.
    pub penalty_interval: u32,
    /// Points taken from each seeker bucket per application.
    pub penalty_points: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_minute: 90,
            snitch_rate_per_minute: 0.002,
            snitch_chance_cap: 0.30,
            tick_period_ms: 1000,
            line_duration_ms: 2000,
            penalty_start_minute: 60,
            penalty_interval: 10,
            penalty_points: 0.5,
        }
    }
}

impl MatchConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Parse`] on malformed JSON and
    /// [`MatchError::InvalidConfig`] if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Io`] if the file cannot be read, otherwise the
    /// errors of [`MatchConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.max_minute == 0 {
            return Err(MatchError::InvalidConfig("max_minute must be positive".into()));
        }
        if self.tick_period_ms == 0 || self.line_duration_ms == 0 {
            return Err(MatchError::InvalidConfig(
                "tick_period_ms and line_duration_ms must be positive".into(),
            ));
        }
        if self.penalty_interval == 0 {
            return Err(MatchError::InvalidConfig("penalty_interval must be positive".into()));
        }
        for (name, value) in [
            ("snitch_rate_per_minute", self.snitch_rate_per_minute),
            ("snitch_chance_cap", self.snitch_chance_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !self.penalty_points.is_finite() || self.penalty_points < 0.0 {
            return Err(MatchError::InvalidConfig(
                "penalty_points must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Scheduler cadence.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Per-line narrative display duration.
    #[must_use]
    pub fn line_duration(&self) -> Duration {
        Duration::from_millis(self.line_duration_ms)
    }

    /// Chance that the snitch shows up at `minute`.
    #[must_use]
    pub fn snitch_chance(&self, minute: u32) -> f64 {
        (f64::from(minute) * self.snitch_rate_per_minute).min(self.snitch_chance_cap)
    }

    /// Whether the time penalty applies at `minute`.
    #[must_use]
    pub fn penalty_due(&self, minute: u32) -> bool {
        minute >= self.penalty_start_minute && minute % self.penalty_interval == 0
    }
}

/// Rating bonus for catching the snitch at `minute`.
///
/// Starts at 3 and drops by 0.5 every 20 minutes.
#[must_use]
pub fn snitch_bonus(minute: u32) -> f64 {
    SNITCH_BASE_BONUS - SNITCH_BONUS_DECAY * f64::from(minute / SNITCH_DECAY_WINDOW)
}
