//! Playback configuration
//!
//! Loaded from RON; every field has a default so a config file only needs to
//! name what it changes:
//!
//! ```ron
//! (
//!     trail_capacity: 16,
//!     goal: (right_goal_line: 188.5),
//! )
//! ```

use crate::error::{Error, Result};
use crate::geometry::RinkGeometry;
use crate::goal::GoalArea;
use crate::time::PlaybackClock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum number of puck positions kept in the trail
    pub trail_capacity: usize,
    /// Source frame rate in frames per second
    pub frame_rate: f64,
    /// Speed multiplier a fresh session starts with
    pub default_speed: f64,
    /// Lowest accepted speed multiplier
    pub min_speed: f64,
    /// Highest accepted speed multiplier
    pub max_speed: f64,
    /// Feed and rink extents
    pub rink: RinkGeometry,
    /// Goal-mouth bands
    pub goal: GoalArea,
}

impl PlaybackConfig {
    /// Parse a configuration from RON text and validate it
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: PlaybackConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&content)
    }

    /// Check values that cannot be clamped into meaning
    pub fn validate(&self) -> Result<()> {
        if self.trail_capacity == 0 {
            return Err(Error::InvalidConfig("trail_capacity must be at least 1".into()));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed && self.max_speed.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "speed bounds must satisfy 0 < min <= max, got {}..{}",
                self.min_speed, self.max_speed
            )));
        }
        if !(self.default_speed >= self.min_speed && self.default_speed <= self.max_speed) {
            return Err(Error::InvalidConfig(format!(
                "default_speed must lie in {}..={}, got {}",
                self.min_speed, self.max_speed, self.default_speed
            )));
        }
        self.rink.validate()?;
        self.goal.validate()?;
        Ok(())
    }

    /// Clamp a speed multiplier into the configured bounds
    ///
    /// Returns `None` for non-positive or non-finite values.
    pub fn clamp_speed(&self, speed: f64) -> Option<f64> {
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        Some(speed.clamp(self.min_speed, self.max_speed))
    }

    /// A clock paced at the configured frame rate
    pub fn clock(&self) -> PlaybackClock {
        PlaybackClock::from_frame_rate(self.frame_rate)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            trail_capacity: 10,
            frame_rate: 30.0,
            default_speed: 1.0,
            min_speed: 0.1,
            max_speed: 8.0,
            rink: RinkGeometry::default(),
            goal: GoalArea::default(),
        }
    }
}
