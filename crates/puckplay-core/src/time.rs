//! Playback timing
//!
//! Provides time-paced frame advancement for replays:
//! - `PlaybackClock` - decides, per host callback, whether a frame is due
//! - `ClockSignal` - the clock's answer for one callback
//! - `SpeedPreset` - named playback rates for transport controls
//!
//! The clock is driven by host timestamps (a monotonic `Duration` since any
//! fixed origin), never by a fixed-step counter, so playback pace does not
//! depend on how often the host calls back.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tolerance for float error when comparing elapsed time with a frame step
const STEP_EPSILON_SECS: f64 = 1e-9;

/// Answer of [`PlaybackClock::tick`] for a single host callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    /// A frame interval has elapsed; advance one frame
    Advance,
    /// Not yet time for the next frame
    Wait,
}

/// Named playback rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    /// Quarter speed
    VerySlow,
    /// Half speed
    Slow,
    /// Source rate
    #[default]
    Normal,
    /// Double speed
    Fast,
    /// Four times the source rate
    VeryFast,
}

impl SpeedPreset {
    const ORDER: [SpeedPreset; 5] = [
        SpeedPreset::VerySlow,
        SpeedPreset::Slow,
        SpeedPreset::Normal,
        SpeedPreset::Fast,
        SpeedPreset::VeryFast,
    ];

    /// Linear playback-rate multiplier for this preset
    pub fn multiplier(&self) -> f64 {
        match self {
            SpeedPreset::VerySlow => 0.25,
            SpeedPreset::Slow => 0.5,
            SpeedPreset::Normal => 1.0,
            SpeedPreset::Fast => 2.0,
            SpeedPreset::VeryFast => 4.0,
        }
    }

    /// Next faster preset (saturates at the fastest)
    pub fn faster(&self) -> Self {
        let i = self.position();
        Self::ORDER[(i + 1).min(Self::ORDER.len() - 1)]
    }

    /// Next slower preset (saturates at the slowest)
    pub fn slower(&self) -> Self {
        Self::ORDER[self.position().saturating_sub(1)]
    }

    /// Preset whose multiplier is closest to `multiplier`
    pub fn nearest(multiplier: f64) -> Self {
        Self::ORDER
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (a.multiplier() - multiplier).abs();
                let db = (b.multiplier() - multiplier).abs();
                da.total_cmp(&db)
            })
            .unwrap_or_default()
    }

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|p| p == self).unwrap_or(2)
    }
}

/// Time-paced scheduler for frame advancement
///
/// Each host callback passes its timestamp to [`tick`](Self::tick). When at
/// least `frame_interval / speed` has elapsed since the last advance the clock
/// answers [`ClockSignal::Advance`]. At most one frame advances per callback,
/// and the reference timestamp moves forward by exactly one step so that the
/// long-run rate stays linear in `speed`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use puckplay_core::{ClockSignal, PlaybackClock};
///
/// let mut clock = PlaybackClock::from_frame_rate(10.0); // 100ms frames
/// clock.start();
/// assert_eq!(clock.tick(Duration::from_millis(0), 1.0), ClockSignal::Wait);
/// assert_eq!(clock.tick(Duration::from_millis(50), 1.0), ClockSignal::Wait);
/// assert_eq!(clock.tick(Duration::from_millis(100), 1.0), ClockSignal::Advance);
/// // Double speed halves the interval
/// assert_eq!(clock.tick(Duration::from_millis(150), 2.0), ClockSignal::Advance);
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    frame_interval: Duration,
    last_tick: Option<Duration>,
    running: bool,
}

impl PlaybackClock {
    /// Create a clock for a fixed source frame interval
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            last_tick: None,
            running: false,
        }
    }

    /// Create a clock for a source frame rate in frames per second
    pub fn from_frame_rate(fps: f64) -> Self {
        let interval = Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::from_millis(33));
        Self::new(interval)
    }

    /// Source frame interval at speed 1.0
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Begin pacing; the next tick only records its timestamp
    pub fn start(&mut self) {
        self.running = true;
        self.last_tick = None;
    }

    /// Stop pacing and forget the last timestamp
    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick = None;
    }

    /// Forget the last timestamp without changing the running flag
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Check if the clock is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Timestamp of the last advance (or of the first tick after a start)
    pub fn last_tick(&self) -> Option<Duration> {
        self.last_tick
    }

    /// Interval between advances at the given speed
    pub fn step_at(&self, speed: f64) -> Option<Duration> {
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(self.frame_interval.as_secs_f64() / speed).ok()
    }

    /// Process one host callback
    ///
    /// Timestamps that go backwards count as zero elapsed time.
    pub fn tick(&mut self, now: Duration, speed: f64) -> ClockSignal {
        if !self.running {
            return ClockSignal::Wait;
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return ClockSignal::Wait;
        };
        let Some(step) = self.step_at(speed) else {
            return ClockSignal::Wait;
        };

        let elapsed = now.saturating_sub(last);
        if elapsed.as_secs_f64() + STEP_EPSILON_SECS < step.as_secs_f64() {
            return ClockSignal::Wait;
        }

        // More than one whole step behind: resync instead of bursting frames.
        self.last_tick = if elapsed >= step * 2 {
            Some(now)
        } else {
            Some(last + step)
        };
        ClockSignal::Advance
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::from_frame_rate(30.0)
    }
}
