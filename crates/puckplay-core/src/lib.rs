//! Puckplay Core - Frame model and playback primitives for goal replays
//!
//! This crate provides the leaf components of the playback engine:
//! - Raw feed records (`RawFrame`, `RawEntity`) and the validated `FrameStore`
//! - Tracked entities (`Entity`, `Skater`) keyed by `EntityId`
//! - Rink geometry and the clamping `CoordinateMapper`
//! - The one-shot `GoalDetector` over a configurable `GoalArea`
//! - The time-paced `PlaybackClock`
//! - `PlaybackConfig`, loadable from RON
//!
//! Nothing here renders or schedules; the `puckplay-player` crate wires these
//! pieces into a playback controller.
//!
//! ## Coordinates
//!
//! Feed positions are raw units and must pass through the mapper before any
//! rendering or goal test:
//!
//! ```
//! use puckplay_core::{CoordinateMapper, GoalDetector, PlaybackConfig};
//!
//! let config = PlaybackConfig::default();
//! let mapper = CoordinateMapper::new(config.rink);
//! let mut goals = GoalDetector::new(config.goal);
//!
//! let puck = mapper.map(2300.0, 510.0);
//! assert!(goals.evaluate(puck, 0));
//! ```

mod config;
mod entity;
mod error;
mod frame;
mod geometry;
mod goal;
mod identity;
mod raw;
pub mod time;

pub use config::PlaybackConfig;
pub use entity::{Entity, Skater};
pub use error::{Error, ParseError, Result};
pub use frame::{Frame, FrameStore};
pub use geometry::{CoordinateMapper, RinkGeometry, RinkPoint};
pub use goal::{GoalArea, GoalDetector, GoalSide, GoalState};
pub use identity::EntityId;
pub use raw::{Label, RawEntity, RawFrame};
pub use time::{ClockSignal, PlaybackClock, SpeedPreset};
