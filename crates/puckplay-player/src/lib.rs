//! Puckplay Player - Goal replay playback control
//!
//! This crate drives a loaded goal clip through time:
//!
//! - **Controller**: transport state machine (play, pause, step, scrub,
//!   restart, speed) owning the trail buffer and goal trigger
//! - **Render sink**: the interface a front end implements to draw frames
//!   and transport readouts
//! - **Scheduler**: one-at-a-time host callbacks with cancellation on every
//!   transition out of playback
//! - **Recorder**: a sink that keeps every render for inspection and export
//!
//! # Example
//!
//! ```rust
//! use puckplay_core::RawFrame;
//! use puckplay_player::{ManualScheduler, PlaybackController, PlayerState, RecordingSink};
//! use std::time::Duration;
//!
//! let frames = (0..4)
//!     .map(|i| RawFrame::new(i as f64 / 30.0).with_puck(1200.0 + 380.0 * i as f64, 510.0))
//!     .collect();
//!
//! let mut player = PlaybackController::with_defaults(RecordingSink::new(), ManualScheduler::new());
//! player.load(frames)?;
//! player.play();
//!
//! // Host loop: deliver each requested callback at 60 Hz
//! let mut now = Duration::ZERO;
//! while player.pump(now) {
//!     now += Duration::from_micros(16_667);
//! }
//!
//! assert_eq!(player.state(), PlayerState::Paused);
//! assert_eq!(player.current_frame_index(), 3);
//! assert_eq!(player.sink().goal_frames(), vec![3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod controller;
mod error;
mod recorder;
mod scheduler;
mod sink;

pub use controller::PlaybackController;
pub use error::{Error, Result};
pub use recorder::{ExportFormat, RecordingSink};
pub use scheduler::{ManualScheduler, TickScheduler, TickTicket};
pub use sink::{
    FnSink, NullSink, PlayerState, RenderCause, RenderCommand, RenderSink, SkaterView,
    TransportStatus,
};

// Re-export the core types a front end needs alongside the controller
pub use puckplay_core::{GoalSide, GoalState, PlaybackConfig, RinkPoint, SpeedPreset};
pub use puckplay_trail::{TrailPoint, TrailStyle};
