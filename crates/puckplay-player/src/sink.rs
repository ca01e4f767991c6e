//! Render-sink interface: what the controller tells the renderer

use puckplay_core::{EntityId, RinkPoint};
use puckplay_trail::TrailPoint;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;

/// Transport state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No frames loaded
    #[default]
    Idle,
    /// Loaded and stopped (after load or restart)
    Ready,
    /// Advancing with the clock
    Playing,
    /// Stopped by the user, a step, a scrub or the end of the clip
    Paused,
}

/// Why a render command was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderCause {
    /// Current frame shown without advancing trail or goal (load, restart, resume)
    Present,
    /// Clock-driven advance
    Playback,
    /// Single-frame step
    Step,
    /// Direct jump to a frame
    Scrub,
}

/// A skater as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkaterView {
    pub id: EntityId,
    pub position: RinkPoint,
    pub team_code: String,
    pub jersey_number: String,
    pub display_name: Option<String>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCommand {
    pub frame_index: usize,
    pub total_frames: usize,
    /// Feed time of the frame
    pub timestamp_seconds: f64,
    /// Time since the first frame
    pub elapsed_seconds: f64,
    /// Normalized puck position, if the puck was tracked in this frame
    pub puck: Option<RinkPoint>,
    pub skaters: Vec<SkaterView>,
    /// Trail snapshot, oldest first; the last point is the current puck
    pub trail: Vec<TrailPoint>,
    /// True only on the render where the goal detector first fired
    pub goal_just_fired: bool,
    pub cause: RenderCause,
}

/// Transport readouts for slider and time/frame displays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportStatus {
    pub frame_index: usize,
    pub total_frames: usize,
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
    pub speed: f64,
    pub state: PlayerState,
}

impl TransportStatus {
    /// Status of a controller with nothing loaded
    pub fn idle(speed: f64) -> Self {
        Self {
            frame_index: 0,
            total_frames: 0,
            elapsed_seconds: 0.0,
            duration_seconds: 0.0,
            speed,
            state: PlayerState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }
}

/// Receiver of render commands and transport updates
///
/// The engine has no rendering dependency; a terminal, canvas or scene-graph
/// front end implements this trait.
pub trait RenderSink {
    /// Draw a frame
    fn render(&mut self, command: &RenderCommand);

    /// Update transport readouts
    fn transport(&mut self, _status: &TransportStatus) {}
}

impl<T: RenderSink + ?Sized> RenderSink for Box<T> {
    fn render(&mut self, command: &RenderCommand) {
        (**self).render(command)
    }

    fn transport(&mut self, status: &TransportStatus) {
        (**self).transport(status)
    }
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn render(&mut self, command: &RenderCommand) {
        (**self).render(command)
    }

    fn transport(&mut self, status: &TransportStatus) {
        (**self).transport(status)
    }
}

/// Render commands forwarded over a channel; a hung-up receiver drops them
impl RenderSink for Sender<RenderCommand> {
    fn render(&mut self, command: &RenderCommand) {
        if self.send(command.clone()).is_err() {
            log::debug!("render receiver disconnected, dropping frame {}", command.frame_index);
        }
    }
}

/// Adapter turning a closure into a render sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(&RenderCommand)> RenderSink for FnSink<F> {
    fn render(&mut self, command: &RenderCommand) {
        (self.0)(command)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _command: &RenderCommand) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualScheduler, PlaybackController};
    use puckplay_core::RawFrame;
    use std::sync::mpsc;

    fn clip() -> Vec<RawFrame> {
        (0..3)
            .map(|i| RawFrame::new(i as f64 * 0.1).with_puck(1200.0, 510.0))
            .collect()
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = mpsc::channel();
        let mut player = PlaybackController::with_defaults(tx, ManualScheduler::new());
        player.load(clip()).unwrap();
        player.step();

        let received: Vec<_> = rx.try_iter().map(|c| (c.frame_index, c.cause)).collect();
        assert_eq!(
            received,
            vec![
                (0, RenderCause::Present),
                (0, RenderCause::Step),
                (1, RenderCause::Step)
            ]
        );
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut player = PlaybackController::with_defaults(tx, ManualScheduler::new());
        player.load(clip()).unwrap();
        player.scrub(2);
        assert_eq!(player.current_frame_index(), 2);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let sink = FnSink(|c: &RenderCommand| seen.push(c.frame_index));
            let mut player = PlaybackController::with_defaults(sink, ManualScheduler::new());
            player.load(clip()).unwrap();
            player.scrub(2);
        }
        assert_eq!(seen, vec![0, 2]);
    }

    #[test]
    fn test_idle_status() {
        let status = TransportStatus::idle(1.0);
        assert_eq!(status.state, PlayerState::Idle);
        assert!(!status.is_playing());
        assert_eq!(status.total_frames, 0);
    }
}
