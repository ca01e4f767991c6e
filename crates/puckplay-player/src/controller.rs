//! The playback state machine

use crate::error::Result;
use crate::scheduler::{ManualScheduler, TickScheduler, TickTicket};
use crate::sink::{
    PlayerState, RenderCause, RenderCommand, RenderSink, SkaterView, TransportStatus,
};
use puckplay_core::{
    ClockSignal, CoordinateMapper, Frame, FrameStore, GoalDetector, GoalState, ParseError,
    PlaybackClock, PlaybackConfig, RawFrame, RinkPoint,
};
use puckplay_trail::{TrailBuffer, TrailPoint};
use std::time::Duration;

/// Playback controller for one goal replay session
///
/// Owns the frame store, trail, goal trigger and clock of a session and
/// coordinates them in response to transport controls:
/// - Play / pause / toggle
/// - Step forward or back one frame
/// - Scrub to any frame
/// - Restart from the first frame
/// - Change playback speed
///
/// Every frame shown is reported to the [`RenderSink`]; clock pacing is driven
/// by host callbacks requested through the [`TickScheduler`].
pub struct PlaybackController<S: RenderSink, Q: TickScheduler> {
    config: PlaybackConfig,
    mapper: CoordinateMapper,
    store: Option<FrameStore>,
    trail: TrailBuffer,
    goals: GoalDetector,
    clock: PlaybackClock,
    state: PlayerState,
    speed: f64,
    current: usize,
    /// Last frame whose advance effect ran (trail push + goal test)
    processed: Option<usize>,
    generation: u64,
    next_seq: u64,
    pending: Option<TickTicket>,
    sink: S,
    scheduler: Q,
}

impl<S: RenderSink, Q: TickScheduler> PlaybackController<S, Q> {
    /// Create a controller with a validated configuration
    pub fn new(config: PlaybackConfig, sink: S, scheduler: Q) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, sink, scheduler))
    }

    /// Create a controller with the default configuration
    pub fn with_defaults(sink: S, scheduler: Q) -> Self {
        Self::build(PlaybackConfig::default(), sink, scheduler)
    }

    fn build(config: PlaybackConfig, sink: S, scheduler: Q) -> Self {
        Self {
            mapper: CoordinateMapper::new(config.rink),
            trail: TrailBuffer::new(config.trail_capacity),
            goals: GoalDetector::new(config.goal),
            clock: config.clock(),
            speed: config.default_speed,
            config,
            store: None,
            state: PlayerState::Idle,
            current: 0,
            processed: None,
            generation: 0,
            next_seq: 0,
            pending: None,
            sink,
            scheduler,
        }
    }

    // ---- control surface ----

    /// Validate and load raw frames, replacing any current session
    ///
    /// On failure nothing changes: an empty controller stays `Idle` and a
    /// loaded one keeps its previous session.
    pub fn load(&mut self, raw: Vec<RawFrame>) -> std::result::Result<(), ParseError> {
        let store = match FrameStore::load(raw) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("load rejected: {}", e);
                return Err(e);
            }
        };
        self.load_store(store);
        Ok(())
    }

    /// Load an already validated frame store
    pub fn load_store(&mut self, store: FrameStore) {
        self.stop_clock();
        log::info!(
            "loaded {} frames ({:.2}s)",
            store.len(),
            store.duration_seconds()
        );
        self.store = Some(store);
        self.current = 0;
        self.processed = None;
        self.speed = self.config.default_speed;
        self.trail.clear();
        self.goals.reset();
        self.state = PlayerState::Ready;
        self.present(RenderCause::Present);
    }

    /// Start or resume clock-driven playback
    ///
    /// From the last frame, playback rewinds to the first frame first.
    pub fn play(&mut self) {
        match self.state {
            PlayerState::Idle => {
                log::warn!("play ignored: nothing loaded");
                return;
            }
            PlayerState::Playing => return,
            PlayerState::Ready | PlayerState::Paused => {}
        }

        if self.current >= self.last_index() {
            log::debug!("play from end: rewinding to frame 0");
            self.current = 0;
            self.processed = None;
            self.trail.clear();
        }

        log::debug!("{:?} -> Playing at frame {}", self.state, self.current);
        self.state = PlayerState::Playing;
        self.clock.start();
        if self.processed == Some(self.current) {
            self.present(RenderCause::Playback);
        } else {
            self.advance_effect(RenderCause::Playback);
        }
        self.schedule_next();
    }

    /// Pause clock-driven playback
    pub fn pause(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        log::debug!("Playing -> Paused at frame {}", self.current);
        self.stop_clock();
        self.state = PlayerState::Paused;
        self.emit_transport();
    }

    /// Play if stopped, pause if playing
    pub fn toggle(&mut self) {
        if self.state == PlayerState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Return to the first frame, clearing trail and goal
    pub fn restart(&mut self) {
        if self.state == PlayerState::Idle {
            log::warn!("restart ignored: nothing loaded");
            return;
        }
        log::debug!("{:?} -> Ready (restart)", self.state);
        self.stop_clock();
        self.current = 0;
        self.processed = None;
        self.trail.clear();
        self.goals.reset();
        self.state = PlayerState::Ready;
        self.present(RenderCause::Present);
    }

    /// Advance exactly one frame and pause
    pub fn step(&mut self) {
        if self.state == PlayerState::Idle {
            log::warn!("step ignored: nothing loaded");
            return;
        }
        self.stop_clock();
        self.state = PlayerState::Paused;

        // After load or restart the first frame has only been presented;
        // process it so stepping and playing see the same trail and goal.
        let first_pass = self.processed.is_none();
        if first_pass {
            self.advance_effect(RenderCause::Step);
        }

        let next = (self.current + 1).min(self.last_index());
        if next != self.current {
            self.current = next;
            self.advance_effect(RenderCause::Step);
        } else if self.processed != Some(self.current) {
            self.advance_effect(RenderCause::Step);
        } else if !first_pass {
            // Already at the last frame: nothing new to process.
            self.present(RenderCause::Step);
        }
    }

    /// Go back one frame and pause
    pub fn step_back(&mut self) {
        if self.state == PlayerState::Idle {
            log::warn!("step back ignored: nothing loaded");
            return;
        }
        self.scrub(self.current as i64 - 1);
    }

    /// Jump to `frame_index` (clamped into range) and pause
    ///
    /// The trail is rebuilt from the frames leading up to the target so it
    /// looks the same as if playback had arrived there; the goal test runs
    /// for the target frame only.
    pub fn scrub(&mut self, frame_index: i64) {
        let Some(store) = self.store.as_ref() else {
            log::warn!("scrub ignored: nothing loaded");
            return;
        };
        let target = store.clamp_index(frame_index);
        log::debug!("{:?} -> Paused (scrub {} -> {})", self.state, frame_index, target);

        self.trail.clear();
        let start = (target + 1).saturating_sub(self.trail.capacity());
        for frame in &store.frames()[start..target] {
            if let Some(puck) = frame.puck() {
                let position = puck.position(&self.mapper);
                self.trail.push(TrailPoint::new(position, frame.index));
            }
        }

        self.stop_clock();
        self.state = PlayerState::Paused;
        self.current = target;
        self.advance_effect(RenderCause::Scrub);
    }

    /// Change the playback-rate multiplier
    ///
    /// Values are clamped to the configured bounds; non-positive or
    /// non-finite values are ignored. Takes effect on the next clock tick.
    pub fn set_speed(&mut self, multiplier: f64) {
        if self.state == PlayerState::Idle {
            log::warn!("speed change ignored: nothing loaded");
            return;
        }
        match self.config.clamp_speed(multiplier) {
            Some(speed) => {
                log::debug!("speed {} -> {}", self.speed, speed);
                self.speed = speed;
                self.emit_transport();
            }
            None => log::warn!("rejected speed multiplier {}", multiplier),
        }
    }

    /// Handle a host callback for `ticket` at host time `now`
    ///
    /// Stale tickets (cancelled, already delivered, or from an earlier
    /// generation) are ignored.
    pub fn tick(&mut self, ticket: TickTicket, now: Duration) {
        if self.pending != Some(ticket)
            || ticket.generation != self.generation
            || self.state != PlayerState::Playing
        {
            log::debug!("ignoring stale tick {:?}", ticket);
            return;
        }
        self.pending = None;

        if self.clock.tick(now, self.speed) == ClockSignal::Advance {
            if self.current >= self.last_index() {
                log::info!("playback reached the last frame");
                self.stop_clock();
                self.state = PlayerState::Paused;
                self.emit_transport();
                return;
            }
            self.current += 1;
            self.advance_effect(RenderCause::Playback);
        }

        self.schedule_next();
    }

    // ---- readouts ----

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn current_frame_index(&self) -> usize {
        self.current
    }

    /// Number of loaded frames (0 when idle)
    pub fn total_frames(&self) -> usize {
        self.store.as_ref().map_or(0, |s| s.len())
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Current transport readouts
    pub fn status(&self) -> TransportStatus {
        let Some(store) = self.store.as_ref() else {
            return TransportStatus::idle(self.speed);
        };
        TransportStatus {
            frame_index: self.current,
            total_frames: store.len(),
            elapsed_seconds: store.elapsed_at(self.current).unwrap_or(0.0),
            duration_seconds: store.duration_seconds(),
            speed: self.speed,
            state: self.state,
        }
    }

    pub fn goal_state(&self) -> GoalState {
        self.goals.state()
    }

    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn store(&self) -> Option<&FrameStore> {
        self.store.as_ref()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Current cancellation generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Q {
        &mut self.scheduler
    }

    // ---- internals ----

    fn last_index(&self) -> usize {
        self.store.as_ref().map_or(0, |s| s.last_index())
    }

    /// Stop pacing and invalidate any outstanding host callback
    fn stop_clock(&mut self) {
        self.clock.stop();
        self.generation += 1;
        if let Some(ticket) = self.pending.take() {
            self.scheduler.cancel(ticket);
        }
    }

    fn schedule_next(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        self.next_seq += 1;
        let ticket = TickTicket {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.pending = Some(ticket);
        self.scheduler.request(ticket);
    }

    /// Push the current puck to the trail, test for a goal, then render
    fn advance_effect(&mut self, cause: RenderCause) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let frame = match store.frame_at(self.current) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("advance skipped: {}", e);
                return;
            }
        };

        let puck = frame.puck().map(|p| p.position(&self.mapper));
        let mut fired = false;
        if let Some(position) = puck {
            self.trail.push(TrailPoint::new(position, frame.index));
            fired = self.goals.evaluate(position, frame.index);
        }
        self.processed = Some(frame.index);

        let command = build_command(store, frame, puck, &self.mapper, &self.trail, fired, cause);
        self.sink.render(&command);
        self.emit_transport();
    }

    /// Render the current frame without touching trail or goal state
    fn present(&mut self, cause: RenderCause) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let frame = match store.frame_at(self.current) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("present skipped: {}", e);
                return;
            }
        };
        let puck = frame.puck().map(|p| p.position(&self.mapper));
        let command = build_command(store, frame, puck, &self.mapper, &self.trail, false, cause);
        self.sink.render(&command);
        self.emit_transport();
    }

    fn emit_transport(&mut self) {
        let status = self.status();
        self.sink.transport(&status);
    }
}

impl<S: RenderSink> PlaybackController<S, ManualScheduler> {
    /// Deliver the pending host callback, if any, at time `now`
    ///
    /// Returns false when no callback was pending.
    pub fn pump(&mut self, now: Duration) -> bool {
        match self.scheduler.take() {
            Some(ticket) => {
                self.tick(ticket, now);
                true
            }
            None => false,
        }
    }
}

fn build_command(
    store: &FrameStore,
    frame: &Frame,
    puck: Option<RinkPoint>,
    mapper: &CoordinateMapper,
    trail: &TrailBuffer,
    goal_just_fired: bool,
    cause: RenderCause,
) -> RenderCommand {
    let skaters = frame
        .skaters()
        .map(|(id, s)| SkaterView {
            id: id.clone(),
            position: mapper.map(s.x, s.y),
            team_code: s.team_code.clone(),
            jersey_number: s.jersey_number.clone(),
            display_name: s.display_name.clone(),
        })
        .collect();

    RenderCommand {
        frame_index: frame.index,
        total_frames: store.len(),
        timestamp_seconds: frame.timestamp_seconds,
        elapsed_seconds: store.elapsed_at(frame.index).unwrap_or(0.0),
        puck,
        skaters,
        trail: trail.snapshot(),
        goal_just_fired,
        cause,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecordingSink;
    use puckplay_core::GoalSide;

    type TestController = PlaybackController<RecordingSink, ManualScheduler>;

    /// Raw x that maps to normalized x on the default rink
    fn raw_x(norm: f64) -> f64 {
        norm * 12.0
    }

    /// Five frames; the puck is past the right goal line only at frame 4
    fn goal_clip() -> Vec<RawFrame> {
        let xs = [100.0, 130.0, 160.0, 185.0, 192.0];
        xs.iter()
            .enumerate()
            .map(|(i, x)| {
                RawFrame::new(i as f64 / 30.0)
                    .with_puck(raw_x(*x), 510.0)
                    .with_skater("8478402", raw_x(150.0), 400.0, "EDM", "97")
            })
            .collect()
    }

    fn long_clip(frames: usize) -> Vec<RawFrame> {
        (0..frames)
            .map(|i| RawFrame::new(i as f64 / 30.0).with_puck(raw_x(100.0), 100.0))
            .collect()
    }

    fn controller() -> TestController {
        PlaybackController::with_defaults(RecordingSink::new(), ManualScheduler::new())
    }

    fn loaded(raw: Vec<RawFrame>) -> TestController {
        let mut c = controller();
        c.load(raw).unwrap();
        c
    }

    /// Pump host callbacks at 60 Hz until playback stops
    fn run_to_end(c: &mut TestController) {
        let mut now = Duration::ZERO;
        for _ in 0..10_000 {
            if !c.pump(now) {
                return;
            }
            now += Duration::from_micros(16_667);
        }
        panic!("playback did not finish");
    }

    #[test]
    fn test_starts_idle_and_ignores_controls() {
        let mut c = controller();
        c.play();
        c.step();
        c.scrub(3);
        c.restart();
        c.set_speed(2.0);
        assert_eq!(c.state(), PlayerState::Idle);
        assert_eq!(c.total_frames(), 0);
        assert!(c.sink().commands().is_empty());
        assert!(c.scheduler().pending().is_none());
    }

    #[test]
    fn test_load_enters_ready() {
        let c = loaded(goal_clip());
        assert_eq!(c.state(), PlayerState::Ready);
        assert_eq!(c.current_frame_index(), 0);
        assert_eq!(c.total_frames(), 5);
        assert!(c.trail().is_empty());
        assert_eq!(c.goal_state(), GoalState::Pending);

        let first = &c.sink().commands()[0];
        assert_eq!(first.cause, RenderCause::Present);
        assert_eq!(first.skaters[0].team_code, "EDM");
        assert_eq!(c.sink().last_transport().unwrap().state, PlayerState::Ready);
    }

    #[test]
    fn test_failed_load_stays_idle() {
        let mut c = controller();
        assert_eq!(c.load(vec![]), Err(ParseError::Empty));
        assert_eq!(c.state(), PlayerState::Idle);

        let mut bad = goal_clip();
        bad[2].on_ice = None;
        assert!(c.load(bad).is_err());
        assert_eq!(c.state(), PlayerState::Idle);
        assert!(c.store().is_none());
    }

    #[test]
    fn test_failed_load_keeps_previous_session() {
        let mut c = loaded(goal_clip());
        c.scrub(3);
        assert!(c.load(vec![]).is_err());
        assert_eq!(c.state(), PlayerState::Paused);
        assert_eq!(c.current_frame_index(), 3);
        assert_eq!(c.total_frames(), 5);
    }

    // Scenario A: play through a clip whose puck enters the net at the end
    #[test]
    fn test_play_to_end_fires_goal_once() {
        let mut c = loaded(goal_clip());
        c.play();
        assert_eq!(c.state(), PlayerState::Playing);
        run_to_end(&mut c);

        assert_eq!(c.state(), PlayerState::Paused);
        assert_eq!(c.current_frame_index(), 4);
        assert_eq!(c.sink().goal_frames(), vec![4]);
        assert_eq!(
            c.goal_state(),
            GoalState::Fired {
                frame_index: 4,
                side: GoalSide::Right
            }
        );
        assert_eq!(c.sink().last_transport().unwrap().state, PlayerState::Paused);
    }

    // P3: uninterrupted playback renders every frame once, in order
    #[test]
    fn test_playback_order() {
        let mut c = loaded(long_clip(12));
        c.scrub(3);
        c.sink_mut().clear();

        c.play();
        run_to_end(&mut c);

        let frames: Vec<_> = c.sink().commands().iter().map(|cmd| cmd.frame_index).collect();
        assert_eq!(frames, (3..12).collect::<Vec<_>>());
        assert_eq!(c.state(), PlayerState::Paused);
        assert_eq!(c.current_frame_index(), 11);
    }

    #[test]
    fn test_resume_does_not_repeat_trail_point() {
        let mut c = loaded(long_clip(6));
        c.step();
        c.step();
        assert_eq!(c.trail().len(), 3);

        c.play();
        // Resuming at an already processed frame presents it without a push
        assert_eq!(c.trail().len(), 3);
        assert_eq!(c.sink().commands().last().unwrap().frame_index, 2);
        run_to_end(&mut c);
        let frames: Vec<_> = c.trail().iter().map(|p| p.frame_index).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4, 5]);
    }

    // Scenario B: stepping through the clip
    #[test]
    fn test_step_through_clip() {
        let mut c = loaded(goal_clip());
        for expected in 1..=4 {
            c.step();
            assert_eq!(c.current_frame_index(), expected);
            assert_eq!(c.state(), PlayerState::Paused);
            let last = c.sink().commands().last().unwrap();
            assert_eq!(last.cause, RenderCause::Step);
            assert_eq!(last.goal_just_fired, expected == 4);
        }

        // Stepping at the end stays put and never fires again
        c.step();
        assert_eq!(c.current_frame_index(), 4);
        assert_eq!(c.sink().goal_frames(), vec![4]);
        let frames: Vec<_> = c.trail().iter().map(|p| p.frame_index).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_step_and_play_agree_on_first_frame() {
        // Puck sits in the right net from the first frame on
        let clip = || -> Vec<RawFrame> {
            (0..4)
                .map(|i| RawFrame::new(i as f64 / 30.0).with_puck(2340.0, 510.0))
                .collect()
        };

        let mut played = loaded(clip());
        played.play();
        run_to_end(&mut played);

        let mut stepped = loaded(clip());
        for _ in 0..3 {
            stepped.step();
        }

        let trail = |c: &TestController| -> Vec<usize> {
            c.trail().iter().map(|p| p.frame_index).collect()
        };
        assert_eq!(played.sink().goal_frames(), vec![0]);
        assert_eq!(stepped.sink().goal_frames(), played.sink().goal_frames());
        assert_eq!(trail(&stepped), vec![0, 1, 2, 3]);
        assert_eq!(trail(&stepped), trail(&played));
        assert_eq!(stepped.current_frame_index(), 3);
    }

    #[test]
    fn test_step_after_restart_processes_first_frame() {
        let mut c = loaded(goal_clip());
        c.scrub(3);
        c.restart();
        c.step();
        let frames: Vec<_> = c.trail().iter().map(|p| p.frame_index).collect();
        assert_eq!(frames, vec![0, 1]);
        assert_eq!(c.current_frame_index(), 1);
    }

    #[test]
    fn test_step_single_frame_clip() {
        let mut c = loaded(long_clip(1));
        c.sink_mut().clear();
        c.step();
        assert_eq!(c.sink().frame_indices(), vec![0]);
        assert_eq!(c.trail().len(), 1);
        c.step();
        assert_eq!(c.sink().frame_indices(), vec![0, 0]);
        assert_eq!(c.trail().len(), 1);
    }

    // Scenario C: a scrub cancels the outstanding callback
    #[test]
    fn test_scrub_cancels_scheduled_tick() {
        let mut c = loaded(goal_clip());
        c.play();
        let stale = c.scheduler().pending().unwrap();
        let renders = c.sink().commands().len();

        c.scrub(2);
        assert!(c.scheduler().pending().is_none());
        assert_eq!(c.scheduler().cancelled(), 1);

        let renders_after_scrub = c.sink().commands().len();
        assert_eq!(renders_after_scrub, renders + 1);

        // The stale callback fires anyway: nothing happens
        c.tick(stale, Duration::from_secs(1));
        c.tick(stale, Duration::from_secs(2));
        assert_eq!(c.current_frame_index(), 2);
        assert_eq!(c.state(), PlayerState::Paused);
        assert_eq!(c.sink().commands().len(), renders_after_scrub);

        // Trail is recomputed for the window ending at frame 2
        let frames: Vec<_> = c.trail().iter().map(|p| p.frame_index).collect();
        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(c.trail().latest().unwrap().frame_index, 2);
    }

    #[test]
    fn test_pause_cancels_tick() {
        let mut c = loaded(long_clip(10));
        c.play();
        let generation = c.generation();
        let ticket = c.scheduler().pending().unwrap();
        c.pause();
        assert_eq!(c.state(), PlayerState::Paused);
        assert!(c.generation() > generation);

        c.tick(ticket, Duration::from_secs(5));
        assert_eq!(c.current_frame_index(), 0);
        assert!(!c.pump(Duration::from_secs(6)));
    }

    #[test]
    fn test_single_outstanding_ticket() {
        let mut c = loaded(long_clip(10));
        c.play();
        assert_eq!(c.scheduler().requested(), 1);
        // play while playing does not schedule a second callback
        c.play();
        assert_eq!(c.scheduler().requested(), 1);
        c.pump(Duration::ZERO);
        assert_eq!(c.scheduler().requested(), 2);
    }

    #[test]
    fn test_scrub_clamps() {
        let mut c = loaded(goal_clip());
        c.scrub(-7);
        assert_eq!(c.current_frame_index(), 0);
        c.scrub(99);
        assert_eq!(c.current_frame_index(), 4);
        assert_eq!(c.state(), PlayerState::Paused);
        // Scrubbing onto the goal frame fires it
        assert_eq!(c.sink().goal_frames(), vec![4]);
    }

    #[test]
    fn test_scrub_window_respects_capacity() {
        let mut config = PlaybackConfig::default();
        config.trail_capacity = 3;
        let mut c =
            PlaybackController::new(config, RecordingSink::new(), ManualScheduler::new()).unwrap();
        c.load(long_clip(20)).unwrap();
        c.scrub(10);
        let frames: Vec<_> = c.trail().iter().map(|p| p.frame_index).collect();
        assert_eq!(frames, vec![8, 9, 10]);
    }

    #[test]
    fn test_restart_resets_trail_and_goal() {
        let mut c = loaded(goal_clip());
        c.play();
        run_to_end(&mut c);
        assert!(c.goal_state().is_fired());

        c.restart();
        assert_eq!(c.state(), PlayerState::Ready);
        assert_eq!(c.current_frame_index(), 0);
        assert!(c.trail().is_empty());
        assert_eq!(c.goal_state(), GoalState::Pending);

        c.sink_mut().clear();
        c.play();
        run_to_end(&mut c);
        assert_eq!(c.sink().goal_frames(), vec![4]);
    }

    #[test]
    fn test_replay_without_restart_does_not_refire() {
        let mut c = loaded(goal_clip());
        c.play();
        run_to_end(&mut c);

        // Play from the end rewinds but keeps the goal state
        c.sink_mut().clear();
        c.play();
        assert_eq!(c.sink().commands()[0].frame_index, 0);
        run_to_end(&mut c);
        assert!(c.sink().goal_frames().is_empty());
        assert_eq!(c.current_frame_index(), 4);
    }

    #[test]
    fn test_step_back() {
        let mut c = loaded(goal_clip());
        c.scrub(3);
        c.step_back();
        assert_eq!(c.current_frame_index(), 2);
        c.scrub(0);
        c.step_back();
        assert_eq!(c.current_frame_index(), 0);
        assert_eq!(c.sink().commands().last().unwrap().cause, RenderCause::Scrub);
    }

    #[test]
    fn test_toggle() {
        let mut c = loaded(goal_clip());
        c.toggle();
        assert!(c.is_playing());
        c.toggle();
        assert_eq!(c.state(), PlayerState::Paused);
    }

    #[test]
    fn test_set_speed() {
        let mut c = loaded(goal_clip());
        c.set_speed(2.0);
        assert_eq!(c.speed(), 2.0);
        c.set_speed(-1.0);
        assert_eq!(c.speed(), 2.0);
        c.set_speed(1000.0);
        assert_eq!(c.speed(), 8.0);
        assert_eq!(c.sink().last_transport().unwrap().speed, 8.0);

        // A fresh load resets the speed
        c.load(goal_clip()).unwrap();
        assert_eq!(c.speed(), 1.0);
    }

    #[test]
    fn test_speed_change_while_playing_does_not_skip() {
        let mut c = loaded(long_clip(100));
        c.play();
        let mut now = Duration::ZERO;
        for _ in 0..20 {
            c.pump(now);
            now += Duration::from_micros(16_667);
        }
        c.set_speed(4.0);
        assert!(c.is_playing());
        let frames: Vec<_> = c.sink().commands().iter().map(|cmd| cmd.frame_index).collect();
        for _ in 0..20 {
            c.pump(now);
            now += Duration::from_micros(16_667);
        }
        let after: Vec<_> = c.sink().commands().iter().map(|cmd| cmd.frame_index).collect();
        // Still one frame at a time
        for pair in after[frames.len() - 1..].windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
    }

    // P4: frames advanced scale linearly with speed
    #[test]
    fn test_speed_linearity() {
        for (speed, expected) in [(0.5, 15i64), (1.0, 30), (2.0, 60)] {
            let mut c = loaded(long_clip(500));
            c.set_speed(speed);
            c.play();
            let start = c.current_frame_index();
            for i in 0..=60u64 {
                c.pump(Duration::from_micros(i * 16_667));
            }
            let advanced = (c.current_frame_index() - start) as i64;
            assert!(
                (advanced - expected).abs() <= 1,
                "speed {} advanced {} frames",
                speed,
                advanced
            );
        }
    }

    #[test]
    fn test_frames_without_puck() {
        let raw = vec![
            RawFrame::new(0.0).with_puck(raw_x(100.0), 510.0),
            RawFrame::new(0.1).with_skater("5", 0.0, 0.0, "TOR", "5"),
            RawFrame::new(0.2).with_puck(raw_x(195.0), 510.0),
        ];
        let mut c = loaded(raw);
        c.step();
        let cmd = c.sink().commands().last().unwrap();
        assert!(cmd.puck.is_none());
        // Only the first frame's puck is in the trail
        assert_eq!(c.trail().latest().unwrap().frame_index, 0);

        c.step();
        assert_eq!(c.sink().goal_frames(), vec![2]);
    }

    #[test]
    fn test_render_carries_normalized_positions() {
        let mut c = loaded(goal_clip());
        c.scrub(1);
        let cmd = c.sink().commands().last().unwrap();
        let puck = cmd.puck.unwrap();
        assert!((puck.x - 130.0).abs() < 1e-9);
        assert!((puck.y - 42.5).abs() < 1e-9);
        assert_eq!(cmd.total_frames, 5);
        assert!((cmd.elapsed_seconds - 1.0 / 30.0).abs() < 1e-9);
        assert!((cmd.skaters[0].position.x - 150.0).abs() < 1e-9);
        assert_eq!(cmd.skaters[0].jersey_number, "97");
        assert_eq!(cmd.trail.last().unwrap().frame_index, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlaybackConfig::default();
        config.frame_rate = -1.0;
        assert!(
            PlaybackController::new(config, RecordingSink::new(), ManualScheduler::new()).is_err()
        );

        // Starting speed outside the speed bounds
        let mut config = PlaybackConfig::default();
        config.max_speed = 2.0;
        config.default_speed = 5.0;
        assert!(
            PlaybackController::new(config, RecordingSink::new(), ManualScheduler::new()).is_err()
        );
    }

    // P1: the first frame inside the net fires; later ones do not
    #[test]
    fn test_goal_fires_at_first_frame_in_net() {
        let xs = [150.0, 180.0, 190.0, 195.0, 199.0];
        let raw = xs
            .iter()
            .enumerate()
            .map(|(i, x)| RawFrame::new(i as f64 / 30.0).with_puck(raw_x(*x), 510.0))
            .collect();
        let mut c = loaded(raw);
        c.play();
        run_to_end(&mut c);
        assert_eq!(c.sink().goal_frames(), vec![2]);
        assert_eq!(c.goal_state().fired_at_frame(), Some(2));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Play,
        Pause,
        Step,
        StepBack,
        Restart,
        Scrub(i64),
        Speed(f64),
        Pump(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Play),
            Just(Op::Pause),
            Just(Op::Step),
            Just(Op::StepBack),
            Just(Op::Restart),
            (-50i64..80).prop_map(Op::Scrub),
            (-2.0f64..10.0).prop_map(Op::Speed),
            (0u64..200).prop_map(Op::Pump),
        ]
    }

    use proptest::prelude::*;

    proptest! {
        // P2 and P5 under arbitrary control sequences
        #[test]
        fn prop_controls_keep_invariants(
            frames in 1usize..40,
            capacity in 1usize..12,
            ops in proptest::collection::vec(op_strategy(), 0..60),
        ) {
            let mut config = PlaybackConfig::default();
            config.trail_capacity = capacity;
            let mut c = PlaybackController::new(config, RecordingSink::new(), ManualScheduler::new())
                .unwrap();
            c.load(long_clip(frames)).unwrap();
            prop_assert!(c.trail().is_empty());

            let mut now = Duration::ZERO;
            for op in ops {
                match op {
                    Op::Play => c.play(),
                    Op::Pause => c.pause(),
                    Op::Step => c.step(),
                    Op::StepBack => c.step_back(),
                    Op::Restart => {
                        c.restart();
                        prop_assert!(c.trail().is_empty());
                        prop_assert_eq!(c.goal_state(), GoalState::Pending);
                    }
                    Op::Scrub(i) => {
                        c.scrub(i);
                        let expected = i.clamp(0, frames as i64 - 1) as usize;
                        prop_assert_eq!(c.current_frame_index(), expected);
                        prop_assert_eq!(c.state(), PlayerState::Paused);
                    }
                    Op::Speed(s) => c.set_speed(s),
                    Op::Pump(ms) => {
                        now += Duration::from_millis(ms);
                        c.pump(now);
                    }
                }
                prop_assert!(c.trail().len() <= capacity);
                prop_assert!(c.current_frame_index() < frames);
                prop_assert!(c.speed() >= 0.1 && c.speed() <= 8.0);
                // At most one callback outstanding, and only while playing
                prop_assert_eq!(c.scheduler().pending().is_some(), c.is_playing());
            }
        }
    }
}
