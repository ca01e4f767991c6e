//! Rink Viewer
//!
//! A console goal replay viewer built on the puckplay engine.
//! - Clip loaded from a JSON/RON file or a goal id in the data directory
//! - Puck trail fades from oldest to newest
//! - Goal banner when the puck first crosses a goal line inside the mouth
//!
//! Usage: `rink_viewer [CLIP_FILE | GOAL_ID] [CONFIG.ron]`

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use puckplay_core::{PlaybackConfig, RawFrame};
use puckplay_loader::{ClipLibrary, SAMPLE_CLIP};
use puckplay_player::{
    ManualScheduler, PlaybackController, PlayerState, RenderCommand, RenderSink, SpeedPreset,
    TrailStyle, TransportStatus,
};
use std::io::{stdout, Stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Character grid the rink is drawn into
const GRID_COLS: usize = 100;
const GRID_ROWS: usize = 22;
/// Frames skipped by the arrow keys
const SCRUB_JUMP: i64 = 10;
/// How long the goal banner stays up
const GOAL_BANNER: Duration = Duration::from_millis(1500);

/// Render sink that keeps the latest frame for the draw loop
#[derive(Default)]
struct TerminalSink {
    frame: Option<RenderCommand>,
    status: Option<TransportStatus>,
    goal_at: Option<Instant>,
    dirty: bool,
}

impl RenderSink for TerminalSink {
    fn render(&mut self, command: &RenderCommand) {
        if command.goal_just_fired {
            self.goal_at = Some(Instant::now());
        }
        self.frame = Some(command.clone());
        self.dirty = true;
    }

    fn transport(&mut self, status: &TransportStatus) {
        self.status = Some(*status);
        self.dirty = true;
    }
}

type Viewer = PlaybackController<TerminalSink, ManualScheduler>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.get(1) {
        Some(path) => PlaybackConfig::load(path)?,
        None => PlaybackConfig::default(),
    };
    let (title, frames) = load_clip(args.first().map(String::as_str), &config)?;

    let mut viewer = PlaybackController::new(config, TerminalSink::default(), ManualScheduler::new())?;
    viewer.load(frames)?;

    // Initialize terminal
    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run_viewer(&mut stdout, &mut viewer, &title);

    // Restore terminal
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn load_clip(
    arg: Option<&str>,
    config: &PlaybackConfig,
) -> Result<(String, Vec<RawFrame>), Box<dyn std::error::Error>> {
    if let Some(arg) = arg {
        if Path::new(arg).is_file() {
            return Ok((arg.to_string(), puckplay_loader::read_frames(arg)?));
        }
    }

    // Try multiple paths for the data directory
    let dirs = ["demos/rink_viewer/data", "data", "../data"];
    let dir = dirs
        .iter()
        .find(|d| Path::new(d).is_dir())
        .ok_or("Could not find the clip data directory")?;

    let library = ClipLibrary::with_config(*dir, config.clone());
    let clip = library.load(arg.unwrap_or(SAMPLE_CLIP))?;
    let title = if clip.meta.from_sample {
        format!("{} (sample data)", clip.goal_id)
    } else {
        clip.goal_id
    };
    Ok((title, clip.frames))
}

fn run_viewer(
    stdout: &mut Stdout,
    viewer: &mut Viewer,
    title: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();

    loop {
        // Check for input (non-blocking)
        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(key_event) = event::read()? {
                match key_event.code {
                    KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Char(' ') => viewer.toggle(),
                    KeyCode::Char('s') => viewer.step(),
                    KeyCode::Char('b') => viewer.step_back(),
                    KeyCode::Char('r') => viewer.restart(),
                    KeyCode::Right => {
                        viewer.scrub(viewer.current_frame_index() as i64 + SCRUB_JUMP)
                    }
                    KeyCode::Left => {
                        viewer.scrub(viewer.current_frame_index() as i64 - SCRUB_JUMP)
                    }
                    KeyCode::Home => viewer.scrub(0),
                    KeyCode::End => viewer.scrub(i64::MAX),
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        let preset = SpeedPreset::nearest(viewer.speed()).faster();
                        viewer.set_speed(preset.multiplier());
                    }
                    KeyCode::Char('-') => {
                        let preset = SpeedPreset::nearest(viewer.speed()).slower();
                        viewer.set_speed(preset.multiplier());
                    }
                    _ => {}
                }
            }
        }

        // Host animation callback
        viewer.pump(started.elapsed());

        let banner_expired = viewer
            .sink()
            .goal_at
            .is_some_and(|at| at.elapsed() >= GOAL_BANNER);
        if banner_expired {
            let sink = viewer.sink_mut();
            sink.goal_at = None;
            sink.dirty = true;
        }

        if viewer.sink().dirty {
            draw(stdout, viewer, title)?;
            viewer.sink_mut().dirty = false;
        }
    }
}

fn draw(stdout: &mut Stdout, viewer: &Viewer, title: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sink = viewer.sink();
    let config = viewer.config();
    let (width, height) = (config.rink.width, config.rink.height);

    let to_cell = |x: f64, y: f64| -> (usize, usize) {
        let col = (x / width * (GRID_COLS - 1) as f64).round() as usize;
        // Screen rows grow downward
        let row = ((1.0 - y / height) * (GRID_ROWS - 1) as f64).round() as usize;
        (col.min(GRID_COLS - 1), row.min(GRID_ROWS - 1))
    };

    let mut grid = vec![vec![(' ', Color::Reset); GRID_COLS]; GRID_ROWS];

    // Goal lines and mouths
    let goal = config.goal;
    for x in [goal.left_goal_line, goal.right_goal_line] {
        let (col, _) = to_cell(x, 0.0);
        for row in grid.iter_mut() {
            row[col] = ('|', Color::DarkRed);
        }
        let (_, top) = to_cell(x, goal.mouth_top);
        let (_, bottom) = to_cell(x, goal.mouth_bottom);
        for row in grid.iter_mut().take(bottom + 1).skip(top) {
            row[col] = ('#', Color::Red);
        }
    }
    let (center, _) = to_cell(width / 2.0, 0.0);
    for row in grid.iter_mut() {
        row[center] = (':', Color::DarkBlue);
    }

    if let Some(frame) = &sink.frame {
        let total = frame.trail.len();
        for (rank, point) in frame.trail.iter().take(total.saturating_sub(1)).enumerate() {
            let style = TrailStyle::for_rank(rank, total.saturating_sub(1));
            let (col, row) = to_cell(point.x, point.y);
            let glyph = if style.opacity > 0.4 { 'o' } else { '.' };
            grid[row][col] = (glyph, Color::Grey);
        }
        for skater in &frame.skaters {
            let (col, row) = to_cell(skater.position.x, skater.position.y);
            let color = team_color(&skater.team_code);
            let mut chars = skater.jersey_number.chars();
            if let Some(c) = chars.next() {
                grid[row][col] = (c, color);
            }
            if let Some(c) = chars.next() {
                if col + 1 < GRID_COLS {
                    grid[row][col + 1] = (c, color);
                }
            }
        }
        if let Some(puck) = frame.puck {
            let (col, row) = to_cell(puck.x, puck.y);
            grid[row][col] = ('@', Color::White);
        }
    }

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(format!("  Goal replay: {}\r\n", title)),
        ResetColor
    )?;

    let border = format!("  +{}+\r\n", "-".repeat(GRID_COLS));
    queue!(stdout, Print(&border))?;
    for row in &grid {
        queue!(stdout, Print("  |"))?;
        for (c, color) in row {
            queue!(stdout, SetForegroundColor(*color), Print(c))?;
        }
        queue!(stdout, ResetColor, Print("|\r\n"))?;
    }
    queue!(stdout, Print(&border))?;

    if let Some(status) = &sink.status {
        let state = match status.state {
            PlayerState::Idle => "idle",
            PlayerState::Ready => "ready",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
        };
        let frame_no = if status.total_frames == 0 {
            0
        } else {
            status.frame_index + 1
        };
        queue!(
            stdout,
            Print(format!(
                "  {:>7}  frame {:>4}/{:<4}  {:>6.2}s / {:.2}s  speed {}x\r\n",
                state,
                frame_no,
                status.total_frames,
                status.elapsed_seconds,
                status.duration_seconds,
                status.speed
            )),
            Print(format!("  {}\r\n", progress_bar(status, GRID_COLS)))
        )?;
    }

    if sink.goal_at.is_some() {
        queue!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print("\r\n                                   *** GOAL! ***\r\n"),
            ResetColor
        )?;
    } else {
        queue!(stdout, Print("\r\n\r\n"))?;
    }

    queue!(
        stdout,
        SetForegroundColor(Color::DarkGrey),
        Print("\r\n  [space] play/pause  [s] step  [b] back  [<-/->] scrub  [+/-] speed  [r] restart  [q] quit\r\n"),
        ResetColor
    )?;

    stdout.flush()?;
    Ok(())
}

fn progress_bar(status: &TransportStatus, width: usize) -> String {
    let filled = if status.total_frames > 1 {
        status.frame_index * width / (status.total_frames - 1)
    } else {
        width
    };
    format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled.min(width)))
}

fn team_color(team_code: &str) -> Color {
    // Stable per-team color from the abbreviation
    let palette = [Color::Blue, Color::Green, Color::Magenta, Color::Yellow];
    let hash = team_code.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    palette[hash % palette.len()]
}
