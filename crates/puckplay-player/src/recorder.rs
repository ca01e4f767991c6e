//! Record render output and export it to various formats

use crate::sink::{RenderCommand, RenderSink, TransportStatus};
use crate::{Error, Result};
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format (one row per render, puck only)
    Csv,
    /// Human-readable text format
    Text,
}

/// Render sink that keeps everything it receives
///
/// Used by tests and headless runs to inspect or export a playback session.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Vec<RenderCommand>,
    transports: Vec<TransportStatus>,
}

impl RecordingSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All render commands, in emission order
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// All transport updates, in emission order
    pub fn transports(&self) -> &[TransportStatus] {
        &self.transports
    }

    pub fn last_command(&self) -> Option<&RenderCommand> {
        self.commands.last()
    }

    pub fn last_transport(&self) -> Option<&TransportStatus> {
        self.transports.last()
    }

    /// Frame index of every render, in order
    pub fn frame_indices(&self) -> Vec<usize> {
        self.commands.iter().map(|c| c.frame_index).collect()
    }

    /// Frames whose render carried the goal trigger
    pub fn goal_frames(&self) -> Vec<usize> {
        self.commands
            .iter()
            .filter(|c| c.goal_just_fired)
            .map(|c| c.frame_index)
            .collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
        self.transports.clear();
    }

    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(e.to_string()))?;
        Ok(())
    }

    /// Export to RON format
    pub fn to_ron(&self) -> Result<String> {
        let export = ExportData::from_recording(self);
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Export to JSON format
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String> {
        let export = ExportData::from_recording(self);
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// Export to CSV: one row per render with the puck position
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("frame,elapsed,cause,puck_x,puck_y,trail_len,goal\n");

        for cmd in &self.commands {
            let (x, y) = cmd
                .puck
                .map(|p| (format!("{:.3}", p.x), format!("{:.3}", p.y)))
                .unwrap_or_default();
            output.push_str(&format!(
                "{},{:.3},{:?},{},{},{},{}\n",
                cmd.frame_index,
                cmd.elapsed_seconds,
                cmd.cause,
                x,
                y,
                cmd.trail.len(),
                cmd.goal_just_fired
            ));
        }

        output
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("=== Playback Recording ===\n\n");
        output.push_str(&format!("Renders: {}\n", self.commands.len()));
        output.push_str(&format!("Transport updates: {}\n", self.transports.len()));
        if let (Some(first), Some(last)) = (self.commands.first(), self.commands.last()) {
            output.push_str(&format!(
                "Frame range: {} - {}\n",
                first.frame_index, last.frame_index
            ));
        }
        let goals = self.goal_frames();
        if !goals.is_empty() {
            output.push_str(&format!("Goal at frame: {:?}\n", goals));
        }

        output.push_str("\n=== Renders ===\n\n");

        for cmd in &self.commands {
            output.push_str(&format!(
                "  #{}/{} t={:.2}s {:?}",
                cmd.frame_index, cmd.total_frames, cmd.elapsed_seconds, cmd.cause
            ));
            match cmd.puck {
                Some(p) => output.push_str(&format!(" puck=({:.1}, {:.1})", p.x, p.y)),
                None => output.push_str(" puck=-"),
            }
            output.push_str(&format!(" skaters={}", cmd.skaters.len()));
            if cmd.goal_just_fired {
                output.push_str(" [GOAL]");
            }
            output.push('\n');
        }

        output
    }

    /// Export only renders whose frame index lies in `start..=end`
    pub fn export_range(&self, start: usize, end: usize, format: ExportFormat) -> Result<String> {
        let filtered = FilteredExport {
            commands: self
                .commands
                .iter()
                .filter(|c| (start..=end).contains(&c.frame_index))
                .cloned()
                .collect(),
        };

        match format {
            ExportFormat::Ron => {
                ron::ser::to_string_pretty(&filtered, ron::ser::PrettyConfig::default())
                    .map_err(|e| Error::Serialization(e.to_string()))
            }
            #[cfg(feature = "serde_json")]
            ExportFormat::Json => serde_json::to_string_pretty(&filtered)
                .map_err(|e| Error::Serialization(e.to_string())),
            #[cfg(not(feature = "serde_json"))]
            ExportFormat::Json => Err(Error::ExportError(
                "JSON export requires the 'serde_json' feature".to_string(),
            )),
            _ => Err(Error::ExportError(
                "Range export only supports RON and JSON".to_string(),
            )),
        }
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, command: &RenderCommand) {
        self.commands.push(command.clone());
    }

    fn transport(&mut self, status: &TransportStatus) {
        self.transports.push(*status);
    }
}

/// Data structure for full recording export
#[derive(Debug, Clone, Serialize)]
struct ExportData {
    version: u32,
    render_count: usize,
    goal_frames: Vec<usize>,
    final_status: Option<TransportStatus>,
    commands: Vec<RenderCommand>,
}

impl ExportData {
    fn from_recording(recording: &RecordingSink) -> Self {
        Self {
            version: 1,
            render_count: recording.commands.len(),
            goal_frames: recording.goal_frames(),
            final_status: recording.last_transport().copied(),
            commands: recording.commands.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct FilteredExport {
    commands: Vec<RenderCommand>,
}
