//! Goal clips: frame files stored per goal id in a data directory

use crate::error::{Error, Result};
use crate::loader;
use puckplay_core::{PlaybackConfig, RawFrame};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File consulted when a goal id has no clip of its own
pub const SAMPLE_CLIP: &str = "sample";

/// Descriptive metadata attached to a loaded clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMeta {
    pub total_frames: usize,
    /// Source frame rate
    pub fps: f64,
    /// Normalized rink extent along x
    pub rink_width: f64,
    /// Normalized rink extent along y
    pub rink_length: f64,
    /// Whether the frames came from the sample fallback
    pub from_sample: bool,
}

/// The tracking frames of one goal plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalClip {
    pub goal_id: String,
    pub frames: Vec<RawFrame>,
    pub meta: ClipMeta,
}

/// Directory of `<goal_id>.json` / `<goal_id>.ron` clip files
///
/// Requests for unknown goals fall back to `sample.json` when it exists.
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    data_dir: PathBuf,
    config: PlaybackConfig,
}

impl ClipLibrary {
    /// Create a library over a data directory with default rink settings
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(data_dir, PlaybackConfig::default())
    }

    /// Create a library whose metadata reflects `config`
    pub fn with_config(data_dir: impl Into<PathBuf>, config: PlaybackConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    /// The directory clips are read from
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the clip for `goal_id`, or the sample clip if it has none
    pub fn load(&self, goal_id: &str) -> Result<GoalClip> {
        let (path, from_sample) = match self.clip_path(goal_id) {
            Some(path) => (path, false),
            None => {
                let sample = self
                    .clip_path(SAMPLE_CLIP)
                    .ok_or_else(|| Error::ClipNotFound(goal_id.to_string()))?;
                log::warn!("no clip for goal {}, using sample data", goal_id);
                (sample, true)
            }
        };

        let frames = loader::read_frames(&path)?;
        log::info!("loaded goal clip {} ({} frames)", goal_id, frames.len());
        Ok(GoalClip {
            goal_id: goal_id.to_string(),
            meta: ClipMeta {
                total_frames: frames.len(),
                fps: self.config.frame_rate,
                rink_width: self.config.rink.width,
                rink_length: self.config.rink.height,
                from_sample,
            },
            frames,
        })
    }

    /// Goal ids with a clip file, sorted (the sample clip is excluded)
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if loader::Format::from_path(&path).is_err() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem != SAMPLE_CLIP {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn clip_path(&self, goal_id: &str) -> Option<PathBuf> {
        // Ids are file stems; reject anything that could leave the directory.
        if goal_id.is_empty() || goal_id.contains(['/', '\\']) || goal_id.contains("..") {
            return None;
        }
        ["json", "ron"]
            .iter()
            .map(|ext| self.data_dir.join(format!("{}.{}", goal_id, ext)))
            .find(|p| p.is_file())
    }
}
