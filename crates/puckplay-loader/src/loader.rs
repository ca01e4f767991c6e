//! Frame sequence parsing from JSON and RON

use crate::error::{Error, Result};
use puckplay_core::{FrameStore, RawFrame};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Text format of a frame file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
}

impl Format {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Format::Ron),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A frame file is either a bare list or an object with a `frames` list
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameFile {
    Bare(Vec<RawFrame>),
    Wrapped { frames: Vec<RawFrame> },
}

impl FrameFile {
    fn into_frames(self) -> Vec<RawFrame> {
        match self {
            FrameFile::Bare(frames) => frames,
            FrameFile::Wrapped { frames } => frames,
        }
    }
}

/// Parse raw frame records from JSON text
pub fn parse_json(content: &str) -> Result<Vec<RawFrame>> {
    let file: FrameFile = serde_json::from_str(content)?;
    Ok(file.into_frames())
}

/// Parse raw frame records from RON text
pub fn parse_ron(content: &str) -> Result<Vec<RawFrame>> {
    let file: FrameFile = ron::from_str(content)?;
    Ok(file.into_frames())
}

/// Parse raw frame records in the given format
pub fn parse_str(content: &str, format: Format) -> Result<Vec<RawFrame>> {
    match format {
        Format::Json => parse_json(content),
        Format::Ron => parse_ron(content),
    }
}

/// Read raw frame records from a `.json` or `.ron` file
pub fn read_frames(path: impl AsRef<Path>) -> Result<Vec<RawFrame>> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let frames = parse_str(&content, format)?;
    log::debug!("read {} raw frames from {}", frames.len(), path.display());
    Ok(frames)
}

/// Read and validate a frame file into a store
pub fn load_store(path: impl AsRef<Path>) -> Result<FrameStore> {
    let raw = read_frames(path)?;
    Ok(FrameStore::load(raw)?)
}
