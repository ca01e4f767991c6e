//! Error types for puckplay-loader

use puckplay_core::ParseError;
use thiserror::Error;

/// Loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid frame data: {0}")]
    Frames(#[from] ParseError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Goal clip not found: {0}")]
    ClipNotFound(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
