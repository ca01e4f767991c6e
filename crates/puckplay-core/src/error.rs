//! Error types for puckplay-core

use thiserror::Error;

/// Load-time validation failure
///
/// Any of these rejects the whole frame sequence; no partial store is built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Frame sequence is empty")]
    Empty,

    #[error("Frame {frame}: missing required field `{field}`")]
    MissingField { frame: usize, field: String },

    #[error("Frame {frame}: invalid value for `{field}`: {reason}")]
    InvalidField {
        frame: usize,
        field: String,
        reason: String,
    },

    #[error("Frame {frame}: time {current}s is earlier than previous frame time {previous}s")]
    NonMonotonicTime {
        frame: usize,
        previous: f64,
        current: f64,
    },

    #[error("Frame {frame}: ordinal {current} does not follow previous ordinal {previous}")]
    NonMonotonicOrdinal {
        frame: usize,
        previous: u64,
        current: u64,
    },
}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Frame index {index} out of range (frame count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
