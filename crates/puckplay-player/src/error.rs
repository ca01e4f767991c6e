//! Error types for puckplay-player

use puckplay_core::ParseError;
use thiserror::Error;

/// Player error type
#[derive(Debug, Error)]
pub enum Error {
    /// Frame data rejected at load
    #[error("Load error: {0}")]
    Load(#[from] ParseError),

    /// Configuration or frame-store error from the core crate
    #[error("Core error: {0}")]
    Core(#[from] puckplay_core::Error),

    /// Export error
    #[error("Export error: {0}")]
    ExportError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, Error>;
