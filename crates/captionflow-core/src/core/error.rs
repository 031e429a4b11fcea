//! CaptionFlow Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

/// Errors that terminate a subtitle load
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),
}

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Ingestion Errors
    // =========================================================================
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Returns the parse error if this failure came from ingestion
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}
