//! Error types for kiez-tc
//!
//! Errors are `Clone` because one transcode outcome is delivered to every
//! caller waiting on the same cache entry.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Transcoding cache errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    /// Source file does not exist; detected before launching the transcoder
    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Cache directory could not be created
    #[error("Failed to create cache directory {}: {reason}", .path.display())]
    DirectoryCreation { path: PathBuf, reason: String },

    /// Transcoder exited non-zero or could not be launched
    #[error("Transcoding failed (exit code {exit_code:?}): {diagnostics}")]
    TranscodeFailure {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    /// Waiting for the transcode exceeded the configured ceiling
    #[error("Transcode of {} did not finish within {after:?}", .output.display())]
    Timeout { output: PathBuf, after: Duration },

    /// Worker ended without publishing an outcome
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using TranscodeError
pub type Result<T> = std::result::Result<T, TranscodeError>;
