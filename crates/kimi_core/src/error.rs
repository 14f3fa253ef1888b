//! Error types for kimi_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kimi_core operations.
#[derive(Error, Debug)]
pub enum KimiError {
    /// The requested session does not exist on disk.
    #[error("session not found: {id}")]
    SessionNotFound {
        /// Session identifier that was looked up.
        id: String,
    },

    /// Session id generation kept colliding with existing sessions.
    #[error("failed to generate a unique session id after {attempts} attempts")]
    SessionIdExhausted {
        /// Number of generation attempts made.
        attempts: u32,
    },

    /// The user's home directory could not be determined.
    #[error("could not determine home directory")]
    HomeDirNotFound,

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Serialization error for on-disk documents.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file operations.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was touching.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl KimiError {
    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type for kimi_core operations.
pub type Result<T> = std::result::Result<T, KimiError>;
