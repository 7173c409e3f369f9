//! Centralized error types for notemime.
//!
//! Decoding a note never fails: malformed input degrades field by field.
//! These errors cover the surrounding operations (reading and writing
//! files, parsing raw bytes into a message tree, serializing metadata).

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the notemime library.
#[derive(Error, Debug)]
pub enum NoteError {
    /// I/O error with the associated file path.
    #[error("I/O error accessing '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Note file not found: {0}")]
    FileNotFound(PathBuf),

    /// The bytes could not be parsed as an RFC 5322 message.
    #[error("MIME error: {0}")]
    Mime(String),

    /// The metadata markup could not be read or written.
    #[error("Markup error at line {line}, column {column}: {reason}")]
    Markup {
        line: usize,
        column: usize,
        reason: String,
    },

    /// An invalid path was provided.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The configuration file or a configured value is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias for `Result<T, NoteError>`.
pub type Result<T> = std::result::Result<T, NoteError>;

impl NoteError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Markup` variant without position information.
    pub fn markup(reason: impl Into<String>) -> Self {
        Self::Markup {
            line: 0,
            column: 0,
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `NoteError::io`).
impl From<std::io::Error> for NoteError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
