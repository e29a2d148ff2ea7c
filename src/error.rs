//! Error types for the media copier.

use crate::models::entry::DetailKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media copier.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Pattern is empty")]
    EmptyPattern,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Pattern errors
    #[error("Unterminated directive at end of pattern: {0}")]
    UnterminatedDirective(String),

    #[error("Unknown directive '%{code}' at position {position}")]
    UnknownDirective { code: char, position: usize },

    #[error("Rendered path is not usable: {0}")]
    InvalidRenderedPath(String),

    // Per-entry errors
    #[error("Timestamp not representable: {0}")]
    Timestamp(String),

    #[error("No free destination name for {path} after {attempts} attempts")]
    CollisionUnresolved { path: PathBuf, attempts: usize },

    #[error("Copied to {destination} but could not remove source {source_path}: {cause}")]
    SourceNotRemoved {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("Checksum mismatch after copying to {0}")]
    ChecksumMismatch(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EXIF error: {0}")]
    Exif(#[from] exif::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Category recorded on a failed entry.
    pub fn detail_kind(&self) -> DetailKind {
        match self {
            Error::Timestamp(_) => DetailKind::Timestamp,
            Error::EmptyPattern
            | Error::UnterminatedDirective(_)
            | Error::UnknownDirective { .. }
            | Error::InvalidRenderedPath(_) => DetailKind::Render,
            Error::CollisionUnresolved { .. } => DetailKind::CollisionUnresolved,
            Error::SourceNotRemoved { .. } => DetailKind::SourceNotRemoved,
            Error::Cancelled => DetailKind::Cancelled,
            _ => DetailKind::Io,
        }
    }
}
