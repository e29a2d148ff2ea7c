//! Candidate data model.

use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A discovered source file that has not been processed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Full path to the source file.
    pub source_path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Raw modification instant, independent of any time basis.
    #[serde(serialize_with = "serialize_instant")]
    pub modification_time: SystemTime,
    /// Capture instant from photo metadata, when the file has one.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_instant"
    )]
    pub capture_time: Option<SystemTime>,
}

impl Candidate {
    /// Create a candidate from already known values.
    pub fn new(source_path: impl Into<PathBuf>, size: u64, modification_time: SystemTime) -> Self {
        Self {
            source_path: source_path.into(),
            size,
            modification_time,
            capture_time: None,
        }
    }

    /// Attach a capture time read from metadata.
    pub fn with_capture_time(mut self, capture_time: Option<SystemTime>) -> Self {
        self.capture_time = capture_time;
        self
    }

    /// Create a candidate by reading the file's metadata.
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(crate::Error::other(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }
        Ok(Self {
            source_path: path.to_path_buf(),
            size: metadata.len(),
            modification_time: metadata.modified()?,
            capture_time: crate::core::metadata::read_capture_time(path),
        })
    }

    /// Instant the destination is rendered from: the capture time when
    /// known, otherwise the modification time.
    pub fn timestamp(&self) -> SystemTime {
        self.capture_time.unwrap_or(self.modification_time)
    }

    /// File name without the extension.
    pub fn base_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Extension without the leading dot, or an empty string.
    pub fn extension(&self) -> String {
        self.source_path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Serialize a `SystemTime` as RFC 3339, or `null` when chrono cannot represent it.
pub(crate) fn serialize_instant<S: Serializer>(
    instant: &SystemTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let formatted = crate::core::timestamp::to_utc(*instant)
        .ok()
        .map(|dt| dt.to_rfc3339());
    formatted.serialize(serializer)
}

fn serialize_optional_instant<S: Serializer>(
    instant: &Option<SystemTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match instant {
        Some(instant) => serialize_instant(instant, serializer),
        None => serializer.serialize_none(),
    }
}
