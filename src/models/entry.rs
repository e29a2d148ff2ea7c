//! Resolved entry data model.

use super::candidate::Candidate;
use crate::core::timestamp::CalendarTimestamp;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Status of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Success,
    Skipped,
    Failed,
}

impl EntryStatus {
    /// Whether the entry reached a final status.
    pub fn is_terminal(self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Pending => write!(f, "pending"),
            EntryStatus::Success => write!(f, "success"),
            EntryStatus::Skipped => write!(f, "skipped"),
            EntryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Why an entry was skipped or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    /// Destination exists and is not older than the source.
    UpToDate,
    /// Destination already holds identical content.
    Duplicate,
    /// Not started because the batch was cancelled.
    Cancelled,
    Timestamp,
    Render,
    CollisionUnresolved,
    Io,
    /// Move copied the file but left the source behind.
    SourceNotRemoved,
}

impl std::fmt::Display for DetailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DetailKind::UpToDate => "up to date",
            DetailKind::Duplicate => "duplicate",
            DetailKind::Cancelled => "cancelled",
            DetailKind::Timestamp => "timestamp error",
            DetailKind::Render => "render error",
            DetailKind::CollisionUnresolved => "unresolved collision",
            DetailKind::Io => "io error",
            DetailKind::SourceNotRemoved => "source not removed",
        };
        f.write_str(name)
    }
}

/// Detail attached to a skipped or failed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDetail {
    /// Category.
    pub kind: DetailKind,
    /// Human readable message.
    pub message: String,
}

impl EntryDetail {
    pub fn new(kind: DetailKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&crate::Error> for EntryDetail {
    fn from(err: &crate::Error) -> Self {
        Self::new(err.detail_kind(), err.to_string())
    }
}

impl std::fmt::Display for EntryDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// A candidate annotated with its computed destination and outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEntry {
    /// Source file.
    pub candidate: Candidate,
    /// Calendar timestamp in the configured basis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<CalendarTimestamp>,
    /// Path rendered from the pattern, relative to the destination root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_path: Option<PathBuf>,
    /// Destination path after collision handling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_path: Option<PathBuf>,
    /// Entry status.
    pub status: EntryStatus,
    /// Skip or failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<EntryDetail>,
}

impl ResolvedEntry {
    /// Create a pending entry for a candidate.
    pub fn pending(candidate: Candidate) -> Self {
        Self {
            candidate,
            timestamp: None,
            rendered_path: None,
            final_path: None,
            status: EntryStatus::Pending,
            detail: None,
        }
    }

    pub(crate) fn succeed(&mut self) {
        self.status = EntryStatus::Success;
        self.detail = None;
    }

    pub(crate) fn skip(&mut self, detail: EntryDetail) {
        self.status = EntryStatus::Skipped;
        self.detail = Some(detail);
    }

    pub(crate) fn fail(&mut self, err: &crate::Error) {
        self.status = EntryStatus::Failed;
        self.detail = Some(EntryDetail::from(err));
    }
}
