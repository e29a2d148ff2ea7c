//! Run result data model.

use super::config::Action;
use super::entry::{EntryStatus, ResolvedEntry};
use serde::{Deserialize, Serialize};

/// Batch-level state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

/// Summary of a finished (or cancelled) batch.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Unique run ID.
    pub run_id: String,
    /// Action the batch was configured with.
    pub action: Action,
    /// Final batch state.
    pub state: BatchState,
    /// Start timestamp (RFC 3339).
    pub started_at: String,
    /// Finish timestamp (RFC 3339).
    pub finished_at: String,
    /// Entries that completed successfully.
    pub succeeded: usize,
    /// Entries that were skipped.
    pub skipped: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Entries in processing order.
    pub entries: Vec<ResolvedEntry>,
}

impl RunResult {
    /// Total number of entries.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state == BatchState::Cancelled
    }

    /// Entries with `Failed` status.
    pub fn failures(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
    }

    /// Recount the counters from the entry list.
    pub(crate) fn tally(&mut self) {
        self.succeeded = 0;
        self.skipped = 0;
        self.failed = 0;
        for entry in &self.entries {
            match entry.status {
                EntryStatus::Success => self.succeeded += 1,
                EntryStatus::Skipped => self.skipped += 1,
                EntryStatus::Failed => self.failed += 1,
                EntryStatus::Pending => {}
            }
        }
    }
}
