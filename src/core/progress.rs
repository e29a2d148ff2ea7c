//! Progress reporting.
//!
//! The engine calls a [`ProgressSink`] synchronously after every entry and
//! once when the batch ends. Sinks that hand events to another thread do so
//! on their own.

use crate::models::entry::{EntryDetail, EntryStatus, ResolvedEntry};
use crate::models::result::RunResult;
use std::path::PathBuf;

/// One entry reached its final status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Zero-based position in processing order.
    pub index: usize,
    /// Number of entries in the batch.
    pub total: usize,
    /// Source file.
    pub source: PathBuf,
    /// Destination, when one was determined.
    pub final_path: Option<PathBuf>,
    /// Final status.
    pub status: EntryStatus,
    /// Skip or failure detail.
    pub detail: Option<EntryDetail>,
}

impl ProgressEvent {
    pub(crate) fn from_entry(index: usize, total: usize, entry: &ResolvedEntry) -> Self {
        Self {
            index,
            total,
            source: entry.candidate.source_path.clone(),
            final_path: entry.final_path.clone(),
            status: entry.status,
            detail: entry.detail.clone(),
        }
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    /// Called after each entry reaches a final status.
    fn on_entry(&mut self, event: &ProgressEvent);

    /// Called once with the complete result.
    fn on_finished(&mut self, _result: &RunResult) {}
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_entry(&mut self, _event: &ProgressEvent) {}
}

/// Sink that keeps every event.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub events: Vec<ProgressEvent>,
    pub finished: bool,
}

impl ProgressSink for CollectingSink {
    fn on_entry(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }

    fn on_finished(&mut self, _result: &RunResult) {
        self.finished = true;
    }
}

/// Sink that writes one log line per entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_entry(&mut self, event: &ProgressEvent) {
        let target = event
            .final_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        match (&event.status, &event.detail) {
            (EntryStatus::Failed, Some(detail)) => tracing::error!(
                "[{}/{}] {} -> {}: {}",
                event.index + 1,
                event.total,
                event.source.display(),
                target,
                detail
            ),
            (status, Some(detail)) => tracing::info!(
                "[{}/{}] {} {} ({})",
                event.index + 1,
                event.total,
                status,
                event.source.display(),
                detail
            ),
            (status, None) => tracing::info!(
                "[{}/{}] {} {} -> {}",
                event.index + 1,
                event.total,
                status,
                event.source.display(),
                target
            ),
        }
    }

    fn on_finished(&mut self, result: &RunResult) {
        tracing::info!(
            "Finished ({:?}): {} succeeded, {} skipped, {} failed",
            result.state,
            result.succeeded,
            result.skipped,
            result.failed
        );
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn on_entry(&mut self, event: &ProgressEvent) {
        (**self).on_entry(event);
    }

    fn on_finished(&mut self, result: &RunResult) {
        (**self).on_finished(result);
    }
}
