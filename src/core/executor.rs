//! Execution engine.
//!
//! Processes candidates one at a time in the given order:
//! - resolve the timestamp in the configured basis
//! - render the destination pattern
//! - resolve collisions against this run and the destination
//! - copy, move or simulate
//!
//! A failing entry is recorded and the batch continues. Cancellation is
//! checked before each entry; an entry that already started always runs to
//! completion.

use crate::core::collision::{
    CollisionPolicy, CollisionResolver, DestinationProbe, Disposition, FsProbe,
};
use crate::core::progress::{ProgressEvent, ProgressSink};
use crate::core::timestamp;
use crate::generators::pattern::{RenderInput, Template};
use crate::models::candidate::Candidate;
use crate::models::config::{Action, JobConfig};
use crate::models::entry::{EntryDetail, ResolvedEntry};
use crate::models::result::{BatchState, RunResult};
use crate::utils::fs as fs_utils;
use crate::Result;
use chrono::Utc;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Entries not yet started will be skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// File-organizing engine.
pub struct Engine {
    config: JobConfig,
    template: Template,
    probe: Box<dyn DestinationProbe + Send>,
    cancel: CancelToken,
    state: BatchState,
}

impl Engine {
    /// Validate the configuration and compile the pattern.
    ///
    /// Errors here are fatal: no entry has been touched yet.
    pub fn new(config: JobConfig) -> Result<Self> {
        config.validate()?;
        let template = Template::compile(&config.pattern, config.pattern_mode)?
            .with_counter_width(config.counter_width);

        Ok(Self {
            config,
            template,
            probe: Box::new(FsProbe),
            cancel: CancelToken::new(),
            state: BatchState::NotStarted,
        })
    }

    /// Replace the destination probe.
    pub fn with_probe(mut self, probe: impl DestinationProbe + Send + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Use an existing cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this engine's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Current batch state.
    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Run a batch. Always returns a result, also when cancelled.
    ///
    /// Every run starts with an empty claim set, so running `Simulate` twice
    /// yields the same entries.
    pub fn run<I>(&mut self, candidates: I, sink: &mut dyn ProgressSink) -> RunResult
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut entries: Vec<ResolvedEntry> =
            candidates.into_iter().map(ResolvedEntry::pending).collect();
        let total = entries.len();
        let started_at = Utc::now().to_rfc3339();

        self.state = BatchState::Running;
        tracing::info!(
            "Running {} on {} files ({} -> {})",
            self.config.action,
            total,
            self.config.source_root.display(),
            self.config.destination_root.display()
        );

        let mut resolver = CollisionResolver::new(
            &self.config.destination_root,
            CollisionPolicy::from_config(&self.config),
        );

        for (index, entry) in entries.iter_mut().enumerate() {
            if self.cancel.is_cancelled() {
                if self.state == BatchState::Running {
                    tracing::info!("Operation was cancelled, skipping {} remaining files", total - index);
                    self.state = BatchState::Cancelled;
                }
                entry.skip(EntryDetail::from(&crate::Error::Cancelled));
            } else {
                self.process(&mut resolver, entry);
            }

            sink.on_entry(&ProgressEvent::from_entry(index, total, entry));
        }

        if self.state == BatchState::Running {
            self.state = BatchState::Completed;
        }

        let mut result = RunResult {
            run_id: Uuid::new_v4().to_string(),
            action: self.config.action,
            state: self.state,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            succeeded: 0,
            skipped: 0,
            failed: 0,
            entries,
        };
        result.tally();

        sink.on_finished(&result);
        result
    }

    /// Process one entry, recording any failure on it.
    fn process(&self, resolver: &mut CollisionResolver, entry: &mut ResolvedEntry) {
        if let Err(e) = self.try_process(resolver, entry) {
            tracing::warn!(
                "Failed: {} - {}",
                entry.candidate.source_path.display(),
                e
            );
            entry.fail(&e);
        }
    }

    fn try_process(&self, resolver: &mut CollisionResolver, entry: &mut ResolvedEntry) -> Result<()> {
        let ts = timestamp::resolve(entry.candidate.timestamp(), self.config.time_basis)?;
        entry.timestamp = Some(ts);

        let base_name = entry.candidate.base_name();
        let extension = entry.candidate.extension();
        let input = RenderInput {
            timestamp: &ts,
            base_name: &base_name,
            extension: &extension,
            counter: self.template.has_counter().then_some(1),
        };
        let rendered = self.template.render_path(&input)?;
        entry.rendered_path = Some(rendered.clone());

        let disposition = resolver.resolve(
            &rendered,
            &self.template,
            &input,
            &entry.candidate,
            self.probe.as_ref(),
        )?;

        match disposition {
            Disposition::Skip { final_path, detail } => {
                tracing::debug!(
                    "Skipping {}: {}",
                    entry.candidate.source_path.display(),
                    detail
                );
                entry.final_path = Some(final_path);
                entry.skip(detail);
            }
            Disposition::Accept(final_path) => {
                entry.final_path = Some(final_path.clone());
                if let Err(e) = self.execute(&entry.candidate.source_path, &final_path) {
                    // Nothing was left at the destination, later entries may use it.
                    if !matches!(e, crate::Error::SourceNotRemoved { .. }) {
                        resolver.release(&final_path);
                    }
                    return Err(e);
                }
                entry.succeed();
            }
        }

        Ok(())
    }

    /// Perform the configured action for one file.
    fn execute(&self, source: &Path, destination: &Path) -> Result<()> {
        let result = match self.config.action {
            Action::Copy => fs_utils::copy_file(source, destination),
            Action::Move => fs_utils::move_file(source, destination, self.config.verify_checksum),
            Action::Simulate => {
                tracing::info!(
                    "{} (from {})",
                    destination.display(),
                    source.display()
                );
                return Ok(());
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    "{}: {} -> {}",
                    self.config.action,
                    source.display(),
                    destination.display()
                );
                Ok(())
            }
            Err(e) => {
                discard_partial(source, destination, &e);
                Err(e)
            }
        }
    }
}

/// Remove what a failed copy or move left at the destination.
///
/// The destination is kept when it may be the only remaining copy: after
/// `SourceNotRemoved`, or when the source is gone. Returns whether a file
/// was removed.
fn discard_partial(source: &Path, destination: &Path, err: &crate::Error) -> bool {
    if matches!(err, crate::Error::SourceNotRemoved { .. })
        || !source.exists()
        || !destination.exists()
    {
        return false;
    }
    match std::fs::remove_file(destination) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Could not remove partial file {}: {}", destination.display(), e);
            false
        }
    }
}

/// Run a batch without progress reporting (convenience function).
pub fn run(config: JobConfig, candidates: Vec<Candidate>) -> Result<RunResult> {
    let mut engine = Engine::new(config)?;
    Ok(engine.run(candidates, &mut crate::core::progress::NoProgress))
}

/// Save a run result as a JSON report.
pub fn save_report(result: &RunResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)?;

    tracing::info!("Report saved to {:?}", path);
    Ok(())
}
