//! Terminal progress bar.

use crate::core::progress::{ProgressEvent, ProgressSink};
use crate::models::entry::EntryStatus;
use crate::models::result::RunResult;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress sink drawing an `indicatif` bar.
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }
}

impl ProgressSink for ProgressBarSink {
    fn on_entry(&mut self, event: &ProgressEvent) {
        let name = event
            .source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.bar.set_message(format!("{}: {}", event.status, name));
        self.bar.inc(1);

        if event.status == EntryStatus::Failed {
            if let Some(detail) = &event.detail {
                self.bar
                    .println(format!("[FAILED] {}: {}", event.source.display(), detail));
            }
        }
    }

    fn on_finished(&mut self, _result: &RunResult) {
        self.bar.finish_with_message("Done!");
    }
}
