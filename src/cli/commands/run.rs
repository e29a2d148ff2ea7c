//! Copy, move and simulate command implementation.
//!
//! Builds the job configuration from the command line, the destination's
//! remembered settings and the user config, scans the source and runs the
//! engine on a blocking worker while Ctrl-C requests cancellation.

use crate::cli::args::JobArgs;
use crate::cli::progress::ProgressBarSink;
use crate::core::executor::{self, Engine};
use crate::core::progress::{LogSink, ProgressSink};
use crate::core::scanner::{self, ScanOptions};
use crate::models::config::{self, Action, AppConfig, JobConfig, PatternMode, TimeBasis};
use crate::models::entry::EntryStatus;
use crate::models::persistent::{self, PersistentConfig};
use crate::models::result::RunResult;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Run a copy, move or simulate command.
pub async fn run_job(action: Action, args: &JobArgs) -> Result<RunResult> {
    let label = format!("[{}]", action.to_string().to_uppercase());
    println!("{} {}", label.bold().cyan(), "Organizing media files...".bold());
    println!();

    let app_config = config::load_config();
    let persisted = match persistent::load_persistent_config(&args.destination) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Ignoring unreadable destination settings: {}", e);
            None
        }
    };

    let job = build_job_config(action, args, &app_config, persisted.as_ref());

    println!("  {} {}", "Source:".bold(), job.source_root.display());
    println!("  {} {}", "Destination:".bold(), job.destination_root.display());
    println!("  {} {}", "Pattern:".bold(), job.pattern);
    println!("  {} {}", "Time basis:".bold(), job.time_basis);
    if job.update_only {
        println!("  {} {}", "Mode:".bold(), "update only");
    }
    println!();

    let mut engine = Engine::new(job.clone())?;

    let scan_options = ScanOptions {
        all_files: args.all_files,
        extra_extensions: app_config.extra_extensions.clone(),
        exclude: nested_destination(&job.source_root, &job.destination_root),
    };
    let scan = scanner::scan_directory(&job.source_root, &scan_options)?;
    println!("[INFO] Found {} files to process", scan.candidates.len());

    // Cancel on Ctrl-C; the running entry still completes.
    let token = engine.cancel_token();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Cancelling operation..");
            token.cancel();
        }
    });

    let candidates = scan.candidates;
    let no_progress = args.no_progress;
    let result = tokio::task::spawn_blocking(move || {
        let mut sink: Box<dyn ProgressSink> = if no_progress {
            Box::new(LogSink)
        } else {
            Box::new(ProgressBarSink::new(candidates.len()))
        };
        engine.run(candidates, sink.as_mut())
    })
    .await
    .map_err(|e| crate::Error::other(format!("Worker failed: {}", e)))?;

    signal_task.abort();

    print_summary(&result);

    if action.writes() {
        let settings = PersistentConfig::new(&job.pattern, job.time_basis);
        if let Err(e) = persistent::store_persistent_config(&job.destination_root, &settings) {
            tracing::warn!("Could not store destination settings: {}", e);
        }
    }

    if let Some(report) = &args.report {
        executor::save_report(&result, report)?;
        println!("{} {}", "[OK] Report saved to:".bold().green(), report.display());
    }

    Ok(result)
}

/// Combine command line, destination settings and user config.
///
/// Precedence: command line, then the destination's `.mediacopier`, then
/// the user config file.
pub fn build_job_config(
    action: Action,
    args: &JobArgs,
    app: &AppConfig,
    persisted: Option<&PersistentConfig>,
) -> JobConfig {
    let pattern = args
        .pattern
        .clone()
        .or_else(|| persisted.and_then(|p| p.pattern.clone()))
        .unwrap_or_else(|| app.pattern.clone());

    let time_basis = if args.local {
        TimeBasis::Local
    } else if args.utc {
        TimeBasis::Utc
    } else {
        persisted
            .and_then(|p| p.time_basis())
            .unwrap_or(app.time_basis)
    };

    let pattern_mode = if args.strict_pattern {
        PatternMode::Strict
    } else {
        PatternMode::Lenient
    };

    JobConfig::new(action, pattern, &args.source, &args.destination)
        .with_update_only(args.update)
        .with_time_basis(time_basis)
        .with_pattern_mode(pattern_mode)
        .with_counter_width(args.counter_width.unwrap_or(app.counter_width))
        .with_collision_limit(args.collision_limit.unwrap_or(app.collision_limit))
        .with_skip_duplicates(!args.no_skip_duplicates)
        .with_verify_checksum(!args.no_verify)
}

/// Destination directory to exclude from scanning when it lies inside the source.
///
/// The returned path is expressed under `source` as given, matching the
/// paths the scanner walks.
fn nested_destination(source: &Path, destination: &Path) -> Option<PathBuf> {
    let canonical_source = source.canonicalize().ok()?;
    let canonical_destination = destination.canonicalize().ok()?;
    let relative = canonical_destination.strip_prefix(&canonical_source).ok()?;
    (!relative.as_os_str().is_empty()).then(|| source.join(relative))
}

/// Print the result summary.
fn print_summary(result: &RunResult) {
    println!();
    println!("{}", "[Summary]".bold().green());
    println!("  {} {}", "Succeeded:".bold(), result.succeeded);
    println!("  {} {}", "Skipped:".bold(), result.skipped);
    println!("  {} {}", "Failed:".bold(), result.failed);

    if result.is_cancelled() {
        println!("{}", "[WARNING] Operation was cancelled".bold().yellow());
    }

    if result.failed > 0 {
        println!();
        println!("{}", "[Failed files]".bold().red());
        for entry in result.failures() {
            let detail = entry
                .detail
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default();
            println!("  - {}: {}", entry.candidate.source_path.display(), detail);
        }
    }

    let skipped_by_kind = result
        .entries
        .iter()
        .filter(|e| e.status == EntryStatus::Skipped)
        .filter_map(|e| e.detail.as_ref().map(|d| d.kind))
        .fold(std::collections::BTreeMap::new(), |mut acc, kind| {
            *acc.entry(kind.to_string()).or_insert(0usize) += 1;
            acc
        });
    for (kind, count) in skipped_by_kind {
        println!("  {} {}", format!("Skipped ({}):", kind).dimmed(), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args() -> JobArgs {
        JobArgs {
            source: PathBuf::from("/src"),
            destination: PathBuf::from("/dst"),
            pattern: None,
            local: false,
            utc: false,
            update: false,
            strict_pattern: false,
            counter_width: None,
            collision_limit: None,
            no_skip_duplicates: false,
            no_verify: false,
            all_files: false,
            no_progress: false,
            report: None,
        }
    }

    #[test]
    fn test_defaults_from_app_config() {
        let app = AppConfig::default();
        let job = build_job_config(Action::Copy, &args(), &app, None);
        assert_eq!(job.pattern, config::DEFAULT_PATTERN);
        assert_eq!(job.time_basis, TimeBasis::Utc);
        assert!(job.skip_duplicates);
        assert!(job.verify_checksum);
    }

    #[test]
    fn test_persisted_settings_override_app_config() {
        let app = AppConfig::default();
        let persisted = PersistentConfig::new("%Y/%f.%e", TimeBasis::Local);
        let job = build_job_config(Action::Move, &args(), &app, Some(&persisted));
        assert_eq!(job.pattern, "%Y/%f.%e");
        assert_eq!(job.time_basis, TimeBasis::Local);
    }

    #[test]
    fn test_command_line_wins() {
        let app = AppConfig::default();
        let persisted = PersistentConfig::new("%Y/%f.%e", TimeBasis::Local);
        let mut cli = args();
        cli.pattern = Some("%m/%f.%e".to_string());
        cli.utc = true;
        cli.update = true;
        cli.strict_pattern = true;

        let job = build_job_config(Action::Simulate, &cli, &app, Some(&persisted));
        assert_eq!(job.pattern, "%m/%f.%e");
        assert_eq!(job.time_basis, TimeBasis::Utc);
        assert!(job.update_only);
        assert_eq!(job.pattern_mode, PatternMode::Strict);
    }

    #[test]
    fn test_nested_destination() {
        let source = TempDir::new().unwrap();
        let inner = source.path().join("sorted");
        std::fs::create_dir(&inner).unwrap();
        let outside = TempDir::new().unwrap();

        assert_eq!(
            nested_destination(source.path(), &inner),
            Some(source.path().join("sorted"))
        );
        assert!(nested_destination(source.path(), outside.path()).is_none());
        assert!(nested_destination(source.path(), source.path()).is_none());
    }
}
