//! Command line argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Media Copier - Sort photos and videos into folders by timestamp
#[derive(Parser, Debug)]
#[command(name = "media-copier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy files from SOURCE to DESTINATION
    Copy(JobArgs),

    /// The same as 'copy', but removing successfully copied files
    Move(JobArgs),

    /// Show what 'copy' would do without writing anything
    Simulate(JobArgs),

    /// Show the user configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Directory containing the media files
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory to place organized files in
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Destination path pattern (e.g. "%Y/%m/%d/IMG_%H%M%S.%e")
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Use local time for pattern values
    #[arg(long, conflicts_with = "utc")]
    pub local: bool,

    /// Use UTC for pattern values
    #[arg(long)]
    pub utc: bool,

    /// Skip files whose destination is not older than the source
    #[arg(short, long)]
    pub update: bool,

    /// Reject unknown pattern directives instead of copying them verbatim
    #[arg(long)]
    pub strict_pattern: bool,

    /// Minimum width of the %n counter
    #[arg(long, value_name = "N")]
    pub counter_width: Option<usize>,

    /// Maximum number of names tried when a destination is taken
    #[arg(long, value_name = "N")]
    pub collision_limit: Option<usize>,

    /// Process files even when identical content already exists at the destination
    #[arg(long)]
    pub no_skip_duplicates: bool,

    /// Do not verify checksums when moving across filesystems
    #[arg(long)]
    pub no_verify: bool,

    /// Process all files, not only photos and videos
    #[arg(long)]
    pub all_files: bool,

    /// Log one line per file instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Write a JSON report of the run
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}
