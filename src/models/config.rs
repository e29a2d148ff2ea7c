//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pattern used when nothing else is configured.
pub const DEFAULT_PATTERN: &str = "%Y/%W/IMG_%Y%m%d_%H%M%S.%e";

/// Maximum number of names tried for one entry before giving up.
pub const DEFAULT_COLLISION_LIMIT: usize = 1000;

/// What to do with each source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Copy,
    Move,
    Simulate,
}

impl Action {
    /// Whether the action writes to the filesystem.
    pub fn writes(self) -> bool {
        !matches!(self, Action::Simulate)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Copy => write!(f, "copy"),
            Action::Move => write!(f, "move"),
            Action::Simulate => write!(f, "simulate"),
        }
    }
}

/// Time basis used to decompose file timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    Local,
    #[default]
    Utc,
}

impl std::fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBasis::Local => write!(f, "local"),
            TimeBasis::Utc => write!(f, "utc"),
        }
    }
}

/// How unknown pattern directives are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// Copy unknown directives verbatim.
    #[default]
    Lenient,
    /// Reject unknown directives.
    Strict,
}

/// Job configuration, fixed for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Action to perform.
    pub action: Action,
    /// Skip files whose destination is not older than the source.
    pub update_only: bool,
    /// Time basis for pattern rendering.
    pub time_basis: TimeBasis,
    /// Destination path pattern.
    pub pattern: String,
    /// Source directory.
    pub source_root: PathBuf,
    /// Destination directory.
    pub destination_root: PathBuf,
    /// Unknown directive handling.
    pub pattern_mode: PatternMode,
    /// Minimum width of the `%n` counter.
    pub counter_width: usize,
    /// Maximum names tried per entry.
    pub collision_limit: usize,
    /// Skip files whose content already exists at the colliding destination.
    pub skip_duplicates: bool,
    /// Verify cross-device move copies by checksum.
    pub verify_checksum: bool,
}

impl JobConfig {
    /// Create a configuration with default options.
    pub fn new(
        action: Action,
        pattern: impl Into<String>,
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            action,
            update_only: false,
            time_basis: TimeBasis::Utc,
            pattern: pattern.into(),
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            pattern_mode: PatternMode::Lenient,
            counter_width: 1,
            collision_limit: DEFAULT_COLLISION_LIMIT,
            skip_duplicates: false,
            verify_checksum: true,
        }
    }

    pub fn with_update_only(mut self, update_only: bool) -> Self {
        self.update_only = update_only;
        self
    }

    pub fn with_time_basis(mut self, time_basis: TimeBasis) -> Self {
        self.time_basis = time_basis;
        self
    }

    pub fn with_pattern_mode(mut self, mode: PatternMode) -> Self {
        self.pattern_mode = mode;
        self
    }

    pub fn with_counter_width(mut self, width: usize) -> Self {
        self.counter_width = width;
        self
    }

    pub fn with_collision_limit(mut self, limit: usize) -> Self {
        self.collision_limit = limit;
        self
    }

    pub fn with_skip_duplicates(mut self, skip: bool) -> Self {
        self.skip_duplicates = skip;
        self
    }

    pub fn with_verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Check the configuration before any entry is processed.
    ///
    /// The destination root may be missing; it is created on first write.
    pub fn validate(&self) -> crate::Result<()> {
        crate::utils::fs::ensure_directory(&self.source_root)?;

        if self.destination_root.exists() && !self.destination_root.is_dir() {
            return Err(crate::Error::NotADirectory(
                self.destination_root.display().to_string(),
            ));
        }
        if self.pattern.is_empty() {
            return Err(crate::Error::EmptyPattern);
        }
        if self.collision_limit == 0 {
            return Err(crate::Error::InvalidConfig(
                "collision limit must be at least 1".to_string(),
            ));
        }
        if self.counter_width == 0 {
            return Err(crate::Error::InvalidConfig(
                "counter width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application configuration read from the user's config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default pattern.
    pub pattern: String,
    /// Default time basis.
    pub time_basis: TimeBasis,
    /// Default counter width.
    pub counter_width: usize,
    /// Default collision limit.
    pub collision_limit: usize,
    /// Extensions accepted in addition to the built-in media list.
    pub extra_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            time_basis: TimeBasis::Utc,
            counter_width: 1,
            collision_limit: DEFAULT_COLLISION_LIMIT,
            extra_extensions: Vec::new(),
        }
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_copier")
}

/// Path of the user config file.
pub fn config_file_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from the user config file.
pub fn load_config() -> AppConfig {
    load_config_from(&config_file_path())
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring invalid config {}: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("Could not read config {}: {}", path.display(), e),
        }
    }

    AppConfig::default()
}
