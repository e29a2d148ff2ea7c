//! Per-destination settings remembered between runs.
//!
//! A `.mediacopier` TOML file in the destination directory stores the
//! pattern and time basis of the last run, so the next run against the
//! same destination reuses them unless overridden.

use super::config::TimeBasis;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the settings file inside the destination directory.
pub const PERSISTENT_CONFIG_FILE: &str = ".mediacopier";

const HEADER: &str = "# this file is updated on every run of media-copier, manual changes might be lost\n";

/// Settings stored in the destination directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentConfig {
    /// Pattern used by the last run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Whether the last run used UTC.
    #[serde(rename = "useUtc", skip_serializing_if = "Option::is_none")]
    pub use_utc: Option<bool>,
}

impl PersistentConfig {
    /// Create from the values of a run.
    pub fn new(pattern: &str, time_basis: TimeBasis) -> Self {
        Self {
            pattern: Some(pattern.to_string()),
            use_utc: Some(time_basis == TimeBasis::Utc),
        }
    }

    /// Stored time basis, if any.
    pub fn time_basis(&self) -> Option<TimeBasis> {
        self.use_utc
            .map(|utc| if utc { TimeBasis::Utc } else { TimeBasis::Local })
    }
}

/// Path of the settings file for a destination.
pub fn persistent_config_path(destination: &Path) -> PathBuf {
    destination.join(PERSISTENT_CONFIG_FILE)
}

/// Load the settings file, returning `None` when the destination has none.
pub fn load_persistent_config(destination: &Path) -> Result<Option<PersistentConfig>> {
    let path = persistent_config_path(destination);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content)?;
    Ok(Some(config))
}

/// Write the settings file. Does nothing when the destination is not a directory.
pub fn store_persistent_config(destination: &Path, config: &PersistentConfig) -> Result<()> {
    if !destination.is_dir() {
        return Ok(());
    }
    let body = toml::to_string(config)?;
    std::fs::write(persistent_config_path(destination), format!("{}{}", HEADER, body))?;
    tracing::debug!("Stored settings in {}", destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_load() {
        let dir = TempDir::new().unwrap();
        let config = PersistentConfig::new("%Y/%m/%f.%e", TimeBasis::Local);

        store_persistent_config(dir.path(), &config).unwrap();
        let loaded = load_persistent_config(dir.path()).unwrap().unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.time_basis(), Some(TimeBasis::Local));

        let raw = std::fs::read_to_string(persistent_config_path(dir.path())).unwrap();
        assert!(raw.starts_with("# this file is updated"));
        assert!(raw.contains("useUtc = false"));
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(load_persistent_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_store_into_missing_destination_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        store_persistent_config(&missing, &PersistentConfig::default()).unwrap();
        assert!(!missing.exists());
    }
}
