//! Config command implementation.

use crate::models::config::{self, AppConfig};
use crate::Result;
use colored::Colorize;

/// Print the effective user configuration as TOML.
pub fn show_config() -> Result<()> {
    let path = config::config_file_path();
    let loaded = config::load_config();

    if path.exists() {
        println!("{} {}", "[INFO] Loaded from:".bold(), path.display());
    } else {
        println!("{}", "[INFO] No config file, showing defaults".bold());
    }
    println!();
    print!("{}", render_config(&loaded)?);
    Ok(())
}

/// Print the path of the user config file.
pub fn show_config_path() {
    println!("{}", config::config_file_path().display());
}

fn render_config(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_config() {
        let rendered = render_config(&AppConfig::default()).unwrap();
        assert!(rendered.contains("pattern = \"%Y/%W/IMG_%Y%m%d_%H%M%S.%e\""));
        assert!(rendered.contains("time_basis = \"utc\""));
    }
}
