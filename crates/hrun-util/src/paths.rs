//! Default paths for hrun
//!
//! Paths are user-level by default:
//! - Config: `$XDG_CONFIG_HOME/hrun/config.toml` or `~/.config/hrun/config.toml`

use std::path::PathBuf;
use tracing::debug;

/// Environment variable for overriding the config file path
pub const HRUN_CONFIG_ENV: &str = "HRUN_CONFIG";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "hrun";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$HRUN_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/hrun/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/hrun/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(HRUN_CONFIG_ENV) {
        debug!(path = %path, "Config path taken from {}", HRUN_CONFIG_ENV);
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the HRUN_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    // Last resort
    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_contains_hrun() {
        let path = config_path_without_env();
        assert!(path.to_string_lossy().contains("hrun"));
        assert!(path.ends_with("config.toml"));
    }
}
