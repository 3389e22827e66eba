//! Configuration file management.
//!
//! Handles loading and saving TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Quote Keeper Configuration
# Auto-generated - edit as needed

[sync]
# Seconds between remote syncs (default: 30)
interval_secs = 30

# Whether periodic sync is enabled
enabled = true

# Sync once immediately when `watch` starts
sync_on_start = false

[remote]
# Remote API serving a `/posts` list of `{ "title": ... }` items
base_url = "https://jsonplaceholder.typicode.com"

# Items requested per sync
limit = 5

# Request timeout in seconds
timeout_secs = 10

# Post locally added quotes to the remote
post_on_add = true

[paths]
# Custom data directory (optional, defaults to ~/.quote-keeper)
# data_dir = "/custom/path"
"#;

/// Load configuration from file or create default.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns `true` when a new file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default().config_file_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.sync.interval_secs, 30);
        assert_eq!(config.remote.limit, 5);
        assert_eq!(config.remote.base_url, "https://jsonplaceholder.typicode.com");
        assert!(config.paths.data_dir.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[sync]\ninterval_secs = 5\n").unwrap();
        assert_eq!(config.sync.interval_secs, 5);
        assert!(config.sync.enabled);
        assert_eq!(config.remote.timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.sync.sync_on_start = true;

        let content = toml::to_string_pretty(&config).unwrap();
        fs::write(&config_path, content).unwrap();

        let loaded = load_config_from_file(&config_path).unwrap();

        assert!(loaded.sync.sync_on_start);
        assert_eq!(loaded.remote.limit, config.remote.limit);
    }

    #[test]
    fn test_ensure_config_exists_only_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        assert!(ensure_config_exists(&path).unwrap());
        assert!(!ensure_config_exists(&path).unwrap());
        assert!(load_config_from_file(&path).is_ok());
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync]\ninterval_secs = \"soon\"\n").unwrap();

        assert!(matches!(
            load_config_from_file(&path),
            Err(AppError::Config { .. })
        ));
    }
}
