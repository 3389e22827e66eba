//! Sync-related domain models and configuration.
//!
//! Contains the application configuration and the state tracked
//! by the reconciler between remote syncs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::QuoteRecord;

/// Message shown to the user after every successful sync.
pub const SYNC_NOTIFICATION: &str = "Quotes synced with server!";

/// Longest accepted sync interval: one day.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Configuration for periodic reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Interval between sync attempts in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Whether periodic sync is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Run one sync immediately instead of waiting a full interval.
    #[serde(default)]
    pub sync_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            enabled: default_enabled(),
            sync_on_start: false,
        }
    }
}

impl SyncConfig {
    /// Interval as a duration, clamped to between one second and one day.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

const fn default_interval() -> u64 {
    30
}

const fn default_enabled() -> bool {
    true
}

/// Configuration for the remote quote source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of items requested per fetch.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Whether locally added quotes are posted to the remote.
    #[serde(default = "default_enabled")]
    pub post_on_add: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            limit: default_limit(),
            timeout_secs: default_timeout(),
            post_on_add: default_enabled(),
        }
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

const fn default_limit() -> u32 {
    5
}

const fn default_timeout() -> u64 {
    10
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Reconciliation configuration.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Remote endpoint configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-keeper")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("quotes.db")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

/// Phase of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// No fetch in flight.
    #[default]
    Idle,
    /// A fetch is in flight.
    Syncing,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
        }
    }
}

/// Current state of synchronization.
#[derive(Debug, Clone, Default)]
pub struct SyncState {
    /// Current phase.
    pub phase: SyncPhase,

    /// Last successful sync timestamp.
    pub last_sync: Option<DateTime<Utc>>,

    /// Number of records the last successful sync appended.
    pub last_added: usize,

    /// Last error message if any.
    pub last_error: Option<String>,
}

impl SyncState {
    /// Mark sync as in progress.
    #[must_use]
    pub const fn syncing(mut self) -> Self {
        self.phase = SyncPhase::Syncing;
        self
    }

    /// Mark sync as completed with the number of appended records.
    #[must_use]
    pub fn completed(mut self, added: usize) -> Self {
        self.phase = SyncPhase::Idle;
        self.last_sync = Some(Utc::now());
        self.last_added = added;
        self.last_error = None;
        self
    }

    /// Set error state.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self.phase = SyncPhase::Idle;
        self
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.phase == SyncPhase::Syncing
    }
}

/// Result of merging one remote snapshot into the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Records appended, in remote order.
    pub added: Vec<QuoteRecord>,
    /// Remote records skipped because their text was already present.
    pub skipped: usize,
}

/// Result of a single sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote snapshot was merged.
    Merged(MergeOutcome),
    /// Another sync was already in flight; nothing was fetched.
    AlreadyRunning,
}
