//! Domain-level error types for quote-keeper.
//!
//! All errors are typed with `thiserror` and provide meaningful context
//! without exposing internal details to end users.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required quote field was empty after trimming.
    #[error("Validation error: {field} must not be empty")]
    Validation { field: &'static str },

    /// Persisted quote data could not be decoded.
    #[error("Stored data is corrupt: {message}")]
    StorageParse { message: String },

    /// Failed to open or query the key-value database.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote fetch or post failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// An imported snapshot was not a valid quote array.
    #[error("Import failed: {message}")]
    ImportParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// JSON serialization failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a storage error from rusqlite error.
    pub fn storage(err: rusqlite::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an import error from a failed snapshot decode.
    pub fn import_parse(err: serde_json::Error) -> Self {
        Self::ImportParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a network error from a reqwest failure.
    pub fn network(err: &reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
