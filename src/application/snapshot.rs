//! JSON snapshot export and import.
//!
//! Import appends every record verbatim; it does not deduplicate, so
//! importing an export of the same store doubles every record.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, QuoteRecord, Result};

use super::quote_store::QuoteStore;

/// Default file name offered for exports.
pub const DEFAULT_EXPORT_FILE: &str = "quotes.json";

/// Pretty-printed JSON array of the whole store.
///
/// # Errors
/// Returns error if serialization fails.
pub fn export_snapshot(store: &QuoteStore) -> Result<String> {
    serde_json::to_string_pretty(store.records()).map_err(AppError::json_parse)
}

/// Write a snapshot to `path`, returning the number of exported records.
///
/// # Errors
/// Returns error if serialization or the file write fails.
pub fn export_to_file(store: &QuoteStore, path: &Path) -> Result<usize> {
    let content = export_snapshot(store)?;
    fs::write(path, content)
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    tracing::info!(path = %path.display(), count = store.len(), "Snapshot exported");

    Ok(store.len())
}

/// Append every record of a JSON array snapshot, returning how many were added.
///
/// # Errors
/// Returns `AppError::ImportParse` if the bytes are not an array of quotes;
/// the store is unchanged in that case.
pub fn import_snapshot(store: &mut QuoteStore, bytes: &[u8]) -> Result<usize> {
    let records: Vec<QuoteRecord> =
        serde_json::from_slice(bytes).map_err(AppError::import_parse)?;

    let count = store.extend(records)?;
    tracing::info!(count, "Snapshot imported");

    Ok(count)
}

/// Read a snapshot file and import it.
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid snapshot.
pub fn import_from_file(store: &mut QuoteStore, path: &Path) -> Result<usize> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
    import_snapshot(store, &bytes)
}
