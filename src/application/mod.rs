//! Application layer - use cases and orchestration.
//!
//! This layer contains the quote store, the remote reconciler,
//! snapshot import/export and output formatting.

pub mod formatter;
pub mod presenter;
pub mod quote_store;
pub mod reconciler;
pub mod snapshot;

pub use formatter::{
    format_categories, format_quote, format_quotes, format_sync_state, OutputFormat,
};
pub use presenter::{ConsoleListener, Presenter};
pub use quote_store::{QuoteStore, SharedStore};
pub use reconciler::Reconciler;
pub use snapshot::{export_to_file, import_from_file, DEFAULT_EXPORT_FILE};
