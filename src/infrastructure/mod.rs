//! Infrastructure layer - external adapters (database, HTTP, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod local_storage;
pub mod remote;

pub use config::{config_file_path, ensure_config_exists, load_config, load_config_from_file};
pub use local_storage::{LocalStorage, MemoryStorage};
pub use remote::{HttpRemote, RemoteSource};
