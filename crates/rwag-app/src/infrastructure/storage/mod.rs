//! Storage infrastructure: configuration file persistence.
//!
//! - `config_store` reads and writes JSON config files, validates their
//!   paths and runs schema migrations when a typed read fails.
//! - `persist_queue` owns the background task that writes settings
//!   snapshots in order.
//! - `paths` resolves the per-user application-data directories.
//! - `app_config` loads the static, read-only TOML application
//!   configuration.

pub mod app_config;
pub mod config_store;
pub mod paths;
pub mod persist_queue;
