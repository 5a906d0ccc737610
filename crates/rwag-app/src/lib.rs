//! rwag-app library entry point.
//!
//! The settings back end of the RwagLab desktop shell. The GUI layer owns an
//! `Arc<SettingsService>` and subscribes to its change notifications; it
//! never touches the config files directly.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the host application share the same module tree.

pub mod application;
pub mod infrastructure;
pub mod logging;
