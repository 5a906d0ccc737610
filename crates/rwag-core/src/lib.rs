//! # rwag-core
//!
//! Shared library for RwagLab containing the pure pieces of the settings
//! subsystem: config path validation, the settings domain types and the JSON
//! schema migration walk.
//!
//! This crate performs no file reads or writes of its own. The only contact
//! with the operating system is the [`VolumeProbe`] used to ask whether a
//! path's root volume is ready, and that sits behind a trait so tests can
//! substitute it.
//!
//! # Architecture overview
//!
//! - **`domain`** – value types with no I/O: [`PathValidator`] decides whether
//!   a string is safe to use as a config file location, and
//!   [`SettingsRecord`] is the typed shape of the persisted user settings.
//!
//! - **`migration`** – structural repair of JSON documents whose shape no
//!   longer matches the current schema (renamed, removed or retyped fields).
//!   The walk operates on a `serde_json::Value` tree and reports whether it
//!   changed anything; writing the result back is the caller's job.

pub mod domain;
pub mod migration;

pub use domain::path::{
    PathRejection, PathValidator, Platform, RootState, SystemVolumeProbe, VolumeProbe,
};
pub use domain::settings::{
    legacy_settings_plan, AppTheme, BackgroundType, SettingsProperty, SettingsRecord, Stretch,
};
pub use migration::mapping::{
    ConversionError, FieldMapping, FieldTarget, MigrationPlan, TypeMapping, DELETE_SENTINEL,
};
pub use migration::walk::{migrate_value, MigrationOutcome};
