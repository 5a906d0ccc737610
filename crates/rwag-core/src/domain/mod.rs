//! Domain entities for the RwagLab settings subsystem.
//!
//! Nothing in here touches the file system directly. Outer layers (the
//! config store, the settings service) depend on these types, never the
//! other way round, so everything in this module can be unit-tested on any
//! platform without setup.

/// Config path validation rules for Windows and POSIX hosts.
pub mod path;

/// The persisted user settings record and its enums.
pub mod settings;
