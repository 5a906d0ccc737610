//! Infrastructure layer of the settings back end.
//!
//! Contains OS-facing adapters: JSON config storage, the application-data
//! directory layout, the static TOML app configuration, the system file
//! manager launcher and the wallpaper-of-the-day metadata client seam.
//!
//! **Dependency rule**: this layer may depend on `rwag_core`, but MUST NOT
//! import anything from `application`.

pub mod shell;
pub mod storage;
pub mod wallpaper;
