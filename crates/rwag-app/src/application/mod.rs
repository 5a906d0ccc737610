//! Application layer: the observable settings model and the logic built on
//! top of it.
//!
//! # Sub-modules
//!
//! - **`settings_service`** – Owns the in-memory [`SettingsRecord`], exposes
//!   typed getters and setters, broadcasts the name of every property that
//!   changes and persists the full record through an ordered background
//!   queue.  One instance per process, handed around as an `Arc`.
//!
//! - **`background`** – Decides what the shell should paint behind its
//!   content (nothing, a local image, the wallpaper of the day, or a solid
//!   fallback colour) and which settings changes require repainting.
//!
//! Both depend on collaborators through traits (`ThemeApplier`,
//! `WallpaperFetcher`) so they can be exercised without a GUI or network.
//!
//! [`SettingsRecord`]: rwag_core::SettingsRecord

pub mod background;
pub mod settings_service;
