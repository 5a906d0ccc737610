//! What to paint behind the shell's content.
//!
//! The settings say *which kind* of background the user wants; this module
//! turns that into a concrete [`BackgroundSource`] the GUI can render, and
//! falls back to a solid accent colour whenever the preferred source is not
//! usable (bad path, deleted file, offline).

use std::path::{Path, PathBuf};

use rwag_core::{BackgroundType, PathRejection, PathValidator, SettingsProperty, SettingsRecord, Stretch};
use thiserror::Error;
use tracing::warn;

use crate::application::settings_service::SettingsService;
use crate::infrastructure::storage::app_config::AppConfig;
use crate::infrastructure::wallpaper::{fetch_wallpaper_url, WallpaperFetcher};

/// Solid colour used when the configured background cannot be shown.
pub const FALLBACK_COLOR: &str = "#0077FF";

/// A renderable background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSource {
    /// No custom background; the theme's own brush applies.
    ThemeDefault,
    /// A local image file.
    Image { path: PathBuf, stretch: Stretch },
    /// A remote image (wallpaper of the day).
    Remote { url: String, stretch: Stretch },
    /// Solid colour shown instead of an unusable image.
    Fallback { color: &'static str },
}

impl BackgroundSource {
    fn fallback() -> Self {
        BackgroundSource::Fallback {
            color: FALLBACK_COLOR,
        }
    }
}

/// Why a user-supplied background path was refused. The settings page shows
/// a different hint for each.
#[derive(Debug, Error)]
pub enum BackgroundPathError {
    #[error("invalid background image path: {0}")]
    InvalidPath(#[from] PathRejection),

    #[error("background image not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

/// Checks that `path` is a valid location holding an existing file.
pub fn validate_background_path(
    validator: &PathValidator,
    path: &Path,
) -> Result<PathBuf, BackgroundPathError> {
    validator.check(path)?;
    if !path.is_file() {
        return Err(BackgroundPathError::FileNotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// Validates a path chosen in the settings page and, if acceptable, stores
/// it. Invalid picks leave the setting unchanged.
pub fn apply_picked_background(
    settings: &SettingsService,
    validator: &PathValidator,
    path: &Path,
) -> Result<(), BackgroundPathError> {
    let path = validate_background_path(validator, path)?;
    settings.set_background_image_path(path.to_string_lossy().into_owned());
    Ok(())
}

/// Resolves the background for `settings`.
///
/// Never fails: any problem with the preferred source is logged and
/// yields [`BackgroundSource::Fallback`].
pub async fn resolve_background(
    settings: &SettingsRecord,
    validator: &PathValidator,
    fetcher: &dyn WallpaperFetcher,
    app_config: &AppConfig,
) -> BackgroundSource {
    let stretch = settings.background_image_stretch;
    match settings.background_type {
        BackgroundType::None => BackgroundSource::ThemeDefault,

        BackgroundType::Image => {
            match validate_background_path(validator, Path::new(&settings.background_image_path)) {
                Ok(path) => BackgroundSource::Image { path, stretch },
                Err(e) => {
                    warn!(error = %e, "background image unusable; using fallback colour");
                    BackgroundSource::fallback()
                }
            }
        }

        BackgroundType::BingWallpaper => {
            match fetch_wallpaper_url(fetcher, &app_config.bing_wallpaper_url).await {
                Ok(url) => BackgroundSource::Remote { url, stretch },
                Err(e) => {
                    warn!(error = %e, "wallpaper of the day unavailable; using fallback colour");
                    BackgroundSource::fallback()
                }
            }
        }
    }
}

/// Whether a change to `property` requires resolving the background again.
///
/// A type change always does; path and stretch only matter while some
/// background is shown.
pub fn needs_background_refresh(property: SettingsProperty, current: BackgroundType) -> bool {
    match property {
        SettingsProperty::BackgroundType => true,
        SettingsProperty::BackgroundImagePath | SettingsProperty::BackgroundImageStretch => {
            current != BackgroundType::None
        }
        SettingsProperty::AppColorTheme => false,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
