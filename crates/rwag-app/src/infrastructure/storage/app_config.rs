//! Static application configuration.
//!
//! Unlike the user settings, `AppConfig` is shipped with the application and
//! never written at runtime. It is a small TOML file next to the executable
//! (or wherever the host points [`load_app_config`]):
//!
//! ```toml
//! environment = "Production"
//! application_name = "RwagLab"
//! owner = "RwagLab Contributors"
//! owner_link = "https://github.com/rwaglab"
//! window_height = 720
//! window_width = 1280
//! bing_wallpaper_url = "https://cn.bing.com/HPImageArchive.aspx?format=js&idx=0&n=1"
//! ```
//!
//! Every field has a `#[serde(default = ...)]`, so a partial file (or no file
//! at all) still produces a usable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("I/O error accessing app config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse app config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read-only application metadata and window defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Deployment label, e.g. `"Production"` or `"Development"`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Title shown by the shell and the about page.
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub owner_link: String,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Endpoint returning the wallpaper-of-the-day metadata JSON.
    #[serde(default = "default_bing_wallpaper_url")]
    pub bing_wallpaper_url: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_environment() -> String {
    "Production".to_string()
}
fn default_application_name() -> String {
    "RwagLab".to_string()
}
fn default_window_height() -> u32 {
    720
}
fn default_window_width() -> u32 {
    1280
}
fn default_bing_wallpaper_url() -> String {
    "https://cn.bing.com/HPImageArchive.aspx?format=js&idx=0&n=1".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            application_name: default_application_name(),
            owner: String::new(),
            owner_link: String::new(),
            window_height: default_window_height(),
            window_width: default_window_width(),
            bing_wallpaper_url: default_bing_wallpaper_url(),
        }
    }
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`AppConfigError::Io`] for file-system errors other than "not
/// found", or [`AppConfigError::Parse`] if the TOML is malformed.
pub fn load_app_config(path: &Path) -> Result<AppConfig, AppConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(AppConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_default_window_size() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.window_width, 1280);
        assert_eq!(cfg.window_height, 720);
    }

    #[test]
    fn test_default_wallpaper_endpoint_requests_json() {
        let cfg = AppConfig::default();
        assert!(cfg.bing_wallpaper_url.starts_with("https://cn.bing.com/"));
        assert!(cfg.bing_wallpaper_url.contains("format=js"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.owner = "someone".to_string();
        cfg.window_width = 1920;

        // Act
        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&text).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("application_name = \"Lab\"\nwindow_height = 900\n")
            .expect("deserialize");

        assert_eq!(cfg.application_name, "Lab");
        assert_eq!(cfg.window_height, 900);
        assert_eq!(cfg.window_width, 1280);
        assert_eq!(cfg.environment, "Production");
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join(format!("rwag_appcfg_{}.toml", Uuid::new_v4()));
        let cfg = load_app_config(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("rwag_appcfg_{}.toml", Uuid::new_v4()));
        std::fs::write(&path, "window_height = \"tall\"").unwrap();

        let err = load_app_config(&path).unwrap_err();

        assert!(matches!(err, AppConfigError::Parse(_)));
        std::fs::remove_file(&path).ok();
    }
}
