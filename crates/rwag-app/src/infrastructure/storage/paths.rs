//! Per-user application-data directory layout.
//!
//! Everything RwagLab persists lives under one root:
//!
//! ```text
//! <platform data dir>/RwagLab/
//! ├── LaunchConfigs/
//! ├── Configs/
//! │   └── SettingsConfigs.json
//! ├── Logs/
//! └── Assets/
//! ```
//!
//! The platform data dir is `%APPDATA%` on Windows, `$XDG_CONFIG_HOME` (or
//! `~/.config`) on Linux and `~/Library/Application Support` on macOS. Set
//! `RWAG_DATA_DIR` to put the whole tree somewhere else (portable installs,
//! tests).

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "RWAG_DATA_DIR";

const APP_DIR_NAME: &str = "RwagLab";
const SETTINGS_FILE_NAME: &str = "SettingsConfigs.json";

#[derive(Debug, Error)]
pub enum PathsError {
    #[error("could not determine platform data directory")]
    NoPlatformDataDir,

    #[error("failed to create data directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved locations of the application-data directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDataPaths {
    root: PathBuf,
}

impl AppDataPaths {
    /// Resolves the root from `RWAG_DATA_DIR` or the platform default.
    ///
    /// # Errors
    ///
    /// [`PathsError::NoPlatformDataDir`] when neither is available (no
    /// `HOME`/`APPDATA`, or an unsupported OS).
    pub fn resolve() -> Result<Self, PathsError> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            debug!(root = ?dir, "data root overridden by {}", DATA_DIR_ENV);
            return Ok(Self::with_root(dir));
        }
        platform_data_dir()
            .map(|base| Self::with_root(base.join(APP_DIR_NAME)))
            .ok_or(PathsError::NoPlatformDataDir)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn launch_configs_dir(&self) -> PathBuf {
        self.root.join("LaunchConfigs")
    }

    pub fn configs_dir(&self) -> PathBuf {
        self.root.join("Configs")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("Logs")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("Assets")
    }

    /// `Configs/SettingsConfigs.json`.
    pub fn settings_file(&self) -> PathBuf {
        self.configs_dir().join(SETTINGS_FILE_NAME)
    }

    /// Creates the root and all four subdirectories. Existing directories
    /// are left alone.
    pub fn create_all(&self) -> Result<(), PathsError> {
        for dir in [
            self.launch_configs_dir(),
            self.configs_dir(),
            self.logs_dir(),
            self.assets_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|source| PathsError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Resolves the platform data base directory without the `RwagLab`
/// subdirectory.
fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_layout_under_root() {
        let paths = AppDataPaths::with_root("/data/RwagLab");

        assert_eq!(paths.configs_dir(), Path::new("/data/RwagLab/Configs"));
        assert_eq!(paths.logs_dir(), Path::new("/data/RwagLab/Logs"));
        assert_eq!(paths.assets_dir(), Path::new("/data/RwagLab/Assets"));
        assert_eq!(
            paths.launch_configs_dir(),
            Path::new("/data/RwagLab/LaunchConfigs")
        );
        assert_eq!(
            paths.settings_file(),
            Path::new("/data/RwagLab/Configs/SettingsConfigs.json")
        );
    }

    #[test]
    fn test_platform_root_ends_with_app_name() {
        // Only meaningful where the platform dir resolves; CI may lack HOME.
        if let Some(base) = platform_data_dir() {
            let paths = AppDataPaths::with_root(base.join(APP_DIR_NAME));
            assert!(paths.root().ends_with(APP_DIR_NAME));
        }
    }

    #[test]
    fn test_create_all_builds_every_directory() {
        let root = std::env::temp_dir().join(format!("rwag_paths_{}", Uuid::new_v4()));
        let paths = AppDataPaths::with_root(&root);

        paths.create_all().expect("create dirs");
        paths.create_all().expect("second call is a no-op");

        assert!(paths.configs_dir().is_dir());
        assert!(paths.launch_configs_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
        assert!(paths.assets_dir().is_dir());
        std::fs::remove_dir_all(&root).ok();
    }
}
