//! JSON-based configuration persistence.
//!
//! [`ConfigStore`] reads and writes one JSON document per config group, for
//! example `<app-data>/RwagLab/Configs/SettingsConfigs.json`. Every operation
//! validates its path with [`PathValidator`] before touching the disk.
//!
//! # Fail-soft reads
//!
//! A missing or malformed config file is an expected situation (first run,
//! upgrade from an older release), not a crash. The `read*` methods return a
//! [`ConfigError`] whose [`ErrorKind`] tells the caller what happened; the
//! `try_*` wrappers log that error and reduce it to `None` / `false` so the
//! caller can simply fall back to defaults.
//!
//! # Migration on parse failure
//!
//! When typed deserialization fails and the caller supplied a
//! [`MigrationPlan`], the store patches the raw document on disk with the
//! plan and retries the read once:
//!
//! ```text
//! read_text ─► from_str::<T> ─ok─► T
//!                  │
//!                 err ─► plan? ─no─► ConfigError::Parse
//!                          │
//!                         yes ─► try_migrate ─false─► ConfigError::Parse
//!                                     │
//!                                   true ─► read_text ─► from_str::<T>
//! ```
//!
//! # Write serialization
//!
//! All writes through one store instance share a single async mutex, so at
//! most one write is in flight at a time no matter which path it targets.
//! Reads are not locked against writes.

use std::io;
use std::path::{Path, PathBuf};

use rwag_core::{migrate_value, MigrationPlan, PathRejection, PathValidator};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path failed validation.
    PathInvalid,
    /// The path is valid but nothing is there.
    FileMissing,
    /// The file is empty, malformed or does not match the schema.
    Parse,
    /// Disk or permission failure.
    Io,
    /// The caller asked for something impossible (a migration without any
    /// mapping). Indicates a bug, not a runtime condition.
    Programmer,
}

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config path {}: {reason}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        reason: PathRejection,
    },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("config file is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("failed to parse config JSON at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("migration requested without a field mapping or a type mapping")]
    NoMappingSupplied,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::InvalidPath { .. } => ErrorKind::PathInvalid,
            ConfigError::NotFound(_) => ErrorKind::FileMissing,
            ConfigError::Empty(_) | ConfigError::Parse { .. } | ConfigError::Serialize(_) => {
                ErrorKind::Parse
            }
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::NoMappingSupplied => ErrorKind::Programmer,
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Logs a swallowed error at a level matching how surprising it is.
fn log_failure(operation: &'static str, err: &ConfigError) {
    match err.kind() {
        ErrorKind::FileMissing => debug!(operation, error = %err, "config not available"),
        ErrorKind::PathInvalid => warn!(operation, error = %err, "config path rejected"),
        ErrorKind::Parse | ErrorKind::Io | ErrorKind::Programmer => {
            error!(operation, error = %err, "config operation failed")
        }
    }
}

/// Reads, writes and migrates JSON config files.
///
/// Share one instance (behind an `Arc`) between everything that writes the
/// same files; the write lock is per instance.
#[derive(Debug)]
pub struct ConfigStore {
    validator: PathValidator,
    write_lock: Mutex<()>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(PathValidator::new())
    }
}

impl ConfigStore {
    pub fn new(validator: PathValidator) -> Self {
        Self {
            validator,
            write_lock: Mutex::new(()),
        }
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Reads `path` and deserializes it as `T`.
    ///
    /// On a parse failure with a non-empty `plan`, the file is migrated and
    /// the read is retried once.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPath`], [`ConfigError::NotFound`],
    /// [`ConfigError::Empty`], [`ConfigError::Parse`] or [`ConfigError::Io`].
    pub fn read<T: DeserializeOwned>(
        &self,
        path: &Path,
        plan: Option<&MigrationPlan>,
    ) -> Result<T, ConfigError> {
        let text = self.read_text(path)?;
        let source = match serde_json::from_str::<T>(&text) {
            Ok(value) => return Ok(value),
            Err(source) => source,
        };

        let plan = match plan {
            Some(plan) if !plan.is_empty() => plan,
            _ => {
                return Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        debug!(path = %path.display(), error = %source, "typed read failed; attempting migration");
        if !self.try_migrate(path, plan)? {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            });
        }

        let text = self.read_text(path)?;
        serde_json::from_str::<T>(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fail-soft [`read`](Self::read): logs the error and returns `None`.
    pub fn try_read<T: DeserializeOwned>(
        &self,
        path: &Path,
        plan: Option<&MigrationPlan>,
    ) -> Option<T> {
        match self.read(path, plan) {
            Ok(value) => Some(value),
            Err(e) => {
                log_failure("read", &e);
                None
            }
        }
    }

    /// Reads `path` into an untyped JSON tree.
    pub fn read_raw(&self, path: &Path) -> Result<Value, ConfigError> {
        let text = self.read_text(path)?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fail-soft [`read_raw`](Self::read_raw).
    pub fn try_read_raw(&self, path: &Path) -> Option<Value> {
        match self.read_raw(path) {
            Ok(value) => Some(value),
            Err(e) => {
                log_failure("read_raw", &e);
                None
            }
        }
    }

    // ── Migration ─────────────────────────────────────────────────────────────

    /// Applies `plan` to the document at `path` and writes it back, indented,
    /// if anything changed.
    ///
    /// Returns `Ok(true)` when the file was rewritten and `Ok(false)` when
    /// nothing matched or the file could not be read, parsed or written
    /// (those failures are logged).
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoMappingSupplied`] when `plan` has neither a field
    /// mapping nor a type mapping.
    pub fn try_migrate(&self, path: &Path, plan: &MigrationPlan) -> Result<bool, ConfigError> {
        if plan.is_empty() {
            return Err(ConfigError::NoMappingSupplied);
        }
        match self.migrate_file(path, plan) {
            Ok(modified) => Ok(modified),
            Err(e) => {
                log_failure("migrate", &e);
                Ok(false)
            }
        }
    }

    fn migrate_file(&self, path: &Path, plan: &MigrationPlan) -> Result<bool, ConfigError> {
        let mut doc = self.read_raw(path)?;
        let outcome = migrate_value(&mut doc, plan);

        if !outcome.removed.is_empty() {
            let removed: Vec<&str> = outcome.removed.iter().map(|(k, _)| k.as_str()).collect();
            debug!(path = %path.display(), ?removed, "migration dropped fields");
        }
        if outcome.failed {
            warn!(path = %path.display(), "migration stopped early; keeping partial result");
        }
        if !outcome.modified {
            return Ok(false);
        }

        let json = serde_json::to_string_pretty(&doc).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json).map_err(io_error(path))?;
        info!(path = %path.display(), "config migrated to current schema");
        Ok(true)
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Serializes `value` as indented JSON and replaces the contents of
    /// `path`, creating the parent directory and the file when missing.
    ///
    /// Writes through this store are serialized; the lock is released on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPath`], [`ConfigError::Serialize`] or
    /// [`ConfigError::Io`].
    pub async fn write<T>(&self, path: &Path, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.check_path(path)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_error(parent))?;
        }
        // Create the destination before queueing on the lock so directory and
        // file creation never happen while holding it.
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_error(path))?;

        let _guard = self.write_lock.lock().await;

        let json = serde_json::to_string_pretty(value).map_err(ConfigError::Serialize)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .await
            .map_err(io_error(path))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(io_error(path))?;
        file.flush().await.map_err(io_error(path))?;

        debug!(path = %path.display(), bytes = json.len(), "config written");
        Ok(())
    }

    /// Fail-soft [`write`](Self::write): `true` only on full success.
    pub async fn try_write<T>(&self, path: &Path, value: &T) -> bool
    where
        T: Serialize + Sync + ?Sized,
    {
        match self.write(path, value).await {
            Ok(()) => true,
            Err(e) => {
                log_failure("write", &e);
                false
            }
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn check_path(&self, path: &Path) -> Result<(), ConfigError> {
        self.validator
            .check(path)
            .map_err(|reason| ConfigError::InvalidPath {
                path: path.to_path_buf(),
                reason,
            })
    }

    /// Validated, non-empty file contents with any UTF-8 byte-order mark
    /// removed.
    fn read_text(&self, path: &Path) -> Result<String, ConfigError> {
        self.check_path(path)?;

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let text = match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Empty(path.to_path_buf()));
        }
        Ok(text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rwag_core::{AppTheme, FieldMapping, SettingsRecord};
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rwag_store_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    fn rename_plan() -> MigrationPlan {
        MigrationPlan::new().with_names(FieldMapping::new().rename("OldName", "AppColorTheme"))
    }

    // ── Error classification ──────────────────────────────────────────────────

    #[test]
    fn test_error_kinds() {
        let path = PathBuf::from("/x");
        assert_eq!(ConfigError::NotFound(path.clone()).kind(), ErrorKind::FileMissing);
        assert_eq!(ConfigError::Empty(path.clone()).kind(), ErrorKind::Parse);
        assert_eq!(ConfigError::NoMappingSupplied.kind(), ErrorKind::Programmer);
        assert_eq!(
            ConfigError::InvalidPath {
                path,
                reason: PathRejection::Empty
            }
            .kind(),
            ErrorKind::PathInvalid
        );
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_read_missing_file_is_file_missing() {
        let store = ConfigStore::default();
        let path = scratch_dir().join("absent.json");

        let err = store.read::<SettingsRecord>(&path, None).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileMissing);
        assert!(store.try_read::<SettingsRecord>(&path, None).is_none());
    }

    #[test]
    fn test_read_relative_path_is_path_invalid() {
        let store = ConfigStore::default();
        let err = store
            .read::<SettingsRecord>(Path::new("Configs/SettingsConfigs.json"), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathInvalid);
    }

    #[test]
    fn test_read_whitespace_file_is_parse_failure() {
        let dir = scratch_dir();
        let path = dir.join("blank.json");
        std::fs::write(&path, "  \n\t ").unwrap();

        let err = ConfigStore::default()
            .read::<SettingsRecord>(&path, None)
            .unwrap_err();

        assert!(matches!(err, ConfigError::Empty(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_tolerates_byte_order_mark() {
        let dir = scratch_dir();
        let path = dir.join("bom.json");
        std::fs::write(&path, "\u{feff}{\"AppColorTheme\":\"Light\"}").unwrap();

        let settings: SettingsRecord = ConfigStore::default().read(&path, None).expect("read");

        assert_eq!(settings.app_color_theme, AppTheme::Light);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parse_failure_without_plan_leaves_file_untouched() {
        let dir = scratch_dir();
        let path = dir.join("old.json");
        let original = r#"{"OldName":"Dark"}"#;
        std::fs::write(&path, original).unwrap();

        let err = ConfigStore::default()
            .read::<SettingsRecord>(&path, None)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_with_plan_migrates_then_retries() {
        let dir = scratch_dir();
        let path = dir.join("old.json");
        std::fs::write(&path, r#"{"OldName":"Dark"}"#).unwrap();

        let settings: SettingsRecord = ConfigStore::default()
            .read(&path, Some(&rename_plan()))
            .expect("read after migration");

        assert_eq!(settings.app_color_theme, AppTheme::Dark);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_with_non_matching_plan_reports_parse_failure() {
        let dir = scratch_dir();
        let path = dir.join("old.json");
        std::fs::write(&path, r#"{"Unrelated":"Dark"}"#).unwrap();

        let err = ConfigStore::default()
            .read::<SettingsRecord>(&path, Some(&rename_plan()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_raw_returns_untyped_tree() {
        let dir = scratch_dir();
        let path = dir.join("api.json");
        std::fs::write(&path, r#"{"images":[{"url":"/a.jpg"}]}"#).unwrap();

        let value = ConfigStore::default().try_read_raw(&path).expect("raw read");

        assert_eq!(value["images"][0]["url"], "/a.jpg");
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── Migration ─────────────────────────────────────────────────────────────

    #[test]
    fn test_migrate_without_any_mapping_is_programmer_error() {
        let path = scratch_dir().join("any.json");
        let err = ConfigStore::default()
            .try_migrate(&path, &MigrationPlan::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoMappingSupplied));
    }

    #[test]
    fn test_migrate_missing_file_reports_no_change() {
        let path = scratch_dir().join("absent.json");
        let modified = ConfigStore::default()
            .try_migrate(&path, &rename_plan())
            .expect("runtime failures are absorbed");
        assert!(!modified);
    }

    #[test]
    fn test_migrate_malformed_json_reports_no_change() {
        let dir = scratch_dir();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let modified = ConfigStore::default()
            .try_migrate(&path, &rename_plan())
            .expect("parse failures are absorbed");

        assert!(!modified);
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_write_creates_parent_directories_and_indents() {
        let dir = scratch_dir();
        let path = dir.join("Configs").join("nested").join("SettingsConfigs.json");

        ConfigStore::default()
            .write(&path, &SettingsRecord::default())
            .await
            .expect("write");

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "output must be indented");
        assert!(text.contains("\"BackgroundType\": \"BingWallpaper\""));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_write_truncates_longer_previous_content() {
        let dir = scratch_dir();
        let path = dir.join("value.json");
        std::fs::write(&path, "x".repeat(4096)).unwrap();
        let store = ConfigStore::default();

        store.write(&path, &serde_json::json!({ "a": 1 })).await.expect("write");

        let value: Value = store.read_raw(&path).expect("file is exactly the new JSON");
        assert_eq!(value, serde_json::json!({ "a": 1 }));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_write_to_invalid_path_fails_without_touching_disk() {
        let store = ConfigStore::default();
        let path = Path::new("relative/settings.json");

        let err = store.write(path, &SettingsRecord::default()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathInvalid);
        assert!(!store.try_write(path, &SettingsRecord::default()).await);
        assert!(!path.exists());
    }
}
