//! Integration tests for the settings model on top of a real config file.
//!
//! Each test points a fresh [`SettingsService`] at a scratch
//! `SettingsConfigs.json` and checks what ends up on disk after setters,
//! reloads and shutdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rwag_app::application::settings_service::SettingsService;
use rwag_app::infrastructure::storage::config_store::ConfigStore;
use rwag_app::infrastructure::storage::paths::AppDataPaths;
use rwag_core::{AppTheme, BackgroundType, SettingsProperty, SettingsRecord, Stretch};
use serde_json::Value;
use uuid::Uuid;

struct Scratch {
    paths: AppDataPaths,
}

impl Scratch {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("rwag_it_settings_{}", Uuid::new_v4()));
        let paths = AppDataPaths::with_root(root);
        paths.create_all().expect("create data dirs");
        Self { paths }
    }

    fn settings_file(&self) -> PathBuf {
        self.paths.settings_file()
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        std::fs::remove_dir_all(self.paths.root()).ok();
    }
}

fn read_disk(path: &Path) -> SettingsRecord {
    let text = std::fs::read_to_string(path).expect("settings file exists");
    serde_json::from_str(&text).expect("settings file is a valid record")
}

#[tokio::test]
async fn test_setters_persist_after_flush() {
    // Arrange
    let scratch = Scratch::new();
    let service =
        SettingsService::load(Arc::new(ConfigStore::default()), scratch.settings_file(), None);

    // Act
    service.set_app_color_theme(AppTheme::Light);
    service.set_background_type(BackgroundType::Image);
    service.set_background_image_path("/srv/wall.jpg");
    service.set_background_image_stretch(Stretch::Uniform);
    service.flush().await;

    // Assert
    assert_eq!(read_disk(&scratch.settings_file()), service.snapshot());
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rapid_setters_converge_to_the_last_value() {
    let scratch = Scratch::new();
    let service =
        SettingsService::load(Arc::new(ConfigStore::default()), scratch.settings_file(), None);

    for i in 0..200 {
        service.set_background_image_path(format!("/pictures/{i}.png"));
    }
    service.flush().await;

    assert_eq!(
        read_disk(&scratch.settings_file()).background_image_path,
        "/pictures/199.png"
    );
    service.shutdown().await;
}

#[tokio::test]
async fn test_values_survive_a_restart() {
    let scratch = Scratch::new();
    let store = Arc::new(ConfigStore::default());

    let first = SettingsService::load(Arc::clone(&store), scratch.settings_file(), None);
    first.set_background_type(BackgroundType::None);
    first.set_background_image_stretch(Stretch::Fill);
    first.shutdown().await;

    let second = SettingsService::load(store, scratch.settings_file(), None);

    assert_eq!(second.background_type(), BackgroundType::None);
    assert_eq!(second.background_image_stretch(), Stretch::Fill);
    second.shutdown().await;
}

#[tokio::test]
async fn test_reload_notifies_every_property_without_rewriting() {
    // Arrange: a compact file the service would never produce itself.
    let scratch = Scratch::new();
    let path = scratch.settings_file();
    let compact = r#"{"AppColorTheme":"Dark","BackgroundType":"None","BackgroundImagePath":"","BackgroundImageStretch":"Fill"}"#;
    std::fs::write(&path, compact).unwrap();
    let service = SettingsService::load(Arc::new(ConfigStore::default()), path.clone(), None);
    let mut rx = service.subscribe();

    // Act
    let reloaded = service.reload();
    service.flush().await;

    // Assert
    assert!(reloaded);
    let mut seen = Vec::new();
    while let Ok(property) = rx.try_recv() {
        seen.push(property);
    }
    assert_eq!(seen, SettingsProperty::ALL.to_vec());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), compact);
    assert_eq!(service.app_color_theme(), AppTheme::Dark);
    service.shutdown().await;
}

#[tokio::test]
async fn test_legacy_file_is_migrated_on_load() {
    let scratch = Scratch::new();
    let path = scratch.settings_file();
    std::fs::write(
        &path,
        r#"{"AppColorTheme":1,"BackgroundType":0,"BackgroundImagePath":"","BackgroundImageStretch":2}"#,
    )
    .unwrap();

    let service = SettingsService::load(Arc::new(ConfigStore::default()), path.clone(), None);

    assert_eq!(service.app_color_theme(), AppTheme::Light);
    assert_eq!(service.background_type(), BackgroundType::None);
    assert_eq!(service.background_image_stretch(), Stretch::Uniform);
    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).expect("valid JSON");
    assert_eq!(on_disk["AppColorTheme"], "Light");
    service.shutdown().await;
}

#[tokio::test]
async fn test_malformed_file_falls_back_to_defaults() {
    let scratch = Scratch::new();
    let path = scratch.settings_file();
    std::fs::write(&path, "not json at all").unwrap();

    let service = SettingsService::load(Arc::new(ConfigStore::default()), path.clone(), None);

    assert_eq!(service.snapshot(), SettingsRecord::default());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json at all");
    service.shutdown().await;
}
