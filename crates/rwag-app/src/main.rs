//! RwagLab settings back end entry point.
//!
//! Boots the settings subsystem headless: resolves the data directories,
//! loads the static app configuration and the user settings, then logs every
//! settings change until Ctrl-C, flushing pending writes before exit. The
//! GUI shell embeds the same pieces through the library crate.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use rwag_app::application::background::needs_background_refresh;
use rwag_app::application::settings_service::SettingsService;
use rwag_app::infrastructure::storage::app_config::load_app_config;
use rwag_app::infrastructure::storage::config_store::ConfigStore;
use rwag_app::infrastructure::storage::paths::AppDataPaths;
use rwag_app::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = AppDataPaths::resolve().context("resolving application data directory")?;
    paths.create_all()?;
    init_logging(&paths.logs_dir(), "info")?;

    info!(root = %paths.root().display(), "RwagLab settings back end starting");

    let app_config = load_app_config(&paths.root().join("appsettings.toml"))?;
    info!(
        name = %app_config.application_name,
        environment = %app_config.environment,
        width = app_config.window_width,
        height = app_config.window_height,
        "app config loaded"
    );

    let store = Arc::new(ConfigStore::default());
    let settings = SettingsService::load(store, paths.settings_file(), None);
    info!(settings = ?settings.snapshot(), "settings loaded");

    // ── Change log ────────────────────────────────────────────────────────────
    let mut changes = settings.subscribe();
    let watched = Arc::clone(&settings);
    let watcher = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(property) => {
                    let refresh = needs_background_refresh(property, watched.background_type());
                    info!(%property, refresh, "setting changed");
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "change log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    info!("shutting down");
    settings.shutdown().await;
    watcher.abort();
    Ok(())
}
