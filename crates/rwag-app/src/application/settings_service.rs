//! SettingsService: the observable, persisted user settings.
//!
//! The service holds the current [`SettingsRecord`] in memory. Every setter
//!
//! 1. updates the in-memory record,
//! 2. queues a full snapshot for writing (when write-through is enabled),
//! 3. broadcasts the changed [`SettingsProperty`] to subscribers.
//!
//! Setting the colour theme additionally asks the injected [`ThemeApplier`]
//! to restyle the UI. Themes are handed to one worker task in the order they
//! were set; a theme superseded before the worker gets to it is skipped, and
//! failures are only logged.
//!
//! # Write-through gate
//!
//! While the service is populating itself from disk (initial load and
//! [`reload`](SettingsService::reload)) the gate is closed, so reading the
//! file never causes it to be rewritten. Notifications are still sent so
//! bound views pick up the loaded values.
//!
//! # Ordering
//!
//! Snapshots are queued while the record's write lock is held, so the queue
//! sees them in the same order the record was mutated and the file always
//! converges to the latest in-memory state. Theme requests are queued under
//! the same lock, so the UI ends on the theme the record holds. Call
//! [`flush`](SettingsService::flush) to wait until that state is on disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use rwag_core::{
    legacy_settings_plan, AppTheme, BackgroundType, SettingsProperty, SettingsRecord, Stretch,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::infrastructure::storage::config_store::ConfigStore;
use crate::infrastructure::storage::persist_queue::PersistQueue;

/// Capacity of the change-notification channel. Subscribers that fall
/// further behind receive `RecvError::Lagged` and should re-read the getters.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Restyles the UI for a colour theme.
///
/// Implemented by the GUI host; tests use a recording double.
#[async_trait]
pub trait ThemeApplier: Send + Sync {
    async fn apply_theme(&self, theme: AppTheme) -> anyhow::Result<()>;
}

/// Process-wide settings model. Construct with [`SettingsService::load`] and
/// share the returned `Arc`.
pub struct SettingsService {
    record: RwLock<SettingsRecord>,
    write_through: AtomicBool,
    changes: broadcast::Sender<SettingsProperty>,
    store: Arc<ConfigStore>,
    path: PathBuf,
    persist: PersistQueue<SettingsRecord>,
    themes: Option<mpsc::UnboundedSender<AppTheme>>,
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("path", &self.path)
            .field("record", &self.snapshot())
            .field("write_through", &self.is_write_through())
            .finish()
    }
}

impl SettingsService {
    /// Creates the service, populates it from `path` and starts the persist
    /// worker.
    ///
    /// A missing or unreadable file is not an error: the service starts
    /// from [`SettingsRecord::default`]. Files from earlier releases are
    /// migrated in place.
    ///
    /// Must be called from inside a Tokio runtime; the setters may then be
    /// called from any thread.
    pub fn load(
        store: Arc<ConfigStore>,
        path: impl Into<PathBuf>,
        theme_applier: Option<Arc<dyn ThemeApplier>>,
    ) -> Arc<Self> {
        let path = path.into();
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let service = Self {
            record: RwLock::new(SettingsRecord::default()),
            write_through: AtomicBool::new(false),
            changes,
            persist: PersistQueue::spawn(Arc::clone(&store), path.clone()),
            store,
            path,
            themes: theme_applier.map(spawn_theme_worker),
        };

        if !service.reload() {
            info!(path = %service.path.display(), "no usable settings file; using defaults");
        }
        Arc::new(service)
    }

    /// Re-reads the settings file and pushes every value through the
    /// setters with write-through disabled.
    ///
    /// Returns `false` (and leaves the current values untouched) when the
    /// file could not be read.
    pub fn reload(&self) -> bool {
        self.write_through.store(false, Ordering::Release);

        let loaded = self
            .store
            .try_read::<SettingsRecord>(&self.path, Some(&legacy_settings_plan()));
        let found = loaded.is_some();
        if let Some(record) = loaded {
            self.set_app_color_theme(record.app_color_theme);
            self.set_background_type(record.background_type);
            self.set_background_image_path(record.background_image_path);
            self.set_background_image_stretch(record.background_image_stretch);
            debug!(path = %self.path.display(), "settings loaded");
        }

        self.write_through.store(true, Ordering::Release);
        found
    }

    // ── Getters ───────────────────────────────────────────────────────────────

    pub fn app_color_theme(&self) -> AppTheme {
        self.read_record().app_color_theme
    }

    pub fn background_type(&self) -> BackgroundType {
        self.read_record().background_type
    }

    pub fn background_image_path(&self) -> String {
        self.read_record().background_image_path.clone()
    }

    pub fn background_image_stretch(&self) -> Stretch {
        self.read_record().background_image_stretch
    }

    /// A copy of the whole record.
    pub fn snapshot(&self) -> SettingsRecord {
        self.read_record().clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_write_through(&self) -> bool {
        self.write_through.load(Ordering::Acquire)
    }

    // ── Setters ───────────────────────────────────────────────────────────────

    pub fn set_app_color_theme(&self, theme: AppTheme) {
        self.update(SettingsProperty::AppColorTheme, |r| {
            r.app_color_theme = theme;
            self.queue_theme(theme);
        });
    }

    pub fn set_background_type(&self, background_type: BackgroundType) {
        self.update(SettingsProperty::BackgroundType, |r| {
            r.background_type = background_type
        });
    }

    pub fn set_background_image_path(&self, path: impl Into<String>) {
        let path = path.into();
        self.update(SettingsProperty::BackgroundImagePath, |r| {
            r.background_image_path = path
        });
    }

    pub fn set_background_image_stretch(&self, stretch: Stretch) {
        self.update(SettingsProperty::BackgroundImageStretch, |r| {
            r.background_image_stretch = stretch
        });
    }

    // ── Observation and lifecycle ─────────────────────────────────────────────

    /// Receives the name of every property set after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SettingsProperty> {
        self.changes.subscribe()
    }

    /// Waits until every snapshot queued so far is on disk.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    /// Writes pending snapshots and stops the persist worker. Setters keep
    /// working afterwards but nothing more is written.
    pub async fn shutdown(&self) {
        self.persist.shutdown().await;
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn read_record(&self) -> std::sync::RwLockReadGuard<'_, SettingsRecord> {
        self.record.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, property: SettingsProperty, mutate: impl FnOnce(&mut SettingsRecord)) {
        {
            let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut record);
            // Queue under the lock so snapshots reach the worker in mutation order.
            if self.is_write_through() {
                self.persist.enqueue(record.clone());
            }
        }
        // Err only means nobody is subscribed.
        self.changes.send(property).ok();
    }

    fn queue_theme(&self, theme: AppTheme) {
        if let Some(themes) = &self.themes {
            if themes.send(theme).is_err() {
                warn!(?theme, "theme worker stopped; theme not applied");
            }
        }
    }
}

fn spawn_theme_worker(applier: Arc<dyn ThemeApplier>) -> mpsc::UnboundedSender<AppTheme> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_theme_worker(applier, rx));
    tx
}

/// Applies themes one at a time, skipping to the newest queued request.
/// Exits when the service is dropped.
async fn run_theme_worker(
    applier: Arc<dyn ThemeApplier>,
    mut rx: mpsc::UnboundedReceiver<AppTheme>,
) {
    while let Some(mut theme) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            theme = newer;
        }
        if let Err(e) = applier.apply_theme(theme).await {
            warn!(?theme, error = %e, "failed to apply colour theme");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
