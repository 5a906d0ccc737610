//! Ordered background persistence of a single config document.
//!
//! Setters on the settings model must not block on disk I/O, but writes
//! issued in quick succession must land in order so the file always ends up
//! holding the newest state. [`PersistQueue`] owns one worker task fed by an
//! unbounded channel:
//!
//! ```text
//! enqueue(r1) ─┐
//! enqueue(r2) ─┼─► mpsc ─► worker: drain batch ─► keep newest ─► write ─► ack flushes
//! flush()     ─┘
//! ```
//!
//! Records queued while a write is in progress are coalesced: only the most
//! recent one is written, which is all that matters because each record is a
//! full snapshot.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::config_store::ConfigStore;

enum PersistCommand<T> {
    Write(T),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the persist worker for one file.
///
/// Must be created inside a Tokio runtime. Dropping the handle closes the
/// channel and the worker exits after finishing what is already queued.
pub struct PersistQueue<T> {
    tx: mpsc::UnboundedSender<PersistCommand<T>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    path: PathBuf,
}

impl<T> std::fmt::Debug for PersistQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistQueue")
            .field("path", &self.path)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<T> PersistQueue<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Starts the worker that writes queued records to `path` through
    /// `store`.
    pub fn spawn(store: Arc<ConfigStore>, path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, path.clone(), rx));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queues `record` for writing. Returns `false` once the worker has
    /// stopped.
    pub fn enqueue(&self, record: T) -> bool {
        if self.tx.send(PersistCommand::Write(record)).is_err() {
            warn!(path = %self.path.display(), "persist worker stopped; write dropped");
            return false;
        }
        true
    }

    /// Waits until every record queued before this call has been written
    /// (or its write has failed and been logged).
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_err() {
            return;
        }
        // A dropped sender means the worker stopped first; nothing is left to wait for.
        ack_rx.await.ok();
    }

    /// Writes what is queued, then stops the worker and waits for it.
    /// Idempotent.
    pub async fn shutdown(&self) {
        self.tx.send(PersistCommand::Shutdown).ok();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(path = %self.path.display(), error = %e, "persist worker ended abnormally");
            }
        }
    }
}

async fn run_worker<T>(
    store: Arc<ConfigStore>,
    path: PathBuf,
    mut rx: mpsc::UnboundedReceiver<PersistCommand<T>>,
) where
    T: Serialize + Send + Sync + 'static,
{
    debug!(path = %path.display(), "persist worker started");

    while let Some(first) = rx.recv().await {
        let mut latest: Option<T> = None;
        let mut acks = Vec::new();
        let mut coalesced = 0usize;
        let mut stop = false;

        // Drain everything already queued so one write covers the batch.
        let mut next = Some(first);
        while let Some(command) = next.take() {
            match command {
                PersistCommand::Write(record) => {
                    if latest.replace(record).is_some() {
                        coalesced += 1;
                    }
                }
                PersistCommand::Flush(ack) => acks.push(ack),
                PersistCommand::Shutdown => {
                    stop = true;
                    break;
                }
            }
            next = rx.try_recv().ok();
        }

        if let Some(record) = latest {
            if coalesced > 0 {
                debug!(path = %path.display(), coalesced, "superseded snapshots skipped");
            }
            if !store.try_write(&path, &record).await {
                warn!(path = %path.display(), "queued write failed; newer writes will retry");
            }
        }
        for ack in acks {
            ack.send(()).ok();
        }
        if stop {
            break;
        }
    }

    debug!(path = %path.display(), "persist worker stopped");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
