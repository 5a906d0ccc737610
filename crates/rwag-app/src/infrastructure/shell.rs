//! Hands a config file or folder to the system file manager.
//!
//! Used by the settings pages' "open config folder" buttons. The path goes
//! through the same strict [`PathValidator`] check as every config access
//! before anything is spawned.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread::JoinHandle;

use rwag_core::{PathRejection, PathValidator};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("refusing to open invalid path {}: {reason}", .path.display())]
    InvalidPath {
        path: PathBuf,
        #[source]
        reason: PathRejection,
    },

    #[error("nothing to open at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to launch {program} for {}: {source}", .path.display())]
    Spawn {
        program: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The program that opens a path with its default handler on this host.
pub fn opener_program() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Opens `path` (file or folder) with the platform's default handler.
///
/// Returns once the opener has been spawned; it is not waited for.
pub fn open_in_file_manager(validator: &PathValidator, path: &Path) -> Result<(), ShellError> {
    validator
        .check(path)
        .map_err(|reason| ShellError::InvalidPath {
            path: path.to_path_buf(),
            reason,
        })?;
    if !path.exists() {
        return Err(ShellError::NotFound(path.to_path_buf()));
    }

    let program = opener_program();
    let child = Command::new(program)
        .arg(path)
        .spawn()
        .map_err(|source| ShellError::Spawn {
            program,
            path: path.to_path_buf(),
            source,
        })?;
    reap_in_background(program, child);

    info!(path = %path.display(), program, "opened in file manager");
    Ok(())
}

/// Waits for the opener on a detached thread so it does not linger as a
/// zombie once it exits.
fn reap_in_background(program: &'static str, mut child: Child) -> JoinHandle<Option<ExitStatus>> {
    std::thread::spawn(move || match child.wait() {
        Ok(status) => {
            if !status.success() {
                warn!(program, %status, "opener exited with failure");
            } else {
                debug!(program, "opener exited");
            }
            Some(status)
        }
        Err(e) => {
            warn!(program, error = %e, "failed to wait for opener");
            None
        }
    })
}

/// Fail-soft [`open_in_file_manager`].
pub fn try_open_in_file_manager(validator: &PathValidator, path: &Path) -> bool {
    match open_in_file_manager(validator, path) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "could not open path");
            false
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
