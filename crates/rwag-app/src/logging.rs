//! Process-wide `tracing` subscriber setup.
//!
//! Events go to two places: a human-readable console layer on stderr and a
//! daily rolling file (`rwaglab.log.YYYY-MM-DD`) under the application's
//! `Logs` directory. Both share one `EnvFilter`.

use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "rwaglab.log";

/// Installs the console and rolling file subscriber used by the host binary.
///
/// `default_level` applies when `RUST_LOG` is unset or unparsable. Fails if
/// the log directory cannot be created or a global subscriber is already
/// installed.
pub fn init_logging(log_dir: &Path, default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .with_context(|| format!("creating log file in {}", log_dir.display()))?;

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_install_creates_log_file_once() {
        // No other test installs a subscriber, so the first call wins.
        let dir = std::env::temp_dir().join(format!("rwag_logs_{}", Uuid::new_v4()));

        init_logging(&dir, "debug").expect("first install");
        tracing::info!("logging installed");

        let names: Vec<String> = std::fs::read_dir(&dir)
            .expect("log dir created")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with(LOG_FILE_PREFIX)), "{names:?}");
        assert!(init_logging(&dir, "debug").is_err());
    }
}
