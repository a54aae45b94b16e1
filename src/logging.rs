//! Console and rolling-file logging for the pipeline binary.
//!
//! Logs go to stdout and to daily files in the platform data directory:
//!
//! - `techlogistics.<date>.log`: everything at the active level
//! - `error.<date>.log`: warnings and errors only
//!
//! The level defaults to INFO and follows `RUST_LOG` when set.
//!
//! ```no_run
//! techlogistics::logging::init()?;
//! tracing::info!("Run started");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const APP_DIR: &str = "techlogistics";
const MAX_LOG_FILES: usize = 10;

/// Log directory under the platform data directory
/// (`~/.local/share/techlogistics/logs` on Linux).
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join(APP_DIR).join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn appender(prefix: &str, log_dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Install the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Returns error if the log directory or the file appenders cannot be created.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;
    let all_logs_appender = appender(APP_DIR, &log_dir)?;
    let error_logs_appender = appender("error", &log_dir)?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_get_log_dir() {
        let log_dir = get_log_dir().unwrap();
        assert!(log_dir.ends_with("techlogistics/logs") || log_dir.ends_with("techlogistics\\logs"));
    }
}
