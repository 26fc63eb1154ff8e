//! Tracing setup.
//!
//! One global `tracing-subscriber` fmt subscriber. The filter comes from
//! `TESSERA_LOG` when set, otherwise from `logging.level`. Output goes to stderr, or
//! to `logging.file` when configured.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const LOG_ENV_VAR: &str = "TESSERA_LOG";

/// Flushes the log file when dropped.
#[must_use = "logging to a file stops being flushed when the guard is dropped"]
pub struct LoggingGuard {
    file: Option<Arc<File>>,
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        info!("logging stopped");
        if let Some(file) = &self.file {
            let _ = (&**file).flush();
        }
    }
}

/// The filter used for `level`, unless `TESSERA_LOG` is set.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(config: &LoggingConfig) -> io::Result<LoggingGuard> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(&config.level)).with_target(true);

    let (result, file) = match config.file_path() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = Arc::new(OpenOptions::new().create(true).append(true).open(&path)?);
            (builder.with_ansi(false).with_writer(Arc::clone(&file)).try_init(), Some(file))
        }
        None => (builder.with_writer(io::stderr).try_init(), None),
    };

    if let Err(err) = result {
        // Already installed, e.g. by a test harness.
        debug!(error = %err, "global subscriber not replaced");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Ok(LoggingGuard { file })
}
