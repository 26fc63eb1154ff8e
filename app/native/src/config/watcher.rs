//! Configuration file watcher.
//!
//! Keybindings are reloaded when the configuration file changes. Everything else
//! takes effect on the next start.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use super::get_config_path;
use crate::platform::{OwnerHandle, OwnerMessage, spawn_named_thread};

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Starts watching the loaded configuration file. Each settled change posts
/// [`OwnerMessage::ReloadKeybindings`] to the owner thread.
pub fn watch_config_file(owner: OwnerHandle) {
    let Some(config_path) = get_config_path().cloned() else {
        // No config file loaded, nothing to watch
        return;
    };

    let result = watch_path(config_path, move || {
        info!("configuration file changed, reloading keybindings");
        owner.post(OwnerMessage::ReloadKeybindings)
    });
    if let Err(err) = result {
        warn!(error = %err, "failed to start config watcher");
    }
}

/// Watches `path` on a background thread and calls `on_change` once per burst of
/// events that touch it. The thread stops when `on_change` returns `false`.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn watch_path(path: PathBuf, on_change: impl Fn() -> bool + Send + 'static) -> std::io::Result<()> {
    let file_name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    spawn_named_thread("config-watcher", move || {
        let (tx, rx) = mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        // Watch the parent directory to catch file replacements
        // (some editors save by writing to a temp file then renaming)
        let watch_path = path.parent().unwrap_or(&path);
        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            warn!(error = %err, path = %watch_path.display(), "failed to watch config file");
            return;
        }

        let affects_config = |event: &notify::Event| {
            event.paths.iter().any(|p| p.file_name().is_some_and(|name| name == file_name))
        };
        let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);

        loop {
            match rx.recv() {
                Ok(Ok(event)) if affects_config(&event) => {}
                Ok(Ok(_)) => continue,
                Ok(Err(err)) => {
                    warn!(error = %err, "config watch error");
                    continue;
                }
                // Channel closed, watcher dropped
                Err(_) => break,
            }

            // Wait for the burst to settle before reloading.
            loop {
                match rx.recv_timeout(debounce) {
                    Ok(_) => {}
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }

            if !on_change() {
                debug!("owner is gone, stopping config watcher");
                break;
            }
        }
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn config_debounce_duration_is_reasonable() {
        const { assert!(CONFIG_DEBOUNCE_MS >= 100) };
        const { assert!(CONFIG_DEBOUNCE_MS <= 1000) };
    }

    #[test]
    fn burst_of_writes_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        fs::write(&path, "{}").unwrap();

        let (tx, rx) = mpsc::channel();
        watch_path(path.clone(), move || tx.send(()).is_ok()).unwrap();
        // Let the watcher register before writing.
        std::thread::sleep(Duration::from_millis(200));

        fs::write(&path, "{ }").unwrap();
        fs::write(&path, "{  }").unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(rx.recv_timeout(Duration::from_millis(600)).is_err());
    }

    #[test]
    fn other_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        fs::write(&path, "{}").unwrap();

        let (tx, rx) = mpsc::channel();
        watch_path(path, move || tx.send(()).is_ok()).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        fs::write(dir.path().join("other.json"), "{}").unwrap();
        assert!(rx.recv_timeout(Duration::from_millis(800)).is_err());
    }
}
