//! Mapping-file watcher.
//!
//! A background thread polls the file's modification time and sends a
//! [`WatchEvent`] over a channel when it changes. The render thread drains
//! the channel inside `EmotionMachine::update`, so the mapping swap itself
//! always happens on the thread that owns the machine.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(PathBuf),
}

pub struct ConfigWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ConfigWatcher {
    /// Start polling `path` every `poll_interval`. Events are delivered on
    /// `tx`; the thread exits when the receiver is dropped or on `stop()`.
    pub fn spawn(path: PathBuf, poll_interval: Duration, tx: Sender<WatchEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("roboeyes-config-watch".to_string())
            .spawn(move || watch_loop(&path, poll_interval, &tx, &stop_flag));
        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!("failed to spawn config watcher: {err}");
                None
            }
        };
        Self { stop, handle }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stop.load(Ordering::Relaxed)
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("config watcher thread panicked");
            }
        }
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn watch_loop(path: &Path, poll_interval: Duration, tx: &Sender<WatchEvent>, stop: &AtomicBool) {
    log::debug!("watching {} for changes", path.display());
    let mut last_mtime = mtime(path);
    while !stop.load(Ordering::Relaxed) {
        // Sleep in short slices so stop() stays responsive.
        let mut slept = Duration::ZERO;
        while slept < poll_interval {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let slice = Duration::from_millis(50).min(poll_interval - slept);
            thread::sleep(slice);
            slept += slice;
        }

        let current = mtime(path);
        match (&last_mtime, &current) {
            (Some(previous), Some(now)) if now > previous => {
                log::info!("mapping file {} changed", path.display());
                if tx.send(WatchEvent::Changed(path.to_path_buf())).is_err() {
                    return;
                }
            }
            (None, Some(_)) => {
                // File appeared after a transient miss (editors often
                // replace-by-rename); treat as a change.
                if tx.send(WatchEvent::Changed(path.to_path_buf())).is_err() {
                    return;
                }
            }
            _ => {}
        }
        if current.is_some() {
            last_mtime = current;
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path) {
        Ok(metadata) => metadata.modified().ok(),
        Err(err) => {
            log::debug!("cannot stat {}: {err}", path.display());
            None
        }
    }
}
