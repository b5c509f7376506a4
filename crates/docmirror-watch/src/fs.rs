//! Filesystem watcher implementation.
//!
//! Provides [`FsWatcher`], a `notify`-backed [`Watcher`] with event debouncing.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::debouncer::EventDebouncer;
use crate::event::{WatchEventKind, WatchEventReceiver, WatchHandle};
use crate::watcher::{WatchError, Watcher};

/// Default debounce window in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Interval at which the drain thread polls the debouncer.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Filesystem watcher backed by the platform's recommended `notify` backend.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use docmirror_watch::{FsWatcher, Watcher};
///
/// let watcher = FsWatcher::new().with_debounce_ms(50);
/// let (rx, handle) = watcher.watch(&[PathBuf::from("/project")])?;
/// ```
#[derive(Debug, Clone)]
pub struct FsWatcher {
    debounce: Duration,
}

impl Default for FsWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FsWatcher {
    /// Create a new filesystem watcher with the default debounce window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }

    /// Set the debounce window in milliseconds.
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce = Duration::from_millis(debounce_ms);
        self
    }

    /// Convert a `notify` event kind into a watch event kind.
    fn event_kind(kind: notify::EventKind) -> Option<WatchEventKind> {
        match kind {
            notify::EventKind::Create(_) => Some(WatchEventKind::Created),
            notify::EventKind::Modify(_) => Some(WatchEventKind::Modified),
            notify::EventKind::Remove(_) => Some(WatchEventKind::Removed),
            _ => None,
        }
    }
}

impl Watcher for FsWatcher {
    fn watch(&self, dirs: &[PathBuf]) -> Result<(WatchEventReceiver, WatchHandle), WatchError> {
        let dirs: BTreeSet<&PathBuf> = dirs.iter().collect();
        if let Some(missing) = dirs.iter().find(|dir| !dir.is_dir()) {
            return Err(WatchError::NotADirectory((*missing).clone()));
        }

        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let debouncer = Arc::new(EventDebouncer::new(self.debounce));
        let debouncer_for_watcher = Arc::clone(&debouncer);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "File watcher reported an error");
                        return;
                    }
                };
                let Some(kind) = Self::event_kind(event.kind) else {
                    return;
                };
                for path in event.paths {
                    tracing::trace!(path = %path.display(), ?kind, "Raw filesystem event");
                    debouncer_for_watcher.record(path, kind);
                }
            })?;

        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(dir = %dir.display(), "Watching directory");
        }

        // Keep watcher alive for as long as the drain thread runs
        let watcher = Arc::new(Mutex::new(watcher));

        std::thread::spawn(move || {
            let _watcher_guard = watcher;

            loop {
                match shutdown_rx.recv_timeout(POLL_INTERVAL) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                for event in debouncer.drain_ready() {
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            }
            tracing::debug!("File watcher stopped");
        });

        Ok((WatchEventReceiver::new(event_rx), WatchHandle::new(shutdown_tx)))
    }
}
