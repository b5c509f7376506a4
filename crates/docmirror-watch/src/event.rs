//! Watch event types for change notification.
//!
//! Provides types for subscribing to file changes through the [`Watcher::watch`](crate::Watcher::watch) method.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

/// Kind of watch event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchEventKind {
    /// File was created (editors that save via rename also report this).
    Created,
    /// File content was modified.
    Modified,
    /// File was removed.
    Removed,
}

/// A file change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    /// Absolute path of the changed file, as reported under the watched directory.
    pub path: PathBuf,
    /// Kind of change.
    pub kind: WatchEventKind,
}

impl WatchEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: WatchEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Receiver for watch events.
///
/// Wraps a [`std::sync::mpsc::Receiver`] for synchronous event delivery.
/// Can be iterated with [`iter()`](Self::iter) or polled with [`recv()`](Self::recv)/[`try_recv()`](Self::try_recv).
pub struct WatchEventReceiver {
    rx: mpsc::Receiver<WatchEvent>,
}

impl WatchEventReceiver {
    /// Create a new receiver from a channel receiver.
    pub(crate) fn new(rx: mpsc::Receiver<WatchEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event (blocking).
    ///
    /// Returns `None` when the sender is dropped.
    #[must_use]
    pub fn recv(&self) -> Option<WatchEvent> {
        self.rx.recv().ok()
    }

    /// Wait for the next event for at most `timeout`.
    ///
    /// Returns `None` on timeout or when the sender is dropped.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Try to receive an event without blocking.
    ///
    /// Returns `None` if no event is available or the sender is dropped.
    #[must_use]
    pub fn try_recv(&self) -> Option<WatchEvent> {
        self.rx.try_recv().ok()
    }

    /// Returns an iterator over events.
    ///
    /// Blocks until an event is available. Stops when the sender is dropped.
    pub fn iter(&self) -> impl Iterator<Item = WatchEvent> + '_ {
        self.rx.iter()
    }
}

/// Handle to stop watching for changes.
///
/// Uses RAII pattern - dropping the handle stops watching automatically.
/// Signals shutdown by dropping the internal channel sender.
pub struct WatchHandle {
    _shutdown: Option<mpsc::Sender<()>>,
}

impl WatchHandle {
    /// Create a new watch handle with a shutdown signal sender.
    ///
    /// When the handle is dropped, the sender is dropped, causing the
    /// receiver to return `Err(RecvError)` which signals shutdown.
    pub(crate) fn new(shutdown: mpsc::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
        }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._shutdown.take();
    }

    /// Create a handle that does nothing on drop.
    #[cfg(feature = "mock")]
    pub(crate) fn no_op() -> Self {
        Self { _shutdown: None }
    }
}
