//! Mock watcher implementation for testing.
//!
//! Provides [`MockWatcher`] for driving change handlers without a real
//! filesystem watcher.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, mpsc};

use crate::event::{WatchEvent, WatchEventKind, WatchEventReceiver, WatchHandle};
use crate::watcher::{WatchError, Watcher};

/// Mock watcher for testing.
///
/// Every call to [`watch`](Watcher::watch) registers a subscriber; [`emit`](Self::emit)
/// delivers an event to all subscribers watching the event's parent directory.
///
/// # Example
///
/// ```ignore
/// use docmirror_watch::{MockWatcher, WatchEventKind, Watcher};
///
/// let watcher = MockWatcher::new();
/// let (rx, _handle) = watcher.watch(&[PathBuf::from("/project")])?;
/// watcher.emit("/project/README.md", WatchEventKind::Modified);
/// assert!(rx.try_recv().is_some());
/// ```
#[derive(Debug, Default)]
pub struct MockWatcher {
    subscribers: RwLock<Vec<Subscriber>>,
}

#[derive(Debug)]
struct Subscriber {
    dirs: Vec<PathBuf>,
    sender: mpsc::Sender<WatchEvent>,
}

impl MockWatcher {
    /// Create a new mock watcher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event to every subscriber watching the path's parent directory.
    ///
    /// Returns the number of subscribers the event was delivered to.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit(&self, path: impl AsRef<Path>, kind: WatchEventKind) -> usize {
        let path = path.as_ref();
        let Some(parent) = path.parent() else {
            return 0;
        };

        let mut subscribers = self.subscribers.write().unwrap();
        // Drop subscribers whose receiver is gone
        subscribers.retain(|sub| {
            !sub.dirs.iter().any(|d| d == parent)
                || sub.sender.send(WatchEvent::new(path, kind)).is_ok()
        });
        subscribers
            .iter()
            .filter(|sub| sub.dirs.iter().any(|d| d == parent))
            .count()
    }

    /// Number of live subscriptions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }

    /// Close every subscription, ending receivers' iteration.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn close(&self) {
        self.subscribers.write().unwrap().clear();
    }
}

impl Watcher for MockWatcher {
    fn watch(&self, dirs: &[PathBuf]) -> Result<(WatchEventReceiver, WatchHandle), WatchError> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Subscriber {
                dirs: dirs.to_vec(),
                sender: tx,
            });
        Ok((WatchEventReceiver::new(rx), WatchHandle::no_op()))
    }
}
