//! Event debouncing for file watching.
//!
//! Editors and copy operations typically emit several raw events per save
//! (truncate, write, metadata). The debouncer folds them into one event per
//! path once the path has been quiet for the debounce window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::event::{WatchEvent, WatchEventKind};

/// Pending event waiting to be emitted.
struct PendingEvent {
    kind: WatchEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<PathBuf, PendingEvent>>,
    debounce_duration: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer with the specified debounce duration.
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            debounce_duration,
        }
    }

    /// Record an event.
    ///
    /// Thread-safe, called from the `notify` callback thread.
    pub fn record(&self, path: PathBuf, kind: WatchEventKind) {
        use std::collections::hash_map::Entry;

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let deadline = Instant::now() + self.debounce_duration;

        match pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent { kind, deadline });
            }
            Entry::Occupied(mut entry) => {
                let existing_kind = entry.get().kind;
                if let Some(coalesced_kind) = Self::coalesce(existing_kind, kind) {
                    entry.get_mut().kind = coalesced_kind;
                    entry.get_mut().deadline = deadline;
                } else {
                    // Created then removed within the window: nothing to report
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two event kinds.
    ///
    /// Returns `None` if both events should be discarded (Created + Removed).
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: WatchEventKind, new: WatchEventKind) -> Option<WatchEventKind> {
        use WatchEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (Created, Created) => Some(Created),
            (Created, Modified) => Some(Created),
            (Created, Removed) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),

            // Write-temp-then-rename saves show up as remove + create
            (Removed, Created) => Some(Modified),
            (Removed, Modified) => Some(Removed),
            (Removed, Removed) => Some(Removed),
        }
    }

    /// Drain events that have passed their debounce deadline.
    pub fn drain_ready(&self) -> Vec<WatchEvent> {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Instant::now();

        let ready_paths: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, event)| event.deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        ready_paths
            .into_iter()
            .filter_map(|path| {
                let event = pending.remove(&path)?;
                Some(WatchEvent {
                    path,
                    kind: event.kind,
                })
            })
            .collect()
    }
}
