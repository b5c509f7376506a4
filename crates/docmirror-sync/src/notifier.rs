//! Change notifier.
//!
//! Keeps the mirror current during a development session and tells connected
//! clients when the mirrored document changes.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::mirror::{MirrorError, mirror};
use crate::paths::MirrorPaths;

/// Message type tag for client notifications.
const CUSTOM_TYPE: &str = "custom";

/// Message sent to connected clients when the mirrored document changes.
///
/// Serializes as `{"type":"custom","event":"<name>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientNotification {
    /// Message type (always "custom").
    #[serde(rename = "type")]
    message_type: String,
    /// Event name clients subscribe to.
    event: String,
}

impl ClientNotification {
    /// Create a custom event notification.
    #[must_use]
    pub fn custom(event: impl Into<String>) -> Self {
        Self {
            message_type: CUSTOM_TYPE.to_owned(),
            event: event.into(),
        }
    }

    /// Event name.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Outbound channel to connected development clients.
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification to every connected client.
    ///
    /// Returns the number of clients reached. With no clients connected the
    /// notification is dropped and `0` is returned.
    fn send(&self, notification: ClientNotification) -> usize;
}

/// Notifier state for the watched source document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifierState {
    /// Waiting for changes.
    Idle,
    /// A change to the source document was accepted.
    ChangeDetected,
    /// The mirror copy is running.
    Copying,
}

/// Handles source and output change events for one mirrored document.
pub struct ChangeNotifier {
    paths: Arc<MirrorPaths>,
    event: String,
    sink: Arc<dyn NotificationSink>,
    state: Mutex<NotifierState>,
}

impl ChangeNotifier {
    /// Create a notifier for the given paths.
    ///
    /// # Arguments
    ///
    /// * `paths` - Resolved source and mirrored document paths
    /// * `event` - Event name sent to clients (e.g. "readme-update")
    /// * `sink` - Channel to connected clients
    #[must_use]
    pub fn new(
        paths: Arc<MirrorPaths>,
        event: impl Into<String>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            paths,
            event: event.into(),
            sink,
            state: Mutex::new(NotifierState::Idle),
        }
    }

    /// Paths this notifier guards.
    #[must_use]
    pub fn paths(&self) -> &Arc<MirrorPaths> {
        &self.paths
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NotifierState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: NotifierState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Handle a change reported for `path` by the watcher.
    ///
    /// Ignored (returns `Ok(None)`) unless `path` equals the source document
    /// path exactly. Otherwise re-mirrors the document and returns the number
    /// of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns the [`MirrorError`] of a failed copy. The notifier returns to
    /// [`NotifierState::Idle`] either way.
    pub fn on_source_changed(&self, path: &Path) -> Result<Option<u64>, MirrorError> {
        if path != self.paths.source() {
            return Ok(None);
        }

        self.set_state(NotifierState::ChangeDetected);
        tracing::debug!(path = %path.display(), "Source document changed");

        self.set_state(NotifierState::Copying);
        let result = mirror(&self.paths);
        self.set_state(NotifierState::Idle);

        result.map(Some)
    }

    /// Handle a change reported for `path` in the public directory.
    ///
    /// Ignored (returns `None`) unless `path` equals the mirrored document
    /// path exactly. Otherwise sends the configured event to all clients and
    /// returns how many were reached.
    pub fn on_output_changed(&self, path: &Path) -> Option<usize> {
        if path != self.paths.destination() {
            return None;
        }

        let clients = self.sink.send(ClientNotification::custom(&self.event));
        tracing::info!(event = %self.event, clients, "Sent client notification");
        Some(clients)
    }
}
