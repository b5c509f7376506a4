//! Live reload manager.
//!
//! Owns the broadcast channel that carries client notifications to
//! WebSocket connections.

use std::sync::Arc;

use docmirror_sync::{ClientNotification, NotificationSink};
use tokio::sync::broadcast;

/// Notification sink backed by a broadcast channel.
///
/// Sending with no connected clients is not an error; the notification is
/// dropped and zero recipients are reported.
struct BroadcastSink {
    sender: broadcast::Sender<ClientNotification>,
}

impl NotificationSink for BroadcastSink {
    fn send(&self, notification: ClientNotification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }
}

/// Sink used when live reload is off: the mirror is kept current but no
/// client is told.
pub(crate) struct DisabledSink;

impl NotificationSink for DisabledSink {
    fn send(&self, _notification: ClientNotification) -> usize {
        0
    }
}

/// Manages broadcasting client notifications.
pub(crate) struct LiveReloadManager {
    broadcaster: broadcast::Sender<ClientNotification>,
}

impl LiveReloadManager {
    /// Create a new live reload manager.
    ///
    /// # Arguments
    ///
    /// * `broadcaster` - Broadcast channel sender for client notifications
    #[must_use]
    pub(crate) fn new(broadcaster: broadcast::Sender<ClientNotification>) -> Self {
        Self { broadcaster }
    }

    /// Sink that forwards notifications to every subscribed client.
    pub(crate) fn sink(&self) -> Arc<dyn NotificationSink> {
        Arc::new(BroadcastSink {
            sender: self.broadcaster.clone(),
        })
    }

    /// Subscribe to client notifications.
    #[must_use]
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ClientNotification> {
        self.broadcaster.subscribe()
    }
}
