//! WebSocket handler for live reload.
//!
//! Each connection subscribes to the notification channel and receives every
//! client notification as a JSON text frame.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use docmirror_sync::ClientNotification;
use tokio::sync::broadcast::{self, error::RecvError};

use super::LiveReloadManager;
use crate::state::AppState;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(receiver) = state.live_reload.as_ref().map(LiveReloadManager::subscribe) else {
        return axum::http::StatusCode::NOT_FOUND.into_response();
    };
    // Subscribe before the upgrade so no notification sent after the
    // handshake is missed
    ws.on_upgrade(move |socket| forward_notifications(socket, receiver))
}

/// Encode a notification as a text frame.
fn encode(notification: &ClientNotification) -> Option<Message> {
    match serde_json::to_string(notification) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode notification");
            None
        }
    }
}

/// Forward notifications until the client disconnects or the channel closes.
async fn forward_notifications(
    mut socket: WebSocket,
    mut receiver: broadcast::Receiver<ClientNotification>,
) {
    loop {
        tokio::select! {
            result = receiver.recv() => match result {
                Ok(notification) => {
                    let Some(message) = encode(&notification) else {
                        continue;
                    };
                    if socket.send(message).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Clients re-fetch the whole document, so one later
                    // notification covers the skipped ones
                    tracing::debug!(skipped, "Live reload client lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Live reload client disconnected");
}
