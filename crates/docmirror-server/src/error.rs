//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docmirror_sync::MirrorError;
use docmirror_watch::WatchError;
use serde_json::json;

/// Error that prevents the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The startup mirror copy failed.
    #[error("{0}")]
    Mirror(#[from] MirrorError),

    /// The file watcher could not be started.
    #[error("{0}")]
    Watch(#[from] WatchError),

    /// Host and port do not form a socket address.
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    /// The document route cannot be registered.
    #[error("Invalid document route {route}: {reason}")]
    InvalidRoute {
        /// Offending route.
        route: String,
        /// Why the route was rejected.
        reason: &'static str,
    },

    /// Binding or serving failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request handler error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Mirrored document is missing on disk.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::DocumentNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Document not found", "path": path}),
            ),
            Self::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
