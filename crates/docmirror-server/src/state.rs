//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Absolute path of the mirrored document.
    pub(crate) document_path: PathBuf,
    /// URL path the mirrored document is served under.
    pub(crate) document_route: String,
    /// Public directory for static files.
    pub(crate) public_dir: PathBuf,
    /// Live reload event name.
    pub(crate) event: String,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
    /// Enable verbose output.
    pub(crate) verbose: bool,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}

impl AppState {
    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
