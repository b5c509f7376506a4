//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;

use crate::handlers;
use crate::live_reload;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Paths registered by the server itself, and prefixes it owns.
const RESERVED_ROUTES: &[&str] = &["/api/config", "/ws/live-reload", "/__docmirror"];

/// Check that `route` can be registered next to the server's own routes.
///
/// `Router::route` panics on overlapping routes and on path parameter
/// syntax, so the document route is checked up front.
pub(crate) fn check_document_route(route: &str) -> Result<(), &'static str> {
    let Some(path) = route.strip_prefix('/') else {
        return Err("must start with '/'");
    };
    if path.is_empty() || path.split('/').any(str::is_empty) {
        return Err("must not contain empty segments");
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err("segments must not start with ':' or '*'");
    }
    if path.contains(['{', '}']) {
        return Err("must not contain '{' or '}'");
    }
    if RESERVED_ROUTES
        .iter()
        .any(|reserved| route == *reserved || route.starts_with(&format!("{reserved}/")))
    {
        return Err("conflicts with a reserved server path");
    }
    Ok(())
}

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route(
            &state.document_route,
            get(handlers::document::get_document),
        );

    // WebSocket for live reload
    if state.live_reload_enabled() {
        router = router.route("/ws/live-reload", get(live_reload::ws_handler));
    }

    // Public directory and built-in page
    router = router.merge(static_files::static_router());

    router
        .layer(
            ServiceBuilder::new()
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
