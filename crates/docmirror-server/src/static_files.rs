//! Static file serving.
//!
//! Serves files from the public directory, falling back to the built-in page
//! assets for `/` and the reserved `__docmirror/` prefix.

use std::path::{Component, Path};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::assets;
use crate::state::AppState;

/// Create router for static file serving.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_static)
}

/// Serve a file from the public directory or a built-in asset.
async fn serve_static(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let Ok(decoded) = percent_decode_str(req.uri().path()).decode_utf8() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let path = decoded.trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    if !is_safe_relative(file_path) {
        return StatusCode::NOT_FOUND.into_response();
    }

    if !file_path.starts_with(assets::BUILTIN_PREFIX) {
        let full_path = state.public_dir.join(file_path);
        if let Ok(content) = tokio::fs::read(&full_path).await {
            return file_response(file_path, Body::from(content));
        }
    }

    if let Some(content) = assets::get(file_path) {
        return file_response(file_path, Body::from(content));
    }

    StatusCode::NOT_FOUND.into_response()
}

fn file_response(file_path: &str, body: Body) -> Response {
    ([(header::CONTENT_TYPE, assets::mime_for(file_path))], body).into_response()
}

/// Reject absolute paths and any `..` or `.` component.
///
/// Applied after percent-decoding, so `%2e%2e/` is rejected too.
fn is_safe_relative(path: &str) -> bool {
    !path.contains('\\')
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("README.md"));
        assert!(is_safe_relative("docs/README.md"));
        assert!(!is_safe_relative("../secret.txt"));
        assert!(!is_safe_relative("docs/../../secret.txt"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative("..\\secret.txt"));
    }

    #[test]
    fn test_static_router_constructs() {
        let _router: Router<Arc<AppState>> = static_router();
    }
}
