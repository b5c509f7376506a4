//! Mirrored document endpoint.
//!
//! Serves the mirrored file's raw bytes. The file is read on every request;
//! a request racing a mirror copy may see partially written content.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use crate::assets;
use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET on the document route.
pub(crate) async fn get_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let content = match tokio::fs::read(&state.document_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::DocumentNotFound(state.document_route.clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let etag = compute_etag(&state.version, &content);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    if state.verbose {
        tracing::info!(route = %state.document_route, bytes = content.len(), "Serving document");
    }

    let mut response = (
        [
            (
                header::CONTENT_TYPE,
                assets::mime_for(&state.document_route),
            ),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        Body::from(content),
    )
        .into_response();

    if let Some(last_modified) = last_modified(&state).await
        && let Ok(value) = last_modified.parse()
    {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }

    Ok(response)
}

/// Format the mirrored file's modification time as an HTTP date.
async fn last_modified(state: &AppState) -> Option<String> {
    let modified = tokio::fs::metadata(&state.document_path)
        .await
        .ok()?
        .modified()
        .ok()?;
    let modified: DateTime<Utc> = modified.into();
    Some(modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(version.as_bytes());
    hasher.update(b":");
    hasher.update(content);
    format!("\"{}\"", &hex::encode(hasher.finalize())[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        let etag1 = compute_etag("1.0.0", b"Hello");
        let etag2 = compute_etag("1.0.1", b"Hello");

        assert_ne!(etag1, etag2);
    }

    #[test]
    fn test_compute_etag_includes_content() {
        let etag1 = compute_etag("1.0.0", b"Hello");
        let etag2 = compute_etag("1.0.0", b"World");

        assert_ne!(etag1, etag2);
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", b"Hello");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        // 16 hex chars + 2 quotes
        assert_eq!(etag.len(), 18);
    }
}
