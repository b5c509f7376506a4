//! Security headers middleware.
//!
//! The policy is built around the built-in page: one same-origin script, one
//! same-origin stylesheet, `fetch` to the document route and a WebSocket to
//! `/ws/live-reload`. Files served from the public directory get the same
//! headers.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy directives, in header order.
const CSP_DIRECTIVES: &[(&str, &str)] = &[
    ("default-src", "'self'"),
    ("script-src", "'self'"),
    ("style-src", "'self'"),
    ("connect-src", "'self' ws: wss:"),
    ("object-src", "'none'"),
    ("base-uri", "'none'"),
    ("frame-ancestors", "'none'"),
];

fn csp_value() -> String {
    CSP_DIRECTIVES
        .iter()
        .map(|(name, value)| format!("{name} {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Create layer that adds Content-Security-Policy header.
///
/// A handler that sets its own policy keeps it.
pub(crate) fn csp_layer() -> SetResponseHeaderLayer<HeaderValue> {
    let value = HeaderValue::try_from(csp_value())
        .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'"));
    SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static("content-security-policy"),
        value,
    )
}

/// Create layer that adds `X-Content-Type-Options: nosniff`.
///
/// Served markdown must never be sniffed as HTML.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that adds `X-Frame-Options: DENY`.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}
