//! Built-in page assets.
//!
//! A minimal page that displays the mirrored document and re-fetches it on
//! the live reload event. Served only when the public directory does not
//! provide its own file at the same path.

/// Built-in index page.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Built-in client script.
const CLIENT_JS: &str = include_str!("../assets/client.js");

/// Built-in stylesheet. Kept out of the page so the CSP needs no inline styles.
const STYLE_CSS: &str = include_str!("../assets/style.css");

/// Path prefix reserved for built-in assets.
pub(crate) const BUILTIN_PREFIX: &str = "__docmirror/";

/// Get a built-in asset by path (relative, without leading slash).
pub(crate) fn get(path: &str) -> Option<&'static str> {
    match path {
        "index.html" => Some(INDEX_HTML),
        "__docmirror/client.js" => Some(CLIENT_JS),
        "__docmirror/style.css" => Some(STYLE_CSS),
        _ => None,
    }
}

/// Return the `Content-Type` value for the given file path.
///
/// Text types carry an explicit UTF-8 charset.
pub(crate) fn mime_for(path: &str) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let is_text = mime.type_() == mime_guess::mime::TEXT
        || mime.subtype() == mime_guess::mime::JAVASCRIPT
        || mime.subtype() == mime_guess::mime::JSON;
    if is_text {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}
