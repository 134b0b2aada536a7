//! Greeting handler.
//!
//! Answers every method on every path with `Hello, <path>!`. The health-check
//! path gets the same greeting; it is only special to the request logger.

use std::borrow::Cow;

use axum::http::Uri;

/// Returns the request path without its leading slash, percent-decoded.
/// Paths that do not decode to UTF-8 are returned as sent.
pub fn requested_path(path: &str) -> Cow<'_, str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

/// Greeting handler. Served as `text/plain`, so the path is echoed verbatim.
pub async fn hello(uri: Uri) -> String {
    format!("Hello, {}!", requested_path(uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_path() {
        assert_eq!(requested_path("/world"), "world");
        assert_eq!(requested_path("/"), "");
        assert_eq!(requested_path("/a/b"), "a/b");
        assert_eq!(requested_path("/hello%20there"), "hello there");
        // Invalid UTF-8 after decoding: keep the raw segment
        assert_eq!(requested_path("/%FF"), "%FF");
    }

    #[tokio::test]
    async fn test_hello_formats_path() {
        let uri: Uri = "/world?x=1".parse().unwrap();
        assert_eq!(hello(uri).await, "Hello, world!");
    }
}
