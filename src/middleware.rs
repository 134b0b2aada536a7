//! Request logging middleware.
//!
//! Generates a UUID v4 for each incoming request and creates a tracing span
//! that wraps the request lifecycle, then logs the host and path once the
//! response is ready. Requests for the health-check path are passed straight
//! through: load balancers probe it constantly and it would drown the log.

use std::time::Instant;

use axum::{extract::Request, http::header::HOST, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::HEALTHCHECK_PATH;
use crate::routes::hello::requested_path;

/// Middleware that logs every request except health checks.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_log_layer(request: Request, next: Next) -> Response {
    let path = requested_path(request.uri().path()).into_owned();
    if path == HEALTHCHECK_PATH {
        return next.run(request).await;
    }

    let request_id = Uuid::new_v4();
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or("-")
        .to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            host = %host,
            path = %path,
            status = response.status().as_u16(),
            "Request served"
        );

        response
    }
    .instrument(span)
    .await
}
