//! HTTP routes for the hello service.
//!
//! There is a single route: the fallback, so every method and path reaches the
//! greeting handler. Responses are never cached, keeping health checks fresh.
//!
//! Request logging is done by middleware that wraps each request in a span
//! with a unique request ID. Health-check requests are not logged.

pub mod hello;

use axum::{middleware, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_GREETING;
use crate::middleware::request_log_layer;

/// Creates the Axum router for the hello service.
pub fn create_router() -> Router {
    Router::new()
        .fallback(hello::hello)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_GREETING),
        ))
        // Request logging - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_log_layer))
}
