//! HTTP server startup and shutdown.
//!
//! The service speaks plain HTTP only: TLS, when enabled, terminates at the
//! load balancer in front of it. The server drains in-flight requests on
//! SIGTERM/SIGINT, which is how the container orchestrator stops tasks.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
