//! hellostack: a hello HTTP service and the description of its deployment.
//!
//! The `routes`, `middleware` and `http` modules make up the service itself.
//! The `deploy` module resolves the deployment context and describes the
//! pipeline and Fargate service that run it.

pub mod config;
pub mod deploy;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

pub use error::{Error, Result};
