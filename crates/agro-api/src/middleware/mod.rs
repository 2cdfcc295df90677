//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`metrics`]: Prometheus request metrics through the `metrics` facade.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly and
//! authentication lives in [`crate::auth`].

pub mod metrics;
