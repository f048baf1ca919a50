//! HTTP API Module.
//!
//! Exposes the admission webhook endpoint plus health checks and metrics.

mod routes;
mod metrics;

pub use routes::run_api_server;
pub use metrics::Metrics;
