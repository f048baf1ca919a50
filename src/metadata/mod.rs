//! Metadata Client Interface.
//!
//! Abstract fetcher returning vulnerabilities and builds for a digest. The
//! concrete Grafeas/Container Analysis backends are out of scope; this module
//! only owns the trait, an in-memory double for tests, and a generic
//! HTTP-backed adapter for operators who run a REST-shaped metadata service.

mod http;
mod memory;

pub use http::HttpMetadataClient;
pub use memory::InMemoryMetadataClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Build, Vulnerability};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata backend request failed: {0}")]
    Request(String),
    #[error("metadata backend returned malformed data: {0}")]
    Decode(String),
}

/// Fetches vulnerability and build metadata for an image digest.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn vulnerabilities_for(&self, digest: &str) -> Result<Vec<Vulnerability>, MetadataError>;
    async fn builds_for(&self, digest: &str) -> Result<Vec<Build>, MetadataError>;
}
