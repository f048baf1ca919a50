//! Policy Fetcher Interface.
//!
//! Returns the ISPs applicable to a namespace. This crate ships a static
//! in-memory fetcher for tests/demos and a file-backed (TOML) fetcher for
//! operators who don't run a CRD-backed policy store.

mod file;
mod memory;

pub use file::FilePolicyFetcher;
pub use memory::InMemoryPolicyFetcher;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ImageSecurityPolicy;

#[derive(Debug, Error)]
pub enum PolicyFetchError {
    #[error("failed to read policy source: {0}")]
    Source(String),
    #[error("failed to parse policy: {0}")]
    Parse(String),
}

/// Returns the ISPs applicable to a namespace. An empty result is not an
/// error: absence of policy means "allow", handled by the caller, not by
/// this trait.
#[async_trait]
pub trait PolicyFetcher: Send + Sync {
    async fn policies_in(&self, namespace: &str) -> Result<Vec<ImageSecurityPolicy>, PolicyFetchError>;
}
