//! Static in-memory policy fetcher, for tests and for clusters small enough
//! to configure their ISPs directly in the controller's own config file.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{PolicyFetchError, PolicyFetcher};
use crate::types::ImageSecurityPolicy;

#[derive(Default)]
pub struct InMemoryPolicyFetcher {
    by_namespace: HashMap<String, Vec<ImageSecurityPolicy>>,
}

impl InMemoryPolicyFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>, isps: Vec<ImageSecurityPolicy>) -> Self {
        self.by_namespace.insert(namespace.into(), isps);
        self
    }
}

#[async_trait]
impl PolicyFetcher for InMemoryPolicyFetcher {
    async fn policies_in(&self, namespace: &str) -> Result<Vec<ImageSecurityPolicy>, PolicyFetchError> {
        Ok(self.by_namespace.get(namespace).cloned().unwrap_or_default())
    }
}
