//! In-memory metadata client, used by tests and by the `--metadata-backend
//! static` operator mode for demos and fixtures.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{MetadataClient, MetadataError};
use crate::types::{Build, Vulnerability};

#[derive(Default)]
pub struct InMemoryMetadataClient {
    vulnerabilities: RwLock<HashMap<String, Vec<Vulnerability>>>,
    builds: RwLock<HashMap<String, Vec<Build>>>,
}

impl InMemoryMetadataClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vulnerabilities(self, digest: impl Into<String>, vulns: Vec<Vulnerability>) -> Self {
        self.vulnerabilities.write().unwrap().insert(digest.into(), vulns);
        self
    }

    pub fn with_builds(self, digest: impl Into<String>, builds: Vec<Build>) -> Self {
        self.builds.write().unwrap().insert(digest.into(), builds);
        self
    }
}

#[async_trait]
impl MetadataClient for InMemoryMetadataClient {
    async fn vulnerabilities_for(&self, digest: &str) -> Result<Vec<Vulnerability>, MetadataError> {
        Ok(self
            .vulnerabilities
            .read()
            .unwrap()
            .get(digest)
            .cloned()
            .unwrap_or_default())
    }

    async fn builds_for(&self, digest: &str) -> Result<Vec<Build>, MetadataError> {
        Ok(self.builds.read().unwrap().get(digest).cloned().unwrap_or_default())
    }
}
