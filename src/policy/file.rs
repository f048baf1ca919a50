//! File-backed policy fetcher.
//!
//! Reads one TOML file per namespace from a directory, named
//! `{namespace}.toml`, each containing a `policies = [...]` array of ISPs.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::{PolicyFetchError, PolicyFetcher};
use crate::types::ImageSecurityPolicy;

#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<ImageSecurityPolicy>,
}

pub struct FilePolicyFetcher {
    namespace_dir: PathBuf,
}

impl FilePolicyFetcher {
    pub fn new(namespace_dir: impl Into<PathBuf>) -> Self {
        Self {
            namespace_dir: namespace_dir.into(),
        }
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        self.namespace_dir.join(format!("{namespace}.toml"))
    }
}

#[async_trait]
impl PolicyFetcher for FilePolicyFetcher {
    async fn policies_in(&self, namespace: &str) -> Result<Vec<ImageSecurityPolicy>, PolicyFetchError> {
        let path = self.path_for(namespace);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PolicyFetchError::Source(e.to_string()))?;
        let file: PolicyFile = toml::from_str(&content).map_err(|e| PolicyFetchError::Parse(e.to_string()))?;
        Ok(file.policies)
    }
}
