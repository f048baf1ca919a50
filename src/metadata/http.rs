//! Generic HTTP-backed metadata client.
//!
//! Talks to a REST-shaped metadata backend (the kind Grafeas or Container
//! Analysis front ends expose): `GET {base_url}/digests/{digest}/vulnerabilities`
//! and `GET {base_url}/digests/{digest}/builds`, each returning a JSON array.
//! The concrete backend is out of scope; this adapter only needs the shape of
//! the response to match [`crate::types::Vulnerability`] and
//! [`crate::types::Build`].

use async_trait::async_trait;
use reqwest::Client;

use super::{MetadataClient, MetadataError};
use crate::types::{Build, Vulnerability};

pub struct HttpMetadataClient {
    base_url: String,
    client: Client,
}

impl HttpMetadataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    fn digest_path(&self, digest: &str, suffix: &str) -> String {
        format!("{}/digests/{}/{}", self.base_url.trim_end_matches('/'), digest, suffix)
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn vulnerabilities_for(&self, digest: &str) -> Result<Vec<Vulnerability>, MetadataError> {
        let url = self.digest_path(digest, "vulnerabilities");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| MetadataError::Request(e.to_string()))?;
        response
            .json::<Vec<Vulnerability>>()
            .await
            .map_err(|e| MetadataError::Decode(e.to_string()))
    }

    async fn builds_for(&self, digest: &str) -> Result<Vec<Build>, MetadataError> {
        let url = self.digest_path(digest, "builds");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetadataError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| MetadataError::Request(e.to_string()))?;
        response
            .json::<Vec<Build>>()
            .await
            .map_err(|e| MetadataError::Decode(e.to_string()))
    }
}
