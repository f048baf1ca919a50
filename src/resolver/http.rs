//! Registry-backed digest resolution over the OCI distribution HTTP API.
//!
//! Issues a manifest `HEAD` request and reads the digest back from the
//! `Docker-Content-Digest` response header, the same header Docker Hub, GCR,
//! and most registries return without requiring a full manifest body fetch.

use async_trait::async_trait;
use reqwest::Client;

use super::{RegistryClient, ResolveError};
use crate::image_ref;

const MANIFEST_ACCEPT: &str =
    "application/vnd.oci.image.manifest.v1+json, application/vnd.docker.distribution.manifest.v2+json";

pub struct HttpRegistryClient {
    client: Client,
}

impl HttpRegistryClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpRegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn digest_for(&self, image_ref: &str) -> Result<String, ResolveError> {
        let (host, repo, tag) = image_ref::split_registry_repo_tag(image_ref).ok_or_else(|| {
            ResolveError::RegistryLookup {
                image_ref: image_ref.to_string(),
                source: "reference is not a qualified, tag-based image".to_string(),
            }
        })?;

        let url = format!("https://{host}/v2/{repo}/manifests/{tag}");
        let response = self
            .client
            .head(&url)
            .header(reqwest::header::ACCEPT, MANIFEST_ACCEPT)
            .send()
            .await
            .map_err(|e| ResolveError::RegistryLookup {
                image_ref: image_ref.to_string(),
                source: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| ResolveError::RegistryLookup {
                image_ref: image_ref.to_string(),
                source: e.to_string(),
            })?;

        let digest = response
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ResolveError::RegistryLookup {
                image_ref: image_ref.to_string(),
                source: "response carried no Docker-Content-Digest header".to_string(),
            })?;

        Ok(digest.to_string())
    }
}
