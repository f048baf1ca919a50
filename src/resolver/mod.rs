//! Digest Resolver.
//!
//! Resolves a tagged image reference to a content digest. Contacting the
//! actual registry is delegated to an injected [`RegistryClient`]; the
//! engine itself never talks to a registry beyond this narrow contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::image_ref;

mod http;
pub use http::HttpRegistryClient;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("registry lookup failed for {image_ref}: {source}")]
    RegistryLookup { image_ref: String, source: String },
}

/// External collaborator: looks up the current digest for a tagged image
/// reference. A single failure fails the whole admission request — the
/// resolver never falls back to "allow".
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn digest_for(&self, image_ref: &str) -> Result<String, ResolveError>;
}

/// Resolve `image_ref` to a digest-qualified reference. If `image_ref`
/// already carries a digest, it is returned unchanged without consulting
/// the registry.
pub async fn resolve(image_ref: &str, registry: &dyn RegistryClient) -> Result<String, ResolveError> {
    if image_ref::has_digest(image_ref) {
        return Ok(image_ref.to_string());
    }
    let digest = registry.digest_for(image_ref).await?;
    Ok(image_ref::with_digest(image_ref, &digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRegistry {
        digest: String,
    }

    #[async_trait]
    impl RegistryClient for FixedRegistry {
        async fn digest_for(&self, _image_ref: &str) -> Result<String, ResolveError> {
            Ok(self.digest.clone())
        }
    }

    struct FailingRegistry;

    #[async_trait]
    impl RegistryClient for FailingRegistry {
        async fn digest_for(&self, image_ref: &str) -> Result<String, ResolveError> {
            Err(ResolveError::RegistryLookup {
                image_ref: image_ref.to_string(),
                source: "connection refused".to_string(),
            })
        }
    }

    const DIGEST: &str = "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85";

    #[tokio::test]
    async fn test_resolve_passes_through_already_digested() {
        let registry = FixedRegistry { digest: DIGEST.to_string() };
        let r = format!("registry.example.com/app@{DIGEST}");
        let resolved = resolve(&r, &registry).await.unwrap();
        assert_eq!(resolved, r);
    }

    #[tokio::test]
    async fn test_resolve_appends_digest_from_registry() {
        let registry = FixedRegistry { digest: DIGEST.to_string() };
        let resolved = resolve("registry.example.com/app:1.0", &registry).await.unwrap();
        assert_eq!(resolved, format!("registry.example.com/app:1.0@{DIGEST}"));
    }

    #[tokio::test]
    async fn test_resolve_propagates_registry_failure() {
        let registry = FailingRegistry;
        let result = resolve("registry.example.com/app:1.0", &registry).await;
        assert!(result.is_err());
    }
}
