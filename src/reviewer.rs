//! Reviewer.
//!
//! Orchestrates policy fetch → digest resolution → metadata fetch → pure
//! evaluation for one admission request, aggregates violations across every
//! `(image, ISP)` pair, and hands the aggregate to the injected
//! [`ViolationStrategy`]. This is the only place in the engine that performs
//! network I/O; [`crate::evaluator::evaluate`] itself is pure.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::attestation::{AttestationAuthority, AttestationError};
use crate::evaluator::{self, EvaluateError};
use crate::image_ref;
use crate::metadata::{MetadataClient, MetadataError};
use crate::policy::{PolicyFetchError, PolicyFetcher};
use crate::resolver::{self, RegistryClient, ResolveError};
use crate::types::{Build, ImageSecurityPolicy, Violation, Vulnerability};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("failed to fetch policies: {0}")]
    PolicyFetch(#[from] PolicyFetchError),
    #[error("failed to resolve image digest: {0}")]
    DigestResolve(#[from] ResolveError),
    #[error("failed to fetch image metadata: {0}")]
    MetadataFetch(#[from] MetadataError),
    #[error("attestation authority lookup failed: {0}")]
    Attestation(#[from] AttestationError),
    #[error("failed to evaluate policy: {0}")]
    Evaluate(#[from] EvaluateError),
    #[error("{0}")]
    Denied(String),
}

/// Decides, from the aggregated violation list, whether the request should
/// be denied. Violations are values, not errors; this is the single place
/// they are converted into a decision.
pub trait ViolationStrategy: Send + Sync {
    fn decide(&self, violations: &[Violation]) -> Result<(), ReviewError>;
}

/// Default strategy: logs every violation and always allows. Suitable for
/// clusters rolling out ISP enforcement in observe-only mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyStrategy;

impl ViolationStrategy for LogOnlyStrategy {
    fn decide(&self, violations: &[Violation]) -> Result<(), ReviewError> {
        for v in violations {
            warn!(subject = %v.subject, kind = ?v.kind, reason = %v.reason, "policy violation (log-only)");
        }
        Ok(())
    }
}

/// Enforcing strategy: denies on the first violation, describing it in the
/// returned error.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockStrategy;

impl ViolationStrategy for BlockStrategy {
    fn decide(&self, violations: &[Violation]) -> Result<(), ReviewError> {
        match violations.first() {
            Some(first) => Err(ReviewError::Denied(first.reason.clone())),
            None => Ok(()),
        }
    }
}

pub struct Reviewer {
    policy_fetcher: Arc<dyn PolicyFetcher>,
    metadata_client: Arc<dyn MetadataClient>,
    registry_client: Arc<dyn RegistryClient>,
    attestation_authority: Arc<dyn AttestationAuthority>,
    violation_strategy: Arc<dyn ViolationStrategy>,
}

impl Reviewer {
    pub fn new(
        policy_fetcher: Arc<dyn PolicyFetcher>,
        metadata_client: Arc<dyn MetadataClient>,
        registry_client: Arc<dyn RegistryClient>,
        attestation_authority: Arc<dyn AttestationAuthority>,
        violation_strategy: Arc<dyn ViolationStrategy>,
    ) -> Self {
        Self {
            policy_fetcher,
            metadata_client,
            registry_client,
            attestation_authority,
            violation_strategy,
        }
    }

    /// Review `images` against every ISP configured for `namespace`.
    /// `pod_name` is carried only for log correlation; evaluation never
    /// branches on it.
    pub async fn review(
        &self,
        namespace: &str,
        images: &[String],
        pod_name: Option<&str>,
    ) -> Result<(), ReviewError> {
        let isps = self.policy_fetcher.policies_in(namespace).await?;
        if isps.is_empty() {
            warn!(namespace, pod = pod_name, "no ISPs configured for namespace, allowing");
            return Ok(());
        }

        let mut all_violations = Vec::new();
        for image in images {
            let (vulns, builds): (Vec<Vulnerability>, Vec<Build>) = if image_ref::is_fully_qualified(image) {
                let digest_ref = resolver::resolve(image, self.registry_client.as_ref()).await?;
                let digest = image_ref::digest_of(&digest_ref)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| digest_ref.clone());
                let vulns = self.metadata_client.vulnerabilities_for(&digest).await?;
                let builds = self.metadata_client.builds_for(&digest).await?;
                (vulns, builds)
            } else {
                (Vec::new(), Vec::new())
            };

            for isp in &isps {
                // Steps 1 and 2 of the evaluator's own precondition chain
                // (unqualified image, image allowlist) must short-circuit
                // before the attestation authority — an out-of-scope,
                // fallible external lookup — is ever consulted.
                let already_resolved = !image_ref::is_fully_qualified(image)
                    || isp.image_allowlist.iter().any(|allowed| allowed == image);
                let has_attestation = if already_resolved {
                    false
                } else {
                    self.check_attestation(isp, image).await?
                };
                let violations = evaluator::evaluate(isp, image, &vulns, &builds, has_attestation)?;
                info!(
                    namespace,
                    image = %image,
                    isp = %isp.name,
                    violations = violations.len(),
                    "evaluated image against ISP"
                );
                all_violations.extend(violations);
            }
        }

        self.violation_strategy.decide(&all_violations)
    }

    async fn check_attestation(&self, isp: &ImageSecurityPolicy, image: &str) -> Result<bool, ReviewError> {
        for authority_name in &isp.attestation_authority_names {
            if self
                .attestation_authority
                .has_valid_attestation(authority_name, image)
                .await?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::NoAuthorities;
    use crate::metadata::InMemoryMetadataClient;
    use crate::policy::InMemoryPolicyFetcher;
    use crate::resolver::ResolveError;
    use crate::severity::Severity;
    use crate::types::ImageSecurityPolicy;
    use async_trait::async_trait;

    const DIGEST: &str = "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85";

    struct FixedRegistry;

    #[async_trait]
    impl RegistryClient for FixedRegistry {
        async fn digest_for(&self, _image_ref: &str) -> Result<String, ResolveError> {
            Ok(DIGEST.to_string())
        }
    }

    fn qualified_image() -> String {
        format!("registry.example.com/app@{DIGEST}")
    }

    #[tokio::test]
    async fn test_empty_isp_list_allows_without_fetch() {
        let reviewer = Reviewer::new(
            Arc::new(InMemoryPolicyFetcher::new()),
            Arc::new(InMemoryMetadataClient::new()),
            Arc::new(FixedRegistry),
            Arc::new(NoAuthorities),
            Arc::new(LogOnlyStrategy),
        );
        let result = reviewer.review("team-a", &[qualified_image()], None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_block_strategy_denies_on_violation() {
        let image = qualified_image();
        let metadata = InMemoryMetadataClient::new().with_vulnerabilities(
            DIGEST,
            vec![Vulnerability {
                cve: "CVE-1".to_string(),
                severity: Severity::Critical,
                has_fix_available: true,
            }],
        );
        let policy = InMemoryPolicyFetcher::new().with_namespace(
            "team-a",
            vec![ImageSecurityPolicy {
                maximum_severity: "HIGH".to_string(),
                ..Default::default()
            }],
        );
        let reviewer = Reviewer::new(
            Arc::new(policy),
            Arc::new(metadata),
            Arc::new(FixedRegistry),
            Arc::new(NoAuthorities),
            Arc::new(BlockStrategy),
        );
        let result = reviewer.review("team-a", &[image], None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_log_only_strategy_allows_despite_violation() {
        let image = qualified_image();
        let metadata = InMemoryMetadataClient::new().with_vulnerabilities(
            DIGEST,
            vec![Vulnerability {
                cve: "CVE-1".to_string(),
                severity: Severity::Critical,
                has_fix_available: true,
            }],
        );
        let policy = InMemoryPolicyFetcher::new().with_namespace(
            "team-a",
            vec![ImageSecurityPolicy {
                maximum_severity: "HIGH".to_string(),
                ..Default::default()
            }],
        );
        let reviewer = Reviewer::new(
            Arc::new(policy),
            Arc::new(metadata),
            Arc::new(FixedRegistry),
            Arc::new(NoAuthorities),
            Arc::new(LogOnlyStrategy),
        );
        let result = reviewer.review("team-a", &[image], None).await;
        assert!(result.is_ok());
    }

    struct FailingAuthority;

    #[async_trait]
    impl AttestationAuthority for FailingAuthority {
        async fn has_valid_attestation(&self, _authority_name: &str, _image_ref: &str) -> Result<bool, AttestationError> {
            Err(AttestationError::LookupFailed("authority unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_allowlisted_image_short_circuits_before_attestation_lookup() {
        let image = qualified_image();
        let policy = InMemoryPolicyFetcher::new().with_namespace(
            "team-a",
            vec![ImageSecurityPolicy {
                image_allowlist: vec![image.clone()],
                attestation_authority_names: vec!["prod-authority".to_string()],
                ..Default::default()
            }],
        );
        let reviewer = Reviewer::new(
            Arc::new(policy),
            Arc::new(InMemoryMetadataClient::new()),
            Arc::new(FixedRegistry),
            Arc::new(FailingAuthority),
            Arc::new(LogOnlyStrategy),
        );
        let result = reviewer.review("team-a", &[image], None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unqualified_image_skips_attestation_lookup_too() {
        let policy = InMemoryPolicyFetcher::new().with_namespace(
            "team-a",
            vec![ImageSecurityPolicy {
                attestation_authority_names: vec!["prod-authority".to_string()],
                ..Default::default()
            }],
        );
        let reviewer = Reviewer::new(
            Arc::new(policy),
            Arc::new(InMemoryMetadataClient::new()),
            Arc::new(FixedRegistry),
            Arc::new(FailingAuthority),
            Arc::new(BlockStrategy),
        );
        let result = reviewer.review("team-a", &["unqualified-image".to_string()], None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unqualified_image_skips_metadata_fetch_but_still_denies() {
        let metadata = InMemoryMetadataClient::new();
        let policy = InMemoryPolicyFetcher::new()
            .with_namespace("team-a", vec![ImageSecurityPolicy::default()]);
        let reviewer = Reviewer::new(
            Arc::new(policy),
            Arc::new(metadata),
            Arc::new(FixedRegistry),
            Arc::new(NoAuthorities),
            Arc::new(BlockStrategy),
        );
        let result = reviewer.review("team-a", &["image".to_string()], None).await;
        assert!(result.is_err());
    }
}
