//! Core value objects for policy evaluation.
//!
//! These are read-only snapshots: fetched once per request, never mutated,
//! and safe to share across the lifetime of a single admission review.

use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// A single vulnerability finding for an image digest. Identity is `cve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub cve: String,
    pub severity: Severity,
    pub has_fix_available: bool,
}

/// Build provenance: which project produced the image, and who triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProvenance {
    pub project_id: String,
    pub creator: String,
}

/// A build record for an image digest. `provenance` is absent when the build
/// system recorded no provenance for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub provenance: Option<BuildProvenance>,
}

/// A namespace-scoped Image Security Policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSecurityPolicy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_allowlist: Vec<String>,
    /// Empty string means "use the default" (`Critical`); callers must apply
    /// the default via [`ImageSecurityPolicy::maximum_severity_or_default`].
    #[serde(default)]
    pub maximum_severity: String,
    /// Empty string means "use the default" (`Allow`); see
    /// [`ImageSecurityPolicy::maximum_fix_unavailable_severity_or_default`].
    #[serde(default)]
    pub maximum_fix_unavailable_severity: String,
    #[serde(default)]
    pub allowlist_cves: Vec<String>,
    #[serde(default)]
    pub built_project_ids: Vec<String>,
    #[serde(default)]
    pub attestation_authority_names: Vec<String>,
}

impl ImageSecurityPolicy {
    pub fn maximum_severity_or_default(&self) -> Result<Severity, crate::severity::ParseSeverityError> {
        if self.maximum_severity.is_empty() {
            Ok(Severity::Critical)
        } else {
            Severity::parse(&self.maximum_severity)
        }
    }

    pub fn maximum_fix_unavailable_severity_or_default(
        &self,
    ) -> Result<Severity, crate::severity::ParseSeverityError> {
        if self.maximum_fix_unavailable_severity.is_empty() {
            Ok(Severity::Allow)
        } else {
            Severity::parse(&self.maximum_fix_unavailable_severity)
        }
    }
}

/// The reason a [`Violation`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    UnqualifiedImage,
    FixesAvailable,
    FixesUnavailable,
    /// Informational: a CVE was suppressed by the allowlist. Never causes
    /// denial on its own; kept for audit trails.
    AllowlistCve,
    BuildProjectId,
    MissingAttestation,
}

/// Supplementary detail attached to a violation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationDetails {
    Vulnerability(Vulnerability),
    BuildProvenance(Option<BuildProvenance>),
    None,
}

/// A single reason an image fails an ISP. A value, not an error: violations
/// are accumulated by the Reviewer and converted to a decision exactly once
/// by the configured [`crate::reviewer::ViolationStrategy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub subject: String,
    pub details: ViolationDetails,
    pub reason: String,
}

impl Violation {
    pub fn unqualified_image(image_ref: &str) -> Self {
        Violation {
            kind: ViolationKind::UnqualifiedImage,
            subject: image_ref.to_string(),
            details: ViolationDetails::None,
            reason: format!("{image_ref} is not a fully qualified image"),
        }
    }
}

/// Status payload mirroring the Kubernetes-style `{code, message}` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionStatus {
    pub code: Option<u32>,
    pub message: String,
}

/// The verdict returned for one admission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    pub status: AdmissionStatus,
}

impl AdmissionResponse {
    pub fn allow(uid: impl Into<String>) -> Self {
        AdmissionResponse {
            uid: uid.into(),
            allowed: true,
            status: AdmissionStatus {
                code: None,
                message: "Success".to_string(),
            },
        }
    }

    pub fn deny(uid: impl Into<String>, message: impl Into<String>) -> Self {
        AdmissionResponse {
            uid: uid.into(),
            allowed: false,
            status: AdmissionStatus {
                code: None,
                message: message.into(),
            },
        }
    }
}
