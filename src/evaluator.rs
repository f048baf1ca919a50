//! ISP Evaluator — the heart of the engine.
//!
//! A pure function over an ISP, an image reference, and already-fetched
//! metadata: `evaluate(isp, image_ref, vulnerabilities, builds, has_attestation)
//! -> Vec<Violation>`. Network access (metadata fetch, attestation lookup)
//! happens in the caller (the Reviewer); this function never suspends.
//!
//! Preconditions are checked in order; the first match short-circuits.
//! Evaluating the same inputs twice always yields the same violation
//! multiset.

use thiserror::Error;

use crate::image_ref;
use crate::severity::ParseSeverityError;
use crate::types::{
    Build, ImageSecurityPolicy, Violation, ViolationDetails, ViolationKind, Vulnerability,
};

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("invalid severity threshold: {0}")]
    InvalidSeverity(#[from] ParseSeverityError),
}

/// Evaluate one `(isp, image_ref)` pair against already-fetched metadata.
///
/// `has_attestation` should report whether any of `isp.attestation_authority_names`
/// has a valid attestation for `image_ref`; the Reviewer resolves that via the
/// out-of-scope [`crate::attestation::AttestationAuthority`] before calling in.
pub fn evaluate(
    isp: &ImageSecurityPolicy,
    image_ref: &str,
    vulnerabilities: &[Vulnerability],
    builds: &[Build],
    has_attestation: bool,
) -> Result<Vec<Violation>, EvaluateError> {
    // 1. Unqualified image halts evaluation for this image entirely.
    if !image_ref::is_fully_qualified(image_ref) {
        return Ok(vec![Violation::unqualified_image(image_ref)]);
    }

    // 2. Image allowlist.
    if isp.image_allowlist.iter().any(|allowed| allowed == image_ref) {
        return Ok(Vec::new());
    }

    // 3. Attestation shortcut.
    if !isp.attestation_authority_names.is_empty() && has_attestation {
        return Ok(Vec::new());
    }

    let mut violations = Vec::new();

    // 4. Build provenance check.
    if !isp.built_project_ids.is_empty() {
        if builds.is_empty() {
            violations.push(Violation {
                kind: ViolationKind::BuildProjectId,
                subject: image_ref.to_string(),
                details: ViolationDetails::None,
                reason: format!("{image_ref} has no build record"),
            });
        } else {
            let matches = builds.iter().any(|b| {
                b.provenance
                    .as_ref()
                    .map(|p| isp.built_project_ids.iter().any(|id| id == &p.project_id))
                    .unwrap_or(false)
            });
            if !matches {
                let offending = builds.iter().find_map(|b| b.provenance.clone());
                violations.push(Violation {
                    kind: ViolationKind::BuildProjectId,
                    subject: image_ref.to_string(),
                    details: ViolationDetails::BuildProvenance(offending),
                    reason: format!("{image_ref} was not built by an allowed project"),
                });
            }
        }
    }

    // 5. Vulnerability check.
    let maximum_severity = isp.maximum_severity_or_default()?;
    let maximum_fix_unavailable_severity = isp.maximum_fix_unavailable_severity_or_default()?;

    for v in vulnerabilities {
        if isp.allowlist_cves.iter().any(|cve| cve == &v.cve) {
            continue;
        }
        let threshold = if v.has_fix_available {
            maximum_severity
        } else {
            maximum_fix_unavailable_severity
        };
        if v.severity.exceeds(threshold) {
            let kind = if v.has_fix_available {
                ViolationKind::FixesAvailable
            } else {
                ViolationKind::FixesUnavailable
            };
            violations.push(Violation {
                kind,
                subject: image_ref.to_string(),
                details: ViolationDetails::Vulnerability(v.clone()),
                reason: format!("{} exceeds allowed severity ({})", v.cve, v.severity),
            });
        }
    }

    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;

    const IMAGE: &str = "registry.example.com/app@sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85";

    fn vuln(cve: &str, severity: Severity, has_fix: bool) -> Vulnerability {
        Vulnerability {
            cve: cve.to_string(),
            severity,
            has_fix_available: has_fix,
        }
    }

    // S1: default-allow.
    #[test]
    fn test_s1_default_allow() {
        let isp = ImageSecurityPolicy::default();
        let vulns = vec![
            vuln("l", Severity::Low, true),
            vuln("m", Severity::Medium, true),
            vuln("h", Severity::High, true),
            vuln("c", Severity::Critical, true),
        ];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        assert!(violations.is_empty());
    }

    // S2: block high.
    #[test]
    fn test_s2_block_high() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "HIGH".to_string(),
            ..Default::default()
        };
        let vulns = vec![
            vuln("l", Severity::Low, true),
            vuln("m", Severity::Medium, true),
            vuln("h", Severity::High, true),
            vuln("c", Severity::Critical, true),
        ];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].subject, IMAGE);
        match &violations[0].details {
            ViolationDetails::Vulnerability(v) => assert_eq!(v.cve, "c"),
            _ => panic!("expected vulnerability details"),
        }
    }

    // S3: split thresholds.
    #[test]
    fn test_s3_split_thresholds() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "MEDIUM".to_string(),
            maximum_fix_unavailable_severity: "HIGH".to_string(),
            ..Default::default()
        };
        let vulns = vec![
            vuln("l", Severity::Low, true),
            vuln("m", Severity::Medium, true),
            vuln("h", Severity::High, true),
            vuln("c", Severity::Critical, true),
            vuln("l_nofix", Severity::Low, false),
            vuln("m_nofix", Severity::Medium, false),
            vuln("h_nofix", Severity::High, false),
            vuln("c_nofix", Severity::Critical, false),
        ];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        let cves: Vec<&str> = violations
            .iter()
            .map(|v| match &v.details {
                ViolationDetails::Vulnerability(vu) => vu.cve.as_str(),
                _ => panic!("expected vulnerability details"),
            })
            .collect();
        assert_eq!(cves, vec!["h", "c", "c_nofix"]);
    }

    // S4: block-all fixable, allow-all unfixable.
    #[test]
    fn test_s4_block_all_allow_all() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "BLOCK_ALL".to_string(),
            maximum_fix_unavailable_severity: "ALLOW_ALL".to_string(),
            ..Default::default()
        };
        let vulns = vec![
            vuln("l", Severity::Low, true),
            vuln("m", Severity::Medium, true),
            vuln("h", Severity::High, true),
            vuln("c", Severity::Critical, true),
            vuln("l_nofix", Severity::Low, false),
            vuln("m_nofix", Severity::Medium, false),
            vuln("h_nofix", Severity::High, false),
            vuln("c_nofix", Severity::Critical, false),
        ];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        let cves: Vec<&str> = violations
            .iter()
            .map(|v| match &v.details {
                ViolationDetails::Vulnerability(vu) => vu.cve.as_str(),
                _ => panic!("expected vulnerability details"),
            })
            .collect();
        assert_eq!(cves, vec!["l", "m", "h", "c"]);
    }

    // S5: allowlisted CVE above threshold.
    #[test]
    fn test_s5_allowlisted_cve() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "LOW".to_string(),
            allowlist_cves: vec!["c".to_string()],
            ..Default::default()
        };
        let vulns = vec![vuln("c", Severity::Critical, true)];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        assert!(violations.is_empty());
    }

    // S6: build projectID enforcement.
    #[test]
    fn test_s6a_no_build_record() {
        let isp = ImageSecurityPolicy {
            built_project_ids: vec!["p1".to_string()],
            ..Default::default()
        };
        let violations = evaluate(&isp, IMAGE, &[], &[], false).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::BuildProjectId);
        assert_eq!(violations[0].details, ViolationDetails::None);
    }

    #[test]
    fn test_s6b_matching_build() {
        let isp = ImageSecurityPolicy {
            built_project_ids: vec!["p1".to_string()],
            ..Default::default()
        };
        let builds = vec![Build {
            provenance: Some(crate::types::BuildProvenance {
                project_id: "p1".to_string(),
                creator: "ci".to_string(),
            }),
        }];
        let violations = evaluate(&isp, IMAGE, &[], &builds, false).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_s6c_non_matching_build() {
        let isp = ImageSecurityPolicy {
            built_project_ids: vec!["p1".to_string()],
            ..Default::default()
        };
        let builds = vec![Build {
            provenance: Some(crate::types::BuildProvenance {
                project_id: "p2".to_string(),
                creator: "ci".to_string(),
            }),
        }];
        let violations = evaluate(&isp, IMAGE, &[], &builds, false).unwrap();
        assert_eq!(violations.len(), 1);
        match &violations[0].details {
            ViolationDetails::BuildProvenance(Some(p)) => assert_eq!(p.project_id, "p2"),
            other => panic!("expected offending provenance, got {other:?}"),
        }
    }

    // S7: unqualified image.
    #[test]
    fn test_s7_unqualified_image() {
        let isp = ImageSecurityPolicy::default();
        let violations = evaluate(&isp, "image", &[], &[], false).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::UnqualifiedImage);
    }

    #[test]
    fn test_image_allowlist_absorbs_regardless_of_metadata() {
        let isp = ImageSecurityPolicy {
            image_allowlist: vec![IMAGE.to_string()],
            maximum_severity: "LOW".to_string(),
            ..Default::default()
        };
        let vulns = vec![vuln("c", Severity::Critical, true)];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_attestation_shortcut_short_circuits() {
        let isp = ImageSecurityPolicy {
            attestation_authority_names: vec!["prod-authority".to_string()],
            maximum_severity: "LOW".to_string(),
            built_project_ids: vec!["p1".to_string()],
            ..Default::default()
        };
        let vulns = vec![vuln("c", Severity::Critical, true)];
        let violations = evaluate(&isp, IMAGE, &vulns, &[], true).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_determinism() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "MEDIUM".to_string(),
            ..Default::default()
        };
        let vulns = vec![vuln("c", Severity::Critical, true), vuln("l", Severity::Low, true)];
        let a = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        let b = evaluate(&isp, IMAGE, &vulns, &[], false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_severity_is_an_error_not_a_violation() {
        let isp = ImageSecurityPolicy {
            maximum_severity: "SEVERE".to_string(),
            ..Default::default()
        };
        let result = evaluate(&isp, IMAGE, &[], &[], false);
        assert!(result.is_err());
    }
}
