//! Image reference grammar.
//!
//! "Qualified" means `host[:port]/path[:tag][@digest]` with a non-empty host.
//! "Has digest" means the `@sha256:<hex>` suffix is present.

const DIGEST_ALGO_PREFIX: &str = "@sha256:";
const DIGEST_HEX_LEN: usize = 64;

/// Returns the `sha256:<hex>` digest suffix of `image_ref`, if present and
/// well formed (64 lowercase hex characters).
pub fn digest_of(image_ref: &str) -> Option<&str> {
    let idx = image_ref.find(DIGEST_ALGO_PREFIX)?;
    let digest = &image_ref[idx + 1..]; // keep the "sha256:" prefix, drop '@'
    let hex_part = digest.strip_prefix("sha256:")?;
    if hex_part.len() == DIGEST_HEX_LEN && hex::decode(hex_part).is_ok() {
        Some(digest)
    } else {
        None
    }
}

/// True iff `image_ref` carries a well-formed `@sha256:<hex>` suffix.
pub fn has_digest(image_ref: &str) -> bool {
    digest_of(image_ref).is_some()
}

/// True iff `image_ref` is qualified to a registry host: the portion before
/// the first `/` contains a `.`, a `:` (port), or is literally `localhost`.
/// Bare names like `nginx` or `myorg/app` are not qualified.
pub fn is_qualified(image_ref: &str) -> bool {
    let before_digest = image_ref.split('@').next().unwrap_or(image_ref);
    let Some((first_segment, rest)) = before_digest.split_once('/') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    first_segment == "localhost" || first_segment.contains('.') || first_segment.contains(':')
}

/// True iff `image_ref` is fully qualified: has a digest, or is qualified to
/// a registry host; either condition suffices.
pub fn is_fully_qualified(image_ref: &str) -> bool {
    has_digest(image_ref) || is_qualified(image_ref)
}

/// Append a digest to a reference that doesn't already carry one.
/// `digest` must be the bare `sha256:<hex>` form (no leading `@`).
pub fn with_digest(image_ref: &str, digest: &str) -> String {
    if has_digest(image_ref) {
        image_ref.to_string()
    } else {
        format!("{image_ref}@{digest}")
    }
}

/// Split a qualified, tag-based reference into `(host, repository, tag)`.
/// Returns `None` if `image_ref` is not qualified (see [`is_qualified`]) or
/// already carries a digest. `tag` defaults to `"latest"` when absent.
pub fn split_registry_repo_tag(image_ref: &str) -> Option<(&str, &str, &str)> {
    if !is_qualified(image_ref) || has_digest(image_ref) {
        return None;
    }
    let (host, path) = image_ref.split_once('/')?;
    match path.rsplit_once(':') {
        Some((repo, tag)) => Some((host, repo, tag)),
        None => Some((host, path, "latest")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DIGEST: &str = "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85";

    #[test]
    fn test_has_digest_true() {
        let r = format!("registry.example.com/app@{VALID_DIGEST}");
        assert!(has_digest(&r));
    }

    #[test]
    fn test_has_digest_false_for_bare_name() {
        assert!(!has_digest("image"));
        assert!(!has_digest("nginx:1.25"));
    }

    #[test]
    fn test_has_digest_rejects_malformed_hex() {
        assert!(!has_digest("app@sha256:not-hex"));
        assert!(!has_digest("app@sha256:abcd"));
    }

    #[test]
    fn test_is_qualified_with_host() {
        assert!(is_qualified("registry.example.com/app:1.0"));
        assert!(is_qualified("localhost/app"));
        assert!(is_qualified("localhost:5000/app"));
        assert!(is_qualified("registry.example.com:5000/app"));
    }

    #[test]
    fn test_is_qualified_false_for_bare_or_org_only() {
        assert!(!is_qualified("image"));
        assert!(!is_qualified("myorg/app"));
        assert!(!is_qualified("nginx:latest"));
    }

    #[test]
    fn test_fully_qualified_via_digest_without_host() {
        // A digest alone is sufficient even without a host-qualified prefix.
        let r = format!("myorg/app@{VALID_DIGEST}");
        assert!(is_fully_qualified(&r));
    }

    #[test]
    fn test_fully_qualified_via_host_without_digest() {
        assert!(is_fully_qualified("registry.example.com/app:1.0"));
    }

    #[test]
    fn test_unqualified_bare_name() {
        assert!(!is_fully_qualified("image"));
    }

    #[test]
    fn test_with_digest_appends_when_missing() {
        let r = with_digest("registry.example.com/app:1.0", VALID_DIGEST);
        assert_eq!(r, format!("registry.example.com/app:1.0@{VALID_DIGEST}"));
    }

    #[test]
    fn test_with_digest_is_noop_when_present() {
        let original = format!("registry.example.com/app@{VALID_DIGEST}");
        let r = with_digest(&original, VALID_DIGEST);
        assert_eq!(r, original);
    }

    #[test]
    fn test_split_registry_repo_tag_with_explicit_tag() {
        let (host, repo, tag) = split_registry_repo_tag("registry.example.com/team/app:1.0").unwrap();
        assert_eq!(host, "registry.example.com");
        assert_eq!(repo, "team/app");
        assert_eq!(tag, "1.0");
    }

    #[test]
    fn test_split_registry_repo_tag_defaults_to_latest() {
        let (host, repo, tag) = split_registry_repo_tag("registry.example.com/app").unwrap();
        assert_eq!(host, "registry.example.com");
        assert_eq!(repo, "app");
        assert_eq!(tag, "latest");
    }

    #[test]
    fn test_split_registry_repo_tag_none_when_unqualified() {
        assert!(split_registry_repo_tag("nginx:1.25").is_none());
    }

    #[test]
    fn test_split_registry_repo_tag_none_when_digested() {
        let r = format!("registry.example.com/app@{VALID_DIGEST}");
        assert!(split_registry_repo_tag(&r).is_none());
    }
}
