//! Attestation Authority Interface.
//!
//! Signing and attestation verification are explicitly out of scope for this
//! crate: the core calls into a signer/verifier only through this narrow
//! contract. There is no real verifier here, only the interface and a
//! default implementation that reports no attestations available.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("attestation authority {0:?} is not configured")]
    UnknownAuthority(String),
    #[error("attestation authority lookup failed: {0}")]
    LookupFailed(String),
}

/// Out-of-scope signer/verifier boundary. Implementations decide, for one
/// named authority, whether `image_ref` carries a valid attestation.
///
/// Credential material for reaching the authority (keys, tokens, whatever a
/// concrete secret store hands back) never crosses this interface at all: a
/// real implementation owns fetching and decoding its own credentials, so
/// whether its secret store returns raw bytes or base64 text is a decision
/// entirely internal to that implementation, never visible here.
#[async_trait]
pub trait AttestationAuthority: Send + Sync {
    async fn has_valid_attestation(
        &self,
        authority_name: &str,
        image_ref: &str,
    ) -> Result<bool, AttestationError>;
}

/// Default implementation used when no concrete authority is wired in.
/// Reports "no attestation" for every authority rather than erroring, so
/// clusters that configure `attestationAuthorityNames` without ever wiring a
/// verifier still get normal (non-shortcut) evaluation instead of a fatal
/// startup error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuthorities;

#[async_trait]
impl AttestationAuthority for NoAuthorities {
    async fn has_valid_attestation(
        &self,
        _authority_name: &str,
        _image_ref: &str,
    ) -> Result<bool, AttestationError> {
        Ok(false)
    }
}
