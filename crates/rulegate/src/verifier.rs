//! Governance signature verification.
//!
//! The rules container is only trusted once enough SuperAdmin signatures
//! over its **raw, undecoded bytes** check out. Verifying before decoding
//! means a forged container never reaches the decoder with any standing.
//!
//! Two operations live here:
//!
//! - [`is_valid_signature`] - does this base64 signature verify under any
//!   of the candidate keys?
//! - [`verify_governance_rules`] - does the container carry at least the
//!   configured number of valid SuperAdmin signatures?

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rulegate_core::envelope::RuleUserSignature;
use rulegate_core::error::{ConfigError, IntegrityError, RuleGateError};
use rulegate_crypto::PublicKey;

/// Check a base64-encoded raw `r || s` signature against candidate keys.
///
/// Returns `true` on the first key that verifies. A malformed or empty
/// base64 string is a routine negative result and yields `false`, not an
/// error - unlike a mis-curved key, which can never be constructed in the
/// first place.
#[must_use]
pub fn is_valid_signature(
    data: &[u8],
    base64_signature: &str,
    candidate_keys: &[PublicKey],
) -> bool {
    if base64_signature.is_empty() {
        return false;
    }
    let Ok(signature) = STANDARD.decode(base64_signature) else {
        return false;
    };
    candidate_keys.iter().any(|key| key.verify(data, &signature))
}

/// Verify that `raw_container` carries at least `min_valid_signatures`
/// valid SuperAdmin signatures.
///
/// Signatures are counted per entry: two signatures from the same key both
/// count. That matches the platform's observed behavior and is pinned by
/// test; do not dedupe here without a policy decision.
///
/// # Errors
///
/// - [`ConfigError::InvalidThreshold`] / [`ConfigError::NoTrustAnchors`]
///   when called with a broken configuration (checked before any crypto
///   work; these are programming/setup errors, not data errors)
/// - [`IntegrityError::MissingRulesContainer`] when `raw_container` is empty
/// - [`IntegrityError::NoSignatures`] when no signatures were supplied
/// - [`IntegrityError::InsufficientSignatures`] when fewer than
///   `min_valid_signatures` entries verify
pub fn verify_governance_rules(
    raw_container: &[u8],
    signatures: &[RuleUserSignature],
    min_valid_signatures: u32,
    super_admin_keys: &[PublicKey],
) -> Result<(), RuleGateError> {
    if min_valid_signatures < 1 {
        return Err(ConfigError::invalid_threshold(i64::from(min_valid_signatures)).into());
    }
    if super_admin_keys.is_empty() {
        return Err(ConfigError::NoTrustAnchors.into());
    }

    if raw_container.is_empty() {
        return Err(IntegrityError::MissingRulesContainer.into());
    }
    if signatures.is_empty() {
        return Err(IntegrityError::NoSignatures.into());
    }

    let valid = signatures
        .iter()
        .filter(|sig| is_valid_signature(raw_container, &sig.signature, super_admin_keys))
        .count();

    if valid < min_valid_signatures as usize {
        tracing::warn!(
            valid,
            required = min_valid_signatures,
            "governance rules signature threshold not met"
        );
        return Err(IntegrityError::insufficient_signatures(valid, min_valid_signatures).into());
    }

    tracing::debug!(valid, "governance rules signatures verified");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
