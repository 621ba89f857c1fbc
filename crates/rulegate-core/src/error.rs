//! Error types for the `RuleGate` verification engine.
//!
//! This module provides error types for all failure modes in the engine,
//! organized by domain:
//!
//! - [`ConfigError`] - Invalid verifier setup (trust anchors, thresholds, keys)
//! - [`DecodeError`] - Malformed rules-container bytes
//! - [`IntegrityError`] - Failed cryptographic or policy verification
//! - [`FetchError`] - Failures reported by the host's rules fetcher
//! - [`RuleGateError`] - Top-level error that wraps all error types
//!
//! # Design
//!
//! Configuration errors are raised as early as possible, ideally when the
//! verifier is constructed, and are never retried. Decode and integrity
//! errors are final for the payload that produced them; the caller may
//! re-fetch and re-run the whole flow, but the engine never downgrades an
//! integrity failure to a warning.
//!
//! Every error message carries the concrete expected/actual values needed
//! for an audit trail (hash strings, counts, group and user ids). Messages
//! never contain private key material.
//!
//! # Example
//!
//! ```rust
//! use rulegate_core::error::{IntegrityError, RuleGateError};
//!
//! fn check_count(valid: usize, required: u32) -> Result<(), RuleGateError> {
//!     if (valid as u32) < required {
//!         return Err(IntegrityError::insufficient_signatures(valid, required).into());
//!     }
//!     Ok(())
//! }
//!
//! let err = check_count(1, 2).unwrap_err();
//! assert!(err.to_string().contains("only 1 valid signatures found, minimum 2 required"));
//! ```

/// Top-level error type for the `RuleGate` verification engine.
///
/// Wraps all domain-specific error types and provides automatic conversion
/// via the `#[from]` attribute.
///
/// The type is `Clone` so a single failure can be fanned out to every
/// caller waiting on a shared cache refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleGateError {
    /// The verifier configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The rules container could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A cryptographic or policy verification failed.
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// The host's rules fetcher reported a failure.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors caused by invalid verifier setup.
///
/// These are fatal and detected before any verification work happens: the
/// SuperAdmin trust anchors and the signature threshold come from host
/// configuration, never from the remote platform, and a broken configuration
/// must not be silently worked around.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The minimum-valid-signatures threshold is below one.
    #[error("minimum signature threshold must be at least 1, got {value}")]
    InvalidThreshold {
        /// The rejected threshold value.
        value: i64,
    },

    /// No SuperAdmin public keys were configured.
    #[error("no SuperAdmin public keys configured")]
    NoTrustAnchors,

    /// A public key is on a curve other than P-256.
    ///
    /// Keys are rejected when they are loaded, not when they are first used
    /// for verification, so a misconfigured key surfaces immediately.
    #[error("public key uses unsupported curve (OID {oid}), only P-256 is accepted")]
    UnsupportedCurve {
        /// The ASN.1 object identifier of the offending curve or algorithm.
        oid: String,
    },

    /// A public key could not be parsed at all.
    #[error("malformed public key: {context}")]
    MalformedKey {
        /// Context about what failed to parse.
        context: String,
    },
}

impl ConfigError {
    /// Create an `InvalidThreshold` error.
    #[must_use]
    pub const fn invalid_threshold(value: i64) -> Self {
        Self::InvalidThreshold { value }
    }

    /// Create an `UnsupportedCurve` error.
    #[must_use]
    pub fn unsupported_curve(oid: impl Into<String>) -> Self {
        Self::UnsupportedCurve { oid: oid.into() }
    }

    /// Create a `MalformedKey` error with context.
    #[must_use]
    pub fn malformed_key(context: impl Into<String>) -> Self {
        Self::MalformedKey {
            context: context.into(),
        }
    }
}

// ============================================================================
// DecodeError
// ============================================================================

/// Errors raised while decoding rules-container bytes.
///
/// Fatal for the payload being decoded. The container is an opaque binary
/// blob supplied by the remote platform; nothing in it is trusted until it
/// has both decoded cleanly and passed signature verification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// The container byte slice is empty.
    #[error("rules container is empty")]
    Empty,

    /// The container does not start with the expected magic bytes.
    #[error("rules container has unrecognized framing (magic {found:02x?})")]
    BadMagic {
        /// The bytes found where the magic was expected.
        found: Vec<u8>,
    },

    /// The container declares a version this engine does not understand.
    #[error("unsupported rules container version {version}")]
    UnsupportedVersion {
        /// The declared version byte.
        version: u8,
    },

    /// The container body is truncated or structurally malformed.
    #[error("malformed rules container: {context}")]
    Malformed {
        /// Context about what was malformed.
        context: String,
    },

    /// A rule user carries an unusable public key.
    #[error("user {user_id} has an invalid public key: {context}")]
    InvalidUserKey {
        /// The id of the user whose key was rejected.
        user_id: String,
        /// Why the key was rejected.
        context: String,
    },

    /// A group threshold inside the container is below one.
    #[error("group {group_id} declares an invalid threshold {value}, must be at least 1")]
    InvalidThreshold {
        /// The group the threshold belongs to.
        group_id: String,
        /// The rejected threshold value.
        value: i64,
    },
}

impl DecodeError {
    /// Create a `Malformed` error with context.
    #[must_use]
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
        }
    }

    /// Create an `InvalidUserKey` error.
    #[must_use]
    pub fn invalid_user_key(user_id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidUserKey {
            user_id: user_id.into(),
            context: context.into(),
        }
    }

    /// Create an `InvalidThreshold` error.
    #[must_use]
    pub fn invalid_threshold(group_id: impl Into<String>, value: i64) -> Self {
        Self::InvalidThreshold {
            group_id: group_id.into(),
            value,
        }
    }
}

// ============================================================================
// IntegrityError
// ============================================================================

/// Errors raised when a payload fails cryptographic or policy verification.
///
/// Each variant corresponds to one way the data returned by the platform can
/// fail to be trustworthy. All of them are fail-closed: absence of evidence
/// (a missing rule, an uncovered hash) is treated exactly like presence of
/// tampering.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IntegrityError {
    /// The envelope carries no rules container.
    #[error("rulesContainer is null")]
    MissingRulesContainer,

    /// The envelope carries no signatures where at least one is required.
    #[error("no signatures present")]
    NoSignatures,

    /// Fewer valid SuperAdmin signatures than the configured minimum.
    #[error("only {valid} valid signatures found, minimum {required} required")]
    InsufficientSignatures {
        /// How many signatures verified against the trust anchors.
        valid: usize,
        /// The configured minimum.
        required: u32,
    },

    /// The payload hash does not match the metadata hash, including after
    /// every known legacy transformation.
    #[error("payload hash mismatch: computed {computed}, expected {expected}")]
    HashMismatch {
        /// The digest computed over the received payload.
        computed: String,
        /// The digest the metadata claims.
        expected: String,
    },

    /// The effective payload hash is not covered by any payload signature.
    #[error("hash not covered by any signature: {hash}")]
    HashNotCovered {
        /// The uncovered digest.
        hash: String,
    },

    /// No whitelisting rule matches the envelope's blockchain/network, not
    /// even a wildcard fallback.
    #[error("no whitelisting rule configured for blockchain {blockchain}, network {network}")]
    NoMatchingRule {
        /// The blockchain the envelope targets.
        blockchain: String,
        /// The network the envelope targets (empty when unspecified).
        network: String,
    },

    /// No approval path reached its signature thresholds.
    #[error(
        "approval threshold not met: group {group_id} requires {required} \
         distinct signatures, got {verified}"
    )]
    ThresholdNotMet {
        /// The first unmet group of the first unsatisfied path.
        group_id: String,
        /// Signatures that group requires.
        required: u32,
        /// Distinct verified signers found in that group.
        verified: usize,
    },

    /// The verified payload could not be interpreted as the expected record.
    #[error("malformed whitelisted payload: {context}")]
    MalformedPayload {
        /// Context about what failed to parse.
        context: String,
    },

    /// A field of the verified payload differs from the expected record.
    #[error("whitelisted record field mismatch: {field}: expected {expected}, got {actual}")]
    FieldMismatch {
        /// The name of the differing field.
        field: String,
        /// The value the caller expected.
        expected: String,
        /// The value the verified payload carries.
        actual: String,
    },
}

impl IntegrityError {
    /// Create an `InsufficientSignatures` error.
    #[must_use]
    pub const fn insufficient_signatures(valid: usize, required: u32) -> Self {
        Self::InsufficientSignatures { valid, required }
    }

    /// Create a `HashMismatch` error.
    #[must_use]
    pub fn hash_mismatch(computed: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::HashMismatch {
            computed: computed.into(),
            expected: expected.into(),
        }
    }

    /// Create a `HashNotCovered` error.
    #[must_use]
    pub fn hash_not_covered(hash: impl Into<String>) -> Self {
        Self::HashNotCovered { hash: hash.into() }
    }

    /// Create a `NoMatchingRule` error.
    #[must_use]
    pub fn no_matching_rule(blockchain: impl Into<String>, network: impl Into<String>) -> Self {
        Self::NoMatchingRule {
            blockchain: blockchain.into(),
            network: network.into(),
        }
    }

    /// Create a `ThresholdNotMet` error.
    #[must_use]
    pub fn threshold_not_met(group_id: impl Into<String>, required: u32, verified: usize) -> Self {
        Self::ThresholdNotMet {
            group_id: group_id.into(),
            required,
            verified,
        }
    }

    /// Create a `MalformedPayload` error with context.
    #[must_use]
    pub fn malformed_payload(context: impl Into<String>) -> Self {
        Self::MalformedPayload {
            context: context.into(),
        }
    }

    /// Create a `FieldMismatch` error.
    #[must_use]
    pub fn field_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::FieldMismatch {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// ============================================================================
// FetchError
// ============================================================================

/// Errors reported by the host's rules fetcher.
///
/// The engine performs no network I/O itself; fetching is delegated to the
/// HTTP collaborator through a trait seam. Whatever goes wrong there is
/// surfaced here with enough context to diagnose, and is not retried inside
/// the engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The fetcher could not produce a rules payload.
    #[error("rules fetch failed: {context}")]
    Unavailable {
        /// Context reported by the fetcher.
        context: String,
    },
}

impl FetchError {
    /// Create an `Unavailable` error with context.
    #[must_use]
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::Unavailable {
            context: context.into(),
        }
    }
}

// ============================================================================
// Result type aliases
// ============================================================================

/// A `Result` type alias using [`RuleGateError`] as the error type.
pub type Result<T> = std::result::Result<T, RuleGateError>;

/// A `Result` type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A `Result` type alias for container decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// A `Result` type alias for integrity verification.
pub type IntegrityResult<T> = std::result::Result<T, IntegrityError>;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Message format tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_insufficient_signatures_message() {
        let err = IntegrityError::insufficient_signatures(1, 2);
        assert_eq!(
            err.to_string(),
            "only 1 valid signatures found, minimum 2 required"
        );
    }

    #[test]
    fn test_zero_valid_signatures_message() {
        let err = IntegrityError::insufficient_signatures(0, 1);
        assert_eq!(
            err.to_string(),
            "only 0 valid signatures found, minimum 1 required"
        );
    }

    #[test]
    fn test_missing_container_message() {
        assert_eq!(
            IntegrityError::MissingRulesContainer.to_string(),
            "rulesContainer is null"
        );
    }

    #[test]
    fn test_no_signatures_message() {
        assert_eq!(
            IntegrityError::NoSignatures.to_string(),
            "no signatures present"
        );
    }

    #[test]
    fn test_hash_mismatch_carries_both_digests() {
        let err = IntegrityError::hash_mismatch("aa".repeat(32), "bb".repeat(32));
        let msg = err.to_string();
        assert!(msg.contains(&"aa".repeat(32)));
        assert!(msg.contains(&"bb".repeat(32)));
    }

    #[test]
    fn test_hash_not_covered_message_prefix() {
        let err = IntegrityError::hash_not_covered("cafe");
        assert!(err
            .to_string()
            .starts_with("hash not covered by any signature"));
    }

    #[test]
    fn test_threshold_not_met_names_group() {
        let err = IntegrityError::threshold_not_met("treasury", 2, 1);
        let msg = err.to_string();
        assert!(msg.contains("treasury"));
        assert!(msg.contains('2'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_field_mismatch_names_field_and_values() {
        let err = IntegrityError::field_mismatch("decimals", "18", "8");
        assert_eq!(
            err.to_string(),
            "whitelisted record field mismatch: decimals: expected 18, got 8"
        );
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::invalid_threshold(0).to_string(),
            "minimum signature threshold must be at least 1, got 0"
        );
        assert_eq!(
            ConfigError::NoTrustAnchors.to_string(),
            "no SuperAdmin public keys configured"
        );
        assert!(ConfigError::unsupported_curve("1.3.132.0.10")
            .to_string()
            .contains("1.3.132.0.10"));
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::Empty.to_string(),
            "rules container is empty"
        );
        assert!(DecodeError::UnsupportedVersion { version: 9 }
            .to_string()
            .contains('9'));
        assert!(DecodeError::invalid_threshold("ops", 0)
            .to_string()
            .contains("ops"));
    }

    // ------------------------------------------------------------------------
    // Conversion tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_top_level_wrapping() {
        let err: RuleGateError = ConfigError::NoTrustAnchors.into();
        assert!(matches!(
            err,
            RuleGateError::Config(ConfigError::NoTrustAnchors)
        ));

        let err: RuleGateError = DecodeError::Empty.into();
        assert!(matches!(err, RuleGateError::Decode(DecodeError::Empty)));

        let err: RuleGateError = IntegrityError::NoSignatures.into();
        assert!(matches!(
            err,
            RuleGateError::Integrity(IntegrityError::NoSignatures)
        ));

        let err: RuleGateError = FetchError::unavailable("timeout").into();
        assert!(matches!(err, RuleGateError::Fetch(_)));
    }

    #[test]
    fn test_errors_are_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<RuleGateError>();
        assert_clone_send_sync::<ConfigError>();
        assert_clone_send_sync::<DecodeError>();
        assert_clone_send_sync::<IntegrityError>();
        assert_clone_send_sync::<FetchError>();
    }
}
