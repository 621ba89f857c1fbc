//! Verifier configuration.
//!
//! The two trust anchors of the whole engine come from here and only here:
//! the SuperAdmin public keys and the minimum number of valid SuperAdmin
//! signatures a rules container must carry. Both are supplied by host
//! configuration, never fetched from the platform - the server must not be
//! able to hand the client its own trust anchors.
//!
//! Validation happens at construction. A verifier built from a
//! [`VerifierConfig`] never has to re-check its anchors.
//!
//! # Example
//!
//! ```
//! use rulegate::config::VerifierConfig;
//! use rulegate_crypto::SigningKey;
//!
//! let admin = SigningKey::random();
//! let config = VerifierConfig::builder()
//!     .super_admin_key(admin.public_key())
//!     .min_valid_signatures(1)
//!     .build()
//!     .expect("valid configuration");
//! assert_eq!(config.super_admin_keys().len(), 1);
//! ```

use rulegate_core::error::ConfigError;
use rulegate_crypto::PublicKey;

/// Validated verifier configuration: the SuperAdmin trust anchors and the
/// governance signature threshold.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    super_admin_keys: Vec<PublicKey>,
    min_valid_signatures: u32,
}

impl VerifierConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> VerifierConfigBuilder {
        VerifierConfigBuilder::default()
    }

    /// The SuperAdmin public keys governance signatures verify against.
    #[must_use]
    pub fn super_admin_keys(&self) -> &[PublicKey] {
        &self.super_admin_keys
    }

    /// Minimum count of valid SuperAdmin signatures a container must carry.
    #[must_use]
    pub const fn min_valid_signatures(&self) -> u32 {
        self.min_valid_signatures
    }
}

/// Builder for [`VerifierConfig`].
///
/// Keys can be supplied pre-parsed or as PEM strings; PEM parsing and curve
/// checking happen in [`build`](Self::build) so a bad key fails the whole
/// configuration rather than being skipped.
#[derive(Debug, Default)]
pub struct VerifierConfigBuilder {
    keys: Vec<PublicKey>,
    pems: Vec<String>,
    min_valid_signatures: Option<u32>,
}

impl VerifierConfigBuilder {
    /// Add a pre-parsed SuperAdmin key.
    #[must_use]
    pub fn super_admin_key(mut self, key: PublicKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Add a PEM-encoded SuperAdmin key.
    #[must_use]
    pub fn super_admin_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.pems.push(pem.into());
        self
    }

    /// Set the minimum count of valid SuperAdmin signatures. Defaults to 1.
    #[must_use]
    pub fn min_valid_signatures(mut self, count: u32) -> Self {
        self.min_valid_signatures = Some(count);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidThreshold`] if the signature minimum is zero
    /// - [`ConfigError::NoTrustAnchors`] if no key was supplied
    /// - [`ConfigError::MalformedKey`] / [`ConfigError::UnsupportedCurve`]
    ///   if any PEM key fails to parse as a P-256 public key
    pub fn build(self) -> Result<VerifierConfig, ConfigError> {
        let min_valid_signatures = self.min_valid_signatures.unwrap_or(1);
        if min_valid_signatures < 1 {
            return Err(ConfigError::invalid_threshold(i64::from(
                min_valid_signatures,
            )));
        }

        let mut keys = self.keys;
        for pem in &self.pems {
            keys.push(PublicKey::from_pem(pem)?);
        }
        if keys.is_empty() {
            return Err(ConfigError::NoTrustAnchors);
        }

        Ok(VerifierConfig {
            super_admin_keys: keys,
            min_valid_signatures,
        })
    }
}
