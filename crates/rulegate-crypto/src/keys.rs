//! ECDSA P-256 key types.
//!
//! `RuleGate` accepts exactly one signature scheme: ECDSA over P-256
//! (secp256r1) with SHA-256 as the message digest, signatures encoded as
//! raw `r || s` with each component a 32-byte unsigned big-endian integer.
//! No DER, no recovery byte.
//!
//! # Curve enforcement
//!
//! Public keys arrive PEM-encoded (SubjectPublicKeyInfo). The loader
//! inspects the algorithm and curve OIDs *before* handing the document to
//! the curve arithmetic, so a key on any other curve is rejected at load
//! time with the offending OID in the error. A [`PublicKey`] value is
//! therefore always a P-256 key; verification never has to re-check the
//! curve, and a `false` from [`PublicKey::verify`] always means "not
//! signed by this key", never "wrong key type".
//!
//! # Example
//!
//! ```
//! use rulegate_crypto::keys::SigningKey;
//!
//! let signer = SigningKey::random();
//! let signature = signer.sign(b"message");
//! assert_eq!(signature.len(), 64);
//! assert!(signer.public_key().verify(b"message", &signature));
//! assert!(!signer.public_key().verify(b"other message", &signature));
//! ```

use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::der::asn1::ObjectIdentifier;
use p256::pkcs8::der::Document;
use p256::pkcs8::spki::SubjectPublicKeyInfoRef;
use p256::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rulegate_core::error::ConfigError;

/// Length in bytes of a raw `r || s` signature.
pub const SIGNATURE_LEN: usize = 64;

/// The PEM label public keys must carry.
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// ASN.1 OID for `id-ecPublicKey` (1.2.840.10045.2.1).
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// ASN.1 OID for the P-256 curve, `secp256r1` (1.2.840.10045.3.1.7).
const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

// ============================================================================
// PublicKey
// ============================================================================

/// A P-256 public verification key.
///
/// Construction is the only place curve checking happens; every value of
/// this type is on P-256 by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    key: VerifyingKey,
}

impl PublicKey {
    /// Parse a PEM-encoded (`SubjectPublicKeyInfo`) public key.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MalformedKey`] when the input is not a PEM public
    ///   key document at all
    /// - [`ConfigError::UnsupportedCurve`] when the key is a valid SPKI
    ///   document but not an EC key on P-256; the error carries the
    ///   algorithm or curve OID found instead
    pub fn from_pem(pem: &str) -> Result<Self, ConfigError> {
        let (label, doc) =
            Document::from_pem(pem).map_err(|e| ConfigError::malformed_key(e.to_string()))?;
        if label != PUBLIC_KEY_LABEL {
            return Err(ConfigError::malformed_key(format!(
                "unexpected PEM label {label:?}, expected {PUBLIC_KEY_LABEL:?}"
            )));
        }

        let spki = SubjectPublicKeyInfoRef::try_from(doc.as_bytes())
            .map_err(|e| ConfigError::malformed_key(e.to_string()))?;
        if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(ConfigError::unsupported_curve(
                spki.algorithm.oid.to_string(),
            ));
        }
        let curve = spki
            .algorithm
            .parameters_oid()
            .map_err(|e| ConfigError::malformed_key(format!("missing curve parameters: {e}")))?;
        if curve != SECP256R1 {
            return Err(ConfigError::unsupported_curve(curve.to_string()));
        }

        let key = p256::PublicKey::from_public_key_der(doc.as_bytes())
            .map_err(|e| ConfigError::malformed_key(e.to_string()))?;
        Ok(Self {
            key: VerifyingKey::from(&key),
        })
    }

    /// Verify a raw `r || s` signature over `data`.
    ///
    /// `data` is the message itself; it is digested with SHA-256 as part of
    /// verification. Any structurally invalid signature (wrong length,
    /// out-of-range scalars) verifies as `false` rather than erroring: a
    /// forged or corrupted signature is a routine negative result.
    #[must_use]
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        self.key.verify(data, &sig).is_ok()
    }

    /// Encode this key as a PEM `SubjectPublicKeyInfo` document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedKey`] if DER/PEM serialization fails,
    /// which does not happen for keys produced by this crate.
    pub fn to_pem(&self) -> Result<String, ConfigError> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| ConfigError::malformed_key(e.to_string()))
    }
}

// ============================================================================
// SigningKey
// ============================================================================

/// A P-256 signing key.
///
/// Exists for the signing side of the protocol (HSM engines, approval
/// clients) and for building test fixtures; the verification flow itself
/// never holds private key material.
pub struct SigningKey {
    key: p256::ecdsa::SigningKey,
}

impl SigningKey {
    /// Generate a new signing key from the operating system's secure RNG.
    #[must_use]
    pub fn random() -> Self {
        Self {
            key: p256::ecdsa::SigningKey::random(&mut OsRng),
        }
    }

    /// Construct a signing key from a raw 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedKey`] if the bytes are not a valid
    /// P-256 scalar (zero, or at least the curve order).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, ConfigError> {
        let key = p256::ecdsa::SigningKey::from_bytes(&bytes.into())
            .map_err(|e| ConfigError::malformed_key(e.to_string()))?;
        Ok(Self { key })
    }

    /// Sign `data`, returning the raw 64-byte `r || s` signature.
    ///
    /// The message is digested with SHA-256 and the nonce is drawn from the
    /// operating system's secure RNG on every call; signatures over the
    /// same message differ between calls but all verify.
    ///
    /// # Panics
    ///
    /// Panics only if the operating system RNG fails, which is treated as
    /// unrecoverable.
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> [u8; SIGNATURE_LEN] {
        let signature: Signature = self.key.sign_with_rng(&mut OsRng, data);
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&signature.to_bytes());
        out
    }

    /// The verification key corresponding to this signing key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: *self.key.verifying_key(),
        }
    }
}

// Never expose scalar material through Debug output.
impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

// ============================================================================
// Tests
// ============================================================================
