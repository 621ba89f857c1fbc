//! # rulegate-crypto
//!
//! Cryptographic primitives for the `RuleGate` verification engine:
//! SHA-256 hashing, ECDSA P-256 signing and verification, PEM public-key
//! loading with strict curve enforcement, and constant-time comparison.
//!
//! Everything here is synchronous, CPU-bound and free of shared mutable
//! state; all operations are safe to call concurrently without locking.
//!
//! ## Modules
//!
//! - [`hash`] - SHA-256 hex digests and constant-time equality
//! - [`keys`] - P-256 key types and raw `r || s` signatures
//!
//! ## Signature format
//!
//! Signatures are raw 64-byte `r || s` values, each component a 32-byte
//! unsigned big-endian integer, with SHA-256 as the message digest. This is
//! the platform's wire format; DER-encoded signatures are not accepted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod hash;
pub mod keys;

pub use hash::{constant_time_eq, sha256_hex, SHA256_HEX_LEN};
pub use keys::{PublicKey, SigningKey, SIGNATURE_LEN};
