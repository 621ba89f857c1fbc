//! Hashing and constant-time comparison.
//!
//! Two primitives the whole verification engine leans on:
//!
//! - [`sha256_hex`] - the canonical payload digest, a 64-character
//!   lowercase hex SHA-256
//! - [`constant_time_eq`] - digest comparison that does not leak where two
//!   values diverge through timing
//!
//! # Example
//!
//! ```
//! use rulegate_crypto::hash::{constant_time_eq, sha256_hex};
//!
//! let digest = sha256_hex("abc");
//! assert_eq!(
//!     digest,
//!     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
//! );
//! assert!(constant_time_eq(&digest, &sha256_hex(b"abc".as_slice())));
//! ```

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length in characters of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Compute the SHA-256 digest of `data` as lowercase hex.
///
/// Accepts anything byte-like; strings hash their UTF-8 bytes. The result
/// is deterministic and always [`SHA256_HEX_LEN`] characters.
#[must_use]
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Compare two byte strings without short-circuiting on the first
/// differing byte.
///
/// Inputs of unequal length compare as `false` immediately; for inputs of
/// equal length the comparison runs in constant time. Intended for hex or
/// base64 digest strings, where a timing-dependent comparison would leak
/// how much of an attacker-controlled value matches.
#[must_use]
pub fn constant_time_eq(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> bool {
    let (a, b) = (a.as_ref(), b.as_ref());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_digest_is_always_64_lowercase_hex(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let digest = sha256_hex(&data);
            prop_assert_eq!(digest.len(), SHA256_HEX_LEN);
            prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn test_constant_time_eq_matches_plain_equality(
            a in proptest::collection::vec(any::<u8>(), 0..64),
            b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assert_eq!(constant_time_eq(&a, &b), a == b);
        }
    }
}
