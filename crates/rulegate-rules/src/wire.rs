//! Binary wire format of the rules container.
//!
//! The container travels as an opaque binary blob: a 4-byte magic, a
//! version byte, and a bincode-serialized body. Signatures are always made
//! over these raw bytes, never over the decoded structure, so the exact
//! byte sequence is load-bearing.
//!
//! Optional collections are `Option` on the wire and normalize to empty
//! vectors during decoding; downstream code never sees "absent" lists.
//!
//! Encoding lives here alongside the format so fixtures and the platform's
//! publishing side share one definition, but encoding is not part of the
//! verification surface.

use rulegate_core::error::DecodeError;
use rulegate_core::rules::{
    AddressWhitelistRule, ContractAddressWhitelistRule, RuleGroup, TransactionRules,
};
use serde::{Deserialize, Serialize};

/// Magic bytes every container starts with.
pub const CONTAINER_MAGIC: [u8; 4] = *b"RGRC";

/// The single container version this engine understands.
pub const CONTAINER_VERSION: u8 = 1;

/// A signer as serialized inside the container.
///
/// The public key is a PEM `SubjectPublicKeyInfo` string; it is parsed and
/// curve-checked during decoding, so a decoded container only ever holds
/// usable keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWire {
    /// The signer's id, referenced by groups and signatures.
    pub id: String,
    /// PEM-encoded P-256 public key.
    pub public_key_pem: String,
    /// Role names; `HSMSLOT` marks an HSM engine identity.
    pub roles: Vec<String>,
}

/// The bincode body of a rules container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerWire {
    /// Declared signers.
    pub users: Option<Vec<UserWire>>,
    /// Declared groups.
    pub groups: Option<Vec<RuleGroup>>,
    /// Container-wide minimum of distinct user signatures.
    pub minimum_distinct_user_signatures: u32,
    /// Container-wide minimum of distinct group signatures.
    pub minimum_distinct_group_signatures: u32,
    /// Transaction-approval rule tables.
    pub transaction_rules: Option<Vec<TransactionRules>>,
    /// Address whitelisting rules.
    pub address_whitelisting_rules: Option<Vec<AddressWhitelistRule>>,
    /// Contract-address whitelisting rules.
    pub contract_address_whitelisting_rules: Option<Vec<ContractAddressWhitelistRule>>,
    /// Digest binding this container to the enforced rule set.
    pub enforced_rules_hash: String,
    /// Publication timestamp, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Minimum signatures required on rule-change commitments.
    pub minimum_commitment_signatures: u32,
    /// Ids of engine identities authorized for this tenant.
    pub engine_identities: Option<Vec<String>>,
}

impl ContainerWire {
    /// Serialize this container into its framed byte form.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] if bincode serialization fails,
    /// which does not happen for well-formed values of this type.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        let body = bincode::serialize(self).map_err(|e| DecodeError::malformed(e.to_string()))?;
        let mut bytes = Vec::with_capacity(body.len() + 5);
        bytes.extend_from_slice(&CONTAINER_MAGIC);
        bytes.push(CONTAINER_VERSION);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

/// Split a framed container into its declared version and body.
///
/// # Errors
///
/// - [`DecodeError::Empty`] for empty input
/// - [`DecodeError::BadMagic`] when the magic bytes are wrong or missing
/// - [`DecodeError::UnsupportedVersion`] for any version other than
///   [`CONTAINER_VERSION`]
pub fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() < 5 || bytes[..4] != CONTAINER_MAGIC {
        return Err(DecodeError::BadMagic {
            found: bytes[..bytes.len().min(4)].to_vec(),
        });
    }
    let version = bytes[4];
    if version != CONTAINER_VERSION {
        return Err(DecodeError::UnsupportedVersion { version });
    }
    Ok((version, &bytes[5..]))
}
