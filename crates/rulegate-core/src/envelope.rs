//! Whitelisted-data envelope types.
//!
//! A [`WhitelistedEnvelope`] is what the HTTP collaborator hands to the
//! verification flow for one whitelisted address or asset: the payload and
//! its claimed hash, the serialized rules container that governed the
//! approval, and the signature sets over both. Envelopes are transient;
//! each is decoded and verified once from caller-supplied data.
//!
//! Field names follow the platform's JSON wire format (camelCase).

use serde::{Deserialize, Serialize};

/// A user's signature together with the set of payload hashes it covers.
///
/// The signature is a base64-encoded raw 64-byte ECDSA P-256 signature
/// (`r || s`, each component a 32-byte unsigned big-endian integer). For
/// payload signatures, the signed message is the UTF-8 concatenation of the
/// entries of `hashes` in list order; each entry is a fixed-width 64-char
/// lowercase hex SHA-256 digest, so the concatenation is unambiguous. For
/// rules signatures, the signed message is the raw container bytes and
/// `hashes` is unused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleUserSignature {
    /// Id of the signing user, resolved against the container's users.
    pub user_id: String,
    /// Base64-encoded raw `r || s` signature.
    pub signature: String,
    /// Hex digests of the payloads this signature covers.
    #[serde(default)]
    pub hashes: Vec<String>,
}

/// Hash metadata accompanying a whitelisted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// Claimed SHA-256 digest of `payload_as_string`, 64 lowercase hex chars.
    pub hash: String,
    /// The exact payload string the digest was computed over.
    pub payload_as_string: String,
}

/// One whitelisted address/asset record as returned by the platform,
/// bundled with everything needed to verify it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistedEnvelope {
    /// Payload hash metadata.
    pub metadata: EnvelopeMetadata,
    /// Base64-encoded serialized rules container.
    pub rules_container: String,
    /// SuperAdmin signatures over the raw container bytes.
    #[serde(default)]
    pub rules_signatures: Vec<RuleUserSignature>,
    /// Per-user signatures covering the payload hash.
    #[serde(default)]
    pub payload_signatures: Vec<RuleUserSignature>,
    /// Blockchain this record belongs to.
    pub blockchain: String,
    /// Network this record belongs to, when the blockchain distinguishes
    /// networks. Empty/absent participates in wildcard matching.
    #[serde(default)]
    pub network: Option<String>,
}

// ============================================================================
// Expected-record types
// ============================================================================

/// The caller-side view of a whitelisted plain address, compared
/// field-by-field against the verified payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    /// Blockchain the address lives on.
    pub blockchain: String,
    /// Network, when applicable.
    #[serde(default)]
    pub network: Option<String>,
    /// The whitelisted address itself.
    pub address: String,
    /// Destination tag / memo, for chains that require one.
    #[serde(default)]
    pub memo: Option<String>,
}

/// The caller-side view of a whitelisted token contract, compared
/// field-by-field against the verified payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    /// Blockchain the contract is deployed on.
    pub blockchain: String,
    /// Token name, e.g. `ChainLink Token`.
    pub name: String,
    /// Token symbol, e.g. `LINK`.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u32,
    /// The contract address.
    pub contract_address: String,
}
