//! The end-to-end envelope verification flow.
//!
//! One call verifies one whitelisted address/asset envelope, in five steps,
//! stopping at the first failure - there is no partial trust:
//!
//! 1. **Metadata hash** - the payload hashes to the claimed digest, possibly
//!    after a known legacy transformation.
//! 2. **Rules signatures** - the rules container carries enough valid
//!    SuperAdmin signatures over its raw bytes.
//! 3. **Decode** - the container decodes into a governance snapshot.
//! 4. **Hash coverage** - the effective payload hash appears in the covered
//!    hash set of at least one payload signature. This blocks replaying a
//!    validly signed but unrelated hash against this payload.
//! 5. **Governance threshold** - a whitelisting rule applies to the
//!    envelope's blockchain/network (no rule means *rejected*, never "no
//!    restriction"), and the signers whose signatures verify and cover the
//!    effective hash satisfy the rule's approval thresholds.
//!
//! After the five steps, the effective payload is compared field-by-field
//! against the record the caller believes it is, so a swapped-but-validly-
//! signed record is also rejected, naming the differing field.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashSet;

use rulegate_core::envelope::{
    AddressDetails, ContractDetails, EnvelopeMetadata, RuleUserSignature, WhitelistedEnvelope,
};
use rulegate_core::error::{DecodeError, IntegrityError, RuleGateError};
use rulegate_crypto::{constant_time_eq, sha256_hex};
use rulegate_policy::{find_address_rule, find_contract_rule, first_shortfall, is_satisfied};
use rulegate_rules::DecodedRulesContainer;

use crate::config::VerifierConfig;
use crate::legacy::legacy_payload_variants;
use crate::verifier::{is_valid_signature, verify_governance_rules};

/// Which rule table step 5 matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Address,
    Contract,
}

/// The outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEnvelope {
    /// The digest that was signed and covered.
    pub effective_hash: String,
    /// The payload form that hashes to `effective_hash`; differs from the
    /// served payload only when a legacy transformation applied.
    pub effective_payload: String,
}

/// Verifies whitelisted-data envelopes against host-configured trust
/// anchors.
#[derive(Debug, Clone)]
pub struct EnvelopeVerifier {
    config: VerifierConfig,
}

impl EnvelopeVerifier {
    /// Create a verifier from a validated configuration.
    #[must_use]
    pub const fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Verify a whitelisted-address envelope and check it describes
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Any [`IntegrityError`] or [`DecodeError`] from the five-step flow,
    /// or [`IntegrityError::FieldMismatch`] when the verified payload is
    /// not the expected record.
    pub fn verify_whitelisted_address(
        &self,
        envelope: &WhitelistedEnvelope,
        expected: &AddressDetails,
    ) -> Result<VerifiedEnvelope, RuleGateError> {
        let verified = self.verify_envelope(envelope, RuleKind::Address)?;
        check_address_record(&verified.effective_payload, expected)?;
        Ok(verified)
    }

    /// Verify a whitelisted-asset (token contract) envelope and check it
    /// describes `expected`.
    ///
    /// # Errors
    ///
    /// Any [`IntegrityError`] or [`DecodeError`] from the five-step flow,
    /// or [`IntegrityError::FieldMismatch`] when the verified payload is
    /// not the expected record.
    pub fn verify_whitelisted_asset(
        &self,
        envelope: &WhitelistedEnvelope,
        expected: &ContractDetails,
    ) -> Result<VerifiedEnvelope, RuleGateError> {
        let verified = self.verify_envelope(envelope, RuleKind::Contract)?;
        check_contract_record(&verified.effective_payload, expected)?;
        Ok(verified)
    }

    fn verify_envelope(
        &self,
        envelope: &WhitelistedEnvelope,
        kind: RuleKind,
    ) -> Result<VerifiedEnvelope, RuleGateError> {
        // Step 1: the payload must hash to the claimed digest.
        let (effective_hash, effective_payload) = check_metadata_hash(&envelope.metadata)?;

        // Step 2: SuperAdmin signatures over the raw, undecoded bytes.
        let raw = decode_container_field(&envelope.rules_container)?;
        verify_governance_rules(
            &raw,
            &envelope.rules_signatures,
            self.config.min_valid_signatures(),
            self.config.super_admin_keys(),
        )?;

        // Step 3: only a signature-verified container is worth decoding.
        let container = rulegate_rules::decode(&raw)?;

        // Step 4: the hash under validation must be in some signature's
        // covered set.
        let covered = envelope
            .payload_signatures
            .iter()
            .any(|sig| sig.hashes.iter().any(|h| h == &effective_hash));
        if !covered {
            tracing::warn!(hash = %effective_hash, "payload hash not covered by any signature");
            return Err(IntegrityError::hash_not_covered(effective_hash).into());
        }

        // Step 5: an applicable rule must exist and its thresholds must be
        // met by signers that verifiably covered this hash.
        let network = envelope.network.as_deref().unwrap_or_default();
        let thresholds = match kind {
            RuleKind::Address => find_address_rule(
                container.address_whitelisting_rules(),
                &envelope.blockchain,
                network,
            )
            .map(|rule| rule.parallel_thresholds.as_slice()),
            RuleKind::Contract => find_contract_rule(
                container.contract_address_whitelisting_rules(),
                &envelope.blockchain,
                network,
            )
            .map(|rule| rule.parallel_thresholds.as_slice()),
        };
        let Some(thresholds) = thresholds else {
            tracing::warn!(
                blockchain = %envelope.blockchain,
                network,
                "no whitelisting rule applies, rejecting"
            );
            return Err(IntegrityError::no_matching_rule(&envelope.blockchain, network).into());
        };

        let signer_ids =
            verified_signer_ids(&container, &envelope.payload_signatures, &effective_hash);
        if !is_satisfied(thresholds, &signer_ids, container.groups()) {
            let err = match first_shortfall(thresholds, &signer_ids, container.groups()) {
                Some(shortfall) => IntegrityError::threshold_not_met(
                    shortfall.group_id,
                    shortfall.required,
                    shortfall.verified,
                ),
                None => IntegrityError::threshold_not_met(String::new(), 1, 0),
            };
            tracing::warn!(%err, "approval thresholds not satisfied");
            return Err(err.into());
        }

        tracing::debug!(
            hash = %effective_hash,
            signers = signer_ids.len(),
            "envelope verified"
        );
        Ok(VerifiedEnvelope {
            effective_hash,
            effective_payload,
        })
    }
}

// ============================================================================
// Step helpers
// ============================================================================

/// Step 1: digest check with legacy fallback.
fn check_metadata_hash(metadata: &EnvelopeMetadata) -> Result<(String, String), IntegrityError> {
    let current = sha256_hex(&metadata.payload_as_string);
    if constant_time_eq(&current, &metadata.hash) {
        return Ok((metadata.hash.clone(), metadata.payload_as_string.clone()));
    }

    for (name, rewritten) in legacy_payload_variants(&metadata.payload_as_string) {
        if constant_time_eq(sha256_hex(&rewritten), &metadata.hash) {
            tracing::debug!(
                transformation = name,
                "payload digest matched after legacy transformation"
            );
            return Ok((metadata.hash.clone(), rewritten));
        }
    }

    Err(IntegrityError::hash_mismatch(current, metadata.hash.clone()))
}

/// Decode the envelope's base64 container field into raw bytes.
fn decode_container_field(rules_container: &str) -> Result<Vec<u8>, RuleGateError> {
    if rules_container.is_empty() {
        return Err(IntegrityError::MissingRulesContainer.into());
    }
    STANDARD.decode(rules_container).map_err(|e| {
        DecodeError::malformed(format!("rules container is not valid base64: {e}")).into()
    })
}

/// The ids of signers whose signature both verifies under their recorded
/// key and covers `effective_hash`. A set: a signer counts once however
/// many signatures they produced.
fn verified_signer_ids(
    container: &DecodedRulesContainer,
    signatures: &[RuleUserSignature],
    effective_hash: &str,
) -> HashSet<String> {
    let mut ids = HashSet::new();
    for sig in signatures {
        if !sig.hashes.iter().any(|h| h == effective_hash) {
            continue;
        }
        let Some(user) = container.find_user_by_id(&sig.user_id) else {
            tracing::debug!(user_id = %sig.user_id, "signature from user not in container, skipped");
            continue;
        };
        // The signed message is the concatenation of the covered hashes in
        // list order (fixed-width digests, so unambiguous).
        let message = sig.hashes.concat();
        if is_valid_signature(
            message.as_bytes(),
            &sig.signature,
            std::slice::from_ref(&user.public_key),
        ) {
            ids.insert(sig.user_id.clone());
        }
    }
    ids
}

// ============================================================================
// Record cross-checks
// ============================================================================

fn ensure_field(field: &str, expected: &str, actual: &str) -> Result<(), IntegrityError> {
    if expected == actual {
        Ok(())
    } else {
        Err(IntegrityError::field_mismatch(field, expected, actual))
    }
}

fn check_address_record(payload: &str, expected: &AddressDetails) -> Result<(), IntegrityError> {
    let actual: AddressDetails = serde_json::from_str(payload)
        .map_err(|e| IntegrityError::malformed_payload(e.to_string()))?;
    ensure_field("blockchain", &expected.blockchain, &actual.blockchain)?;
    ensure_field(
        "network",
        expected.network.as_deref().unwrap_or_default(),
        actual.network.as_deref().unwrap_or_default(),
    )?;
    ensure_field("address", &expected.address, &actual.address)?;
    ensure_field(
        "memo",
        expected.memo.as_deref().unwrap_or_default(),
        actual.memo.as_deref().unwrap_or_default(),
    )?;
    Ok(())
}

fn check_contract_record(payload: &str, expected: &ContractDetails) -> Result<(), IntegrityError> {
    let actual: ContractDetails = serde_json::from_str(payload)
        .map_err(|e| IntegrityError::malformed_payload(e.to_string()))?;
    ensure_field("blockchain", &expected.blockchain, &actual.blockchain)?;
    ensure_field("name", &expected.name, &actual.name)?;
    ensure_field("symbol", &expected.symbol, &actual.symbol)?;
    ensure_field(
        "decimals",
        &expected.decimals.to_string(),
        &actual.decimals.to_string(),
    )?;
    ensure_field(
        "contractAddress",
        &expected.contract_address,
        &actual.contract_address,
    )?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
