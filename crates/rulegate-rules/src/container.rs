//! The decoded governance snapshot.
//!
//! [`decode`] turns raw container bytes into a [`DecodedRulesContainer`]:
//! an immutable snapshot of the tenant's governance configuration. All
//! validation that can happen at decode time does happen at decode time -
//! user keys are parsed and curve-checked, group thresholds are range
//! checked - so the rest of the engine works with data that is structurally
//! sound (though not yet *trusted*: signature verification over the raw
//! bytes is a separate step and always runs first).
//!
//! A refreshed container is a new snapshot; existing holders keep reading
//! their old one. The only interior state is the memoized HSM-key lookup,
//! which is computed at most once per snapshot and is safe to race.

use rulegate_core::error::DecodeError;
use rulegate_core::rules::{
    AddressWhitelistRule, ContractAddressWhitelistRule, RuleGroup, SequentialThresholds,
    TransactionRules,
};
use rulegate_crypto::PublicKey;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::wire::{split_frame, ContainerWire};

/// The role name marking an HSM engine identity rather than a human signer.
pub const HSM_SLOT_ROLE: &str = "HSMSLOT";

/// A declared signer with a parsed, curve-checked public key.
#[derive(Debug, Clone)]
pub struct RuleUser {
    /// The signer's id, referenced by groups and signatures.
    pub id: String,
    /// The signer's P-256 verification key.
    pub public_key: PublicKey,
    /// Role names attached to this signer.
    pub roles: HashSet<String>,
}

impl RuleUser {
    /// Returns `true` if this user carries the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if this user is an HSM engine identity.
    #[must_use]
    pub fn is_hsm_slot(&self) -> bool {
        self.has_role(HSM_SLOT_ROLE)
    }
}

/// An immutable decoded rules container.
///
/// Produced only by [`decode`]; cannot be constructed or mutated elsewhere.
#[derive(Debug, Clone)]
pub struct DecodedRulesContainer {
    users: Vec<RuleUser>,
    groups: Vec<RuleGroup>,
    minimum_distinct_user_signatures: u32,
    minimum_distinct_group_signatures: u32,
    transaction_rules: Vec<TransactionRules>,
    address_whitelisting_rules: Vec<AddressWhitelistRule>,
    contract_address_whitelisting_rules: Vec<ContractAddressWhitelistRule>,
    enforced_rules_hash: String,
    timestamp: u64,
    minimum_commitment_signatures: u32,
    engine_identities: Vec<String>,
    /// Memoized result of the HSM-key scan; `None` once computed means
    /// "no user carries the HSMSLOT role".
    hsm_key: OnceLock<Option<PublicKey>>,
}

/// Decode framed container bytes into a [`DecodedRulesContainer`].
///
/// Absent optional collections decode to empty vectors.
///
/// # Errors
///
/// - [`DecodeError::Empty`] / [`DecodeError::BadMagic`] /
///   [`DecodeError::UnsupportedVersion`] for framing problems
/// - [`DecodeError::Malformed`] for a truncated or structurally invalid body
/// - [`DecodeError::InvalidUserKey`] when a user's PEM key does not parse
///   or is not on P-256
/// - [`DecodeError::InvalidThreshold`] when any group threshold is zero
pub fn decode(bytes: &[u8]) -> Result<DecodedRulesContainer, DecodeError> {
    let (_, body) = split_frame(bytes)?;
    let wire: ContainerWire =
        bincode::deserialize(body).map_err(|e| DecodeError::malformed(e.to_string()))?;

    let mut users = Vec::with_capacity(wire.users.as_ref().map_or(0, Vec::len));
    for user in wire.users.unwrap_or_default() {
        let public_key = PublicKey::from_pem(&user.public_key_pem)
            .map_err(|e| DecodeError::invalid_user_key(&user.id, e.to_string()))?;
        users.push(RuleUser {
            id: user.id,
            public_key,
            roles: user.roles.into_iter().collect(),
        });
    }

    let address_whitelisting_rules = wire.address_whitelisting_rules.unwrap_or_default();
    let contract_address_whitelisting_rules =
        wire.contract_address_whitelisting_rules.unwrap_or_default();

    for path in address_whitelisting_rules
        .iter()
        .flat_map(|r| &r.parallel_thresholds)
        .chain(
            contract_address_whitelisting_rules
                .iter()
                .flat_map(|r| &r.parallel_thresholds),
        )
    {
        validate_path(path)?;
    }

    Ok(DecodedRulesContainer {
        users,
        groups: wire.groups.unwrap_or_default(),
        minimum_distinct_user_signatures: wire.minimum_distinct_user_signatures,
        minimum_distinct_group_signatures: wire.minimum_distinct_group_signatures,
        transaction_rules: wire.transaction_rules.unwrap_or_default(),
        address_whitelisting_rules,
        contract_address_whitelisting_rules,
        enforced_rules_hash: wire.enforced_rules_hash,
        timestamp: wire.timestamp,
        minimum_commitment_signatures: wire.minimum_commitment_signatures,
        engine_identities: wire.engine_identities.unwrap_or_default(),
        hsm_key: OnceLock::new(),
    })
}

fn validate_path(path: &SequentialThresholds) -> Result<(), DecodeError> {
    for threshold in &path.thresholds {
        if threshold.minimum_signatures < 1 {
            return Err(DecodeError::invalid_threshold(
                &threshold.group_id,
                i64::from(threshold.minimum_signatures),
            ));
        }
    }
    Ok(())
}

impl DecodedRulesContainer {
    /// The declared signers.
    #[must_use]
    pub fn users(&self) -> &[RuleUser] {
        &self.users
    }

    /// The declared groups.
    #[must_use]
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Container-wide minimum of distinct user signatures.
    #[must_use]
    pub const fn minimum_distinct_user_signatures(&self) -> u32 {
        self.minimum_distinct_user_signatures
    }

    /// Container-wide minimum of distinct group signatures.
    #[must_use]
    pub const fn minimum_distinct_group_signatures(&self) -> u32 {
        self.minimum_distinct_group_signatures
    }

    /// Transaction-approval rule tables, untouched by the whitelist flow.
    #[must_use]
    pub fn transaction_rules(&self) -> &[TransactionRules] {
        &self.transaction_rules
    }

    /// Address whitelisting rules.
    #[must_use]
    pub fn address_whitelisting_rules(&self) -> &[AddressWhitelistRule] {
        &self.address_whitelisting_rules
    }

    /// Contract-address whitelisting rules.
    #[must_use]
    pub fn contract_address_whitelisting_rules(&self) -> &[ContractAddressWhitelistRule] {
        &self.contract_address_whitelisting_rules
    }

    /// Digest binding this container to the enforced rule set.
    #[must_use]
    pub fn enforced_rules_hash(&self) -> &str {
        &self.enforced_rules_hash
    }

    /// Publication timestamp, milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Minimum signatures required on rule-change commitments.
    #[must_use]
    pub const fn minimum_commitment_signatures(&self) -> u32 {
        self.minimum_commitment_signatures
    }

    /// Ids of engine identities authorized for this tenant.
    #[must_use]
    pub fn engine_identities(&self) -> &[String] {
        &self.engine_identities
    }

    /// Find a user by exact id.
    #[must_use]
    pub fn find_user_by_id(&self, user_id: &str) -> Option<&RuleUser> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Find a group by exact id.
    #[must_use]
    pub fn find_group_by_id(&self, group_id: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// The HSM engine public key: the key of the first user carrying the
    /// `HSMSLOT` role, if any.
    ///
    /// The scan runs at most once per container instance; concurrent
    /// callers either wait for the single computation or observe its cached
    /// result.
    #[must_use]
    pub fn hsm_public_key(&self) -> Option<&PublicKey> {
        self.hsm_key
            .get_or_init(|| {
                self.users
                    .iter()
                    .find(|u| u.is_hsm_slot())
                    .map(|u| u.public_key.clone())
            })
            .as_ref()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::wire::UserWire;
    use rulegate_core::rules::GroupThreshold;
    use rulegate_crypto::SigningKey;
    use std::sync::Arc;

    fn user_wire(id: &str, roles: &[&str]) -> (SigningKey, UserWire) {
        let key = SigningKey::random();
        let wire = UserWire {
            id: id.to_string(),
            public_key_pem: key.public_key().to_pem().unwrap(),
            roles: roles.iter().map(ToString::to_string).collect(),
        };
        (key, wire)
    }

    fn minimal_wire() -> ContainerWire {
        ContainerWire {
            enforced_rules_hash: "00".repeat(32),
            timestamp: 1_700_000_000_000,
            ..ContainerWire::default()
        }
    }

    #[test]
    fn test_decode_empty_collections_normalize() {
        let bytes = minimal_wire().encode().unwrap();
        let container = decode(&bytes).unwrap();
        assert!(container.users().is_empty());
        assert!(container.groups().is_empty());
        assert!(container.transaction_rules().is_empty());
        assert!(container.address_whitelisting_rules().is_empty());
        assert!(container.contract_address_whitelisting_rules().is_empty());
        assert!(container.engine_identities().is_empty());
        assert_eq!(container.timestamp(), 1_700_000_000_000);
    }

    #[test]
    fn test_decode_rejects_truncated_body() {
        let bytes = {
            let mut full = minimal_wire().encode().unwrap();
            full.truncate(full.len() - 3);
            full
        };
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_parses_users_and_roles() {
        let (_, human) = user_wire("alice", &["ADMIN"]);
        let (_, hsm) = user_wire("engine-1", &["HSMSLOT"]);
        let mut wire = minimal_wire();
        wire.users = Some(vec![human, hsm]);

        let container = decode(&wire.encode().unwrap()).unwrap();
        assert_eq!(container.users().len(), 2);
        assert!(container.find_user_by_id("alice").unwrap().has_role("ADMIN"));
        assert!(container.find_user_by_id("engine-1").unwrap().is_hsm_slot());
        assert!(container.find_user_by_id("bob").is_none());
    }

    #[test]
    fn test_decode_rejects_bad_user_key() {
        let mut wire = minimal_wire();
        wire.users = Some(vec![UserWire {
            id: "broken".to_string(),
            public_key_pem: "not a pem".to_string(),
            roles: Vec::new(),
        }]);

        let err = decode(&wire.encode().unwrap()).unwrap_err();
        match err {
            DecodeError::InvalidUserKey { user_id, .. } => assert_eq!(user_id, "broken"),
            other => panic!("expected InvalidUserKey, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_zero_group_threshold() {
        let mut wire = minimal_wire();
        wire.address_whitelisting_rules = Some(vec![AddressWhitelistRule {
            parallel_thresholds: vec![SequentialThresholds {
                thresholds: vec![GroupThreshold {
                    group_id: "ops".to_string(),
                    minimum_signatures: 0,
                }],
            }],
            ..AddressWhitelistRule::default()
        }]);

        let err = decode(&wire.encode().unwrap()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidThreshold { .. }));
    }

    #[test]
    fn test_find_group_by_id() {
        let mut wire = minimal_wire();
        wire.groups = Some(vec![RuleGroup {
            id: "ops".to_string(),
            user_ids: vec!["alice".to_string()],
        }]);
        let container = decode(&wire.encode().unwrap()).unwrap();
        assert!(container.find_group_by_id("ops").is_some());
        assert!(container.find_group_by_id("treasury").is_none());
    }

    // ------------------------------------------------------------------------
    // HSM key memoization
    // ------------------------------------------------------------------------

    #[test]
    fn test_hsm_key_is_first_hsmslot_user() {
        let (_, human) = user_wire("alice", &[]);
        let (first_hsm, first_wire) = user_wire("engine-1", &["HSMSLOT"]);
        let (_, second_wire) = user_wire("engine-2", &["HSMSLOT"]);
        let mut wire = minimal_wire();
        wire.users = Some(vec![human, first_wire, second_wire]);

        let container = decode(&wire.encode().unwrap()).unwrap();
        let key = container.hsm_public_key().unwrap();
        assert_eq!(key, &first_hsm.public_key());
    }

    #[test]
    fn test_hsm_key_absent() {
        let (_, human) = user_wire("alice", &["ADMIN"]);
        let mut wire = minimal_wire();
        wire.users = Some(vec![human]);

        let container = decode(&wire.encode().unwrap()).unwrap();
        assert!(container.hsm_public_key().is_none());
        // Memoized absence is stable.
        assert!(container.hsm_public_key().is_none());
    }

    #[test]
    fn test_hsm_key_concurrent_callers_agree() {
        let (hsm, hsm_wire) = user_wire("engine-1", &["HSMSLOT"]);
        let mut wire = minimal_wire();
        wire.users = Some(vec![hsm_wire]);
        let container = Arc::new(decode(&wire.encode().unwrap()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = Arc::clone(&container);
                let expected = hsm.public_key();
                std::thread::spawn(move || {
                    assert_eq!(container.hsm_public_key(), Some(&expected));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
