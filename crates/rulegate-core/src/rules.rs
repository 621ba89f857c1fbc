//! Governance rule model types.
//!
//! These are the policy-side entities found in a decoded rules container:
//! groups of signers, the thresholds each group must reach, and the
//! per-blockchain whitelisting rules that reference them.
//!
//! All types here are immutable value types, fully constructed at decode
//! time. A refreshed container replaces the whole snapshot; holders of an
//! older snapshot keep using it safely.
//!
//! # Approval semantics
//!
//! Approval requirements compose in two layers:
//!
//! - [`SequentialThresholds`] is a conjunction: every [`GroupThreshold`]
//!   in it must be satisfied.
//! - [`ParallelThresholds`] is a disjunction of those paths: satisfying any
//!   single path approves the action.
//!
//! # Example
//!
//! ```
//! use rulegate_core::rules::{GroupThreshold, SequentialThresholds};
//!
//! // "two of group ops AND one of group treasury"
//! let path = SequentialThresholds {
//!     thresholds: vec![
//!         GroupThreshold { group_id: "ops".into(), minimum_signatures: 2 },
//!         GroupThreshold { group_id: "treasury".into(), minimum_signatures: 1 },
//!     ],
//! };
//! assert_eq!(path.thresholds.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// A named collection of signers.
///
/// Membership is an ordered list of user ids referencing users declared in
/// the same container. Lists are small; lookups are linear scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    /// The group's identifier, referenced by [`GroupThreshold::group_id`].
    pub id: String,
    /// Ids of the users belonging to this group, in declaration order.
    pub user_ids: Vec<String>,
}

impl RuleGroup {
    /// Returns `true` if the given user id belongs to this group.
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }
}

/// A minimum-signature requirement against one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupThreshold {
    /// The group whose members must sign.
    pub group_id: String,
    /// How many distinct members of that group must sign. At least 1 in
    /// any container that decodes successfully.
    pub minimum_signatures: u32,
}

/// One approval path: a conjunction of group thresholds, all of which must
/// be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentialThresholds {
    /// Every entry must be satisfied for the path to be satisfied.
    pub thresholds: Vec<GroupThreshold>,
}

/// Alternative approval paths: satisfying any single
/// [`SequentialThresholds`] entry suffices.
pub type ParallelThresholds = Vec<SequentialThresholds>;

/// One row of a tabular rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleLine {
    /// Cell values, positionally matching the owning rule's columns.
    pub values: Vec<String>,
}

/// A whitelisting rule for plain addresses on a (blockchain, network) pair.
///
/// `currency` is the blockchain selector; `currency` and `network` are
/// wildcards when absent, empty, or case-insensitively `"Any"`, which makes
/// the rule a fallback (see the matcher for the exact priority order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressWhitelistRule {
    /// Blockchain selector, wildcard when unset.
    pub currency: Option<String>,
    /// Network selector, wildcard when unset.
    pub network: Option<String>,
    /// The approval paths governing additions under this rule.
    pub parallel_thresholds: ParallelThresholds,
    /// Optional tabular detail rows.
    #[serde(default)]
    pub lines: Vec<RuleLine>,
    /// Whether the network identifier is part of the signed payload.
    #[serde(default)]
    pub include_network_in_payload: bool,
}

/// A whitelisting rule for contract addresses on a (blockchain, network)
/// pair. Same wildcard and priority semantics as [`AddressWhitelistRule`],
/// keyed on `blockchain` directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddressWhitelistRule {
    /// Blockchain selector, wildcard when unset.
    pub blockchain: Option<String>,
    /// Network selector, wildcard when unset.
    pub network: Option<String>,
    /// The approval paths governing additions under this rule.
    pub parallel_thresholds: ParallelThresholds,
}

/// A transaction-approval rule table.
///
/// Carried through decoding for completeness; the whitelist verification
/// flow does not evaluate these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRules {
    /// Identifier of the rule table.
    pub key: String,
    /// Column names for `lines`.
    pub columns: Vec<String>,
    /// The rule rows.
    pub lines: Vec<RuleLine>,
    /// Free-form description.
    #[serde(default)]
    pub details: Option<String>,
}
