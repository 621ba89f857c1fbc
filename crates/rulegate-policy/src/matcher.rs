//! Whitelisting rule matching.
//!
//! Finds the rule that applies to a (blockchain, network) pair. Matching is
//! a single pass over the rule list with a strict three-tier priority:
//!
//! 1. **Exact** - the rule names this blockchain and this network. The scan
//!    short-circuits on the first such rule.
//! 2. **Blockchain-only** - the rule names this blockchain with a wildcard
//!    network. First occurrence wins.
//! 3. **Global default** - the rule's blockchain selector is itself a
//!    wildcard. First occurrence wins.
//!
//! List order never overrides tier order. When no tier matches, there is no
//! applicable rule; callers treat that as a hard failure, not as "no
//! restriction".
//!
//! Address rules and contract rules have historically been matched by two
//! independently written routines; they are deliberately one routine here,
//! parameterized by field accessors, so the two call sites cannot drift
//! apart.

use rulegate_core::rules::{AddressWhitelistRule, ContractAddressWhitelistRule};

/// Returns `true` if a selector value means "match anything".
///
/// A selector is a wildcard when it is absent, empty, or the word `Any` in
/// any casing.
#[must_use]
pub fn is_wildcard(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || v.eq_ignore_ascii_case("any"),
    }
}

/// One three-tier scan, shared by both rule kinds.
///
/// `chain_of` and `network_of` extract the blockchain and network selectors
/// from a rule; everything else about the rule type is irrelevant to
/// matching.
fn find_rule<'a, R>(
    rules: &'a [R],
    blockchain: &str,
    network: &str,
    chain_of: impl Fn(&R) -> Option<&str>,
    network_of: impl Fn(&R) -> Option<&str>,
) -> Option<&'a R> {
    let mut blockchain_only: Option<&R> = None;
    let mut global_default: Option<&R> = None;

    for rule in rules {
        let chain = chain_of(rule);
        let is_global_default = is_wildcard(chain);
        let blockchain_matches = !is_global_default && chain == Some(blockchain);
        let has_wildcard_network = is_wildcard(network_of(rule));

        if blockchain_matches {
            if !has_wildcard_network && network_of(rule) == Some(network) {
                // Exact match, highest priority: no later rule can beat it.
                return Some(rule);
            }
            if has_wildcard_network {
                blockchain_only.get_or_insert(rule);
            }
            // Named network that is not this one: the rule does not apply.
        } else if is_global_default {
            global_default.get_or_insert(rule);
        }
    }

    blockchain_only.or(global_default)
}

/// Find the address whitelisting rule applicable to `(blockchain, network)`.
///
/// Address rules key their blockchain selector as `currency`. Returns
/// `None` when no rule matches, not even a global default.
#[must_use]
pub fn find_address_rule<'a>(
    rules: &'a [AddressWhitelistRule],
    blockchain: &str,
    network: &str,
) -> Option<&'a AddressWhitelistRule> {
    find_rule(
        rules,
        blockchain,
        network,
        |r| r.currency.as_deref(),
        |r| r.network.as_deref(),
    )
}

/// Find the contract-address whitelisting rule applicable to
/// `(blockchain, network)`.
///
/// Identical algorithm to [`find_address_rule`], keyed on the rule's
/// `blockchain` field.
#[must_use]
pub fn find_contract_rule<'a>(
    rules: &'a [ContractAddressWhitelistRule],
    blockchain: &str,
    network: &str,
) -> Option<&'a ContractAddressWhitelistRule> {
    find_rule(
        rules,
        blockchain,
        network,
        |r| r.blockchain.as_deref(),
        |r| r.network.as_deref(),
    )
}

// ============================================================================
// Tests
// ============================================================================
