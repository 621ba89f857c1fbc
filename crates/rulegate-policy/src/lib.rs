//! # rulegate-policy
//!
//! Policy evaluation for the `RuleGate` verification engine: finding the
//! whitelisting rule that applies to a (blockchain, network) pair, and
//! deciding whether a set of verified signers satisfies a rule's approval
//! thresholds.
//!
//! Everything here is pure computation over immutable inputs; no locking,
//! no I/O, safe from any number of threads.
//!
//! ## Modules
//!
//! - [`matcher`] - wildcard predicate and the three-tier rule matcher
//! - [`threshold`] - parallel/sequential threshold evaluation
//!
//! ## Matching priority
//!
//! ```
//! use rulegate_core::rules::AddressWhitelistRule;
//! use rulegate_policy::find_address_rule;
//!
//! let exact = AddressWhitelistRule {
//!     currency: Some("ETH".into()),
//!     network: Some("mainnet".into()),
//!     ..AddressWhitelistRule::default()
//! };
//! let fallback = AddressWhitelistRule::default(); // fully wildcard
//!
//! let rules = vec![fallback, exact.clone()];
//! assert_eq!(find_address_rule(&rules, "ETH", "mainnet"), Some(&exact));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod matcher;
pub mod threshold;

pub use matcher::{find_address_rule, find_contract_rule, is_wildcard};
pub use threshold::{first_shortfall, is_satisfied, Shortfall};
