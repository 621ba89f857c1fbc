//! # rulegate-core
//!
//! Core types and error definitions for the `RuleGate` verification engine.
//!
//! `RuleGate` lets a tenant trust whitelisted-address/asset data returned by
//! a remote custody platform only after verifying it cryptographically and
//! against the tenant's governance rules, without trusting the transport or
//! the server. This crate holds the pieces every other `RuleGate` crate
//! builds on:
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`rules`] - Governance rule model types (groups, thresholds, rules)
//! - [`envelope`] - Whitelisted-data envelope wire types
//!
//! ## Error Handling
//!
//! ```rust
//! use rulegate_core::error::{IntegrityError, RuleGateError};
//!
//! let err: RuleGateError = IntegrityError::insufficient_signatures(1, 2).into();
//! assert!(err.to_string().contains("minimum 2 required"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod envelope;
pub mod error;
pub mod rules;

// Re-export commonly used types at crate root for convenience
pub use envelope::{
    AddressDetails, ContractDetails, EnvelopeMetadata, RuleUserSignature, WhitelistedEnvelope,
};
pub use error::{
    ConfigError, DecodeError, FetchError, IntegrityError, Result, RuleGateError,
};
pub use rules::{
    AddressWhitelistRule, ContractAddressWhitelistRule, GroupThreshold, ParallelThresholds,
    RuleGroup, RuleLine, SequentialThresholds, TransactionRules,
};
