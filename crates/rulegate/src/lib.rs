//! # rulegate
//!
//! Governance-rules and whitelist integrity verification for data returned
//! by a remote custody platform.
//!
//! A tenant must not trust whitelisted addresses/assets or governance
//! configuration just because the platform's API returned them: the
//! transport and the server are both outside the tenant's trust boundary.
//! This crate makes the trust decision locally, from two host-configured
//! anchors - the SuperAdmin public keys and a signature minimum - and
//! nothing else.
//!
//! ## Modules
//!
//! - [`config`] - trust-anchor configuration ([`VerifierConfig`])
//! - [`verifier`] - governance signature verification over raw container bytes
//! - [`flow`] - the 5-step envelope verification ([`EnvelopeVerifier`])
//! - [`legacy`] - schema-history payload transformations
//! - [`cache`] - TTL + single-flight container cache ([`RulesContainerCache`])
//!
//! ## Example
//!
//! ```
//! use rulegate::config::VerifierConfig;
//! use rulegate::flow::EnvelopeVerifier;
//! use rulegate_crypto::SigningKey;
//!
//! let admin = SigningKey::random();
//! let config = VerifierConfig::builder()
//!     .super_admin_key(admin.public_key())
//!     .min_valid_signatures(1)
//!     .build()
//!     .expect("valid configuration");
//! let verifier = EnvelopeVerifier::new(config);
//! // verifier.verify_whitelisted_address(&envelope, &expected_record)?;
//! # let _ = verifier;
//! ```
//!
//! ## Concurrency
//!
//! All verification is synchronous, CPU-bound and free of shared mutable
//! state. The only asynchronous, stateful piece is the cache, whose
//! fetcher seam is where the HTTP collaborator plugs in; the engine itself
//! performs no network I/O and no retries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod config;
pub mod flow;
pub mod legacy;
pub mod verifier;

pub use cache::{FetchedRules, RulesContainerCache, RulesFetcher};
pub use config::{VerifierConfig, VerifierConfigBuilder};
pub use flow::{EnvelopeVerifier, VerifiedEnvelope};
pub use verifier::{is_valid_signature, verify_governance_rules};

// Re-export the crates this one composes, so SDK consumers need a single
// dependency.
pub use rulegate_core;
pub use rulegate_crypto;
pub use rulegate_policy;
pub use rulegate_rules;
