//! # rulegate-rules
//!
//! Rules-container decoding for the `RuleGate` verification engine.
//!
//! The platform serves each tenant's governance configuration as an opaque
//! binary blob. This crate owns that blob's framing, decodes it into an
//! immutable [`DecodedRulesContainer`] snapshot, and performs all
//! decode-time validation: PEM user keys are parsed and curve-checked,
//! group thresholds are range checked, optional collections normalize to
//! empty lists.
//!
//! Decoding establishes *structure*, not *trust*: signatures over the raw
//! container bytes are verified separately (and first) by the `rulegate`
//! crate.
//!
//! ## Modules
//!
//! - [`wire`] - the framed binary format and its encoder
//! - [`container`] - [`decode`] and the decoded snapshot

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod container;
pub mod wire;

pub use container::{decode, DecodedRulesContainer, RuleUser, HSM_SLOT_ROLE};
pub use wire::{ContainerWire, UserWire, CONTAINER_MAGIC, CONTAINER_VERSION};
