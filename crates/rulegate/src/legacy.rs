//! Legacy payload transformations.
//!
//! The platform occasionally adds fields to whitelisted-record payloads
//! after records were signed. For such records the served payload no longer
//! hashes to the signed digest; stripping the later-added field restores
//! the originally signed form.
//!
//! The transformation list is a compatibility contract tied to the
//! platform's schema version history. It is maintained by hand from the
//! schema changelog, ordered newest change first, and each transformation
//! is applied to the *original* payload independently - they do not stack.

use serde_json::Value;

/// A schema-history payload rewrite: removal of one later-added field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyTransformation {
    /// Short name for logs and diagnostics.
    pub name: &'static str,
    /// The top-level JSON field the transformation removes.
    field: &'static str,
}

/// Known transformations, newest schema change first.
///
/// - `contractType` was added to whitelisted-asset payloads after launch.
/// - `label` was added to whitelisted-address payloads after launch.
pub const LEGACY_TRANSFORMATIONS: &[LegacyTransformation] = &[
    LegacyTransformation {
        name: "strip-contract-type",
        field: "contractType",
    },
    LegacyTransformation {
        name: "strip-label",
        field: "label",
    },
];

impl LegacyTransformation {
    /// Apply this transformation to a JSON object payload.
    ///
    /// Returns `None` when the payload is not a JSON object or does not
    /// contain the field - in which case this transformation cannot change
    /// the hash and there is nothing to recompute. Field order of the
    /// remaining keys is preserved.
    #[must_use]
    pub fn apply(&self, payload: &str) -> Option<String> {
        let mut value: Value = serde_json::from_str(payload).ok()?;
        let object = value.as_object_mut()?;
        object.remove(self.field)?;
        serde_json::to_string(&value).ok()
    }
}

/// All distinct rewritten payloads the legacy transformations produce for
/// `payload`, in transformation order.
#[must_use]
pub fn legacy_payload_variants(payload: &str) -> Vec<(&'static str, String)> {
    LEGACY_TRANSFORMATIONS
        .iter()
        .filter_map(|t| t.apply(payload).map(|rewritten| (t.name, rewritten)))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_strips_contract_type_preserving_order() {
        let payload = r#"{"blockchain":"ETH","contractType":"ERC20","symbol":"LINK"}"#;
        let variants = legacy_payload_variants(payload);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].0, "strip-contract-type");
        assert_eq!(variants[0].1, r#"{"blockchain":"ETH","symbol":"LINK"}"#);
    }

    #[test]
    fn test_strips_label() {
        let payload = r#"{"address":"0xabc","label":"treasury cold"}"#;
        let variants = legacy_payload_variants(payload);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].1, r#"{"address":"0xabc"}"#);
    }

    #[test]
    fn test_transformations_apply_independently_not_stacked() {
        let payload = r#"{"address":"0xabc","contractType":"ERC20","label":"x"}"#;
        let variants = legacy_payload_variants(payload);
        assert_eq!(variants.len(), 2);
        // Each variant still contains the other field.
        assert!(variants[0].1.contains("label"));
        assert!(variants[1].1.contains("contractType"));
    }

    #[test]
    fn test_no_matching_field_yields_no_variants() {
        assert!(legacy_payload_variants(r#"{"address":"0xabc"}"#).is_empty());
    }

    #[test]
    fn test_non_object_payload_yields_no_variants() {
        assert!(legacy_payload_variants("not json at all").is_empty());
        assert!(legacy_payload_variants("[1,2,3]").is_empty());
        assert!(legacy_payload_variants("42").is_empty());
    }
}
