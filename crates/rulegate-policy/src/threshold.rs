//! Approval-threshold evaluation.
//!
//! Decides whether a set of verified signers satisfies a rule's approval
//! requirement. The requirement is a disjunction of paths
//! ([`ParallelThresholds`]); each path is a conjunction of per-group
//! minimums ([`SequentialThresholds`]).
//!
//! A signer counts at most once per group no matter how many signatures
//! they produced; the input is a *set* of verified user ids for exactly
//! that reason. A threshold referencing a group the container does not
//! declare can never be satisfied (fail closed).

use rulegate_core::rules::{GroupThreshold, RuleGroup, SequentialThresholds};
use std::collections::HashSet;

/// The first unmet group requirement of an unsatisfied evaluation, used to
/// name the failure in error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    /// The group whose threshold was missed.
    pub group_id: String,
    /// Distinct signatures that group requires.
    pub required: u32,
    /// Distinct verified signers actually found in that group.
    pub verified: usize,
}

/// Returns `true` if any approval path is fully satisfied by the verified
/// signers.
///
/// An empty `verified_user_ids` set satisfies only a path whose every
/// threshold requires zero signatures; with no paths at all the result is
/// `false`.
#[must_use]
pub fn is_satisfied(
    parallel_thresholds: &[SequentialThresholds],
    verified_user_ids: &HashSet<String>,
    groups: &[RuleGroup],
) -> bool {
    parallel_thresholds
        .iter()
        .any(|path| path_satisfied(path, verified_user_ids, groups))
}

/// Locate the failure to report when no path is satisfied: the first unmet
/// threshold of the first unsatisfied path.
///
/// Returns `None` when the thresholds are in fact satisfied.
#[must_use]
pub fn first_shortfall(
    parallel_thresholds: &[SequentialThresholds],
    verified_user_ids: &HashSet<String>,
    groups: &[RuleGroup],
) -> Option<Shortfall> {
    if is_satisfied(parallel_thresholds, verified_user_ids, groups) {
        return None;
    }

    for path in parallel_thresholds {
        for threshold in &path.thresholds {
            let verified = verified_in_group(threshold, verified_user_ids, groups);
            if verified < threshold.minimum_signatures as usize {
                return Some(Shortfall {
                    group_id: threshold.group_id.clone(),
                    required: threshold.minimum_signatures,
                    verified,
                });
            }
        }
    }

    // No paths configured at all: nothing can ever be approved.
    Some(Shortfall {
        group_id: String::new(),
        required: 1,
        verified: 0,
    })
}

fn path_satisfied(
    path: &SequentialThresholds,
    verified_user_ids: &HashSet<String>,
    groups: &[RuleGroup],
) -> bool {
    path.thresholds.iter().all(|threshold| {
        verified_in_group(threshold, verified_user_ids, groups)
            >= threshold.minimum_signatures as usize
    })
}

/// Count distinct verified signers belonging to the threshold's group.
fn verified_in_group(
    threshold: &GroupThreshold,
    verified_user_ids: &HashSet<String>,
    groups: &[RuleGroup],
) -> usize {
    let Some(group) = groups.iter().find(|g| g.id == threshold.group_id) else {
        return 0;
    };
    // Distinct members only, in case a membership list repeats an id.
    group
        .user_ids
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|id| verified_user_ids.contains(*id))
        .count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn group(id: &str, members: &[&str]) -> RuleGroup {
        RuleGroup {
            id: id.to_string(),
            user_ids: members.iter().map(ToString::to_string).collect(),
        }
    }

    fn threshold(group_id: &str, minimum: u32) -> GroupThreshold {
        GroupThreshold {
            group_id: group_id.to_string(),
            minimum_signatures: minimum,
        }
    }

    fn path(thresholds: Vec<GroupThreshold>) -> SequentialThresholds {
        SequentialThresholds { thresholds }
    }

    fn verified(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_single_path_single_group() {
        let groups = [group("ops", &["u1", "u2", "u3"])];
        let paths = [path(vec![threshold("ops", 2)])];

        assert!(is_satisfied(&paths, &verified(&["u1", "u2"]), &groups));
        assert!(is_satisfied(&paths, &verified(&["u1", "u2", "u3"]), &groups));
        assert!(!is_satisfied(&paths, &verified(&["u1"]), &groups));
        assert!(!is_satisfied(&paths, &verified(&[]), &groups));
    }

    #[test]
    fn test_all_groups_in_a_path_must_be_met() {
        let groups = [group("ops", &["u1", "u2"]), group("treasury", &["t1"])];
        let paths = [path(vec![threshold("ops", 1), threshold("treasury", 1)])];

        assert!(is_satisfied(&paths, &verified(&["u1", "t1"]), &groups));
        assert!(!is_satisfied(&paths, &verified(&["u1", "u2"]), &groups));
        assert!(!is_satisfied(&paths, &verified(&["t1"]), &groups));
    }

    #[test]
    fn test_any_satisfied_path_suffices() {
        let groups = [group("ops", &["u1", "u2"]), group("admins", &["a1"])];
        let paths = [
            path(vec![threshold("ops", 2)]),
            path(vec![threshold("admins", 1)]),
        ];

        // Second path carries the approval even though the first fails.
        assert!(is_satisfied(&paths, &verified(&["a1"]), &groups));
        assert!(is_satisfied(&paths, &verified(&["u1", "u2"]), &groups));
        assert!(!is_satisfied(&paths, &verified(&["u1", "a2"]), &groups));
    }

    #[test]
    fn test_signers_outside_the_group_do_not_count() {
        let groups = [group("ops", &["u1"])];
        let paths = [path(vec![threshold("ops", 1)])];

        assert!(!is_satisfied(&paths, &verified(&["stranger"]), &groups));
    }

    #[test]
    fn test_unknown_group_fails_closed() {
        let groups = [group("ops", &["u1"])];
        let paths = [path(vec![threshold("missing", 1)])];

        assert!(!is_satisfied(&paths, &verified(&["u1"]), &groups));
    }

    #[test]
    fn test_duplicate_membership_entries_count_once() {
        let groups = [group("ops", &["u1", "u1", "u2"])];
        let paths = [path(vec![threshold("ops", 2)])];

        // u1 listed twice is still one signer.
        assert!(!is_satisfied(&paths, &verified(&["u1"]), &groups));
        assert!(is_satisfied(&paths, &verified(&["u1", "u2"]), &groups));
    }

    #[test]
    fn test_no_paths_is_never_satisfied() {
        let groups = [group("ops", &["u1"])];
        assert!(!is_satisfied(&[], &verified(&["u1"]), &groups));
    }

    #[test]
    fn test_empty_verified_set_against_zero_minimum() {
        // Degenerate configuration: a zero-minimum threshold is satisfied
        // by nobody signing.
        let groups = [group("ops", &["u1"])];
        let paths = [path(vec![threshold("ops", 0)])];
        assert!(is_satisfied(&paths, &verified(&[]), &groups));
    }

    // ------------------------------------------------------------------------
    // Shortfall reporting
    // ------------------------------------------------------------------------

    #[test]
    fn test_first_shortfall_names_first_unmet_group() {
        let groups = [group("ops", &["u1", "u2"]), group("treasury", &["t1"])];
        let paths = [path(vec![threshold("ops", 2), threshold("treasury", 1)])];

        let shortfall = first_shortfall(&paths, &verified(&["u1", "t1"]), &groups).unwrap();
        assert_eq!(shortfall.group_id, "ops");
        assert_eq!(shortfall.required, 2);
        assert_eq!(shortfall.verified, 1);
    }

    #[test]
    fn test_first_shortfall_none_when_satisfied() {
        let groups = [group("ops", &["u1"])];
        let paths = [path(vec![threshold("ops", 1)])];
        assert!(first_shortfall(&paths, &verified(&["u1"]), &groups).is_none());
    }

    #[test]
    fn test_first_shortfall_with_no_paths() {
        let shortfall = first_shortfall(&[], &verified(&["u1"]), &[]).unwrap();
        assert_eq!(shortfall.required, 1);
        assert_eq!(shortfall.verified, 0);
    }
}
