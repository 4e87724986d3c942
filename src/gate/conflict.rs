//! Conflict detection
//!
//! Finds contradictions among the claims a scope makes relevant. Detection
//! is recomputed fresh on every gate check; conflicts are derived values and
//! are never persisted.

use crate::claim::models::{ChangeScope, Claim};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Why two or more claims were flagged as conflicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReasonCode {
    ScopeOverlap,
    AssertionContradiction,
    OwnerDisagreement,
}

/// Choice key for rejecting the change under arbitration.
pub const CHOICE_REJECT: &str = "reject";
/// Choice key for allowing the change for this scope only.
pub const CHOICE_ALLOW_ONCE: &str = "allow_once";

/// One arbitration option offered to the human resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictChoice {
    pub key: String,
    pub label: String,
    pub effect: String,
}

/// A detected contradiction between two or more claims under a scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    /// Deterministic function of the sorted participant claim ids; stable
    /// across repeated checks on unchanged input.
    pub conflict_id: String,
    pub reason_code: ConflictReasonCode,
    /// The question framed for the arbiter.
    pub question: String,
    /// Always the same ordered pair: a rejecting choice, then an accepting one.
    pub choices: Vec<ConflictChoice>,
    pub claim_ids: Vec<String>,
    pub scope: ChangeScope,
    pub introduced_by: String,
}

/// Answers "do these two assertions contradict each other".
///
/// New negation patterns extend the detector by adding predicates; the
/// grouping loop never changes.
pub trait ContradictionPredicate: Send + Sync {
    fn name(&self) -> &'static str;
    fn contradicts(&self, a: &Claim, b: &Claim) -> bool;
}

/// Structural negation via a controlled token substitution: claim A's
/// assertion becomes claim B's under one swap (e.g. "never" -> "may").
pub struct TokenSwapNegation {
    name: &'static str,
    from: &'static str,
    to: &'static str,
}

impl TokenSwapNegation {
    pub const fn new(name: &'static str, from: &'static str, to: &'static str) -> Self {
        Self { name, from, to }
    }
}

impl ContradictionPredicate for TokenSwapNegation {
    fn name(&self) -> &'static str {
        self.name
    }

    fn contradicts(&self, a: &Claim, b: &Claim) -> bool {
        let key_a = assertion_key(&a.assertion);
        let key_b = assertion_key(&b.assertion);
        if key_a == key_b {
            return false;
        }
        key_a.replace(self.from, self.to) == key_b || key_b.replace(self.from, self.to) == key_a
    }
}

/// Case-folded, whitespace-collapsed form of an assertion. Claims that
/// normalize to the same key are talking about the same thing.
pub fn assertion_key(assertion: &str) -> String {
    assertion
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Detects contradictions among affected claims.
pub struct ConflictDetector {
    predicates: Vec<Box<dyn ContradictionPredicate>>,
}

impl ConflictDetector {
    /// Detector with the default negation predicates.
    pub fn new() -> Self {
        Self::with_predicates(vec![
            Box::new(TokenSwapNegation::new("never_may", "never", "may")),
            Box::new(TokenSwapNegation::new("must_not_may", "must not", "may")),
        ])
    }

    pub fn with_predicates(predicates: Vec<Box<dyn ContradictionPredicate>>) -> Self {
        Self { predicates }
    }

    /// All conflicts among `affected`, in deterministic order.
    ///
    /// Two passes: first, claims grouped by normalized assertion key conflict
    /// when the group mixes categories; second, every pair is tested against
    /// the contradiction predicates. Duplicate findings collapse on
    /// conflict_id, keeping first-emission order.
    pub fn detect(&self, affected: &[Claim], _scope: &ChangeScope) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // Pass 1: same assertion, disagreeing vocabulary.
        for group in Self::assertion_groups(affected) {
            if group.len() < 2 {
                continue;
            }
            let first_category = group[0].category;
            if group.iter().all(|c| c.category == first_category) {
                continue;
            }
            Self::push_conflict(&mut conflicts, &mut seen, &group, &group[0].assertion);
        }

        // Pass 2: structural negation between any two claims.
        for (i, a) in affected.iter().enumerate() {
            for b in affected.iter().skip(i + 1) {
                if self.predicates.iter().any(|p| p.contradicts(a, b)) {
                    Self::push_conflict(&mut conflicts, &mut seen, &[a, b], &b.assertion);
                }
            }
        }

        conflicts
    }

    /// Groups in first-occurrence order, members in insertion order.
    fn assertion_groups(affected: &[Claim]) -> Vec<Vec<&Claim>> {
        let mut keys: Vec<String> = Vec::new();
        let mut groups: Vec<Vec<&Claim>> = Vec::new();
        for claim in affected {
            let key = assertion_key(&claim.assertion);
            match keys.iter().position(|k| *k == key) {
                Some(idx) => groups[idx].push(claim),
                None => {
                    keys.push(key);
                    groups.push(vec![claim]);
                }
            }
        }
        groups
    }

    fn push_conflict(
        conflicts: &mut Vec<Conflict>,
        seen: &mut HashSet<String>,
        participants: &[&Claim],
        framed_assertion: &str,
    ) {
        let mut claim_ids: Vec<String> =
            participants.iter().map(|c| c.claim_id.clone()).collect();
        claim_ids.sort();
        let conflict_id = format!("conflict-{}", claim_ids.join("-"));
        if !seen.insert(conflict_id.clone()) {
            return;
        }

        let first = participants[0];
        conflicts.push(Conflict {
            conflict_id,
            reason_code: ConflictReasonCode::AssertionContradiction,
            question: format!("Allow {}?", framed_assertion),
            choices: default_choices(),
            claim_ids,
            scope: ChangeScope::wildcard_for(&first.scope_types),
            introduced_by: first.introduced_by.clone(),
        });
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed ordered choice pair attached to every conflict.
pub fn default_choices() -> Vec<ConflictChoice> {
    vec![
        ConflictChoice {
            key: CHOICE_REJECT.to_string(),
            label: "Reject change".to_string(),
            effect: "Change is blocked".to_string(),
        },
        ConflictChoice {
            key: CHOICE_ALLOW_ONCE.to_string(),
            label: "Allow for this scope only".to_string(),
            effect: "Change proceeds for this scope".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::models::{Category, ClaimSeverity, ScopeType};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn claim(claim_id: &str, assertion: &str, category: Category) -> Claim {
        Claim {
            claim_id: claim_id.to_string(),
            title: claim_id.to_string(),
            assertion: assertion.to_string(),
            rationale: "test".to_string(),
            scope_types: vec![ScopeType::Repo],
            severity: ClaimSeverity::Block,
            owner: "env".to_string(),
            category,
            introduced_by: "invariant".to_string(),
            source_type: None,
            rationale_ref: None,
            read_only: false,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_assertion_key_folds_case_and_whitespace() {
        assert_eq!(
            assertion_key("  Snapshots   are\tDIAGNOSTIC "),
            "snapshots are diagnostic"
        );
    }

    #[test]
    fn test_same_assertion_differing_categories_is_one_conflict() {
        // Scenario: identical assertion text registered under two categories.
        let affected = vec![
            claim("A-1", "all writes go through the gate", Category::Invariant),
            claim("A-2", "All writes go through the  gate", Category::Prohibition),
        ];
        let conflicts = ConflictDetector::new().detect(&affected, &ChangeScope::default());

        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.reason_code, ConflictReasonCode::AssertionContradiction);
        assert_eq!(conflict.claim_ids, vec!["A-1", "A-2"]);
        assert_eq!(conflict.conflict_id, "conflict-A-1-A-2");
    }

    #[test]
    fn test_same_assertion_same_category_is_not_a_conflict() {
        let affected = vec![
            claim("A-1", "all writes go through the gate", Category::Invariant),
            claim("A-2", "all writes go through the gate", Category::Invariant),
        ];
        let conflicts = ConflictDetector::new().detect(&affected, &ChangeScope::default());
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_never_may_negation_pair_conflicts() {
        let affected = vec![
            claim("ENV-002", "deploys never skip review", Category::Invariant),
            claim("ENV-003", "deploys may skip review", Category::Invariant),
        ];
        let conflicts = ConflictDetector::new().detect(&affected, &ChangeScope::default());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].claim_ids, vec!["ENV-002", "ENV-003"]);
    }

    #[test]
    fn test_must_not_may_negation_pair_conflicts() {
        let affected = vec![
            claim(
                "LOCK-1",
                "operators must not disable the interlock",
                Category::Prohibition,
            ),
            claim(
                "LOCK-2",
                "operators may disable the interlock",
                Category::Capability,
            ),
        ];
        let conflicts = ConflictDetector::new().detect(&affected, &ChangeScope::default());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].question, "Allow operators may disable the interlock?");
    }

    #[test]
    fn test_conflict_id_is_order_independent() {
        let a = claim("B-2", "ui never computes readiness", Category::Invariant);
        let b = claim("B-1", "ui may computes readiness", Category::Invariant);
        let detector = ConflictDetector::new();

        let forward = detector.detect(&[a.clone(), b.clone()], &ChangeScope::default());
        let reverse = detector.detect(&[b, a], &ChangeScope::default());
        assert_eq!(forward[0].conflict_id, reverse[0].conflict_id);
        assert_eq!(forward[0].conflict_id, "conflict-B-1-B-2");
    }

    #[test]
    fn test_detection_is_deterministic_across_calls() {
        let affected = vec![
            claim("A-1", "deploys never skip review", Category::Invariant),
            claim("A-2", "deploys may skip review", Category::Invariant),
            claim("A-3", "rollbacks are manual", Category::Capability),
            claim("A-4", "rollbacks are manual", Category::Prohibition),
        ];
        let detector = ConflictDetector::new();
        let first = detector.detect(&affected, &ChangeScope::default());
        let second = detector.detect(&affected, &ChangeScope::default());

        let ids = |cs: &[Conflict]| cs.iter().map(|c| c.conflict_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        // Grouping pass findings come before negation-pair findings.
        assert_eq!(
            ids(&first),
            vec!["conflict-A-3-A-4", "conflict-A-1-A-2"]
        );
    }

    #[test]
    fn test_choices_are_the_fixed_ordered_pair() {
        let affected = vec![
            claim("A-1", "retries never happen", Category::Invariant),
            claim("A-2", "retries may happen", Category::Invariant),
        ];
        let conflicts = ConflictDetector::new().detect(&affected, &ChangeScope::default());
        let keys: Vec<&str> = conflicts[0].choices.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec![CHOICE_REJECT, CHOICE_ALLOW_ONCE]);
    }

    #[test]
    fn test_custom_predicate_extends_detection() {
        struct AlwaysOpposites;
        impl ContradictionPredicate for AlwaysOpposites {
            fn name(&self) -> &'static str {
                "always_opposites"
            }
            fn contradicts(&self, a: &Claim, b: &Claim) -> bool {
                assertion_key(&a.assertion).replace("always", "sometimes")
                    == assertion_key(&b.assertion)
            }
        }

        let affected = vec![
            claim("A-1", "audits always run", Category::Invariant),
            claim("A-2", "audits sometimes run", Category::Invariant),
        ];

        let default_detector = ConflictDetector::new();
        assert!(default_detector
            .detect(&affected, &ChangeScope::default())
            .is_empty());

        let extended = ConflictDetector::with_predicates(vec![Box::new(AlwaysOpposites)]);
        assert_eq!(extended.detect(&affected, &ChangeScope::default()).len(), 1);
    }
}
