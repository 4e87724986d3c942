//! Importer rule tables
//!
//! The ordered lexical rules that turn a free-text sentence into claim
//! fields. Classification order is part of the contract: sentences may match
//! several cue sets and the first match wins.

use crate::claim::models::{Category, ClaimSeverity, ScopeType};
use once_cell::sync::Lazy;
use regex::Regex;

fn cue(pattern: &str) -> Regex {
    Regex::new(pattern).expect("cue pattern is a valid regex")
}

/// Ordered (cue, category) pairs with strict first-match semantics.
/// Prohibition outranks requirement outranks invariant outranks capability;
/// anything unmatched falls through to constraint.
static CLASSIFICATION_RULES: Lazy<Vec<(Regex, Category)>> = Lazy::new(|| {
    vec![
        (
            cue(r"\bmust not\b|\bnever\b|\bnot allowed\b"),
            Category::Prohibition,
        ),
        (
            cue(r"\bmust\b|\brequired\b|\bresponsible for\b"),
            Category::Requirement,
        ),
        (cue(r"\balways\b|\bauthoritative\b"), Category::Invariant),
        (cue(r"\bdoes\b|\bis\b|\bexists\b"), Category::Capability),
    ]
});

/// Scope cues, checked in order; matches accumulate (deduplicated).
static SCOPE_CUES: Lazy<Vec<(Regex, ScopeType)>> = Lazy::new(|| {
    vec![
        (cue(r"\bapi\b|\bendpoint\b"), ScopeType::Api),
        (cue(r"\bui\b|\bfrontend\b"), ScopeType::Subsystem),
        (cue(r"\bbackend\b|\bservice\b"), ScopeType::Subsystem),
        (cue(r"\brepo-wide\b|\bsystem\b"), ScopeType::Repo),
        (cue(r"\bdevice\b|\bpanel\b"), ScopeType::Subsystem),
    ]
});

/// Fixed owner keyword vocabulary; first keyword found in the sentence wins.
pub const OWNER_VOCABULARY: [&str; 7] =
    ["ui", "env", "control-point", "api", "subsystem", "repo", "node"];

pub const DEFAULT_OWNER: &str = "unassigned";

/// Classify a sentence into the closed category vocabulary.
pub fn classify(sentence: &str) -> Category {
    let lowered = sentence.to_lowercase();
    for (pattern, category) in CLASSIFICATION_RULES.iter() {
        if pattern.is_match(&lowered) {
            return *category;
        }
    }
    Category::Constraint
}

/// Infer which scope dimensions a sentence governs. Defaults to repo when
/// nothing matches.
pub fn infer_scope_types(sentence: &str) -> Vec<ScopeType> {
    let lowered = sentence.to_lowercase();
    let mut scopes: Vec<ScopeType> = Vec::new();
    for (pattern, scope_type) in SCOPE_CUES.iter() {
        if pattern.is_match(&lowered) && !scopes.contains(scope_type) {
            scopes.push(*scope_type);
        }
    }
    if scopes.is_empty() {
        scopes.push(ScopeType::Repo);
    }
    scopes
}

/// Severity follows the classified category: prohibitions and requirements
/// block, everything else warns.
pub fn severity_for(category: Category) -> ClaimSeverity {
    match category {
        Category::Prohibition | Category::Requirement => ClaimSeverity::Block,
        _ => ClaimSeverity::Warn,
    }
}

/// Owner from the fixed keyword vocabulary, or "unassigned".
pub fn infer_owner(sentence: &str) -> String {
    let lowered = sentence.to_lowercase();
    for owner in OWNER_VOCABULARY {
        if lowered.contains(owner) {
            return owner.to_string();
        }
    }
    DEFAULT_OWNER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prohibition_cues_win() {
        assert_eq!(
            classify("Users must not disable the safety interlock"),
            Category::Prohibition
        );
        assert_eq!(classify("Retries are never silent"), Category::Prohibition);
        assert_eq!(
            classify("Direct writes are not allowed"),
            Category::Prohibition
        );
    }

    #[test]
    fn test_priority_order_is_first_match() {
        // Matches both prohibition ("must not") and requirement ("must");
        // prohibition is checked first.
        assert_eq!(
            classify("The service must not bypass review and must log it"),
            Category::Prohibition
        );
        // Matches requirement ("must") and capability ("is").
        assert_eq!(
            classify("The owner must confirm the change is safe"),
            Category::Requirement
        );
        // Matches invariant ("always") and capability ("is").
        assert_eq!(
            classify("The registry always wins when state is disputed"),
            Category::Invariant
        );
    }

    #[test]
    fn test_capability_and_default_constraint() {
        assert_eq!(classify("A rollback path exists"), Category::Capability);
        assert_eq!(classify("Three retries, then stop"), Category::Constraint);
    }

    #[test]
    fn test_scope_inference() {
        assert_eq!(
            infer_scope_types("The API endpoint validates input"),
            vec![ScopeType::Api]
        );
        assert_eq!(
            infer_scope_types("UI panels refresh on demand"),
            vec![ScopeType::Subsystem]
        );
        // api + backend cues both present: both dimensions, deduplicated.
        assert_eq!(
            infer_scope_types("The backend service owns the api contract"),
            vec![ScopeType::Api, ScopeType::Subsystem]
        );
        // No cue: defaults to repo.
        assert_eq!(infer_scope_types("Reviews come first"), vec![ScopeType::Repo]);
    }

    #[test]
    fn test_severity_follows_category() {
        assert_eq!(severity_for(Category::Prohibition), ClaimSeverity::Block);
        assert_eq!(severity_for(Category::Requirement), ClaimSeverity::Block);
        assert_eq!(severity_for(Category::Invariant), ClaimSeverity::Warn);
        assert_eq!(severity_for(Category::Capability), ClaimSeverity::Warn);
        assert_eq!(severity_for(Category::Constraint), ClaimSeverity::Warn);
    }

    #[test]
    fn test_owner_vocabulary() {
        assert_eq!(infer_owner("The UI must not block"), "ui");
        assert_eq!(infer_owner("env snapshots are diagnostic"), "env");
        assert_eq!(infer_owner("Reviews come first"), DEFAULT_OWNER);
    }
}
