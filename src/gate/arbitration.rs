//! Arbitration
//!
//! Validates and records a human decision against one conflict. Accepted
//! arbitrations are echoed back and never fed into conflict detection: a
//! subsequent gate check recomputes every conflict from scratch.

use crate::claim::models::{ChangeScope, MAX_RATIONALE_LEN};
use crate::gate::conflict::{CHOICE_ALLOW_ONCE, CHOICE_REJECT};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// The closed decision vocabulary - the same keys the conflict choices
/// declare, so a CLI can submit exactly what it prompted for.
pub const DECISION_VOCABULARY: [&str; 2] = [CHOICE_REJECT, CHOICE_ALLOW_ONCE];

/// A human decision resolving one conflict for the current invocation.
///
/// `decision` is carried as a plain string so an unrecognized value reaches
/// the handler and comes back as a rejected outcome instead of failing
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arbitration {
    pub conflict_id: String,
    pub decision: String,
    pub justification: String,
    pub scope: ChangeScope,
}

/// Outcome of an arbitration submission. Callers branch on the `status`
/// field, never on transport errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ArbitrationOutcome {
    Accepted {
        /// Receipt id for the accepted decision.
        arbitration_id: Uuid,
        arbitration: Arbitration,
    },
    Rejected {
        reason: String,
    },
}

pub struct ArbitrationHandler;

impl ArbitrationHandler {
    /// Validate a decision and echo it back.
    ///
    /// Invalid values produce a rejected outcome with no side effects. Valid
    /// values are accepted but do not remove or mark the originating
    /// conflict.
    pub fn resolve(arbitration: Arbitration) -> ArbitrationOutcome {
        if !DECISION_VOCABULARY.contains(&arbitration.decision.as_str()) {
            return ArbitrationOutcome::Rejected {
                reason: format!(
                    "Invalid choice key '{}' (expected one of: {})",
                    arbitration.decision,
                    DECISION_VOCABULARY.join(", ")
                ),
            };
        }
        if arbitration.justification.chars().count() > MAX_RATIONALE_LEN {
            return ArbitrationOutcome::Rejected {
                reason: format!(
                    "justification must be at most {} characters",
                    MAX_RATIONALE_LEN
                ),
            };
        }

        info!(
            conflict_id = %arbitration.conflict_id,
            decision = %arbitration.decision,
            "arbitration accepted"
        );
        ArbitrationOutcome::Accepted {
            arbitration_id: Uuid::new_v4(),
            arbitration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arbitration(decision: &str) -> Arbitration {
        Arbitration {
            conflict_id: "conflict-A-1-A-2".to_string(),
            decision: decision.to_string(),
            justification: "Approved by release captain".to_string(),
            scope: ChangeScope {
                repo: Some("main".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_valid_decision_is_accepted_and_echoed() {
        let outcome = ArbitrationHandler::resolve(arbitration("allow_once"));
        match outcome {
            ArbitrationOutcome::Accepted { arbitration, .. } => {
                assert_eq!(arbitration.decision, "allow_once");
                assert_eq!(arbitration.conflict_id, "conflict-A-1-A-2");
            }
            ArbitrationOutcome::Rejected { reason } => panic!("rejected: {reason}"),
        }
    }

    #[test]
    fn test_bogus_decision_is_rejected_not_an_error() {
        let outcome = ArbitrationHandler::resolve(arbitration("bogus"));
        assert!(matches!(outcome, ArbitrationOutcome::Rejected { .. }));
    }

    #[test]
    fn test_overlong_justification_is_rejected() {
        let mut arb = arbitration("reject");
        arb.justification = "y".repeat(MAX_RATIONALE_LEN + 1);
        assert!(matches!(
            ArbitrationHandler::resolve(arb),
            ArbitrationOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let accepted = ArbitrationHandler::resolve(arbitration("reject"));
        let value = serde_json::to_value(&accepted).unwrap();
        assert_eq!(value["status"], "accepted");

        let rejected = ArbitrationHandler::resolve(arbitration("nope"));
        let value = serde_json::to_value(&rejected).unwrap();
        assert_eq!(value["status"], "rejected");
        assert!(value["reason"].as_str().unwrap().contains("nope"));
    }
}
