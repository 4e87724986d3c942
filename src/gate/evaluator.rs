//! Gate evaluation
//!
//! Composes scope matching, conflict detection, and severity into a single
//! pass/fail verdict. Evaluation is synchronous, single-request-scoped, and
//! recomputed from the registry on every call.

use crate::claim::models::{ChangeScope, Claim, ClaimSeverity};
use crate::claim::store::ClaimStore;
use crate::gate::conflict::{Conflict, ConflictDetector};
use crate::gate::matcher::ScopeMatcher;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire contract version. Callers observing a mismatch must treat it as
/// fatal before interpreting anything else in the payload. Any change to the
/// exit-code or payload contract requires bumping this.
pub const CONTRACT_VERSION: u32 = 1;

/// Count summary attached to every gate result.
///
/// `violated` and `unknown` are always zero: severity-state tracking beyond
/// block/warn is intentionally unimplemented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSummary {
    pub affected: usize,
    pub violated: usize,
    pub conflicted: usize,
    pub unknown: usize,
}

/// The verdict for one gate check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub contract_version: u32,
    pub scope: ChangeScope,
    pub summary: GateSummary,
    pub claims: Vec<Claim>,
    pub conflicts: Vec<Conflict>,
    #[serde(rename = "pass")]
    pub passed: bool,
    pub blocking_claims: Vec<String>,
}

/// Evaluates a change scope against the claim registry.
pub struct GateEvaluator {
    detector: ConflictDetector,
}

impl GateEvaluator {
    pub fn new() -> Self {
        Self {
            detector: ConflictDetector::new(),
        }
    }

    pub fn with_detector(detector: ConflictDetector) -> Self {
        Self { detector }
    }

    /// Evaluate `scope` against the current registry contents.
    ///
    /// The verdict passes exactly when no affected claim blocks and no
    /// conflict was detected.
    pub async fn check(&self, store: &ClaimStore, scope: &ChangeScope) -> GateResult {
        let claims = store.list().await;
        let affected = ScopeMatcher::affected(&claims, scope);
        let conflicts = self.detector.detect(&affected, scope);
        let blocking_claims: Vec<String> = affected
            .iter()
            .filter(|c| c.severity == ClaimSeverity::Block)
            .map(|c| c.claim_id.clone())
            .collect();
        let passed = blocking_claims.is_empty() && conflicts.is_empty();

        debug!(
            affected = affected.len(),
            conflicted = conflicts.len(),
            blocking = blocking_claims.len(),
            passed,
            "gate check evaluated"
        );

        GateResult {
            contract_version: CONTRACT_VERSION,
            scope: scope.clone(),
            summary: GateSummary {
                affected: affected.len(),
                violated: 0,
                conflicted: conflicts.len(),
                unknown: 0,
            },
            claims: affected,
            conflicts,
            passed,
            blocking_claims,
        }
    }
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
