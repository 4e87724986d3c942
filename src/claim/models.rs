//! Claim data models
//!
//! Defines the atomic policy claim, its closed vocabularies, and the
//! change scope used to select which claims apply to a proposed change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The dimensions a claim can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Repo,
    Path,
    Subsystem,
    Api,
}

/// What a violated or conflicted claim does to the gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimSeverity {
    /// Blocks the change outright
    Block,
    /// Reported but never blocks
    Warn,
}

/// Closed category vocabulary. Deserialization rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Requirement,
    Invariant,
    Constraint,
    Capability,
    Prohibition,
}

/// Maximum length of `rationale` and arbitration justifications, in characters.
pub const MAX_RATIONALE_LEN: usize = 140;

/// An atomic policy assertion about the governed system.
///
/// Claims are immutable once registered; they are created by direct
/// registration or by the importer and never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Stable unique identity
    pub claim_id: String,
    pub title: String,
    /// Normalized free-text assertion
    pub assertion: String,
    /// Short justification, bounded at registration
    pub rationale: String,
    /// Which scope dimensions this claim governs (non-empty)
    pub scope_types: Vec<ScopeType>,
    pub severity: ClaimSeverity,
    pub owner: String,
    pub category: Category,
    pub introduced_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale_ref: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "Utc::now")]
    pub registered_at: DateTime<Utc>,
}

/// The dimensions a proposed change touches.
///
/// A dimension counts as present only when its field is a non-empty string;
/// a scope with no present dimensions requests a global evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

impl ChangeScope {
    /// The scope dimensions that are actually set.
    pub fn present_dimensions(&self) -> Vec<ScopeType> {
        let mut dims = Vec::new();
        if Self::is_present(&self.repo) {
            dims.push(ScopeType::Repo);
        }
        if Self::is_present(&self.path) {
            dims.push(ScopeType::Path);
        }
        if Self::is_present(&self.subsystem) {
            dims.push(ScopeType::Subsystem);
        }
        if Self::is_present(&self.api) {
            dims.push(ScopeType::Api);
        }
        dims
    }

    /// True when no dimension is set (global evaluation).
    pub fn is_empty(&self) -> bool {
        self.present_dimensions().is_empty()
    }

    /// A wildcard scope covering the given scope types.
    ///
    /// Used when a scope must be synthesized from a claim rather than a
    /// caller request (conflict framing, post-import checks).
    pub fn wildcard_for(scope_types: &[ScopeType]) -> Self {
        let star = || Some("*".to_string());
        let mut scope = Self::default();
        for st in scope_types {
            match st {
                ScopeType::Repo => scope.repo = star(),
                ScopeType::Path => scope.path = star(),
                ScopeType::Subsystem => scope.subsystem = star(),
                ScopeType::Api => scope.api = star(),
            }
        }
        scope
    }

    fn is_present(field: &Option<String>) -> bool {
        field.as_deref().is_some_and(|v| !v.is_empty())
    }
}
