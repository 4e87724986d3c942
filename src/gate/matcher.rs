//! Scope matching
//!
//! Filters the claim registry down to the claims relevant to a change scope.

use crate::claim::models::{ChangeScope, Claim};

pub struct ScopeMatcher;

impl ScopeMatcher {
    /// Claims relevant to `scope`, in registry (insertion) order.
    ///
    /// A scope with no present dimensions selects every claim - that is the
    /// global evaluation. Otherwise a claim matches when its scope types
    /// intersect the dimensions the scope actually sets.
    pub fn affected(claims: &[Claim], scope: &ChangeScope) -> Vec<Claim> {
        let present = scope.present_dimensions();
        if present.is_empty() {
            return claims.to_vec();
        }
        claims
            .iter()
            .filter(|c| c.scope_types.iter().any(|st| present.contains(st)))
            .cloned()
            .collect()
    }
}
