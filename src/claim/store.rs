//! Claim storage
//!
//! In-memory, insertion-ordered claim registry. The store is process-local
//! by design: state is lost on restart and there are no persistence or
//! distribution guarantees.

use crate::claim::models::{Claim, MAX_RATIONALE_LEN};
use crate::error::AppError;
use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe claim registry.
///
/// Every downstream component depends on `list()` returning claims in
/// insertion order, so the backing storage is a plain `Vec` rather than a
/// map. Registration takes the write lock across the uniqueness check and
/// the insert, so two racing `register` calls on the same id cannot both
/// succeed.
pub struct ClaimStore {
    claims: RwLock<Vec<Claim>>,
}

impl ClaimStore {
    pub fn new() -> Self {
        Self {
            claims: RwLock::new(Vec::new()),
        }
    }

    /// Register a new claim.
    ///
    /// Shape validation happens here, at registration, and never again:
    /// claims are immutable once stored.
    pub async fn register(&self, claim: Claim) -> Result<Claim, AppError> {
        Self::validate(&claim)?;

        let mut claims = self.claims.write().await;
        if claims.iter().any(|c| c.claim_id == claim.claim_id) {
            return Err(AppError::DuplicateClaim(format!(
                "claim_id {} is already registered",
                claim.claim_id
            )));
        }
        debug!(claim_id = %claim.claim_id, owner = %claim.owner, "claim registered");
        claims.push(claim.clone());
        Ok(claim)
    }

    /// Get a claim by id.
    pub async fn get(&self, claim_id: &str) -> Result<Claim, AppError> {
        let claims = self.claims.read().await;
        claims
            .iter()
            .find(|c| c.claim_id == claim_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Claim {} not found", claim_id)))
    }

    /// All claims, in insertion order.
    pub async fn list(&self) -> Vec<Claim> {
        let claims = self.claims.read().await;
        claims.clone()
    }

    /// Number of registered claims.
    pub async fn count(&self) -> usize {
        let claims = self.claims.read().await;
        claims.len()
    }

    fn validate(claim: &Claim) -> Result<(), AppError> {
        if claim.claim_id.trim().is_empty() {
            return Err(AppError::Validation(
                "claim_id must be non-empty".to_string(),
            ));
        }
        if claim.owner.trim().is_empty() {
            return Err(AppError::Validation("owner must be present".to_string()));
        }
        if claim.scope_types.is_empty() {
            return Err(AppError::Validation(
                "scope_types must not be empty".to_string(),
            ));
        }
        if claim.rationale.chars().count() > MAX_RATIONALE_LEN {
            return Err(AppError::Validation(format!(
                "rationale must be at most {} characters",
                MAX_RATIONALE_LEN
            )));
        }
        Ok(())
    }
}

impl Default for ClaimStore {
    fn default() -> Self {
        Self::new()
    }
}
