//! Claim module
//!
//! The claim registry and its data model: atomic policy assertions with a
//! closed category vocabulary, and the change scope that selects them.

pub mod models;
pub mod store;

pub use models::{Category, ChangeScope, Claim, ClaimSeverity, ScopeType, MAX_RATIONALE_LEN};
pub use store::ClaimStore;
