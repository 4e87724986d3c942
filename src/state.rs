//! Application state management
//!
//! Contains shared state accessible across all handlers. The claim registry
//! is an explicitly owned instance threaded into every evaluator call site,
//! never an implicit global.

use crate::claim::store::ClaimStore;
use crate::gate::evaluator::GateEvaluator;
use std::sync::Arc;

/// Application state shared across all handlers.
pub struct AppState {
    /// The claim registry (has internal locking)
    pub claims: ClaimStore,

    /// Gate evaluator composing matching, conflict detection, and severity
    pub gate: GateEvaluator,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            claims: ClaimStore::new(),
            gate: GateEvaluator::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
