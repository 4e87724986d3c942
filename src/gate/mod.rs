//! Gate module - the heart of Control Point
//!
//! This module provides:
//! - Scope matching (which claims apply to a change)
//! - Conflict detection (contradictions among applicable claims)
//! - Gate evaluation (the pass/fail verdict)
//! - Arbitration (validated human decisions on conflicts)

pub mod arbitration;
pub mod conflict;
pub mod evaluator;
pub mod matcher;

pub use arbitration::{Arbitration, ArbitrationHandler, ArbitrationOutcome};
pub use conflict::{Conflict, ConflictChoice, ConflictDetector, ConflictReasonCode};
pub use evaluator::{GateEvaluator, GateResult, GateSummary, CONTRACT_VERSION};
pub use matcher::ScopeMatcher;
