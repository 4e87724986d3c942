//! Gate routes

use crate::cli::ExitCode;
use crate::claim::models::ChangeScope;
use crate::gate::arbitration::{Arbitration, ArbitrationHandler, ArbitrationOutcome};
use crate::gate::evaluator::{GateResult, CONTRACT_VERSION};
use crate::state::SharedState;
use axum::{extract::State, Json};

/// Evaluate a change scope against the claim registry.
///
/// Always succeeds at the transport level; the verdict lives in `pass`.
pub async fn gate_check(
    State(state): State<SharedState>,
    Json(scope): Json<ChangeScope>,
) -> Json<GateResult> {
    Json(state.gate.check(&state.claims, &scope).await)
}

/// Submit a human arbitration for one conflict.
///
/// Invalid decisions produce a rejected status in the payload, not an HTTP
/// error; callers branch on `status`.
pub async fn arbitrate(Json(arbitration): Json<Arbitration>) -> Json<ArbitrationOutcome> {
    Json(ArbitrationHandler::resolve(arbitration))
}

/// Expose the wire contract for CI tooling discovery.
pub async fn contract() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "contract_version": CONTRACT_VERSION,
        "exit_codes": ExitCode::table(),
    }))
}
