//! Claim registry routes

use crate::claim::models::Claim;
use crate::error::ApiResult;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Register a new claim.
///
/// The registration gate validates shape and uniqueness; both kinds of
/// failure come back as 400.
pub async fn register_claim(
    State(state): State<SharedState>,
    Json(claim): Json<Claim>,
) -> ApiResult<(StatusCode, Json<Claim>)> {
    let claim = state.claims.register(claim).await?;
    Ok((StatusCode::CREATED, Json(claim)))
}

/// List all claims in insertion order.
pub async fn list_claims(State(state): State<SharedState>) -> Json<Vec<Claim>> {
    Json(state.claims.list().await)
}

/// Get a claim by id.
pub async fn get_claim(
    State(state): State<SharedState>,
    Path(claim_id): Path<String>,
) -> ApiResult<Json<Claim>> {
    Ok(Json(state.claims.get(&claim_id).await?))
}
