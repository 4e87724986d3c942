//! Claim import route

use crate::claim::models::Claim;
use crate::error::ApiResult;
use crate::importer::ClaimImporter;
use crate::state::SharedState;
use axum::{extract::State, http::HeaderMap, Json};

/// Source label header; falls back to "imported" when absent.
const IMPORT_SOURCE_HEADER: &str = "x-import-source";

/// Import claims from a text or JSON body.
///
/// Distills the body into atomic claims, runs each through the registration
/// gate, and gate-checks the result. Conflicts reject the batch with 409 and
/// structured conflict detail.
pub async fn import_claims(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<Vec<Claim>>> {
    let introduced_by = headers
        .get(IMPORT_SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("imported");

    let imported = ClaimImporter::import(&state.claims, &state.gate, introduced_by, &body).await?;
    Ok(Json(imported))
}
