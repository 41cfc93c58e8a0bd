//! Import API handler
//!
//! POST /import/:id — run one package through the intake workflow.
//! The handler only translates between HTTP and the workflow; all
//! filesystem effects and audit records are the workflow's.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{error::ApiResult, AppState};

/// POST /import/:id response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub id: String,
    pub url: String,
}

/// POST /import/:id
///
/// Returns 200 with the composed destination URL on success, 400 for a
/// malformed id, 409 when the same id is already being processed, 500
/// for every other terminal failure.
pub async fn import_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ImportResponse>> {
    let receipt = state.workflow.run(&id).await?;
    Ok(Json(ImportResponse {
        id: receipt.id,
        url: receipt.url,
    }))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import/:id", post(import_package))
}
