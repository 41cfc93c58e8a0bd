//! HTTP error mapping for dflow-pi
//!
//! Only the id syntax check is the client's fault; everything else the
//! workflow can report is a server-side condition.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::workflow::IntakeError;

/// API error: a terminal workflow failure carried to the HTTP surface
#[derive(Debug)]
pub struct ApiError(pub IntakeError);

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            IntakeError::InvalidId => StatusCode::BAD_REQUEST,
            IntakeError::AlreadyInProgress => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": self.0.to_string(),
                "extra_info": self.0.extra_info(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
