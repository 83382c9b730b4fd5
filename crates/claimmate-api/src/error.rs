//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

/// Error returned by every handler; rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// Unexpected failure; the detail is logged, never returned.
    Internal(claimmate_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl ApiError {
    pub fn claim_not_found() -> Self {
        ApiError::NotFound("Claim not found".to_string())
    }
}

impl From<claimmate_core::Error> for ApiError {
    fn from(err: claimmate_core::Error) -> Self {
        match &err {
            claimmate_core::Error::ClaimNotFound(_) => ApiError::claim_not_found(),
            claimmate_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            claimmate_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
