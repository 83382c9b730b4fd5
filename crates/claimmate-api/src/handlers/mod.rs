//! HTTP handlers for claimmate-api.

pub mod actions;
pub mod claims;
pub mod conversation;
pub mod health;
pub mod timeline;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Parse a claim id from the path. Malformed ids cannot name a claim, so
/// they are reported as not found.
pub(crate) fn parse_claim_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::claim_not_found())
}

/// Unwrap a JSON body, turning a malformed or mistyped body into a 400
/// carrying `message`.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(
                subsystem = "api",
                error = %rejection.body_text(),
                "Rejected request body"
            );
            Err(ApiError::BadRequest(message.to_string()))
        }
    }
}

/// Mark the body `demo: true` when serving from the in-memory store.
pub(crate) fn respond(state: &AppState, mut body: JsonValue) -> Json<JsonValue> {
    if state.is_demo() {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("demo".to_string(), JsonValue::Bool(true));
        }
    }
    Json(body)
}
