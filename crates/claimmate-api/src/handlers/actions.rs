//! Action execution handler.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use claimmate_core::{ActionKind, ActionResult, ChatHistoryEntry};
use serde::Deserialize;

use super::{json_body, parse_claim_id, respond};
use crate::services::format_action_message;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteActionRequest {
    /// Action name; only `send_email` is supported.
    #[serde(default)]
    pub action: String,
    /// What the user asked for, in their words.
    #[serde(default)]
    pub user_message: String,
    /// Recent chat; only the last five entries reach the model.
    #[serde(default)]
    pub chat_history: Vec<ChatHistoryEntry>,
}

/// Run an action for a claim.
///
/// The claim is looked up before the action name is checked, so an unknown
/// claim is a 404 even when the action is also invalid.
#[utoipa::path(post, path = "/api/claims/{id}/actions", tag = "Actions",
    params(("id" = String, Path, description = "Claim id")),
    request_body = ExecuteActionRequest,
    responses(
        (status = 200, description = "Action result with the chat-ready message, successful or not"),
        (status = 400, description = "Unknown action type"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn execute_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ExecuteActionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let body = json_body(payload, "Invalid action request")?;
    let claim = state.store.get_claim(id).await?;
    let kind: ActionKind = body.action.parse()?;

    let result = state
        .dispatcher
        .execute(&claim, kind, &body.user_message, &body.chat_history)
        .await;

    Ok(respond(&state, action_response(&result)))
}

/// Response body for an executed action; `message` is the chat-ready text.
pub(crate) fn action_response(result: &ActionResult) -> serde_json::Value {
    serde_json::json!({
        "success": result.success,
        "message": format_action_message(result),
        "action": result.action,
        "timestamp": result.timestamp,
    })
}
