//! Claim timeline handlers.
//!
//! Reads and writes go to the primary store. When the store itself fails
//! (not when the claim is missing), messages are kept in the process-local
//! fallback timeline and the response is flagged `demo: true` with a
//! `warning`, so the chat keeps working through a database outage.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use claimmate_core::{MessageStatus, MessageType, TimelineMessage};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};
use uuid::Uuid;

use super::{json_body, parse_claim_id, respond};
use crate::services::conversation::HANDOVER_QUESTION;
use crate::{ApiError, AppState};

pub const FALLBACK_WARNING: &str = "Using demo mode due to database error";

/// Request body for appending a message.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AppendMessageRequest {
    /// `"ai"` for assistant messages; anything else is the user.
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub content: String,
    /// Defaults to `delivered`.
    pub status: Option<String>,
    pub recipient: Option<String>,
    pub subject: Option<String>,
}

/// Confirm the claim exists. `Ok(false)` means the store could not answer
/// and the caller should use the fallback timeline.
pub(crate) async fn check_claim(state: &AppState, id: Uuid) -> Result<bool, ApiError> {
    match state.store.get_claim(id).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Err(ApiError::claim_not_found()),
        Err(e) => {
            warn!(
                subsystem = "api",
                component = "timeline",
                claim_id = %id,
                error = %e,
                "Claim lookup failed, using fallback timeline"
            );
            Ok(false)
        }
    }
}

/// Store a message, falling back to process memory if the store fails.
/// Returns the stored message and whether the fallback was used.
pub(crate) async fn append_or_fallback(
    state: &AppState,
    message: TimelineMessage,
) -> Result<(TimelineMessage, bool), ApiError> {
    match state.store.append_message(message.clone()).await {
        Ok(stored) => Ok((stored, false)),
        Err(e) if e.is_not_found() => Err(ApiError::claim_not_found()),
        Err(e) => {
            warn!(
                subsystem = "api",
                component = "timeline",
                claim_id = %message.claim_id,
                message_id = %message.id,
                error = %e,
                "Timeline write failed, using fallback timeline"
            );
            Ok((state.fallback_timeline.append(message).await, true))
        }
    }
}

/// Full timeline, persisted messages first. Returns whether only the
/// fallback could be read.
pub(crate) async fn load_timeline(state: &AppState, id: Uuid) -> (Vec<TimelineMessage>, bool) {
    match state.store.list_messages(id).await {
        Ok(mut chat) => {
            chat.extend(state.fallback_timeline.list(id).await);
            (chat, false)
        }
        Err(e) => {
            warn!(
                subsystem = "api",
                component = "timeline",
                claim_id = %id,
                error = %e,
                "Timeline read failed, using fallback timeline"
            );
            (state.fallback_timeline.list(id).await, true)
        }
    }
}

/// Flag a body as served from the fallback timeline.
pub(crate) fn mark_fallback(body: &mut JsonValue) {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("demo".to_string(), JsonValue::Bool(true));
        obj.insert("warning".to_string(), JsonValue::from(FALLBACK_WARNING));
    }
}

#[utoipa::path(get, path = "/api/claims/{id}/timeline", tag = "Timeline",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Messages, oldest first"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let (chat, fallback) = if check_claim(&state, id).await? {
        load_timeline(&state, id).await
    } else {
        (state.fallback_timeline.list(id).await, true)
    };

    let mut body = json!({ "chat": chat });
    if fallback {
        mark_fallback(&mut body);
    }
    Ok(respond(&state, body))
}

#[utoipa::path(post, path = "/api/claims/{id}/timeline", tag = "Timeline",
    params(("id" = String, Path, description = "Claim id")),
    request_body = AppendMessageRequest,
    responses(
        (status = 200, description = "Stored message"),
        (status = 400, description = "Missing sender or content, or invalid status"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AppendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let body = json_body(payload, "Missing sender or content")?;
    if body.sender.trim().is_empty() || body.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing sender or content".to_string()));
    }
    let status = match body.status.as_deref() {
        Some(raw) => raw.parse::<MessageStatus>()?,
        None => MessageStatus::default(),
    };

    let mut message = TimelineMessage::new(
        id,
        MessageType::from_sender(&body.sender),
        body.content,
        status,
    );
    message.recipient = body.recipient;
    message.subject = body.subject;

    let (message, fallback) = if check_claim(&state, id).await? {
        append_or_fallback(&state, message).await?
    } else {
        (state.fallback_timeline.append(message).await, true)
    };

    let mut body = json!({ "message": message });
    if fallback {
        mark_fallback(&mut body);
    }
    Ok(respond(&state, body))
}

/// Post the assistant's introduction followed by the hand-over question.
#[utoipa::path(post, path = "/api/claims/{id}/timeline/initial", tag = "Timeline",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Introduction posted"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn initial_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let claim = state.store.get_claim(id).await?;

    let outcome = state.messages.initial_message(&claim).await;
    let degraded = outcome.is_degraded();
    let (message, fallback_intro) = append_or_fallback(&state, outcome.into_inner()).await?;
    let (question, fallback_question) =
        append_or_fallback(&state, TimelineMessage::ai(id, HANDOVER_QUESTION)).await?;

    info!(
        subsystem = "api",
        component = "timeline",
        op = "initial",
        claim_id = %id,
        degraded,
        "Initial message posted"
    );

    let mut body = json!({
        "message": message,
        "handoverQuestion": question,
        "handoverOffered": true,
        "handoverAccepted": false,
        "degraded": degraded,
    });
    if fallback_intro || fallback_question {
        mark_fallback(&mut body);
    }
    Ok(respond(&state, body))
}

/// Draft a follow-up for a claim that has gone unanswered.
#[utoipa::path(post, path = "/api/claims/{id}/timeline/follow-up", tag = "Timeline",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Follow-up draft posted"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn follow_up_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let claim = state.store.get_claim(id).await?;
    let (prior, _) = load_timeline(&state, id).await;

    let outcome = state.messages.follow_up(&claim, &prior).await;
    let degraded = outcome.is_degraded();
    let (message, fallback) = append_or_fallback(&state, outcome.into_inner()).await?;

    info!(
        subsystem = "api",
        component = "timeline",
        op = "follow_up",
        claim_id = %id,
        degraded,
        "Follow-up drafted"
    );

    let mut body = json!({ "message": message, "degraded": degraded });
    if fallback {
        mark_fallback(&mut body);
    }
    Ok(respond(&state, body))
}
