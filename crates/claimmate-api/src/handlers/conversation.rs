//! Chat turn handler.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use claimmate_core::{
    ActionResult, ChatHistoryEntry, MessageStatus, MessageType, TimelineMessage,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::actions::action_response;
use super::timeline::{append_or_fallback, load_timeline, mark_fallback};
use super::{json_body, parse_claim_id, respond};
use crate::services::conversation::{ACTION_ERROR, HANDOVER_ACCEPTED, WORKING_ON_IT};
use crate::services::{format_action_message, ConversationStep, HandoverState};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub handover_offered: bool,
    #[serde(default)]
    pub handover_accepted: bool,
}

/// Messages posted during one turn.
struct Turn<'a> {
    state: &'a AppState,
    posted: Vec<TimelineMessage>,
    fallback: bool,
}

impl<'a> Turn<'a> {
    fn new(state: &'a AppState) -> Self {
        Self {
            state,
            posted: Vec::new(),
            fallback: false,
        }
    }

    async fn post(&mut self, message: TimelineMessage) -> Result<(), ApiError> {
        let (stored, fallback) = append_or_fallback(self.state, message).await?;
        self.fallback |= fallback;
        self.posted.push(stored);
        Ok(())
    }
}

/// Persisted and fallback messages for the action prompt. `None` when the
/// store failed and the fallback timeline holds nothing for the claim.
async fn load_history(state: &AppState, id: Uuid) -> Option<Vec<TimelineMessage>> {
    let (history, fallback_only) = load_timeline(state, id).await;
    if fallback_only && history.is_empty() {
        None
    } else {
        Some(history)
    }
}

/// Post the user's message and the assistant's reply.
///
/// The client echoes back the hand-over flags from the previous turn. Once
/// the hand-over is accepted, messages asking for outbound contact run
/// `send_email` and post the result.
#[utoipa::path(post, path = "/api/claims/{id}/conversation", tag = "Timeline",
    params(("id" = String, Path, description = "Claim id")),
    request_body = ConversationRequest,
    responses(
        (status = 200, description = "Messages posted this turn and the new hand-over state"),
        (status = 400, description = "Missing content"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn converse(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let body = json_body(payload, "Missing content")?;
    let text = body.content.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Missing content".to_string()));
    }
    let claim = state.store.get_claim(id).await?;

    let (step, handover) = state.planner.plan(
        text,
        HandoverState {
            handover_offered: body.handover_offered,
            handover_accepted: body.handover_accepted,
        },
    );

    let mut turn = Turn::new(&state);
    turn.post(TimelineMessage::new(
        id,
        MessageType::UserSent,
        text,
        MessageStatus::Delivered,
    ))
    .await?;

    let mut action: Option<ActionResult> = None;
    match step {
        ConversationStep::AcceptHandover => {
            turn.post(TimelineMessage::ai(id, HANDOVER_ACCEPTED)).await?;
        }
        ConversationStep::Acknowledge(reply) => {
            turn.post(TimelineMessage::ai(id, reply)).await?;
        }
        ConversationStep::ExecuteAction(kind) => {
            turn.post(TimelineMessage::ai(id, WORKING_ON_IT)).await?;
            match load_history(&state, id).await {
                Some(history) => {
                    let history: Vec<ChatHistoryEntry> =
                        history.iter().map(ChatHistoryEntry::from).collect();
                    let result = state
                        .dispatcher
                        .execute(&claim, kind, text, &history)
                        .await;
                    turn.post(TimelineMessage::ai(id, format_action_message(&result)))
                        .await?;
                    action = Some(result);
                }
                None => {
                    warn!(
                        subsystem = "api",
                        component = "conversation",
                        claim_id = %id,
                        "Could not load chat history for action"
                    );
                    turn.post(TimelineMessage::ai(id, ACTION_ERROR)).await?;
                }
            }
        }
    }

    let fallback = turn.fallback;
    let mut body = json!({
        "messages": turn.posted,
        "handoverOffered": handover.handover_offered,
        "handoverAccepted": handover.handover_accepted,
    });
    if let Some(result) = action {
        body["action"] = action_response(&result);
    }
    if fallback {
        mark_fallback(&mut body);
    }
    Ok(respond(&state, body))
}
