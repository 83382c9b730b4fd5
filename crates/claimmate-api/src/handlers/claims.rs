//! Claim lifecycle handlers: create, list, get, status update, delete.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    response::IntoResponse,
};
use claimmate_core::{ClaimStatus, CreateClaimRequest};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{json_body, parse_claim_id, respond};
use crate::services::Upload;
use crate::{ApiError, AppState};

/// Request body for a status change.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `pending`, `solved`, `opposed`, `closed`.
    #[serde(default)]
    pub status: String,
}

/// Submit a claim.
///
/// Multipart form with a required `narrative` text part and any number of
/// `files` (or `files[]`) parts. Files are safety-checked and stored, their
/// text is pulled into a single extraction call, and the claim is saved as
/// `pending` whether or not extraction succeeded.
#[utoipa::path(post, path = "/api/claims", tag = "Claims",
    responses(
        (status = 200, description = "Claim created"),
        (status = 400, description = "Narrative missing or malformed upload"),
    ))]
pub async fn create_claim(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut narrative: Option<String> = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("narrative") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read narrative: {}", e)))?;
                narrative = Some(text);
            }
            Some("files") | Some("files[]") => {
                let filename = field.file_name().unwrap_or("unnamed_file").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                uploads.push(Upload {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    let narrative = narrative
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Narrative is required".to_string()))?;

    let upload_count = uploads.len();
    let attachments = state.attachments.process(uploads).await;
    let extraction = state
        .extraction
        .extract(&narrative, &attachments.texts)
        .await;
    if let Some(reason) = extraction.reason() {
        warn!(
            subsystem = "api",
            component = "claims",
            op = "create",
            degraded = true,
            reason,
            "Claim saved without extracted data"
        );
    }
    let extraction_degraded = extraction.is_degraded();

    let claim = state
        .store
        .create_claim(CreateClaimRequest {
            narrative,
            files: attachments.references,
            extracted_data: extraction.into_inner(),
        })
        .await?;

    info!(
        subsystem = "api",
        component = "claims",
        op = "create",
        claim_id = %claim.id,
        file_count = claim.files.len(),
        upload_count,
        blocked = attachments.blocked,
        extraction_degraded,
        "Claim submitted"
    );

    let message = if state.is_demo() {
        "Claim submitted successfully (Demo Mode)"
    } else {
        "Claim submitted successfully"
    };

    Ok(respond(
        &state,
        json!({
            "success": true,
            "claim": claim,
            "message": message,
            "extraction_degraded": extraction_degraded,
        }),
    ))
}

/// List all claims, newest first.
#[utoipa::path(get, path = "/api/claims", tag = "Claims",
    responses((status = 200, description = "All claims")))]
pub async fn list_claims(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let claims = state.store.list_claims().await?;
    Ok(respond(&state, json!({ "claims": claims })))
}

#[utoipa::path(get, path = "/api/claims/{id}", tag = "Claims",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "The claim"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let claim = state.store.get_claim(id).await?;
    Ok(respond(&state, json!({ "claim": claim })))
}

/// Change a claim's status. Any status may follow any other.
#[utoipa::path(patch, path = "/api/claims/{id}", tag = "Claims",
    params(("id" = String, Path, description = "Claim id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated claim"),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn update_claim_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<axum::Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    let body = json_body(payload, "Invalid status")?;
    let status: ClaimStatus = body.status.parse()?;
    let claim = state.store.update_status(id, status).await?;

    info!(
        subsystem = "api",
        component = "claims",
        op = "update_status",
        claim_id = %id,
        status = %status,
        "Claim status updated"
    );
    Ok(respond(&state, json!({ "claim": claim })))
}

/// Delete a claim and its timeline.
#[utoipa::path(delete, path = "/api/claims/{id}", tag = "Claims",
    params(("id" = String, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Claim not found"),
    ))]
pub async fn delete_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_claim_id(&id)?;
    state.store.delete_claim(id).await?;
    state.fallback_timeline.remove_claim(id).await;

    info!(
        subsystem = "api",
        component = "claims",
        op = "delete",
        claim_id = %id,
        "Claim deleted"
    );
    Ok(respond(&state, json!({ "success": true })))
}
