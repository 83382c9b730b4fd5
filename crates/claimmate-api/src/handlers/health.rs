//! Health and API description endpoints.

use axum::{extract::State, response::IntoResponse, Json};
use utoipa::OpenApi;

use super::respond;
use crate::{ApiDoc, AppState};

/// Liveness plus the active storage, model and transport. Postgres
/// deployments also report pool occupancy.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service is up")))]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    respond(
        &state,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "storage": state.store.backend_name(),
            "pool": state.store.pool_status(),
            "inference": {
                "enabled": state.model_name.is_some(),
                "model": state.model_name,
            },
            "transport": state.dispatcher.transport_name(),
        }),
    )
}

#[utoipa::path(get, path = "/api/openapi.json", tag = "System",
    responses((status = 200, description = "OpenAPI document")))]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
