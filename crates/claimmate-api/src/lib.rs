//! # claimmate-api
//!
//! HTTP API for ClaimMate: claim intake with AI field extraction, per-claim
//! chat timelines with AI-authored messages, and assistant actions such as
//! sending email on the user's behalf.
//!
//! The binary in `main.rs` wires configuration, storage and the model client
//! into an [`AppState`] and serves [`router`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

pub use config::{ServerConfig, StorageMode};
pub use error::ApiError;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use handlers::{actions, claims, conversation, health, timeline};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClaimMate API",
        description = "Claim intake, AI extraction, claim timelines and assistant actions"
    ),
    paths(
        health::health,
        health::openapi_json,
        claims::create_claim,
        claims::list_claims,
        claims::get_claim,
        claims::update_claim_status,
        claims::delete_claim,
        timeline::get_timeline,
        timeline::append_message,
        timeline::initial_message,
        timeline::follow_up_message,
        actions::execute_action,
        conversation::converse,
    ),
    components(schemas(
        claimmate_core::Claim,
        claimmate_core::ClaimStatus,
        claimmate_core::ExtractedClaimData,
        claimmate_core::TimelineMessage,
        claimmate_core::MessageType,
        claimmate_core::MessageStatus,
        claimmate_core::ChatHistoryEntry,
        claimmate_core::ActionKind,
        claimmate_core::EmailAction,
        claimmate_core::ActionResult,
        claims::UpdateStatusRequest,
        timeline::AppendMessageRequest,
        actions::ExecuteActionRequest,
        conversation::ConversationRequest,
        services::HandoverState,
    )),
    tags(
        (name = "Claims", description = "Claim intake and lifecycle"),
        (name = "Timeline", description = "Per-claim chat timeline"),
        (name = "Actions", description = "Assistant actions"),
        (name = "System", description = "Health checks and API description")
    )
)]
pub struct ApiDoc;

/// Build the application router with all routes and middleware.
///
/// Stored attachments are served read-only under the public base path when
/// that path is local to this server.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(health::openapi_json))
        .route(
            "/api/claims",
            post(claims::create_claim).get(claims::list_claims),
        )
        .route(
            "/api/claims/:id",
            get(claims::get_claim)
                .patch(claims::update_claim_status)
                .delete(claims::delete_claim),
        )
        .route(
            "/api/claims/:id/timeline",
            get(timeline::get_timeline).post(timeline::append_message),
        )
        .route(
            "/api/claims/:id/timeline/initial",
            post(timeline::initial_message),
        )
        .route(
            "/api/claims/:id/timeline/follow-up",
            post(timeline::follow_up_message),
        )
        .route("/api/claims/:id/actions", post(actions::execute_action))
        .route(
            "/api/claims/:id/conversation",
            post(conversation::converse),
        );

    if let (Some(root), Some(mount)) = (&config.file_storage_path, config.file_mount_path()) {
        app = app.nest_service(mount, ServeDir::new(root));
    }

    app
        // Middleware
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_request_bytes))
        .with_state(state)
}
