//! ClaimMate API server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use claimmate_api::services::{AttachmentPipeline, SimulatedTransport};
use claimmate_api::{router, AppState, ServerConfig, StorageMode};
use claimmate_core::{ClaimStore, GenerationBackend};
use claimmate_db::{Database, FilesystemBackend, MemoryClaimStore, PoolConfig, StorageBackend};
use claimmate_inference::{OpenAIBackend, OpenAIConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "claimmate_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "claimmate_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Daily-rotated file output when LOG_FILE is set
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("claimmate-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env()?;

    // Claim store
    let store: Arc<dyn ClaimStore> = match config.storage_mode {
        StorageMode::Memory => {
            warn!(
                subsystem = "api",
                "STORAGE_MODE=memory: claims live in process memory only (demo mode)"
            );
            Arc::new(MemoryClaimStore::new())
        }
        StorageMode::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required"))?;
            let db = Database::connect_with_config(
                url,
                PoolConfig::new().max_connections(config.db_max_connections),
            )
            .await?;
            db.migrate().await?;
            info!(subsystem = "db", "Database migrations applied");
            Arc::new(db)
        }
    };

    // Attachment blob area
    let blobs: Option<Arc<dyn StorageBackend>> = match &config.file_storage_path {
        Some(path) => {
            let backend = FilesystemBackend::new(path);
            backend.validate().await?;
            info!(
                subsystem = "storage",
                path = %path.display(),
                "File storage ready"
            );
            Some(Arc::new(backend))
        }
        None => {
            warn!(
                subsystem = "storage",
                "FILE_STORAGE_PATH not set; attachments get placeholder references"
            );
            None
        }
    };
    let attachments = AttachmentPipeline::new(
        blobs,
        config.file_public_base_url.clone(),
        config.max_upload_bytes,
    );

    // Language model
    let openai_config = OpenAIConfig::from_env();
    let backend: Option<Arc<dyn GenerationBackend>> = if openai_config.is_configured() {
        let backend = OpenAIBackend::new(openai_config)?;
        info!(
            subsystem = "inference",
            model = backend.model_name(),
            "OpenAI backend configured"
        );
        Some(Arc::new(backend))
    } else {
        warn!(
            subsystem = "inference",
            "OPENAI_API_KEY not set; extraction and message generation use fallbacks"
        );
        None
    };

    let transport = Arc::new(SimulatedTransport::new(Duration::from_millis(
        config.email_send_delay_ms,
    )));

    let state = AppState::new(store, backend, transport, attachments);
    let app = router(state, &config);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
