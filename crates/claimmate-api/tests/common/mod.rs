//! Shared harness for API integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use claimmate_api::services::{AttachmentPipeline, EmailTransport};
use claimmate_api::{router, AppState, ServerConfig};
use claimmate_core::{
    Claim, ClaimStatus, ClaimStore, CreateClaimRequest, EmailAction, Error, GenerationBackend,
    Result, TimelineMessage,
};
use claimmate_db::{FilesystemBackend, MemoryClaimStore, StorageBackend};
use claimmate_inference::mock::MockGenerationBackend;
use uuid::Uuid;

pub const EXTRACTION_REPLY: &str = r#"```json
{"email": "john@x.com", "amount": "$500", "claimType": "damaged package", "favouriteColour": "blue", "phone": null}
```"#;

pub const EMAIL_REPLY: &str = r#"{"recipient": "john@x.com", "subject": "Damaged package claim", "content": "Please refund the $500.", "context": "User asked to contact the sender"}"#;

/// Mock model answering each prompt family with a canned reply.
pub fn scripted_model() -> MockGenerationBackend {
    MockGenerationBackend::new()
        .with_response_matching("Extract and return JSON", EXTRACTION_REPLY)
        .with_response_matching("generate a professional email", EMAIL_REPLY)
        .with_response_matching(
            "initial message for a claim assistant",
            "Hi! I'm your claims assistant.",
        )
        .with_response_matching(
            "professional follow-up message",
            "Dear Sir/Madam, following up on my claim.",
        )
}

/// Transport that records emails instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<EmailAction>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<EmailAction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn deliver(&self, email: &EmailAction) -> Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Transport whose every delivery fails.
pub struct FailingTransport;

#[async_trait]
impl EmailTransport for FailingTransport {
    async fn deliver(&self, _email: &EmailAction) -> Result<()> {
        Err(Error::Transport("relay refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Persistent-looking store whose timeline operations fail, as a database
/// outage would.
#[derive(Default)]
pub struct BrokenTimelineStore {
    inner: MemoryClaimStore,
}

#[async_trait]
impl ClaimStore for BrokenTimelineStore {
    async fn create_claim(&self, req: CreateClaimRequest) -> Result<Claim> {
        self.inner.create_claim(req).await
    }

    async fn get_claim(&self, id: Uuid) -> Result<Claim> {
        self.inner.get_claim(id).await
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        self.inner.list_claims().await
    }

    async fn update_status(&self, id: Uuid, status: ClaimStatus) -> Result<Claim> {
        self.inner.update_status(id, status).await
    }

    async fn delete_claim(&self, id: Uuid) -> Result<()> {
        self.inner.delete_claim(id).await
    }

    async fn append_message(&self, _message: TimelineMessage) -> Result<TimelineMessage> {
        Err(Error::Internal("connection reset".to_string()))
    }

    async fn list_messages(&self, _claim_id: Uuid) -> Result<Vec<TimelineMessage>> {
        Err(Error::Internal("connection reset".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a claim from a narrative alone and return its JSON.
    pub async fn create_claim(&self, narrative: &str) -> serde_json::Value {
        let form = reqwest::multipart::Form::new().text("narrative", narrative.to_string());
        let resp = self
            .client
            .post(self.url("/api/claims"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        body["claim"].clone()
    }
}

pub struct TestAppBuilder {
    store: Arc<dyn ClaimStore>,
    model: Option<MockGenerationBackend>,
    transport: Arc<dyn EmailTransport>,
    blob_dir: Option<PathBuf>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryClaimStore::new()),
            model: Some(scripted_model()),
            transport: Arc::new(RecordingTransport::default()),
            blob_dir: None,
        }
    }

    pub fn store(mut self, store: Arc<dyn ClaimStore>) -> Self {
        self.store = store;
        self
    }

    pub fn model(mut self, model: Option<MockGenerationBackend>) -> Self {
        self.model = model;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Store attachments on disk under `dir` and serve them at `/files`.
    pub fn blob_dir(mut self, dir: &Path) -> Self {
        self.blob_dir = Some(dir.to_path_buf());
        self
    }

    pub async fn spawn(self) -> TestApp {
        let config = ServerConfig {
            file_storage_path: self.blob_dir.clone(),
            ..ServerConfig::default()
        };
        let blobs = self
            .blob_dir
            .map(|dir| Arc::new(FilesystemBackend::new(dir)) as Arc<dyn StorageBackend>);
        let backend = self
            .model
            .map(|m| Arc::new(m) as Arc<dyn GenerationBackend>);
        let attachments = AttachmentPipeline::new(
            blobs,
            config.file_public_base_url.clone(),
            config.max_upload_bytes,
        );
        let state = AppState::new(self.store, backend, self.transport, attachments);
        let app = router(state, &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        TestApp {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }
}

pub async fn spawn_app() -> TestApp {
    TestAppBuilder::new().spawn().await
}
