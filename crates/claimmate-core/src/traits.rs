//! Core traits for ClaimMate abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CLAIM STORE
// =============================================================================

/// Persistence for claims and their chat timelines.
///
/// Implemented by the Postgres `Database` and by the in-memory store used in
/// demo mode and tests.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Insert a new claim with status `pending`.
    async fn create_claim(&self, req: CreateClaimRequest) -> Result<Claim>;

    /// Fetch a claim by ID; `Error::ClaimNotFound` if absent.
    async fn get_claim(&self, id: Uuid) -> Result<Claim>;

    /// List all claims, newest first.
    async fn list_claims(&self) -> Result<Vec<Claim>>;

    /// Set a claim's status and refresh `updated_at`.
    async fn update_status(&self, id: Uuid, status: ClaimStatus) -> Result<Claim>;

    /// Delete a claim and its timeline; `Error::ClaimNotFound` if absent.
    async fn delete_claim(&self, id: Uuid) -> Result<()>;

    /// Append a message to a claim's timeline.
    async fn append_message(&self, message: TimelineMessage) -> Result<TimelineMessage>;

    /// All messages for a claim, oldest first.
    async fn list_messages(&self, claim_id: Uuid) -> Result<Vec<TimelineMessage>>;

    /// Short backend name for health and logs.
    fn backend_name(&self) -> &'static str;

    /// True when data only lives for the lifetime of the process.
    fn is_ephemeral(&self) -> bool {
        false
    }

    /// Connection pool occupancy, for stores backed by a pool.
    fn pool_status(&self) -> Option<PoolStatus> {
        None
    }
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// A single chat-completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run a chat completion and return the first choice's text.
    async fn complete(&self, request: GenerationRequest) -> Result<String>;

    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(GenerationRequest::new(prompt)).await
    }

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool>;
}
