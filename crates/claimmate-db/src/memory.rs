//! In-process storage for demo mode and tests.
//!
//! [`MemoryClaimStore`] keeps claims and their timelines in maps behind
//! `tokio::sync::RwLock`. Nothing survives a restart. [`MemoryTimeline`] is
//! also used on its own by the API as the fallback timeline when the
//! persistent store fails.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use claimmate_core::{
    new_v7, Claim, ClaimStatus, ClaimStore, CreateClaimRequest, Error, Result, TimelineMessage,
};

/// Per-claim message lists held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTimeline {
    messages: RwLock<HashMap<Uuid, Vec<TimelineMessage>>>,
}

impl MemoryTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, message: TimelineMessage) -> TimelineMessage {
        let mut messages = self.messages.write().await;
        messages
            .entry(message.claim_id)
            .or_default()
            .push(message.clone());
        message
    }

    /// Messages for a claim in timestamp order; the sort is stable so
    /// insertion order breaks ties.
    pub async fn list(&self, claim_id: Uuid) -> Vec<TimelineMessage> {
        let messages = self.messages.read().await;
        let mut list = messages.get(&claim_id).cloned().unwrap_or_default();
        list.sort_by_key(|m| m.timestamp);
        list
    }

    pub async fn remove_claim(&self, claim_id: Uuid) {
        self.messages.write().await.remove(&claim_id);
    }
}

/// Ephemeral [`ClaimStore`] used when `STORAGE_MODE=memory`.
#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: RwLock<HashMap<Uuid, Claim>>,
    timeline: MemoryTimeline,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Next `updated_at`, strictly after `previous` even if the clock has not moved.
fn next_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn create_claim(&self, req: CreateClaimRequest) -> Result<Claim> {
        let now = Utc::now();
        let claim = Claim {
            id: new_v7(),
            narrative: req.narrative,
            status: ClaimStatus::Pending,
            files: req.files,
            extracted_data: req.extracted_data,
            created_at: now,
            updated_at: now,
        };
        self.claims.write().await.insert(claim.id, claim.clone());
        debug!(subsystem = "db", component = "memory_store", op = "create_claim", claim_id = %claim.id, "Stored claim in memory");
        Ok(claim)
    }

    async fn get_claim(&self, id: Uuid) -> Result<Claim> {
        self.claims
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::ClaimNotFound(id))
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        let mut claims: Vec<Claim> = self.claims.read().await.values().cloned().collect();
        claims.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(claims)
    }

    async fn update_status(&self, id: Uuid, status: ClaimStatus) -> Result<Claim> {
        let mut claims = self.claims.write().await;
        let claim = claims.get_mut(&id).ok_or(Error::ClaimNotFound(id))?;
        claim.status = status;
        claim.updated_at = next_updated_at(claim.updated_at);
        Ok(claim.clone())
    }

    async fn delete_claim(&self, id: Uuid) -> Result<()> {
        if self.claims.write().await.remove(&id).is_none() {
            return Err(Error::ClaimNotFound(id));
        }
        self.timeline.remove_claim(id).await;
        Ok(())
    }

    async fn append_message(&self, message: TimelineMessage) -> Result<TimelineMessage> {
        // Hold the read guard so a concurrent delete cannot orphan the message.
        let claims = self.claims.read().await;
        if !claims.contains_key(&message.claim_id) {
            return Err(Error::ClaimNotFound(message.claim_id));
        }
        Ok(self.timeline.append(message).await)
    }

    async fn list_messages(&self, claim_id: Uuid) -> Result<Vec<TimelineMessage>> {
        Ok(self.timeline.list(claim_id).await)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_ephemeral(&self) -> bool {
        true
    }
}
