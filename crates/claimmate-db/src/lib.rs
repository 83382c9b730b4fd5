//! # claimmate-db
//!
//! Storage layer for ClaimMate.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for claims and their chat timelines
//! - An in-memory [`ClaimStore`] for demo mode and tests
//! - Filesystem blob storage for attachments
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimmate_db::{ClaimStore, CreateClaimRequest, Database};
//!
//! let db = Database::connect("postgres://localhost/claimmate").await?;
//! db.migrate().await?;
//! let claim = db.create_claim(CreateClaimRequest {
//!     narrative: "Customer has not paid invoice #42".to_string(),
//!     files: vec![],
//!     extracted_data: Default::default(),
//! }).await?;
//! ```

pub mod claims;
pub mod file_storage;
pub mod memory;
pub mod pool;
pub mod timeline;

// Re-export core types
pub use claimmate_core::*;

pub use claims::PgClaimRepository;
pub use file_storage::{
    attachment_key, placeholder_reference, public_reference, FilesystemBackend, StorageBackend,
    CLAIM_FILES_BUCKET,
};
pub use memory::{MemoryClaimStore, MemoryTimeline};
pub use pool::{create_pool, create_pool_with_config, pool_status, PoolConfig};
pub use timeline::PgTimelineRepository;

use async_trait::async_trait;
use uuid::Uuid;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Claim repository.
    pub claims: PgClaimRepository,
    /// Claim chat repository.
    pub timeline: PgTimelineRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            claims: PgClaimRepository::new(pool.clone()),
            timeline: PgTimelineRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[async_trait]
impl ClaimStore for Database {
    async fn create_claim(&self, req: CreateClaimRequest) -> Result<Claim> {
        self.claims.insert(req).await
    }

    async fn get_claim(&self, id: Uuid) -> Result<Claim> {
        self.claims.fetch(id).await
    }

    async fn list_claims(&self) -> Result<Vec<Claim>> {
        self.claims.list().await
    }

    async fn update_status(&self, id: Uuid, status: ClaimStatus) -> Result<Claim> {
        self.claims.update_status(id, status).await
    }

    async fn delete_claim(&self, id: Uuid) -> Result<()> {
        self.claims.delete(id).await
    }

    async fn append_message(&self, message: TimelineMessage) -> Result<TimelineMessage> {
        self.timeline.append(message).await
    }

    async fn list_messages(&self, claim_id: Uuid) -> Result<Vec<TimelineMessage>> {
        self.timeline.list(claim_id).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn pool_status(&self) -> Option<PoolStatus> {
        Some(pool_status(&self.pool))
    }
}
