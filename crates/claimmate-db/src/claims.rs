//! Claim repository implementation.

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use claimmate_core::{
    new_v7, Claim, ClaimStatus, CreateClaimRequest, Error, ExtractedClaimData, Result,
};

const CLAIM_COLUMNS: &str = "id, narrative, status, files, extracted_data, created_at, updated_at";

/// PostgreSQL repository for the `claims` table.
pub struct PgClaimRepository {
    pool: Pool<Postgres>,
}

impl PgClaimRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, req: CreateClaimRequest) -> Result<Claim> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO claims (id, narrative, status, files, extracted_data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.narrative)
        .bind(ClaimStatus::Pending.as_str())
        .bind(&req.files)
        .bind(Json(&req.extracted_data))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(subsystem = "db", component = "claims", op = "insert", claim_id = %id, "Inserted claim");
        claim_from_row(&row)
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Claim> {
        let row = sqlx::query(&format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(r) => claim_from_row(&r),
            None => Err(Error::ClaimNotFound(id)),
        }
    }

    pub async fn list(&self) -> Result<Vec<Claim>> {
        let rows = sqlx::query(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(claim_from_row).collect()
    }

    /// Set the status. `updated_at` always moves forward, even when two
    /// updates land within the same clock tick.
    pub async fn update_status(&self, id: Uuid, status: ClaimStatus) -> Result<Claim> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE claims
            SET status = $2,
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE id = $1
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => claim_from_row(&r),
            None => Err(Error::ClaimNotFound(id)),
        }
    }

    /// Delete a claim; its chat rows go with it through the foreign key cascade.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM claims WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ClaimNotFound(id));
        }
        Ok(())
    }
}

fn claim_from_row(r: &PgRow) -> Result<Claim> {
    let status: String = r.get("status");
    let status = status
        .parse::<ClaimStatus>()
        .map_err(|e| Error::Internal(format!("corrupt claim row: {}", e)))?;
    let extracted: Json<ExtractedClaimData> = r.get("extracted_data");

    Ok(Claim {
        id: r.get("id"),
        narrative: r.get("narrative"),
        status,
        files: r.get::<Vec<String>, _>("files"),
        extracted_data: extracted.0,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}
