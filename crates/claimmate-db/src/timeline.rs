//! Timeline (claim chat) repository implementation.

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use claimmate_core::{Error, MessageType, Result, TimelineMessage};

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL repository for the `claim_chats` table.
pub struct PgTimelineRepository {
    pool: Pool<Postgres>,
}

impl PgTimelineRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn append(&self, message: TimelineMessage) -> Result<TimelineMessage> {
        let result = sqlx::query(
            r#"
            INSERT INTO claim_chats (id, claim_id, sender, content, status, recipient, subject, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(message.claim_id)
        .bind(message.message_type.sender())
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(&message.recipient)
        .bind(&message.subject)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(message),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(Error::ClaimNotFound(message.claim_id))
            }
            Err(e) => Err(Error::Database(e)),
        }
    }

    /// Messages for a claim, oldest first; insertion order breaks timestamp ties.
    pub async fn list(&self, claim_id: Uuid) -> Result<Vec<TimelineMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, claim_id, sender, content, status, recipient, subject, timestamp
            FROM claim_chats
            WHERE claim_id = $1
            ORDER BY timestamp ASC, seq ASC
            "#,
        )
        .bind(claim_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(message_from_row).collect()
    }
}

fn message_from_row(r: &PgRow) -> Result<TimelineMessage> {
    let sender: String = r.get("sender");
    let status: String = r.get("status");

    Ok(TimelineMessage {
        id: r.get("id"),
        claim_id: r.get("claim_id"),
        message_type: MessageType::from_stored_sender(&sender),
        content: r.get("content"),
        timestamp: r.get("timestamp"),
        status: status
            .parse()
            .map_err(|e| Error::Internal(format!("corrupt chat row: {}", e)))?,
        recipient: r.get("recipient"),
        subject: r.get("subject"),
    })
}
