use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::Message;
use crate::infrastructure::repositories::MessageRepository;
use crate::utils::error::Result;

#[derive(Debug, FromRow)]
struct MessageRow {
    id: Uuid,
    vehicle_id: Option<Uuid>,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            vehicle_id: row.vehicle_id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            content: row.content,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: Pool<Postgres>,
}

impl PgMessageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: &Message) -> Result<()> {
        sqlx::query(
            "INSERT INTO messages (id, vehicle_id, sender_id, receiver_id, content, is_read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(message.id)
        .bind(message.vehicle_id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, vehicle_id, sender_id, receiver_id, content, is_read, created_at \
             FROM messages WHERE sender_id = $1 OR receiver_id = $1 \
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    /// Marque comme lus les messages reçus de `counterpart_id` dans le fil
    async fn mark_thread_read(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
        vehicle_id: Option<Uuid>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE receiver_id = $1 AND sender_id = $2 \
             AND vehicle_id IS NOT DISTINCT FROM $3 AND NOT is_read",
        )
        .bind(user_id)
        .bind(counterpart_id)
        .bind(vehicle_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
