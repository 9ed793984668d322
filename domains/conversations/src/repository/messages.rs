//! Message repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use chatbot_common::{PageRequest, Result};

use super::MessageStore;
use crate::domain::entities::Message;

pub(crate) const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, \
     prompt_tokens, completion_tokens, total_tokens, created_at";

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(&self, msg: &Message) -> Result<Message> {
        let query = format!(
            "INSERT INTO messages ({MESSAGE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {MESSAGE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Message>(&query)
            .bind(msg.id)
            .bind(msg.conversation_id)
            .bind(msg.role)
            .bind(&msg.content)
            .bind(msg.prompt_tokens)
            .bind(msg.completion_tokens)
            .bind(msg.total_tokens)
            .bind(msg.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn recent(&self, conversation_id: Uuid, limit: i64) -> Result<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM ( \
                 SELECT {MESSAGE_COLUMNS} FROM messages \
                 WHERE conversation_id = $1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $2 \
             ) AS latest \
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn list_all(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn list_page(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Message>, i64)> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(conversation_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((messages, total))
    }

    async fn clear(&self, conversation_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
