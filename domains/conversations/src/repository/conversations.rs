//! Conversation repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use chatbot_common::{PageRequest, Result};

use super::ConversationStore;
use crate::domain::entities::Conversation;

const CONVERSATION_COLUMNS: &str =
    "id, user_id, title, is_active, last_message_at, created_at, updated_at";

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn create(&self, conv: &Conversation) -> Result<Conversation> {
        let query = format!(
            "INSERT INTO conversations ({CONVERSATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Conversation>(&query)
            .bind(conv.id)
            .bind(conv.user_id)
            .bind(&conv.title)
            .bind(conv.is_active)
            .bind(conv.last_message_at)
            .bind(conv.created_at)
            .bind(conv.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1 AND user_id = $2"
        );
        let conv = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conv)
    }

    async fn find_active_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE id = $1 AND user_id = $2 AND is_active"
        );
        let conv = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(conv)
    }

    async fn list_active_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Conversation>, i64)> {
        let query = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE user_id = $1 AND is_active \
             ORDER BY last_message_at DESC, created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let convs = sqlx::query_as::<_, Conversation>(&query)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM conversations WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((convs, total))
    }

    async fn rename(&self, id: Uuid, user_id: Uuid, title: &str) -> Result<Option<Conversation>> {
        let query = format!(
            "UPDATE conversations SET title = $2, updated_at = NOW() \
             WHERE id = $1 AND user_id = $3 AND is_active \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .bind(title)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Conversation>> {
        // The CASE keeps updated_at stable when the row is already inactive
        let query = format!(
            "UPDATE conversations SET \
                 updated_at = CASE WHEN is_active THEN NOW() ELSE updated_at END, \
                 is_active = FALSE \
             WHERE id = $1 \
             RETURNING {CONVERSATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Conversation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }
}
