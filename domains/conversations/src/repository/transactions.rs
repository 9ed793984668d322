//! Transaction helpers for the Conversations domain

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use chatbot_common::Result;

use super::messages::MESSAGE_COLUMNS;
use super::ReplyRecorder;
use crate::domain::entities::Message;

/// Insert a message within a transaction
pub async fn insert_message_tx(
    tx: &mut Transaction<'_, Postgres>,
    msg: &Message,
) -> std::result::Result<Message, sqlx::Error> {
    let query = format!(
        "INSERT INTO messages ({MESSAGE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {MESSAGE_COLUMNS}"
    );
    sqlx::query_as::<_, Message>(&query)
        .bind(msg.id)
        .bind(msg.conversation_id)
        .bind(msg.role)
        .bind(&msg.content)
        .bind(msg.prompt_tokens)
        .bind(msg.completion_tokens)
        .bind(msg.total_tokens)
        .bind(msg.created_at)
        .fetch_one(&mut **tx)
        .await
}

/// Advance a conversation's `last_message_at` within a transaction
pub async fn touch_conversation_tx(
    tx: &mut Transaction<'_, Postgres>,
    conversation_id: Uuid,
    at: DateTime<Utc>,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE conversations SET \
             last_message_at = GREATEST(last_message_at, $2), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(conversation_id)
    .bind(at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Postgres `ReplyRecorder`: one transaction per reply
#[derive(Clone)]
pub struct PgReplyRecorder {
    pool: PgPool,
}

impl PgReplyRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReplyRecorder for PgReplyRecorder {
    async fn record_reply(&self, reply: &Message) -> Result<Message> {
        let mut tx = self.pool.begin().await?;
        let stored = insert_message_tx(&mut tx, reply).await?;
        touch_conversation_tx(&mut tx, reply.conversation_id, Utc::now()).await?;
        tx.commit().await?;
        Ok(stored)
    }
}
