//! Message API handlers

use axum::extract::State;
use chatbot_auth::AuthUser;
use chatbot_common::{ApiResponse, PageQuery, Pagination, Result, ValidatedQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::extractors::ConversationId;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Message, MessageRole};
use crate::service::DEFAULT_MESSAGES_LIMIT;

/// Token usage of one message
#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub prompt: i32,
    pub completion: i32,
    pub total: i32,
}

/// Message response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub tokens: TokensResponse,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            role: m.role,
            content: m.content,
            tokens: TokensResponse {
                prompt: m.prompt_tokens,
                completion: m.completion_tokens,
                total: m.total_tokens,
            },
            created_at: m.created_at,
        }
    }
}

/// Response for listing messages
#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageResponse>,
    pub pagination: Pagination,
}

/// List messages of a conversation, oldest first
pub async fn list_messages(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ConversationId(conversation_id): ConversationId,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<ApiResponse<ListMessagesResponse>> {
    let page = state
        .chat
        .get_messages(
            conversation_id,
            user.id(),
            query.resolve(DEFAULT_MESSAGES_LIMIT),
        )
        .await?
        .map(MessageResponse::from);

    Ok(ApiResponse::success(
        ListMessagesResponse {
            messages: page.items,
            pagination: page.pagination,
        },
        "Success",
    ))
}

/// Delete every message of a conversation
pub async fn clear_messages(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ConversationId(conversation_id): ConversationId,
) -> Result<ApiResponse<()>> {
    let outcome = state
        .chat
        .clear_conversation(conversation_id, user.id())
        .await?;

    Ok(ApiResponse::message(outcome.message))
}
