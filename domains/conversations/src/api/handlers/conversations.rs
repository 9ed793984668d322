//! Conversation management API handlers

use std::borrow::Cow;

use axum::extract::State;
use chatbot_auth::AuthUser;
use chatbot_common::{ApiResponse, PageQuery, Pagination, Result, ValidatedJson, ValidatedQuery};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::messages::MessageResponse;
use crate::api::extractors::ConversationId;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Conversation, MAX_TITLE_CHARS};
use crate::service::DEFAULT_CONVERSATIONS_LIMIT;

/// Titles are measured after trimming, the same way they are stored
fn validate_title_field(value: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Title cannot be empty")));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::new("length")
            .with_message(Cow::Borrowed("Title cannot exceed 100 characters")));
    }
    Ok(())
}

/// Request for creating a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationRequest {
    #[validate(custom(function = "validate_title_field"))]
    pub title: Option<String>,
}

/// Request for renaming a conversation
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConversationRequest {
    #[validate(custom(function = "validate_title_field"))]
    pub title: String,
}

/// Conversation response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            title: c.title,
            is_active: c.is_active,
            last_message_at: c.last_message_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Conversation with its embedded messages
#[derive(Debug, Serialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

/// `{conversation: ...}` payload
#[derive(Debug, Serialize)]
pub struct ConversationEnvelope<T> {
    pub conversation: T,
}

/// Response for listing conversations
#[derive(Debug, Serialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationResponse>,
    pub pagination: Pagination,
}

/// List the caller's active conversations, most recent first
pub async fn list_conversations(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<ApiResponse<ListConversationsResponse>> {
    let page = state
        .chat
        .get_conversations(user.id(), query.resolve(DEFAULT_CONVERSATIONS_LIMIT))
        .await?
        .map(ConversationResponse::from);

    Ok(ApiResponse::success(
        ListConversationsResponse {
            conversations: page.items,
            pagination: page.pagination,
        },
        "Success",
    ))
}

/// Create a new conversation
pub async fn create_conversation(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<ApiResponse<ConversationEnvelope<ConversationResponse>>> {
    let conversation = state.chat.create_conversation(user.id(), req.title).await?;

    Ok(ApiResponse::created(
        ConversationEnvelope {
            conversation: conversation.into(),
        },
        "Conversation created successfully",
    ))
}

/// Get a single conversation with all of its messages
pub async fn get_conversation(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ConversationId(conversation_id): ConversationId,
) -> Result<ApiResponse<ConversationEnvelope<ConversationDetailResponse>>> {
    let found = state
        .chat
        .get_conversation_by_id(conversation_id, user.id())
        .await?;

    Ok(ApiResponse::success(
        ConversationEnvelope {
            conversation: ConversationDetailResponse {
                conversation: found.conversation.into(),
                messages: found.messages.into_iter().map(Into::into).collect(),
            },
        },
        "Success",
    ))
}

/// Rename a conversation
pub async fn update_conversation(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ConversationId(conversation_id): ConversationId,
    ValidatedJson(req): ValidatedJson<UpdateConversationRequest>,
) -> Result<ApiResponse<ConversationEnvelope<ConversationResponse>>> {
    let conversation = state
        .chat
        .update_conversation_title(conversation_id, user.id(), &req.title)
        .await?;

    Ok(ApiResponse::success(
        ConversationEnvelope {
            conversation: conversation.into(),
        },
        "Conversation updated successfully",
    ))
}

/// Soft-delete a conversation
pub async fn delete_conversation(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ConversationId(conversation_id): ConversationId,
) -> Result<ApiResponse<()>> {
    state
        .chat
        .delete_conversation(conversation_id, user.id())
        .await?;

    Ok(ApiResponse::message("Conversation deleted successfully"))
}
