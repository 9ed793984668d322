//! Chat turn handlers

use std::borrow::Cow;

use axum::extract::State;
use chatbot_auth::AuthUser;
use chatbot_common::{ApiResponse, Result, ValidatedJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::invalid_conversation_id;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{MessageRole, MAX_MESSAGE_CHARS};
use crate::service::MessageSummary;

fn validate_message(value: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Message is required")));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ValidationError::new("length")
            .with_message(Cow::Borrowed("Message cannot exceed 4000 characters")));
    }
    Ok(())
}

/// Request for sending a chat message
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(custom(function = "validate_message"))]
    pub message: String,

    /// Existing conversation to continue; a new one is opened when absent.
    /// Parsed in the handler so a malformed id reports as `conversationId`.
    pub conversation_id: Option<String>,
}

/// Request for a stateless exchange
#[derive(Debug, Deserialize, Validate)]
pub struct QuickChatRequest {
    #[validate(custom(function = "validate_message"))]
    pub message: String,
}

/// One message of a chat turn
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMessageResponse {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageSummary> for TurnMessageResponse {
    fn from(m: MessageSummary) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Response for a chat turn
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    /// Id of the conversation the turn landed in
    pub conversation: Uuid,
    pub user_message: TurnMessageResponse,
    pub assistant_message: TurnMessageResponse,
}

#[derive(Debug, Serialize)]
pub struct QuickChatResponse {
    pub response: String,
}

/// Send a message, opening a conversation when no id is given
pub async fn send_message(
    user: AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<ApiResponse<SendMessageResponse>> {
    let conversation_id = req
        .conversation_id
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| invalid_conversation_id())?;

    let outcome = state
        .chat
        .send_message(user.id(), &req.message, conversation_id)
        .await?;

    Ok(ApiResponse::success(
        SendMessageResponse {
            conversation: outcome.conversation_id,
            user_message: outcome.user_message.into(),
            assistant_message: outcome.assistant_message.into(),
        },
        "Message sent successfully",
    ))
}

/// One-off question with no stored history
pub async fn quick_chat(
    _user: AuthUser,
    State(state): State<ConversationsState>,
    ValidatedJson(req): ValidatedJson<QuickChatRequest>,
) -> Result<ApiResponse<QuickChatResponse>> {
    let response = state.chat.quick_chat(&req.message).await?;

    Ok(ApiResponse::success(
        QuickChatResponse { response },
        "Response generated",
    ))
}
