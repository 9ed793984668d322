//! Domain entities for the Conversations domain
//!
//! Conversations are per-user chat threads; messages are the append-only
//! turns inside them. Constructors enforce the column constraints so a
//! value that exists in memory is always storable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatbot_common::{Error, Result};
use chatbot_llm::{LlmRole, TokenUsage};

/// Title given to conversations created without one
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// Maximum title length in code points (CHECK char_length(title) <= 100)
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum user message length in code points
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Code points of the first message kept when deriving a title
const TITLE_PREVIEW_CHARS: usize = 50;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

impl From<MessageRole> for LlmRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => LlmRole::User,
            MessageRole::Assistant => LlmRole::Assistant,
            MessageRole::System => LlmRole::System,
        }
    }
}

/// Validate user-supplied message text and return it trimmed.
pub fn validate_message_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Message is required".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::Validation(format!(
            "Message cannot exceed {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a conversation title and return it trimmed.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Title cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::Validation(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Title for a thread opened by `text`: the first 50 code points, with an
/// ellipsis only when something was cut.
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(TITLE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new active conversation
    pub fn new(user_id: Uuid, title: Option<String>) -> Result<Self> {
        let title = match title {
            Some(t) => validate_title(&t)?,
            None => DEFAULT_CONVERSATION_TITLE.to_string(),
        };

        let now = Utc::now();
        Ok(Conversation {
            id: Uuid::new_v4(),
            user_id,
            title,
            is_active: true,
            last_message_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create the conversation opened by a first message
    pub fn opened_by(user_id: Uuid, first_message: &str) -> Result<Self> {
        Self::new(user_id, Some(derive_title(first_message)))
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(conversation_id: Uuid, content: String) -> Result<Self> {
        Self::build(conversation_id, MessageRole::User, content, TokenUsage::default())
    }

    /// Create a new assistant message carrying the provider's usage
    pub fn new_assistant(conversation_id: Uuid, content: String, usage: TokenUsage) -> Result<Self> {
        Self::build(conversation_id, MessageRole::Assistant, content, usage)
    }

    fn build(
        conversation_id: Uuid,
        role: MessageRole,
        content: String,
        usage: TokenUsage,
    ) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content,
            prompt_tokens: usage.prompt_tokens.max(0),
            completion_tokens: usage.completion_tokens.max(0),
            total_tokens: usage.total_tokens.max(0),
            created_at: Utc::now(),
        })
    }

    /// Validate message content (CHECK (length(trim(content)) > 0))
    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(())
    }
}
