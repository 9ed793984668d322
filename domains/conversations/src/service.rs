//! Conversation orchestration
//!
//! `ChatService` owns the chat-turn workflow: resolve or open a thread,
//! persist the user's turn, hand bounded history to the model, persist the
//! reply. It also fronts the conversation read/manage operations so every
//! ownership check lives in one place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatbot_common::config::Config;
use chatbot_common::{Error, Page, PageRequest, Result};
use chatbot_llm::{ChatMessage, GenerationOptions, LlmService};

use crate::domain::entities::{
    validate_message_text, validate_title, Conversation, Message, MessageRole,
};
use crate::repository::ConversationsRepositories;

/// Instruction sent ahead of every conversation turn
pub const DEFAULT_CHAT_SYSTEM_PROMPT: &str = "You are a helpful, friendly AI assistant. \
Provide clear, accurate, and helpful responses. Be conversational but concise.";

/// Messages of context handed to the model per turn
pub const HISTORY_LIMIT: i64 = 10;

/// Default page size for conversation listings
pub const DEFAULT_CONVERSATIONS_LIMIT: i64 = 20;

/// Default page size for message listings
pub const DEFAULT_MESSAGES_LIMIT: i64 = 50;

fn not_found() -> Error {
    Error::NotFound("Conversation not found".to_string())
}

/// Tunables for the chat workflow
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub history_limit: i64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_CHAT_SYSTEM_PROMPT.to_string(),
            history_limit: HISTORY_LIMIT,
        }
    }
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config
                .chat_system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAT_SYSTEM_PROMPT.to_string()),
            ..Self::default()
        }
    }
}

/// A message as returned to the caller of a chat turn
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSummary {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageSummary {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct SendMessageOutcome {
    pub conversation_id: Uuid,
    pub user_message: MessageSummary,
    pub assistant_message: MessageSummary,
}

/// A conversation with its full message list, oldest first
#[derive(Debug, Clone)]
pub struct ConversationWithMessages {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

/// Result of clearing a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted: u64,
    pub message: &'static str,
}

/// Conversation orchestrator, cheap to clone
#[derive(Clone)]
pub struct ChatService {
    repos: ConversationsRepositories,
    llm: Arc<dyn LlmService>,
    settings: Arc<ChatSettings>,
}

impl ChatService {
    pub fn new(
        repos: ConversationsRepositories,
        llm: Arc<dyn LlmService>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            repos,
            llm,
            settings: Arc::new(settings),
        }
    }

    /// Run one chat turn.
    ///
    /// A provider failure leaves the user's message in place; no assistant
    /// message is written.
    pub async fn send_message(
        &self,
        user_id: Uuid,
        text: &str,
        conversation_id: Option<Uuid>,
    ) -> Result<SendMessageOutcome> {
        let text = validate_message_text(text)?;

        let conversation = match conversation_id {
            Some(id) => self
                .repos
                .conversations
                .find_active_owned(id, user_id)
                .await?
                .ok_or_else(not_found)?,
            None => {
                let conv = Conversation::opened_by(user_id, &text)?;
                let created = self.repos.conversations.create(&conv).await?;
                tracing::info!(
                    user_id = %user_id,
                    conversation_id = %created.id,
                    "Opened conversation"
                );
                created
            }
        };

        let user_message = self
            .repos
            .messages
            .append(&Message::new_user(conversation.id, text)?)
            .await?;

        let history: Vec<ChatMessage> = self
            .repos
            .messages
            .recent(conversation.id, self.settings.history_limit)
            .await?
            .into_iter()
            .map(|m| ChatMessage::new(m.role.into(), m.content))
            .collect();

        tracing::debug!(
            conversation_id = %conversation.id,
            history = history.len(),
            "Requesting model reply"
        );

        let completion = self
            .llm
            .generate_response(
                history,
                GenerationOptions::with_system_prompt(self.settings.system_prompt.clone()),
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    conversation_id = %conversation.id,
                    error = %e,
                    "Model call failed"
                );
                Error::from(e)
            })?;

        if completion.content.trim().is_empty() {
            tracing::error!(conversation_id = %conversation.id, "Model returned empty content");
            return Err(Error::Internal(
                "Model returned an empty response".to_string(),
            ));
        }

        let reply = Message::new_assistant(conversation.id, completion.content, completion.usage)?;
        let assistant_message = self.repos.replies.record_reply(&reply).await?;

        tracing::info!(
            user_id = %user_id,
            conversation_id = %conversation.id,
            model = %completion.model,
            total_tokens = assistant_message.total_tokens,
            "Chat turn completed"
        );

        Ok(SendMessageOutcome {
            conversation_id: conversation.id,
            user_message: user_message.into(),
            assistant_message: assistant_message.into(),
        })
    }

    /// Active conversations owned by `user_id`, most recent first
    pub async fn get_conversations(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Conversation>> {
        let (items, total) = self
            .repos
            .conversations
            .list_active_by_user(user_id, page)
            .await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<ConversationWithMessages> {
        let conversation = self
            .repos
            .conversations
            .find_active_owned(conversation_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let messages = self.repos.messages.list_all(conversation_id).await?;

        Ok(ConversationWithMessages {
            conversation,
            messages,
        })
    }

    /// Messages of an owned conversation, oldest first.
    ///
    /// Ownership is the only filter: messages of a soft-deleted conversation
    /// stay readable.
    pub async fn get_messages(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Message>> {
        self.repos
            .conversations
            .find_owned(conversation_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let (items, total) = self.repos.messages.list_page(conversation_id, page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn create_conversation(
        &self,
        user_id: Uuid,
        title: Option<String>,
    ) -> Result<Conversation> {
        let conv = Conversation::new(user_id, title)?;
        let created = self.repos.conversations.create(&conv).await?;

        tracing::info!(user_id = %user_id, conversation_id = %created.id, "Conversation created");
        Ok(created)
    }

    pub async fn update_conversation_title(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        title: &str,
    ) -> Result<Conversation> {
        let title = validate_title(title)?;

        self.repos
            .conversations
            .rename(conversation_id, user_id, &title)
            .await?
            .ok_or_else(not_found)
    }

    /// Soft delete. Deleting an already-deleted owned conversation succeeds.
    pub async fn delete_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Conversation> {
        self.repos
            .conversations
            .find_owned(conversation_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let deleted = self
            .repos
            .conversations
            .deactivate(conversation_id)
            .await?
            .ok_or_else(not_found)?;

        tracing::info!(user_id = %user_id, conversation_id = %conversation_id, "Conversation deleted");
        Ok(deleted)
    }

    /// Hard-delete every message; the conversation itself is untouched
    pub async fn clear_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<ClearOutcome> {
        self.repos
            .conversations
            .find_active_owned(conversation_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let deleted = self.repos.messages.clear(conversation_id).await?;

        tracing::info!(
            user_id = %user_id,
            conversation_id = %conversation_id,
            deleted,
            "Conversation cleared"
        );

        Ok(ClearOutcome {
            deleted,
            message: "Conversation cleared successfully",
        })
    }

    /// Single stateless exchange; nothing is persisted
    pub async fn quick_chat(&self, text: &str) -> Result<String> {
        let text = validate_message_text(text)?;
        let response = self.llm.generate_simple_response(&text).await?;
        Ok(response)
    }
}
