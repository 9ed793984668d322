//! Repository implementations for the Conversations domain
//!
//! Each store is a trait so the orchestration layer runs unchanged against
//! Postgres or the in-process backend.

pub mod conversations;
pub mod memory;
pub mod messages;
pub mod transactions;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use chatbot_common::{PageRequest, Result};

use crate::domain::entities::{Conversation, Message};

pub use conversations::ConversationRepository;
pub use memory::InMemoryStore;
pub use messages::MessageRepository;
pub use transactions::PgReplyRecorder;

/// Sole writer of conversation title, activity and soft-delete state
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation>;

    /// Owned by `user_id`, active or not
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>>;

    /// Owned by `user_id` and still active
    async fn find_active_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>>;

    /// Active conversations for a user, most recent first, with the total count
    async fn list_active_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Conversation>, i64)>;

    /// Retitle an active conversation owned by `user_id`; `None` otherwise
    async fn rename(&self, id: Uuid, user_id: Uuid, title: &str) -> Result<Option<Conversation>>;

    /// Soft delete. Already-inactive rows are returned unchanged.
    async fn deactivate(&self, id: Uuid) -> Result<Option<Conversation>>;
}

/// Sole writer of message content and usage
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: &Message) -> Result<Message>;

    /// The most recent `limit` messages, oldest first
    async fn recent(&self, conversation_id: Uuid, limit: i64) -> Result<Vec<Message>>;

    /// Every message, oldest first
    async fn list_all(&self, conversation_id: Uuid) -> Result<Vec<Message>>;

    /// One page of messages, oldest first, with the total count
    async fn list_page(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Message>, i64)>;

    /// Hard-delete every message; returns how many went
    async fn clear(&self, conversation_id: Uuid) -> Result<u64>;
}

/// Writes an assistant reply and moves the conversation's `last_message_at`
/// forward (never backwards) as one unit
#[async_trait]
pub trait ReplyRecorder: Send + Sync {
    async fn record_reply(&self, reply: &Message) -> Result<Message>;
}

/// Combined repository access for the Conversations domain
#[derive(Clone)]
pub struct ConversationsRepositories {
    pub conversations: Arc<dyn ConversationStore>,
    pub messages: Arc<dyn MessageStore>,
    pub replies: Arc<dyn ReplyRecorder>,
}

impl ConversationsRepositories {
    /// Postgres-backed repositories
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: Arc::new(ConversationRepository::new(pool.clone())),
            messages: Arc::new(MessageRepository::new(pool.clone())),
            replies: Arc::new(PgReplyRecorder::new(pool)),
        }
    }

    /// Repositories sharing one in-process store
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            conversations: store.clone(),
            messages: store.clone(),
            replies: store,
        }
    }
}
