//! In-process store
//!
//! Implements every repository trait over one `RwLock`, so a reply and its
//! recency bump land under a single write guard. Backs `STORAGE_PROVIDER=memory`
//! and the service tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use chatbot_common::{Error, PageRequest, Result};

use super::{ConversationStore, MessageStore, ReplyRecorder};
use crate::domain::entities::{Conversation, Message};

#[derive(Debug, Default)]
struct MemoryState {
    conversations: HashMap<Uuid, Conversation>,
    /// Per conversation, ascending by `created_at`, ties in insertion order
    messages: HashMap<Uuid, Vec<Message>>,
}

impl MemoryState {
    fn insert_message(&mut self, message: &Message) -> Result<Message> {
        if !self.conversations.contains_key(&message.conversation_id) {
            return Err(Error::NotFound("Conversation not found".to_string()));
        }
        let thread = self.messages.entry(message.conversation_id).or_default();
        let pos = thread.partition_point(|m| m.created_at <= message.created_at);
        thread.insert(pos, message.clone());
        Ok(message.clone())
    }
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation> {
        let mut state = self.state.write().await;
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation.clone())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state
            .conversations
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn find_active_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Conversation>> {
        let state = self.state.read().await;
        Ok(state
            .conversations
            .get(&id)
            .filter(|c| c.user_id == user_id && c.is_active)
            .cloned())
    }

    async fn list_active_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Conversation>, i64)> {
        let state = self.state.read().await;
        let mut owned: Vec<&Conversation> = state
            .conversations
            .values()
            .filter(|c| c.user_id == user_id && c.is_active)
            .collect();
        owned.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = owned.len() as i64;
        Ok((paginate(&owned, page).into_iter().cloned().collect(), total))
    }

    async fn rename(&self, id: Uuid, user_id: Uuid, title: &str) -> Result<Option<Conversation>> {
        let mut state = self.state.write().await;
        Ok(state
            .conversations
            .get_mut(&id)
            .filter(|c| c.user_id == user_id && c.is_active)
            .map(|c| {
                c.title = title.to_string();
                c.updated_at = Utc::now();
                c.clone()
            }))
    }

    async fn deactivate(&self, id: Uuid) -> Result<Option<Conversation>> {
        let mut state = self.state.write().await;
        Ok(state.conversations.get_mut(&id).map(|c| {
            if c.is_active {
                c.is_active = false;
                c.updated_at = Utc::now();
            }
            c.clone()
        }))
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn append(&self, message: &Message) -> Result<Message> {
        self.state.write().await.insert_message(message)
    }

    async fn recent(&self, conversation_id: Uuid, limit: i64) -> Result<Vec<Message>> {
        let state = self.state.read().await;
        let thread = state
            .messages
            .get(&conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let skip = thread.len().saturating_sub(limit.max(0) as usize);
        Ok(thread[skip..].to_vec())
    }

    async fn list_all(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_page(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Message>, i64)> {
        let state = self.state.read().await;
        let thread = state
            .messages
            .get(&conversation_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok((paginate(thread, page), thread.len() as i64))
    }

    async fn clear(&self, conversation_id: Uuid) -> Result<u64> {
        let mut state = self.state.write().await;
        Ok(state
            .messages
            .remove(&conversation_id)
            .map(|thread| thread.len() as u64)
            .unwrap_or(0))
    }
}

#[async_trait]
impl ReplyRecorder for InMemoryStore {
    async fn record_reply(&self, reply: &Message) -> Result<Message> {
        let mut state = self.state.write().await;
        let stored = state.insert_message(reply)?;
        if let Some(conv) = state.conversations.get_mut(&reply.conversation_id) {
            let now = Utc::now();
            if now > conv.last_message_at {
                conv.last_message_at = now;
            }
            conv.updated_at = now;
        }
        Ok(stored)
    }
}
