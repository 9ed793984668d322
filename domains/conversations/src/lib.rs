//! Conversations domain: chat threads, messages, and the chat-turn workflow

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Conversation, Message, MessageRole};

// Re-export repository types
pub use repository::{
    ConversationStore, ConversationsRepositories, InMemoryStore, MessageStore, ReplyRecorder,
};

// Re-export service types
pub use service::{ChatService, ChatSettings};

// Re-export API types
pub use api::routes::routes;
pub use api::ConversationsState;
