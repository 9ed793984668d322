//! Route definitions for Conversations domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{chat, conversations, messages};
use super::middleware::ConversationsState;

/// Create chat routes
fn chat_routes() -> Router<ConversationsState> {
    Router::new()
        .route("/chat/send", post(chat::send_message))
        .route("/chat/quick", post(chat::quick_chat))
}

/// Create conversation routes
fn conversation_routes() -> Router<ConversationsState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(conversations::get_conversation)
                .put(conversations::update_conversation)
                .delete(conversations::delete_conversation),
        )
}

/// Create message routes
fn message_routes() -> Router<ConversationsState> {
    Router::new().route(
        "/conversations/{id}/messages",
        get(messages::list_messages).delete(messages::clear_messages),
    )
}

/// Create all Conversations domain API routes, relative to the API prefix
pub fn routes() -> Router<ConversationsState> {
    Router::new()
        .merge(chat_routes())
        .merge(conversation_routes())
        .merge(message_routes())
}
