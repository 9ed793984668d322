//! Conversations domain state and auth backend integration

use axum::extract::FromRef;
use chatbot_auth::AuthBackend;

use crate::service::ChatService;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub chat: ChatService,
    pub auth: AuthBackend,
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
