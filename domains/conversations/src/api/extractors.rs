//! Path extractors

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chatbot_common::{Error, FieldError};
use uuid::Uuid;

/// 400 for a conversation id that is not a UUID
pub(crate) fn invalid_conversation_id() -> Error {
    Error::InvalidInput {
        message: "Validation Failed".to_string(),
        errors: vec![FieldError::new("conversationId", "Invalid conversation Id")],
    }
}

/// The `{id}` segment of a conversation route, parsed as a UUID
#[derive(Debug, Clone, Copy)]
pub struct ConversationId(pub Uuid);

impl<S> FromRequestParts<S> for ConversationId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_conversation_id())?;

        Uuid::parse_str(&raw)
            .map(ConversationId)
            .map_err(|_| invalid_conversation_id())
    }
}
