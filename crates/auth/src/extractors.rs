//! Axum extractors for authentication
//!
//! Generic over any state `S` where `AuthBackend: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::backend::AuthBackend;
use crate::error::AuthError;
use crate::jwt::{extract_bearer_token, extract_cookie_token};
use crate::types::AuthIdentity;

/// Authenticated user extractor.
///
/// Reads `Authorization: Bearer <jwt>`, falling back to the `token` cookie.
#[derive(Debug)]
pub struct AuthUser(pub AuthIdentity);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthBackend: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let backend = AuthBackend::from_ref(state);

        let token = match parts.headers.get(AUTHORIZATION) {
            Some(header) => extract_bearer_token(header)?,
            None => extract_cookie_token(&parts.headers).ok_or(AuthError::MissingAuthorization)?,
        };

        let user = backend.authenticate_jwt(&token).await?;

        Ok(AuthUser(user))
    }
}
