//! Account read-model types
//!
//! Lightweight view of the `users` rows owned by the account service.
//! Carries only the fields needed for authentication.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lightweight identity for authenticated users
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthIdentity {
    /// Active account with the given id, for tests and seeding
    pub fn active(id: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            name: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
