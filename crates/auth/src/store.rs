//! Account lookup
//!
//! The account service owns the `users` table; this crate only reads the
//! columns needed to authorize a request.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Read access to user accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError>;
}

/// Postgres-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        sqlx::query_as::<_, AuthIdentity>(
            r#"
            SELECT id, email, name, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })
    }
}

/// Account store kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    users: Arc<RwLock<HashMap<Uuid, AuthIdentity>>>,
    provision_unknown: bool,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that provisions an active account the first time a verified
    /// token names an unknown user (JIT provisioning for local runs).
    pub fn provisioning() -> Self {
        Self {
            provision_unknown: true,
            ..Self::default()
        }
    }

    /// Insert or replace an account
    pub async fn upsert(&self, user: AuthIdentity) {
        self.users.write().await.insert(user.id, user);
    }

    /// Flip the account's active flag; returns false when unknown
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.is_active = is_active;
                user.updated_at = chrono::Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        if !self.provision_unknown {
            return Ok(self.users.read().await.get(&id).cloned());
        }

        let mut users = self.users.write().await;
        let user = users.entry(id).or_insert_with(|| {
            tracing::info!(user_id = %id, "JIT user provisioned");
            AuthIdentity::active(id, format!("{}@local", id.simple()))
        });
        Ok(Some(user.clone()))
    }
}
