//! Concrete authentication backend
//!
//! Wraps an `AccountStore` + `AuthConfig`. Token verification happens here;
//! account rows are read through the store so the backend works against
//! Postgres or process memory alike.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::store::AccountStore;
use crate::types::AuthIdentity;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    accounts: Arc<dyn AccountStore>,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(accounts: Arc<dyn AccountStore>, config: AuthConfig) -> Self {
        Self { accounts, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a token and load the account it names.
    ///
    /// Unknown and deactivated accounts are rejected.
    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = self
            .accounts
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            tracing::info!(user_id = %user_id, "Rejected request from deactivated account");
            return Err(AuthError::UserDeactivated);
        }

        Ok(user)
    }
}
