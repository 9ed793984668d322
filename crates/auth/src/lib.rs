//! Authentication middleware for the chatbot API
//!
//! Provides JWT validation, account lookup, and axum extractors
//! that work with any domain state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod error;
mod extractors;
mod jwt;
mod store;
mod types;

pub use backend::AuthBackend;
pub use claims::Claims;
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use store::{AccountStore, InMemoryAccountStore, PgAccountStore};
pub use types::AuthIdentity;
