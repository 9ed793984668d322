//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Model-provider settings
//! live in `chatbot_llm::LlmConfig`.

use anyhow::Result;
use std::env;

/// Default HTTP port
const DEFAULT_PORT: u16 = 5000;

#[derive(Clone)]
pub struct Config {
    /// Storage backend: `postgres` or `memory`
    pub storage_provider: String,

    /// Database connection URL (required for the `postgres` backend)
    pub database_url: Option<String>,

    /// JWT verification
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Overrides the assistant's default system instruction
    pub chat_system_prompt: Option<String>,

    /// Extra origin allowed by CORS, on top of the local dev origins
    pub frontend_url: Option<String>,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    #[mutants::skip] // Formatting only; redaction is covered by test_debug_redacts_secrets
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_provider", &self.storage_provider)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("chat_system_prompt", &self.chat_system_prompt)
            .field("frontend_url", &self.frontend_url)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

/// Read an optional variable, treating empty strings as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let storage_provider =
            env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "postgres".to_string());

        let database_url = optional_var("DATABASE_URL");
        if storage_provider == "postgres" && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required when STORAGE_PROVIDER=postgres"
            ));
        }

        let config = Self {
            storage_provider,
            database_url,

            jwt_secret: optional_var("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: optional_var("JWT_ISSUER"),
            jwt_audience: optional_var("JWT_AUDIENCE"),

            chat_system_prompt: optional_var("CHAT_SYSTEM_PROMPT"),
            frontend_url: optional_var("FRONTEND_URL"),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "chatbot=debug".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(config)
    }
}
