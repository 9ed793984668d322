//! Chatbot LLM Service
//!
//! Provides text generation for the chat orchestrator with support for:
//! - Any OpenAI-style chat-completions endpoint (Perplexity by default)
//! - Mock LLM service for testing and development
//! - Typed request/response shapes with explicit defaults

pub mod chat_completions;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default provider base URL
pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";

/// Default model name
pub const DEFAULT_MODEL: &str = "sonar";

/// Fallback system instruction when a caller passes none
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful, friendly AI assistant. Provide clear and concise responses.";

/// System instruction for single-turn quick chat
pub const SIMPLE_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Be concise and accurate.";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("Invalid model provider API key")]
    Unauthorized,

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimit,

    #[error("{0}")]
    BadRequest(String),

    #[error("Model provider request timed out")]
    Timeout,

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM response error: {0}")]
    Response(String),
}

impl From<LlmError> for chatbot_common::Error {
    fn from(err: LlmError) -> Self {
        use chatbot_common::Error;

        match err {
            // Credential misconfiguration is a server fault, not the caller's
            LlmError::Unauthorized => Error::Internal(err.to_string()),
            LlmError::RateLimit => Error::RateLimit(err.to_string()),
            LlmError::BadRequest(msg) => Error::Validation(msg),
            LlmError::Configuration(_)
            | LlmError::Timeout
            | LlmError::Request(_)
            | LlmError::Response(_) => {
                Error::Internal(format!("Failed to generate AI response: {}", err))
            }
        }
    }
}

/// Role of a message sent to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

/// One `{role, content}` history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: LlmRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: LlmRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Per-call generation options; `None` falls back to `LlmConfig`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            ..Default::default()
        }
    }
}

/// Token usage reported by the provider; missing counts are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
}

/// Result of a multi-turn generation
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
}

/// LLM service configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Provider (perplexity, openai, mock)
    pub provider: String,
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Upper bound on one provider round trip
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "perplexity".to_string(),
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, LlmError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| LlmError::Configuration(format!("{} has an invalid value", name))),
        _ => Ok(default),
    }
}

impl LlmConfig {
    /// Create LLM config from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let provider = std::env::var("LLM_PROVIDER").unwrap_or(defaults.provider);

        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("PERPLEXITY_API_KEY"))
            .unwrap_or_else(|_| {
                if provider == "mock" {
                    "mock-api-key".to_string()
                } else {
                    String::new()
                }
            });

        if provider != "mock" && api_key.is_empty() {
            return Err(LlmError::Configuration(
                "LLM_API_KEY is required for the configured provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            api_key,
            base_url: std::env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
            default_model: std::env::var("LLM_MODEL").unwrap_or(defaults.default_model),
            temperature: parse_var("LLM_TEMPERATURE", defaults.temperature)?,
            top_p: parse_var("LLM_TOP_P", defaults.top_p)?,
            max_tokens: parse_var("LLM_MAX_TOKENS", defaults.max_tokens)?,
            timeout_secs: parse_var("LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }
}

/// LLM service trait for different implementations
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Generate the next assistant turn for an ordered history.
    ///
    /// A single system entry built from `options.system_prompt` is prepended;
    /// history roles other than `Assistant` are sent as `user`.
    async fn generate_response(
        &self,
        history: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<Completion, LlmError>;

    /// Stateless single-turn generation
    async fn generate_simple_response(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}

/// Factory for creating LlmService implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create an LlmService based on configuration
    pub fn create(config: LlmConfig) -> Result<Box<dyn LlmService>, LlmError> {
        match config.provider.as_str() {
            "perplexity" | "openai" => {
                tracing::info!(
                    provider = %config.provider,
                    base_url = %config.base_url,
                    model = %config.default_model,
                    "Creating chat-completions LLM service"
                );
                let service = chat_completions::ChatCompletionsService::new(config)?;
                Ok(Box::new(service))
            }
            "mock" => {
                tracing::info!("Creating mock LLM service");
                Ok(Box::new(mock::MockLlmService::new()))
            }
            provider => Err(LlmError::Configuration(format!(
                "Unknown LLM provider: {}. Supported providers: perplexity, openai, mock",
                provider
            ))),
        }
    }
}
