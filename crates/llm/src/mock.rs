//! Mock LLM Service Implementation
//!
//! Minimal mock used by `LlmServiceFactory` when provider is `"mock"`.
//! Returns deterministic responses for testing and offline development.

use crate::{ChatMessage, Completion, GenerationOptions, LlmError, LlmService, TokenUsage};

/// Rough token estimate: one token per four bytes, at least one
fn estimate_tokens(text: &str) -> i32 {
    (text.len() as i32 / 4).max(1)
}

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService;

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn generate_response(
        &self,
        history: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<Completion, LlmError> {
        tracing::info!(turns = history.len(), "Mock LLM service processing completion request");

        let model = options
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "mock-model".to_string());

        // Generate a simple response based on the last message
        let last_message = history
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("empty");

        let content = format!("Mock response to: {}", last_message);
        let prompt_tokens = history.iter().map(|m| estimate_tokens(&m.content)).sum();
        let completion_tokens = estimate_tokens(&content);

        Ok(Completion {
            content,
            model,
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
        })
    }

    async fn generate_simple_response(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(format!("Mock response to: {}", prompt))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
