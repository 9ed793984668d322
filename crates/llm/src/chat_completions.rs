//! Chat-completions API Implementation
//!
//! Calls an OpenAI-style `POST {base_url}/chat/completions` endpoint
//! (Perplexity by default) using the reqwest HTTP client. Output is never
//! streamed.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    ChatMessage, Completion, GenerationOptions, LlmConfig, LlmError, LlmRole, LlmService,
    TokenUsage, DEFAULT_SYSTEM_PROMPT, SIMPLE_SYSTEM_PROMPT,
};

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct CompletionRequestBody {
    model: String,
    messages: Vec<MessageBody>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct MessageBody {
    role: &'static str,
    content: String,
}

/// Chat-completions response body. Every field the provider may omit has
/// a declared default so call sites never chase optional chains.
#[derive(Debug, Default, Deserialize)]
struct CompletionResponseBody {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsageBody {
    #[serde(default)]
    prompt_tokens: Option<i32>,
    #[serde(default)]
    completion_tokens: Option<i32>,
    #[serde(default)]
    total_tokens: Option<i32>,
}

impl From<UsageBody> for TokenUsage {
    fn from(u: UsageBody) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens.unwrap_or(0).max(0),
            completion_tokens: u.completion_tokens.unwrap_or(0).max(0),
            total_tokens: u.total_tokens.unwrap_or(0).max(0),
        }
    }
}

impl CompletionResponseBody {
    /// Text of the first choice, empty when absent
    fn first_content(&mut self) -> String {
        self.choices
            .first_mut()
            .and_then(|c| c.message.as_mut())
            .and_then(|m| m.content.take())
            .unwrap_or_default()
    }
}

/// Provider error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

fn provider_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}

/// Translate history into the provider's message list: one system entry
/// first, then each turn with non-assistant roles collapsed to `user`.
fn build_messages(system_prompt: &str, history: Vec<ChatMessage>) -> Vec<MessageBody> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(MessageBody {
        role: LlmRole::System.as_str(),
        content: system_prompt.to_string(),
    });
    messages.extend(history.into_iter().map(|m| MessageBody {
        role: match m.role {
            LlmRole::Assistant => LlmRole::Assistant.as_str(),
            LlmRole::User | LlmRole::System => LlmRole::User.as_str(),
        },
        content: m.content,
    }));
    messages
}

/// Chat-completions LLM service implementation
pub struct ChatCompletionsService {
    client: Client,
    config: LlmConfig,
}

impl ChatCompletionsService {
    /// Create a new chat-completions service
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Issue one non-streaming request and map failures to `LlmError`
    async fn post(&self, body: &CompletionRequestBody) -> Result<CompletionResponseBody, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Request(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            tracing::error!(status = %status, body = %error_body, "Model provider returned an error");

            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED => LlmError::Unauthorized,
                reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimit,
                reqwest::StatusCode::BAD_REQUEST => LlmError::BadRequest(
                    provider_error_message(&error_body)
                        .unwrap_or_else(|| "Bad request to AI service".to_string()),
                ),
                _ => LlmError::Response(
                    provider_error_message(&error_body)
                        .unwrap_or_else(|| format!("provider returned {}", status)),
                ),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Response(format!("Failed to parse response: {}", e))
            }
        })
    }
}

#[async_trait::async_trait]
impl LlmService for ChatCompletionsService {
    async fn generate_response(
        &self,
        history: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<Completion, LlmError> {
        let system_prompt = options
            .system_prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let model = options
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.config.default_model.clone());

        let body = CompletionRequestBody {
            model: model.clone(),
            messages: build_messages(&system_prompt, history),
            temperature: options.temperature.unwrap_or(self.config.temperature),
            top_p: options.top_p.unwrap_or(self.config.top_p),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            stream: false,
        };

        tracing::debug!(
            model = %model,
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "Sending chat-completions request"
        );

        let mut api_response = self.post(&body).await?;
        let content = api_response.first_content();
        let usage: TokenUsage = api_response.usage.take().unwrap_or_default().into();

        Ok(Completion {
            content,
            model: api_response.model.unwrap_or(model),
            usage,
        })
    }

    async fn generate_simple_response(&self, prompt: &str) -> Result<String, LlmError> {
        let body = CompletionRequestBody {
            model: self.config.default_model.clone(),
            messages: build_messages(
                SIMPLE_SYSTEM_PROMPT,
                vec![ChatMessage::new(LlmRole::User, prompt)],
            ),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let mut api_response = self.post(&body).await?;
        Ok(api_response.first_content())
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
