//! Common test utilities and fixtures for integration tests
//!
//! - In-process application with seeded accounts
//! - JWT helpers
//! - Model client doubles
//! - Request/response helpers

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use chatbot_app::{create_app, with_middleware, Storage};
use chatbot_auth::{AuthIdentity, InMemoryAccountStore};
use chatbot_common::config::Config;
use chatbot_conversations::InMemoryStore;
use chatbot_llm::{ChatMessage, Completion, GenerationOptions, LlmError, LlmService, TokenUsage};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only"; // pragma: allowlist secret

/// Model double that echoes the latest turn and records every history it saw
#[derive(Default)]
pub struct RecordingLlm {
    pub calls: Mutex<Vec<(Vec<ChatMessage>, GenerationOptions)>>,
}

impl RecordingLlm {
    pub fn histories(&self) -> Vec<Vec<ChatMessage>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(h, _)| h.clone())
            .collect()
    }

    pub fn last_options(&self) -> Option<GenerationOptions> {
        self.calls.lock().unwrap().last().map(|(_, o)| o.clone())
    }
}

#[async_trait::async_trait]
impl LlmService for RecordingLlm {
    async fn generate_response(
        &self,
        history: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<Completion, LlmError> {
        let last = history.last().map(|m| m.content.clone()).unwrap_or_default();
        self.calls.lock().unwrap().push((history, options));
        Ok(Completion {
            content: format!("Echo: {}", last),
            model: "test-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 8,
                total_tokens: 20,
            },
        })
    }

    async fn generate_simple_response(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(format!("Quick: {}", prompt))
    }

    fn default_model(&self) -> &str {
        "test-model"
    }
}

/// Model double that always fails with the given error
pub struct FailingLlm(pub fn() -> LlmError);

#[async_trait::async_trait]
impl LlmService for FailingLlm {
    async fn generate_response(
        &self,
        _history: Vec<ChatMessage>,
        _options: GenerationOptions,
    ) -> Result<Completion, LlmError> {
        Err((self.0)())
    }

    async fn generate_simple_response(&self, _prompt: &str) -> Result<String, LlmError> {
        Err((self.0)())
    }

    fn default_model(&self) -> &str {
        "failing-model"
    }
}

pub fn test_config() -> Config {
    Config {
        storage_provider: "memory".to_string(),
        database_url: None,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_issuer: None,
        jwt_audience: None,
        chat_system_prompt: None,
        frontend_url: None,
        rust_log: "info".to_string(),
        port: 5000,
    }
}

/// Test application: composed router plus handles on its storage
pub struct TestApp {
    pub router: Router,
    pub accounts: InMemoryAccountStore,
    pub store: InMemoryStore,
    pub llm: Arc<RecordingLlm>,
}

impl TestApp {
    pub fn new() -> Self {
        let llm = Arc::new(RecordingLlm::default());
        Self::build(llm.clone(), llm)
    }

    /// Application whose model client always fails
    pub fn with_failing_llm(make: fn() -> LlmError) -> Self {
        Self::build(Arc::new(FailingLlm(make)), Arc::new(RecordingLlm::default()))
    }

    fn build(service: Arc<dyn LlmService>, llm: Arc<RecordingLlm>) -> Self {
        let config = test_config();
        let accounts = InMemoryAccountStore::new();
        let store = InMemoryStore::new();

        let storage = Storage::Memory {
            conversations: store.clone(),
            accounts: accounts.clone(),
        };
        let router = with_middleware(create_app(&config, storage, service), &config);

        Self {
            router,
            accounts,
            store,
            llm,
        }
    }

    /// Router handle for a single `oneshot` call
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Seed an active account and mint a token for it
    pub async fn create_test_user(&self) -> UserFixture {
        let id = Uuid::new_v4();
        let user = AuthIdentity::active(id, format!("test_{}@chatbot.test", id.simple()));
        self.accounts.upsert(user.clone()).await;

        UserFixture {
            jwt: create_test_jwt(id, TEST_JWT_SECRET),
            user,
        }
    }
}

pub struct UserFixture {
    pub user: AuthIdentity,
    pub jwt: String,
}

/// HS256 token carrying the `id` claim the web client issues
pub fn create_test_jwt(user_id: Uuid, secret: &str) -> String {
    let now = Utc::now().timestamp() as u64;
    let claims = json!({
        "id": user_id.to_string(),
        "iat": now,
        "exp": now + 3600,
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Build an authenticated request
pub fn authed_request(method: Method, uri: &str, jwt: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", jwt));

    with_body(builder, body)
}

/// Build a request without credentials
pub fn anonymous_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    with_body(Request::builder().method(method).uri(uri), body)
}

fn with_body(builder: axum::http::request::Builder, body: Option<Value>) -> Request<Body> {
    match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Send one chat turn and return the response body
pub async fn send_turn(app: &TestApp, jwt: &str, message: &str, conversation_id: Option<&str>) -> Result<Value> {
    use tower::ServiceExt;

    let mut payload = json!({ "message": message });
    if let Some(id) = conversation_id {
        payload["conversationId"] = json!(id);
    }

    let response = app
        .router()
        .oneshot(authed_request(
            Method::POST,
            "/api/v1/chat/send",
            jwt,
            Some(payload),
        ))
        .await?;
    Ok(parse_body(response).await)
}
