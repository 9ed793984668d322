//! Chatbot application composition root
//!
//! Wires storage, authentication and the model client into the domain
//! routers and adds the shared HTTP middleware.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower::{util::MapResponseLayer, ServiceBuilder};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use chatbot_auth::{AccountStore, AuthBackend, AuthConfig, InMemoryAccountStore, PgAccountStore};
use chatbot_common::config::Config;
use chatbot_common::response::error_response;
use chatbot_conversations::{
    ChatService, ChatSettings, ConversationsRepositories, ConversationsState, InMemoryStore,
};
use chatbot_llm::LlmService;

/// Maximum accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Local web clients always allowed by CORS
const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Backing store for conversations and accounts
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory {
        conversations: InMemoryStore,
        accounts: InMemoryAccountStore,
    },
}

impl Storage {
    /// Empty in-process storage
    pub fn memory(accounts: InMemoryAccountStore) -> Self {
        Storage::Memory {
            conversations: InMemoryStore::new(),
            accounts,
        }
    }
}

/// Open the storage selected by `STORAGE_PROVIDER`, running migrations for Postgres
pub async fn connect_storage(config: &Config) -> anyhow::Result<Storage> {
    match config.storage_provider.as_str() {
        "postgres" => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres storage"))?;

            let pool = PgPool::connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;
            sqlx::migrate!("../../migrations").run(&pool).await?;

            tracing::info!("Database connection established");
            Ok(Storage::Postgres(pool))
        }
        "memory" => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Storage::memory(InMemoryAccountStore::provisioning()))
        }
        other => Err(anyhow::anyhow!("Unsupported STORAGE_PROVIDER: {}", other)),
    }
}

/// Create the main application router with all routes
pub fn create_app(config: &Config, storage: Storage, llm: Arc<dyn LlmService>) -> Router {
    let (repos, accounts) = match storage {
        Storage::Postgres(pool) => {
            let accounts: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
            (ConversationsRepositories::new(pool), accounts)
        }
        Storage::Memory {
            conversations,
            accounts,
        } => {
            let accounts: Arc<dyn AccountStore> = Arc::new(accounts);
            (ConversationsRepositories::in_memory(conversations), accounts)
        }
    };

    let state = ConversationsState {
        chat: ChatService::new(repos, llm, ChatSettings::from_config(config)),
        auth: AuthBackend::new(accounts, AuthConfig::from_config(config)),
    };

    let api = chatbot_conversations::routes()
        .with_state(state)
        .route("/", get(api_index));

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .nest("/api/v1", api)
        .fallback(route_not_found)
}

/// Add tracing, CORS and the body size limit
pub fn with_middleware(app: Router, config: &Config) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer(config.frontend_url.as_deref()))
            .layer(MapResponseLayer::new(IntoResponse::into_response))
            .layer(body_limit_layer())
            .into_inner(),
    )
}

/// CORS allow-list: local dev origins plus the configured frontend
pub fn build_cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = DEV_ORIGINS
        .iter()
        .copied()
        .map(HeaderValue::from_static)
        .collect();

    if let Some(url) = frontend_url {
        match HeaderValue::from_str(url.trim_end_matches('/')) {
            Ok(origin) => origins.push(origin),
            Err(e) => tracing::warn!(origin = %url, error = %e, "Ignoring invalid FRONTEND_URL"),
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Chatbot API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn api_index() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Chatbot API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/api/v1/chat",
            "conversations": "/api/v1/conversations",
        },
    }))
}

async fn route_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found", None).into_response()
}
