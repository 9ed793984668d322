// Chatbot API - Local Development Server

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use chatbot_app::{connect_storage, create_app, with_middleware};
use chatbot_common::config::Config;
use chatbot_llm::{LlmConfig, LlmServiceFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .init();

    info!("Starting Chatbot API local development server");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(storage = %config.storage_provider, "Configuration loaded successfully");

    let llm_config = LlmConfig::from_env().map_err(|e| {
        error!("Failed to load model configuration: {}", e);
        anyhow::anyhow!("Model configuration failed: {}", e)
    })?;
    let llm = LlmServiceFactory::create(llm_config).map_err(|e| {
        error!("Failed to create model client: {}", e);
        anyhow::anyhow!("Model client creation failed: {}", e)
    })?;

    let storage = connect_storage(&config).await.map_err(|e| {
        error!("Failed to open storage: {}", e);
        e
    })?;

    let app = create_app(&config, storage, Arc::from(llm));
    let app = with_middleware(app, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Server starting on http://{}", addr);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
