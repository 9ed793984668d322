//! Chatbot API - AWS Lambda Runtime

use std::sync::Arc;

use lambda_http::{run, Error};
use tracing::info;

use chatbot_app::{connect_storage, create_app, with_middleware};
use chatbot_common::config::Config;
use chatbot_llm::{LlmConfig, LlmServiceFactory};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Chatbot API Lambda");

    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let llm_config =
        LlmConfig::from_env().map_err(|e| Error::from(format!("Model configuration error: {}", e)))?;
    let llm = LlmServiceFactory::create(llm_config)
        .map_err(|e| Error::from(format!("Model client error: {}", e)))?;

    let storage = connect_storage(&config)
        .await
        .map_err(|e| Error::from(format!("Storage error: {}", e)))?;

    let app = create_app(&config, storage, Arc::from(llm));
    let app = with_middleware(app, &config);

    info!("Chatbot API Lambda ready to serve requests");

    run(app).await
}
