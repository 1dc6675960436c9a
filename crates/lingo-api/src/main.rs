//! Binary entrypoint for the Lingo API server.
use anyhow::Context;
use lingo_api::{run, AppState, HttpProvider, HttpProviderConfig};
use lingo_core::{EngineConfig, ProviderRegistry};
use lingo_engine::CoordinationEngine;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("LINGO_CONFIG") {
        Ok(path) => EngineConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => EngineConfig::default(),
    }
    .apply_env()?;

    let provider_config = HttpProviderConfig::from_env();
    if provider_config.endpoint.is_none() {
        tracing::warn!("LINGO_LLM_URL is not set; every capability will report unavailable");
    }
    let provider = Arc::new(HttpProvider::new(provider_config)?);
    let registry = ProviderRegistry::new()
        .with_text_generator(provider.clone())
        .with_summarizer(provider.clone())
        .with_translator(provider.clone())
        .with_writer(provider);

    let engine = CoordinationEngine::new(registry, config)?;
    let state = AppState::new(engine)?;

    // Default listen address can be overridden with LINGO_ADDR
    let addr = std::env::var("LINGO_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    run(&addr, state).await?;
    Ok(())
}
