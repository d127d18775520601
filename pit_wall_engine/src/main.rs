use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod api;
mod cache;
mod config;
mod error;
#[cfg(test)]
mod fixtures;
mod source;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::EngineConfig::from_env()?;
    let cache_dir = cache::init_cache_dir(&cfg.cache_dir)?;

    let store = source::DiskSessionStore::new(cache_dir);
    let app = api::router(api::AppState::new(Arc::new(store)));

    tracing::info!("pit wall data engine listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
