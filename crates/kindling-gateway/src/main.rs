mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;

use crate::app::App;
use crate::cli::CLI;
use crate::state::AppState;
use clap::Parser;
use kindling_aggregator::{AggregatorConfig, AggregatorService};
use kindling_cache::MemoryTtlCache;
use kindling_client::HnClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CLI::try_parse()?;

    info!(
        listen_addr = %config.listen_addr,
        upstream_base_url = %config.upstream_base_url,
        max_concurrent_fetches = config.max_concurrent_fetches,
        "starting kindling gateway"
    );

    let client = HnClient::with_config(
        config.upstream_base_url.as_str(),
        Duration::from_secs(config.upstream_timeout_secs),
    )?;
    let engine = AggregatorService::new(
        client,
        MemoryTtlCache::new(),
        MemoryTtlCache::new(),
        AggregatorConfig::builder()
            .ids_ttl(Duration::from_secs(config.ids_ttl_secs))
            .story_ttl(Duration::from_secs(config.story_ttl_secs))
            .max_concurrent_fetches(config.max_concurrent_fetches)
            .build(),
    );
    let state = AppState::new(Arc::new(engine));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");
    axum::serve(listener, App::router(state)).await?;

    Ok(())
}
