//! News Aggregation Service — Binary Entrypoint
//! Boots the Axum HTTP server, the source registry, and the scheduler loop.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mena_news_aggregator::aggregator::Aggregator;
use mena_news_aggregator::api::{self, AppState};
use mena_news_aggregator::config::AggregatorConfig;
use mena_news_aggregator::fetch::build_fetchers;
use mena_news_aggregator::metrics::Metrics;
use mena_news_aggregator::scheduler::spawn_scheduler;
use mena_news_aggregator::sources::SourceRegistry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mena_news_aggregator=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This supplies the
    // provider API keys (NEWSAPI_KEY, GNEWS_KEY, NEWSDATA_KEY).
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AggregatorConfig::load_default()?;
    let metrics = Metrics::init(config.store_cap);

    let registry = SourceRegistry::from_env();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let fetchers = build_fetchers(&registry, &client);
    tracing::info!(sources = fetchers.len(), "source adapters ready");

    let tick_secs = config.tick_secs;
    let aggregator = Arc::new(Aggregator::new(registry, fetchers, config));
    let scheduler = spawn_scheduler(aggregator.clone(), tick_secs);

    let state = AppState { aggregator };
    let router = api::create_router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Tear the scheduler down explicitly so a run in flight finishes.
    scheduler.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
