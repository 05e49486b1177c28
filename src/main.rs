//! Energy News Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::{Arc, RwLock};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use energy_news_aggregator::aggregate::{aggregate, POOL_SIZE};
use energy_news_aggregator::api::{create_router, AppState};
use energy_news_aggregator::fetch::HttpFeedFetcher;
use energy_news_aggregator::metrics::Metrics;
use energy_news_aggregator::sources::Registry;
use energy_news_aggregator::types::FeedSource;

const DEFAULT_REGISTRY_PATH: &str = "config/sources.json";
const ENV_REGISTRY_PATH: &str = "NEWS_SOURCES_PATH";
const ENV_BIND_ADDR: &str = "NEWS_BIND_ADDR";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("energy_news_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let path =
        std::env::var(ENV_REGISTRY_PATH).unwrap_or_else(|_| DEFAULT_REGISTRY_PATH.to_string());
    let registry = Arc::new(Registry::load_from_file(&path));
    tracing::info!(sources = registry.sources.len(), config = %path, "registry loaded");

    let metrics = Metrics::init(POOL_SIZE);
    let fetcher: Arc<dyn FeedSource> = Arc::new(HttpFeedFetcher::new());

    // First pass up front so /news has content before the first refresh.
    let initial = aggregate(&registry, fetcher.as_ref()).await;

    let state = AppState {
        registry,
        fetcher,
        result: Arc::new(RwLock::new(initial)),
    };

    let router = create_router(state).merge(metrics.router());

    let addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
