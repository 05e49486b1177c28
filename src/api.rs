// src/api.rs
use std::sync::{Arc, RwLock};

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregate;
use crate::filter::FilterSpec;
use crate::sources::Registry;
use crate::types::{AggregationResult, FeedSource, NewsItem};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub fetcher: Arc<dyn FeedSource>,
    pub result: Arc<RwLock<AggregationResult>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/catalog", get(catalog))
        .route("/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct NewsQuery {
    /// Comma-separated source names.
    sources: Option<String>,
    /// Comma-separated keywords; compound keywords in display form.
    keywords: Option<String>,
    /// Free-text filter.
    q: Option<String>,
}

fn split_csv(v: Option<String>) -> Vec<String> {
    v.map(|s| {
        s.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

async fn news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Json<Vec<NewsItem>> {
    let spec = FilterSpec {
        sources: split_csv(q.sources),
        keywords: split_csv(q.keywords),
        text: q.q.unwrap_or_default(),
    };

    let guard = state.result.read().expect("result rwlock poisoned");
    let visible = guard
        .items
        .iter()
        .filter(|item| spec.matches(item, &state.registry.keyword_aliases))
        .cloned()
        .collect();
    Json(visible)
}

#[derive(serde::Serialize)]
struct CatalogResp {
    sources: Vec<String>,
    keywords: Vec<String>,
}

async fn catalog(State(state): State<AppState>) -> Json<CatalogResp> {
    Json(CatalogResp {
        sources: state.registry.source_names(),
        keywords: state.registry.keywords.clone(),
    })
}

#[derive(serde::Serialize)]
struct RefreshResp {
    items: usize,
    duplicates: usize,
    failed_sources: usize,
}

/// Run a fresh aggregation pass and swap it into shared state. The previous
/// result stays visible until the new pass has fully completed.
async fn refresh(State(state): State<AppState>) -> Json<RefreshResp> {
    let pass = aggregate::aggregate(&state.registry, state.fetcher.as_ref()).await;
    let resp = RefreshResp {
        items: pass.items.len(),
        duplicates: pass.duplicates,
        failed_sources: pass.failed_sources,
    };
    *state.result.write().expect("result rwlock poisoned") = pass;
    Json(resp)
}
