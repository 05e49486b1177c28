// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /news (full list + filter query params)
// - GET /catalog
// - POST /refresh

use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use energy_news_aggregator::api::{create_router, AppState};
use energy_news_aggregator::normalize::parse_published;
use energy_news_aggregator::sources::{Registry, Source};
use energy_news_aggregator::types::{AggregationResult, FeedSource, NewsItem, RawEntry};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct CannedFeed;

#[async_trait]
impl FeedSource for CannedFeed {
    async fn fetch(&self, _source: &Source) -> Result<Vec<RawEntry>> {
        Ok(vec![RawEntry {
            title: "Nowy blok gazowy".to_string(),
            link: "https://example.test/blok".to_string(),
            summary_html: "<p>Opis inwestycji</p>".to_string(),
            published_text: "Wed, 05 Jun 2024 14:30:00 +0200".to_string(),
            published_struct: None,
        }])
    }
}

fn item(title: &str, summary: &str, source: &str, published: &str) -> NewsItem {
    let dt = parse_published(published).expect("test date");
    NewsItem {
        title: title.to_string(),
        link: format!("https://example.test/{}", title.replace(' ', "-")),
        published_at: Some(dt),
        published_display: dt.format("%a, %d %b %Y %H:%M").to_string(),
        summary: summary.to_string(),
        source: source.to_string(),
    }
}

/// Build the same Router the binary uses, around a pre-seeded result.
fn test_router(items: Vec<NewsItem>) -> Router {
    let state = AppState {
        registry: Arc::new(Registry::default_seed()),
        fetcher: Arc::new(CannedFeed),
        result: Arc::new(RwLock::new(AggregationResult {
            items,
            duplicates: 0,
            failed_sources: 0,
        })),
    };
    create_router(state)
}

fn seeded_items() -> Vec<NewsItem> {
    vec![
        item(
            "Orlen kupuje farmy",
            "przejęcie aktywów offshore",
            "WNP",
            "Wed, 05 Jun 2024 14:30:00 +0200",
        ),
        item(
            "Nowe moce CCUS",
            "instalacja wychwytu dwutlenku węgla",
            "Biznes Alert",
            "Wed, 05 Jun 2024 10:00:00 +0200",
        ),
    ]
}

async fn get_json(app: Router, uri: &str) -> Json {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    assert!(
        resp.status().is_success(),
        "GET {uri} should be 2xx, got {}",
        resp.status()
    );
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(Vec::new());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_news_serializes_the_item_contract() {
    let v = get_json(test_router(seeded_items()), "/news").await;

    let arr = v.as_array().expect("news must be an array");
    assert_eq!(arr.len(), 2);

    // Contract checks for UI consumers
    let first = &arr[0];
    for field in [
        "title",
        "link",
        "published_at",
        "published_display",
        "summary",
        "source",
    ] {
        assert!(first.get(field).is_some(), "missing '{field}'");
    }
    let published = first["published_at"].as_str().expect("ISO-8601 string");
    assert!(published.starts_with("2024-06-05T14:30:00"));
}

#[tokio::test]
async fn api_news_applies_keyword_filter() {
    let v = get_json(test_router(seeded_items()), "/news?keywords=orlen").await;
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Orlen kupuje farmy");
}

#[tokio::test]
async fn api_news_expands_compound_keywords() {
    // The seed registry aliases "ccs/ccus" to both halves.
    let v = get_json(test_router(seeded_items()), "/news?keywords=ccs/ccus").await;
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Nowe moce CCUS");
}

#[tokio::test]
async fn api_news_combines_source_and_text_filters() {
    let v = get_json(test_router(seeded_items()), "/news?sources=wnp&q=offshore").await;
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["source"], "WNP");

    let none = get_json(test_router(seeded_items()), "/news?sources=wnp&q=ccus").await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn api_catalog_lists_sources_and_keywords() {
    let v = get_json(test_router(Vec::new()), "/catalog").await;

    let sources = v["sources"].as_array().expect("sources array");
    assert_eq!(sources.len(), 35);
    assert!(sources.iter().any(|s| s == "Energetyka24"));

    let keywords = v["keywords"].as_array().expect("keywords array");
    assert!(keywords.iter().any(|k| k == "ccs/ccus"));
}

#[tokio::test]
async fn api_refresh_swaps_in_a_fresh_pass() {
    let app = test_router(Vec::new());

    let before = get_json(app.clone(), "/news").await;
    assert!(before.as_array().unwrap().is_empty());

    let req = Request::builder()
        .method("POST")
        .uri("/refresh")
        .body(Body::empty())
        .expect("build POST /refresh");
    let resp = app.clone().oneshot(req).await.expect("oneshot /refresh");
    assert!(resp.status().is_success());

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse refresh json");
    // One canned entry per registered source, all sharing one link.
    assert_eq!(v["items"], 1);
    assert_eq!(v["duplicates"], 34);

    let after = get_json(app, "/news").await;
    let arr = after.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Nowy blok gazowy");
}
