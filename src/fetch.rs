// src/fetch.rs
//! Per-source feed retrieval and parsing.
//!
//! One fetch covers exactly one source and never lets a failure cross the
//! engine boundary unisolated: the engine maps an error to zero entries for
//! that source and moves on.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::sources::Source;
use crate::types::{FeedSource, RawEntry};

/// Per-request HTTP timeout so one unresponsive feed cannot stall a pass.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("energy-news-aggregator/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "dc:date")]
    dc_date: Option<String>,
    description: Option<String>,
    summary: Option<String>,
}

/// ISO-8601 values become the structured timestamp, stored as naive UTC;
/// anything else stays textual for the normalizer's pattern chain.
fn parse_structured(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s.trim()).ok().map(|dt| dt.naive_utc())
}

/// Parse one feed document into raw entries plus the feed-level title.
/// Items without a link carry no identity and are skipped.
pub fn parse_feed(body: &str) -> Result<(Option<String>, Vec<RawEntry>)> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);
    let rss: Rss = from_str(&xml).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let Some(link) = it.link.filter(|l| !l.trim().is_empty()) else {
            continue;
        };
        let published_struct = it
            .dc_date
            .as_deref()
            .or(it.pub_date.as_deref())
            .and_then(parse_structured);
        out.push(RawEntry {
            title: it.title.unwrap_or_default(),
            link,
            summary_html: it.summary.or(it.description).unwrap_or_default(),
            published_text: it.pub_date.unwrap_or_default(),
            published_struct,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("fetch_parse_ms").record(ms);
    counter!("fetch_entries_total").increment(out.len() as u64);
    Ok((rss.channel.title, out))
}

/// Production fetcher: HTTP GET with a shared client, then `parse_feed`.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self { client }
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedSource for HttpFeedFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawEntry>> {
        let resp = self
            .client
            .get(&source.url)
            .send()
            .await
            .with_context(|| format!("GET {}", source.url))?;
        if !resp.status().is_success() {
            anyhow::bail!("HTTP {} from {}", resp.status(), source.url);
        }
        let body = resp.text().await.context("reading feed body")?;

        let (feed_title, entries) =
            parse_feed(&body).with_context(|| format!("parsing feed from {}", source.url))?;
        tracing::debug!(
            source = %source.name,
            feed_title = feed_title.as_deref().unwrap_or("?"),
            entries = entries.len(),
            "fetched feed"
        );
        Ok(entries)
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
