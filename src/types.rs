// src/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::sources::Source;

/// One feed item as parsed off the wire, before normalization.
/// Ephemeral: consumed immediately by the normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub summary_html: String,
    /// Raw publication date string, e.g. an RFC-822 `pubDate`.
    pub published_text: String,
    /// Structured timestamp, when the feed carried an ISO-8601 date the
    /// parser recognized. Stored as naive UTC; interpretation follows the
    /// source's time basis.
    pub published_struct: Option<NaiveDateTime>,
}

/// The durable entity handed to the presentation layer.
///
/// `link` is the dedup key: globally unique within one aggregation run.
/// `published_at`, when present, is normalized to the fixed target offset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub published_display: String,
    pub summary: String,
    pub source: String,
}

/// Outcome of one full aggregation pass. Items are sorted by publication
/// time descending, entries without a parseable timestamp forming a suffix.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AggregationResult {
    pub items: Vec<NewsItem>,
    pub duplicates: usize,
    pub failed_sources: usize,
}

/// The per-source fetch seam. The production impl speaks HTTP; tests mock it.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawEntry>>;
}
