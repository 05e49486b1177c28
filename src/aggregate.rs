// src/aggregate.rs
//! Concurrent fan-out across all registered sources, deduplication by link,
//! and the global chronological merge.

use futures::{stream, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::cmp::Reverse;
use std::collections::HashSet;

use crate::normalize::normalize;
use crate::sources::Registry;
use crate::types::{AggregationResult, FeedSource, NewsItem};

/// Fixed worker-pool size for the fan-out; excess sources queue.
pub const POOL_SIZE: usize = 8;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_entries_total", "Raw entries parsed from feeds.");
        describe_counter!("fetch_errors_total", "Feed fetch/parse failures.");
        describe_counter!("aggregate_items_total", "Items kept after deduplication.");
        describe_counter!("aggregate_dedup_total", "Duplicate links suppressed.");
        describe_counter!(
            "aggregate_date_errors_total",
            "Entries with no parseable timestamp."
        );
        describe_histogram!("fetch_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("aggregate_last_run_ts", "Unix ts of the last completed pass.");
    });
}

/// Run one full aggregation pass over the registry.
///
/// Each source is fetched at most once, concurrently up to `POOL_SIZE`.
/// A failing source reduces coverage but never aborts the pass; it is
/// retried only on the next pass. The first item observed for a link wins,
/// so a mirrored article is attributed to whichever source completed first.
pub async fn aggregate(registry: &Registry, fetcher: &dyn FeedSource) -> AggregationResult {
    ensure_metrics_described();
    let t0 = std::time::Instant::now();

    let fetches: Vec<_> = registry
        .sources
        .iter()
        .map(|source| async move { (source, fetcher.fetch(source).await) })
        .collect();

    let mut outcomes = stream::iter(fetches).buffer_unordered(POOL_SIZE);

    // Single consumer owns the seen-set and the result vector; fetch tasks
    // share nothing mutable.
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut items: Vec<NewsItem> = Vec::new();
    let mut duplicates = 0usize;
    let mut failed_sources = 0usize;

    while let Some((source, outcome)) = outcomes.next().await {
        match outcome {
            Ok(entries) => {
                for raw in &entries {
                    if !seen_links.insert(raw.link.clone()) {
                        duplicates += 1;
                        continue;
                    }
                    items.push(normalize(raw, source));
                }
            }
            Err(e) => {
                tracing::warn!(source = %source.name, error = ?e, "feed fetch failed");
                counter!("fetch_errors_total").increment(1);
                failed_sources += 1;
            }
        }
    }

    // Sorting happens only after every task joined, so the final order is
    // deterministic regardless of completion order. `None` sorts below any
    // real timestamp; `Reverse` puts those items at the tail.
    items.sort_by_key(|item| Reverse(item.published_at));

    counter!("aggregate_items_total").increment(items.len() as u64);
    counter!("aggregate_dedup_total").increment(duplicates as u64);
    gauge!("aggregate_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    tracing::info!(
        items = items.len(),
        duplicates,
        failed_sources,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "aggregation pass complete"
    );

    AggregationResult {
        items,
        duplicates,
        failed_sources,
    }
}
