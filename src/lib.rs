// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod fetch;
pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod sources;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::aggregate;
pub use crate::api::{create_router, AppState};
pub use crate::filter::FilterSpec;
pub use crate::sources::{Registry, Source, TimeBasis};
pub use crate::types::{AggregationResult, FeedSource, NewsItem, RawEntry};
