// src/filter.rs
//! Visibility predicate over an aggregation result.
//!
//! Pure and side-effect free, so the same rules can run server-side before
//! transmission or client-side on UI interaction without re-fetching.

use std::collections::HashMap;

use crate::types::NewsItem;

/// Caller-supplied selection. Empty fields do not constrain.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub text: String,
}

impl FilterSpec {
    /// True iff the item passes all three rules. Each rule is an OR across
    /// its own selection and trivially true when the selection is empty.
    pub fn matches(&self, item: &NewsItem, aliases: &HashMap<String, Vec<String>>) -> bool {
        let title = item.title.to_lowercase();
        let summary = item.summary.to_lowercase();
        let source = item.source.to_lowercase();

        let source_ok = self.sources.is_empty()
            || self
                .sources
                .iter()
                .any(|s| source.contains(&s.to_lowercase()));

        let keyword_ok = self.keywords.is_empty()
            || self
                .keywords
                .iter()
                .flat_map(|k| expand_keyword(k, aliases))
                .any(|k| title.contains(&k) || summary.contains(&k));

        let text = self.text.to_lowercase();
        let text_ok = text.is_empty() || title.contains(&text) || summary.contains(&text);

        source_ok && keyword_ok && text_ok
    }
}

/// Expand one selected keyword through the alias table. A compound keyword
/// such as "ccs/ccus" stands for its aliased tokens; anything else matches
/// on itself.
fn expand_keyword(keyword: &str, aliases: &HashMap<String, Vec<String>>) -> Vec<String> {
    let lower = keyword.to_lowercase();
    match aliases.get(&lower) {
        Some(tokens) => tokens.iter().map(|t| t.to_lowercase()).collect(),
        None => vec![lower],
    }
}
