// src/normalize.rs
//! Entry normalization: HTML-laden summaries to plain text, heterogeneous
//! date formats and timezones to one fixed target offset.
//!
//! Pure per-entry transformation; a date-resolution failure degrades the
//! item (timestamp absent, display "Unknown") instead of dropping it.

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::sources::{Source, TimeBasis};
use crate::types::{NewsItem, RawEntry};

/// Every timestamp is rendered and sorted at this fixed offset, regardless
/// of what the source reported.
pub const TARGET_OFFSET_SECS: i32 = 2 * 3600;

/// Render format for `published_display`.
const DISPLAY_FORMAT: &str = "%a, %d %b %Y %H:%M";

pub fn target_offset() -> FixedOffset {
    FixedOffset::east_opt(TARGET_OFFSET_SECS).unwrap()
}

/// Zone abbreviations accepted in textual dates: the RFC-822 set plus the
/// central European pair the feeds actually emit.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("UT", 0),
    ("GMT", 0),
    ("UTC", 0),
    ("Z", 0),
    ("CET", 3_600),
    ("CEST", 7_200),
    ("EST", -5 * 3_600),
    ("EDT", -4 * 3_600),
    ("CST", -6 * 3_600),
    ("CDT", -5 * 3_600),
    ("MST", -7 * 3_600),
    ("MDT", -6 * 3_600),
    ("PST", -8 * 3_600),
    ("PDT", -7 * 3_600),
];

enum Pattern {
    /// Numeric offset inside the string (`%z`).
    Aware(&'static str),
    /// Trailing zone abbreviation, resolved through `ZONE_OFFSETS`.
    NamedZone(&'static str),
    /// No zone at all; read as wall time at the target offset.
    Naive(&'static str),
}

/// Tried in order; first match wins.
const DATE_PATTERNS: &[Pattern] = &[
    Pattern::Aware("%a, %d %b %Y %H:%M:%S %z"),
    Pattern::NamedZone("%a, %d %b %Y %H:%M:%S"),
    Pattern::Naive("%a, %d %b %Y %H:%M:%S"),
    Pattern::NamedZone("%a, %d %b %Y %H:%M"),
    Pattern::Naive("%a, %d %b %Y %H:%M"),
    Pattern::Naive("%d/%m/%Y - %H:%M"),
];

/// Strip image tags and comment blocks, strip all remaining markup, and
/// decode HTML entities, yielding plain text.
pub fn clean_html(html: &str) -> String {
    static RE_IMG: OnceCell<Regex> = OnceCell::new();
    static RE_COMMENT: OnceCell<Regex> = OnceCell::new();
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_img = RE_IMG.get_or_init(|| Regex::new(r"(?i)<img[^>]*>").unwrap());
    let re_comment = RE_COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"</?[^>]+>").unwrap());

    let out = html_escape::decode_html_entities(html).to_string();
    let out = re_img.replace_all(&out, "");
    let out = re_comment.replace_all(&out, "");
    let out = re_tags.replace_all(&out, "");
    out.trim().to_string()
}

/// Some feeds concatenate a teaser and a body with a run of blank lines;
/// fold the two passages into one sentence-separated string.
fn fold_passages(text: &str) -> String {
    if text.contains("\n\n\n\n") {
        let mut parts = text.split("\n\n\n\n");
        let teaser = parts.next().unwrap_or_default();
        let body = parts.next().unwrap_or_default();
        format!("{teaser}. {body}")
    } else {
        text.to_string()
    }
}

/// Parse a textual publication date against the ordered pattern list.
///
/// A leading two-or-three-letter day abbreviation followed by `., ` is
/// stripped first: Polish feeds prefix a translated weekday
/// ("pon., Wed, 05 Jun 2024 ...") that no pattern expects.
pub fn parse_published(text: &str) -> Result<DateTime<FixedOffset>> {
    static RE_DAY_PREFIX: OnceCell<Regex> = OnceCell::new();
    let re_prefix = RE_DAY_PREFIX.get_or_init(|| Regex::new(r"(?i)^[a-z]{2,3}\.,\s").unwrap());
    let text = re_prefix.replace(text.trim(), "").to_string();

    for pattern in DATE_PATTERNS {
        match pattern {
            Pattern::Aware(fmt) => {
                if let Ok(dt) = DateTime::parse_from_str(&text, fmt) {
                    return Ok(dt.with_timezone(&target_offset()));
                }
            }
            Pattern::NamedZone(fmt) => {
                if let Some((head, zone)) = text.rsplit_once(' ') {
                    if let Some((_, secs)) = ZONE_OFFSETS
                        .iter()
                        .find(|(abbrev, _)| abbrev.eq_ignore_ascii_case(zone))
                    {
                        if let Ok(naive) = NaiveDateTime::parse_from_str(head, fmt) {
                            if let Some(offset) = FixedOffset::east_opt(*secs) {
                                if let Some(dt) = offset.from_local_datetime(&naive).single() {
                                    return Ok(dt.with_timezone(&target_offset()));
                                }
                            }
                        }
                    }
                }
            }
            Pattern::Naive(fmt) => {
                if let Ok(naive) = NaiveDateTime::parse_from_str(&text, fmt) {
                    if let Some(dt) = target_offset().from_local_datetime(&naive).single() {
                        return Ok(dt);
                    }
                }
            }
        }
    }

    Err(anyhow!("time data {text:?} does not match any known format"))
}

/// Resolve the publication instant for one raw entry.
///
/// A structured timestamp wins and is read per the source's declared time
/// basis; otherwise the raw text goes through the pattern list.
fn resolve_published(raw: &RawEntry, source: &Source) -> Result<DateTime<FixedOffset>> {
    if let Some(naive) = raw.published_struct {
        let dt = match source.time_basis {
            TimeBasis::Utc => Utc.from_utc_datetime(&naive).with_timezone(&target_offset()),
            TimeBasis::Local => target_offset()
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| anyhow!("ambiguous local timestamp"))?,
        };
        return Ok(dt);
    }
    parse_published(&raw.published_text)
}

/// Normalize one raw entry into a `NewsItem`.
pub fn normalize(raw: &RawEntry, source: &Source) -> NewsItem {
    let summary = fold_passages(&clean_html(&raw.summary_html));

    let (published_at, published_display) = match resolve_published(raw, source) {
        Ok(dt) => (Some(dt), dt.format(DISPLAY_FORMAT).to_string()),
        Err(e) => {
            tracing::warn!(source = %source.name, error = %e, "unparseable publication date");
            counter!("aggregate_date_errors_total").increment(1);
            (None, "Unknown".to_string())
        }
    };

    NewsItem {
        title: raw.title.clone(),
        link: raw.link.clone(),
        published_at,
        published_display,
        summary,
        source: source.name.clone(),
    }
}
