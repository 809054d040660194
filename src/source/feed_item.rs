//! The normalised feed entry shared by the RSS and Atom readers.
//!
//! Both feed formats are converted into `FeedEntry`s so that the incident
//! rules (recency window, report threshold, keyword colour) are written once.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single feed entry, reduced to what the incident rules look at.
///
/// ## Sorting
///
/// `FeedEntry` implements [`Ord`] for **reverse-chronological** ordering:
/// newer entries sort before older ones, and undated entries sort last.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedEntry {
    /// Headline; `(untitled)` when the feed omits it.
    pub title: String,

    /// Optional longer description or summary text.
    pub summary: Option<String>,

    /// Publication (or last update) timestamp.
    pub published: Option<DateTime<Utc>>,
}

impl Ord for FeedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that `Some(newer) > Some(older)` gives newest-first.
        // `None` is less than `Some(_)`, so undated entries sink to the bottom.
        other.published.cmp(&self.published)
    }
}

impl PartialOrd for FeedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse a feed date.  RSS uses RFC 2822, Atom uses RFC 3339; plenty of RSS
/// feeds use the latter anyway, so both are accepted everywhere.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
