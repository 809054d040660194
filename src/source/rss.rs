//! Incident feeds (RSS 2.0, with an Atom fallback).
//!
//! A feed is read as "the vendor posts an entry when something breaks":
//!
//! * any entry inside the recency window means an active incident, red if
//!   a title hits a red keyword and yellow otherwise;
//! * no recent entries means green.
//!
//! Crowd-report feeds (Outage.Report via RSSHub) set `report_threshold`, so
//! entries with only a handful of user reports are ignored.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use serde::Deserialize;

use super::feed_item::{parse_date, FeedEntry};
use super::keywords::{first_number, Keywords};
use super::{default_window, is_recent, StatusSource, ALL_CLEAR};
use crate::error::ParseError;
use crate::registry::ParseHints;
use crate::status::{Assessment, Indicator};

/// RSS / Atom incident feed.
pub struct RssFeed;

impl RssFeed {
    /// Parse an already-fetched [`rss::Channel`] into [`FeedEntry`]s.
    ///
    /// Pure (no I/O) so tests can exercise it with literal XML.
    pub fn parse_channel(channel: &::rss::Channel) -> Vec<FeedEntry> {
        channel
            .items()
            .iter()
            .map(|item| FeedEntry {
                title: item.title().unwrap_or("(untitled)").to_string(),
                summary: item.description().map(String::from),
                // Unparseable dates degrade to None and the entry is ignored.
                published: item.pub_date().and_then(parse_date),
            })
            .collect()
    }

    /// Read `body` as RSS, falling back to Atom.
    pub fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>, ParseError> {
        match ::rss::Channel::read_from(body) {
            Ok(channel) => Ok(Self::parse_channel(&channel)),
            Err(rss_err) => parse_atom(body)
                .map_err(|atom_err| ParseError::Feed(format!("not RSS ({rss_err}); {atom_err}"))),
        }
    }
}

impl StatusSource for RssFeed {
    fn assess(
        &self,
        body: &[u8],
        hints: &ParseHints,
        now: DateTime<Utc>,
    ) -> Result<Assessment, ParseError> {
        let window = hints.window.unwrap_or_else(default_window);
        let keywords = Keywords::from_hints(hints)?;

        let mut recent: Vec<FeedEntry> = Self::parse_entries(body)?
            .into_iter()
            .filter(|e| e.published.is_some_and(|at| is_recent(at, now, window)))
            .filter(|e| meets_threshold(e, hints.report_threshold))
            .collect();
        recent.sort();

        let Some(newest) = recent.first() else {
            return Ok(Assessment::new(Indicator::Green, ALL_CLEAR));
        };

        let indicator = if recent.iter().any(|e| keywords.is_red(&e.title)) {
            Indicator::Red
        } else {
            Indicator::Yellow
        };
        Ok(Assessment::new(indicator, newest.title.clone()))
    }
}

/// Entries without a readable report count never pass a threshold.
fn meets_threshold(entry: &FeedEntry, threshold: Option<u32>) -> bool {
    let Some(threshold) = threshold else {
        return true;
    };
    first_number(&entry.title)
        .or_else(|| entry.summary.as_deref().and_then(first_number))
        .is_some_and(|count| count >= threshold)
}

// ---------------------------------------------------------------------------
// Atom
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    summary: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

fn parse_atom(body: &[u8]) -> Result<Vec<FeedEntry>, String> {
    let text = std::str::from_utf8(body).map_err(|e| format!("not UTF-8: {e}"))?;
    if !root_is_atom_feed(text) {
        return Err("not Atom (no <feed> root)".into());
    }
    let feed: AtomFeed = quick_xml::de::from_str(text).map_err(|e| format!("bad Atom: {e}"))?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| FeedEntry {
            title: entry
                .title
                .map(|t| t.value)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "(untitled)".to_string()),
            summary: entry.summary.map(|s| s.value),
            published: entry
                .published
                .as_deref()
                .or(entry.updated.as_deref())
                .and_then(parse_date),
        })
        .collect())
}

/// The serde path ignores the root element's name, so check it explicitly
/// before treating arbitrary XML (or HTML error pages) as an empty feed.
fn root_is_atom_feed(text: &str) -> bool {
    let mut reader = quick_xml::Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return e.local_name().as_ref() == b"feed";
            }
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn rss_with(items: &[(&str, DateTime<Utc>)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, at)| {
                format!(
                    "<item><title>{title}</title><pubDate>{}</pubDate></item>",
                    at.to_rfc2822()
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>Status</title>{body}</channel></rss>"#
        )
    }

    fn assess(xml: &str, hints: &ParseHints) -> Assessment {
        RssFeed.assess(xml.as_bytes(), hints, now()).unwrap()
    }

    #[test]
    fn parse_channel_extracts_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>Elevated errors</title>
      <guid>guid-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
      <description>We are investigating.</description>
    </item>
    <item>
      <guid>guid-2</guid>
      <pubDate>not-a-real-date</pubDate>
    </item>
  </channel>
</rss>"#;

        let channel = ::rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = RssFeed::parse_channel(&channel);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Elevated errors");
        assert_eq!(entries[0].summary.as_deref(), Some("We are investigating."));
        assert!(entries[0].published.is_some());
        assert_eq!(entries[1].title, "(untitled)");
        assert!(entries[1].published.is_none());
    }

    #[test]
    fn recent_outage_entry_is_red() {
        let xml = rss_with(&[("Major outage in us-east-1", now() - Duration::minutes(30))]);
        let a = assess(&xml, &ParseHints::default());
        assert_eq!(a.indicator, Indicator::Red);
        assert_eq!(a.message.as_deref(), Some("Major outage in us-east-1"));
    }

    #[test]
    fn recent_entry_without_red_keyword_is_yellow() {
        let xml = rss_with(&[("Increased API latency", now() - Duration::hours(2))]);
        assert_eq!(assess(&xml, &ParseHints::default()).indicator, Indicator::Yellow);
    }

    #[test]
    fn no_recent_entries_is_green() {
        let xml = rss_with(&[
            ("Outage resolved", now() - Duration::hours(30)),
            ("Maintenance", now() - Duration::days(3)),
        ]);
        let a = assess(&xml, &ParseHints::default());
        assert_eq!(a.indicator, Indicator::Green);
        assert_eq!(a.message.as_deref(), Some(ALL_CLEAR));
    }

    #[test]
    fn empty_feed_is_green() {
        assert_eq!(assess(&rss_with(&[]), &ParseHints::default()).indicator, Indicator::Green);
    }

    #[test]
    fn message_is_newest_recent_title() {
        let xml = rss_with(&[
            ("Older degradation", now() - Duration::hours(5)),
            ("Newest update", now() - Duration::minutes(10)),
        ]);
        assert_eq!(
            assess(&xml, &ParseHints::default()).message.as_deref(),
            Some("Newest update")
        );
    }

    #[test]
    fn window_hint_narrows_recency() {
        let xml = rss_with(&[("Outage", now() - Duration::hours(3))]);
        let hints = ParseHints::default().window(Duration::hours(1));
        assert_eq!(assess(&xml, &hints).indicator, Indicator::Green);
    }

    #[test]
    fn report_threshold_filters_quiet_entries() {
        let hints = ParseHints::default().report_threshold(30);

        let quiet = rss_with(&[("Visa: 4 outage reports", now() - Duration::minutes(5))]);
        assert_eq!(assess(&quiet, &hints).indicator, Indicator::Green);

        let loud = rss_with(&[("Visa: 85 outage reports", now() - Duration::minutes(5))]);
        assert_eq!(assess(&loud, &hints).indicator, Indicator::Red);
    }

    #[test]
    fn reads_atom_feeds() {
        let updated = (now() - Duration::minutes(20)).to_rfc3339();
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Vendor Status</title>
  <entry>
    <title type="html">Partial outage of webhooks</title>
    <updated>{updated}</updated>
    <summary>Webhooks are delayed.</summary>
  </entry>
</feed>"#
        );
        let a = assess(&xml, &ParseHints::default());
        assert_eq!(a.indicator, Indicator::Red);
        assert_eq!(a.message.as_deref(), Some("Partial outage of webhooks"));
    }

    #[test]
    fn far_future_entries_are_ignored() {
        let xml = rss_with(&[("Scheduled maintenance", now() + Duration::days(5 * 365))]);
        let a = assess(&xml, &ParseHints::default());
        assert_eq!(a.indicator, Indicator::Green);
        assert_eq!(a.message.as_deref(), Some(ALL_CLEAR));
    }

    #[test]
    fn rejects_non_feed_payloads() {
        let err = RssFeed
            .assess(b"<html><body>502 Bad Gateway</body></html>", &ParseHints::default(), now())
            .unwrap_err();
        assert!(matches!(err, ParseError::Feed(_)));
    }
}
