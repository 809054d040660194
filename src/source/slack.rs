//! Chat message logs (Slack webhook / channel proxies).
//!
//! There is no single API shape for "a channel where the vendor posts
//! incidents", so this is a configurable fetch-and-match strategy: find the
//! message array, keep the recent messages, colour by keyword.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use super::keywords::Keywords;
use super::{default_window, is_recent, StatusSource, ALL_CLEAR};
use crate::error::ParseError;
use crate::registry::ParseHints;
use crate::status::{Assessment, Indicator};

const DEFAULT_MESSAGES_POINTER: &str = "/messages";
const DEFAULT_TEXT_FIELD: &str = "text";
const DEFAULT_TIME_FIELD: &str = "ts";

/// JSON message log matched against incident keywords.
pub struct SlackLog;

impl StatusSource for SlackLog {
    fn assess(
        &self,
        body: &[u8],
        hints: &ParseHints,
        now: DateTime<Utc>,
    ) -> Result<Assessment, ParseError> {
        let doc: Value = serde_json::from_slice(body)?;
        let pointer = hints
            .messages_pointer
            .as_deref()
            .unwrap_or(DEFAULT_MESSAGES_POINTER);

        let messages = match &doc {
            Value::Array(items) => items,
            _ => doc
                .pointer(pointer)
                .ok_or_else(|| ParseError::MissingField(pointer.to_string()))?
                .as_array()
                .ok_or_else(|| ParseError::InvalidShape(format!("{pointer} is not an array")))?,
        };

        let text_field = hints.text_field.as_deref().unwrap_or(DEFAULT_TEXT_FIELD);
        let time_field = hints.time_field.as_deref().unwrap_or(DEFAULT_TIME_FIELD);
        let window = hints.window.unwrap_or_else(default_window);
        let keywords = Keywords::from_hints(hints)?;

        // (timestamp, text, colour) for every recent message that matched.
        let mut hits: Vec<(DateTime<Utc>, &str, Indicator)> = messages
            .iter()
            .filter_map(|msg| {
                let at = msg.get(time_field).and_then(parse_timestamp)?;
                if !is_recent(at, now, window) {
                    return None;
                }
                let text = msg.get(text_field)?.as_str()?;
                keywords.classify(text).map(|ind| (at, text, ind))
            })
            .collect();

        if hits.is_empty() {
            return Ok(Assessment::new(Indicator::Green, ALL_CLEAR));
        }

        hits.sort_by(|a, b| b.0.cmp(&a.0));
        let indicator = if hits.iter().any(|h| h.2 == Indicator::Red) {
            Indicator::Red
        } else {
            Indicator::Yellow
        };
        Ok(Assessment::new(indicator, hits[0].1))
    }
}

/// Slack `ts` (`"1700000000.000100"`), bare epoch seconds, or RFC 3339.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => from_epoch(n.as_f64()?),
        Value::String(s) => match s.parse::<f64>() {
            Ok(secs) => from_epoch(secs),
            Err(_) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        },
        _ => None,
    }
}

fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9) as u32;
    Utc.timestamp_opt(whole, nanos).single()
}
