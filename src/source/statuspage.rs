//! JSON status APIs.
//!
//! Handles both the flat `{"status": "operational"}` shape and Atlassian
//! Statuspage's `status.json`:
//!
//! ```json
//! {"status": {"indicator": "minor", "description": "Partially Degraded Service"}}
//! ```
//!
//! Other vendors are reached through `status_pointer` / `message_pointer`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::StatusSource;
use crate::error::ParseError;
use crate::registry::ParseHints;
use crate::status::{Assessment, Indicator};

/// JSON status-page API.
pub struct Statuspage;

impl Statuspage {
    /// Map a vendor status word onto an indicator.
    pub fn classify(status: &str) -> Indicator {
        match status.trim().to_ascii_lowercase().as_str() {
            "operational" | "none" | "ok" | "up" | "normal" => Indicator::Green,
            "degraded_performance" | "degraded" | "partial_outage" | "minor"
            | "under_maintenance" | "maintenance" | "active" => Indicator::Yellow,
            "major_outage" | "major" | "critical" | "down" | "outage" => Indicator::Red,
            _ => Indicator::Unknown,
        }
    }
}

impl StatusSource for Statuspage {
    fn assess(
        &self,
        body: &[u8],
        hints: &ParseHints,
        _now: DateTime<Utc>,
    ) -> Result<Assessment, ParseError> {
        let doc: Value = serde_json::from_slice(body)?;

        let status = match hints.status_pointer.as_deref() {
            Some(pointer) => string_at(&doc, pointer)?,
            None => match doc.get("status") {
                Some(Value::String(s)) => s.as_str(),
                Some(Value::Object(_)) => string_at(&doc, "/status/indicator")?,
                Some(_) => return Err(ParseError::InvalidShape("status is not a string".into())),
                None => return Err(ParseError::MissingField("/status".into())),
            },
        };

        let description = match hints.message_pointer.as_deref() {
            Some(pointer) => doc.pointer(pointer).and_then(Value::as_str),
            None => doc.pointer("/status/description").and_then(Value::as_str),
        };

        let indicator = Self::classify(status);
        let message = if indicator == Indicator::Unknown {
            format!("unrecognized status \"{status}\"")
        } else {
            description.unwrap_or(status).to_string()
        };
        Ok(Assessment::new(indicator, message))
    }
}

fn string_at<'a>(doc: &'a Value, pointer: &str) -> Result<&'a str, ParseError> {
    doc.pointer(pointer)
        .ok_or_else(|| ParseError::MissingField(pointer.to_string()))?
        .as_str()
        .ok_or_else(|| ParseError::InvalidShape(format!("{pointer} is not a string")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(body: &str) -> Result<Assessment, ParseError> {
        Statuspage.assess(body.as_bytes(), &ParseHints::default(), Utc::now())
    }

    #[test]
    fn operational_is_green() {
        let a = assess(r#"{"status":"operational"}"#).unwrap();
        assert_eq!(a.indicator, Indicator::Green);
        assert_eq!(a.message.as_deref(), Some("operational"));
    }

    #[test]
    fn major_outage_is_red() {
        assert_eq!(assess(r#"{"status":"major_outage"}"#).unwrap().indicator, Indicator::Red);
    }

    #[test]
    fn degraded_performance_is_yellow() {
        assert_eq!(
            assess(r#"{"status":"degraded_performance"}"#).unwrap().indicator,
            Indicator::Yellow
        );
    }

    #[test]
    fn atlassian_shape_uses_indicator_and_description() {
        let a = assess(
            r#"{"page":{"id":"x"},"status":{"indicator":"minor","description":"Partially Degraded Service"}}"#,
        )
        .unwrap();
        assert_eq!(a.indicator, Indicator::Yellow);
        assert_eq!(a.message.as_deref(), Some("Partially Degraded Service"));
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        let a = assess(r#"{"status":"sparkly"}"#).unwrap();
        assert_eq!(a.indicator, Indicator::Unknown);
        assert_eq!(a.message.as_deref(), Some("unrecognized status \"sparkly\""));
    }

    #[test]
    fn vocabulary_is_case_insensitive() {
        assert_eq!(Statuspage::classify("Major_Outage"), Indicator::Red);
        assert_eq!(Statuspage::classify(" OK "), Indicator::Green);
    }

    #[test]
    fn pointer_hints_override_defaults() {
        let hints = ParseHints::default()
            .status_pointer("/health/state")
            .message_pointer("/health/note");
        let body = br#"{"health":{"state":"down","note":"Datacenter fire"}}"#;
        let a = Statuspage.assess(body, &hints, Utc::now()).unwrap();
        assert_eq!(a.indicator, Indicator::Red);
        assert_eq!(a.message.as_deref(), Some("Datacenter fire"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(assess("{not json"), Err(ParseError::Json(_))));
    }

    #[test]
    fn missing_status_is_a_parse_error() {
        assert!(matches!(assess(r#"{"page":{}}"#), Err(ParseError::MissingField(_))));
        assert!(matches!(assess(r#"{"status":42}"#), Err(ParseError::InvalidShape(_))));
    }
}
