//! The result type shared by the poller and both renderers.
//!
//! Every source kind converts its native payload into an [`Assessment`]; the
//! poller stamps it with the provider name and fetch time to produce a
//! [`StatusResult`].  Results live for one poll pass and are then dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::registry::ProviderKind;

/// Health signal for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl Indicator {
    pub fn as_str(self) -> &'static str {
        match self {
            Indicator::Green => "green",
            Indicator::Yellow => "yellow",
            Indicator::Red => "red",
            Indicator::Unknown => "unknown",
        }
    }

    /// Short human label used by both renderers.
    pub fn label(self) -> &'static str {
        match self {
            Indicator::Green => "Operational",
            Indicator::Yellow => "Degraded",
            Indicator::Red => "Outage",
            Indicator::Unknown => "Unknown",
        }
    }

    /// All variants, in the order the summary line shows them.
    pub const ALL: [Indicator; 4] = [
        Indicator::Green,
        Indicator::Yellow,
        Indicator::Red,
        Indicator::Unknown,
    ];
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a parser concluded from one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub indicator: Indicator,
    pub message: Option<String>,
}

impl Assessment {
    pub fn new(indicator: Indicator, message: impl Into<String>) -> Self {
        Self {
            indicator,
            message: Some(message.into()),
        }
    }
}

/// One row of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResult {
    pub provider_name: String,
    pub kind: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub indicator: Indicator,
    pub message: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Count results per indicator, in [`Indicator::ALL`] order.
pub fn tally(results: &[StatusResult]) -> [(Indicator, usize); 4] {
    Indicator::ALL.map(|ind| (ind, results.iter().filter(|r| r.indicator == ind).count()))
}
