//! The static provider list.
//!
//! Providers are plain data: a name, a source kind, a URL, and optional
//! parsing hints.  The list is built once at startup and handed to the
//! poller read-only.
//!
//! ## Adding a provider
//!
//! Append a [`ProviderDescriptor`] to [`Registry::builtin`].  Names must be
//! unique; [`Registry::new`] refuses to start otherwise.

use std::collections::HashSet;
use std::fmt;

use chrono::Duration;
use reqwest::Url;
use serde::Serialize;

use crate::error::ConfigError;

/// How a provider's payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// A JSON status API (Atlassian Statuspage and friends).
    Statuspage,
    /// An RSS 2.0 or Atom incident feed.
    Rss,
    /// A JSON message log from a chat webhook / channel proxy.
    Slack,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::Statuspage => "statuspage",
            ProviderKind::Rss => "rss",
            ProviderKind::Slack => "slack",
        })
    }
}

/// Optional per-provider parsing overrides.
///
/// Every field defaults to "use the parser's built-in behaviour".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseHints {
    /// JSON pointer to the status string (statuspage).
    pub status_pointer: Option<String>,
    /// JSON pointer to a human-readable description (statuspage).
    pub message_pointer: Option<String>,
    /// JSON pointer to the message array (slack).
    pub messages_pointer: Option<String>,
    /// Text field inside each message (slack).
    pub text_field: Option<String>,
    /// Timestamp field inside each message (slack).
    pub time_field: Option<String>,
    /// How far back an entry still counts as an active incident.
    pub window: Option<Duration>,
    pub red_keywords: Option<Vec<String>>,
    pub yellow_keywords: Option<Vec<String>>,
    /// Crowd-report feeds: ignore entries reporting fewer than this.
    pub report_threshold: Option<u32>,
}

impl ParseHints {
    pub fn status_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.status_pointer = Some(pointer.into());
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    pub fn red_keywords(mut self, words: &[&str]) -> Self {
        self.red_keywords = Some(words.iter().map(|w| w.to_string()).collect());
        self
    }

    pub fn report_threshold(mut self, threshold: u32) -> Self {
        self.report_threshold = Some(threshold);
        self
    }
}

#[cfg(test)]
impl ParseHints {
    pub fn message_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.message_pointer = Some(pointer.into());
        self
    }

    pub fn messages_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.messages_pointer = Some(pointer.into());
        self
    }

    pub fn text_field(mut self, field: impl Into<String>) -> Self {
        self.text_field = Some(field.into());
        self
    }

    pub fn time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field = Some(field.into());
        self
    }

    pub fn yellow_keywords(mut self, words: &[&str]) -> Self {
        self.yellow_keywords = Some(words.iter().map(|w| w.to_string()).collect());
        self
    }
}

/// One monitored vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub name: String,
    pub kind: ProviderKind,
    pub url: String,
    /// Human-facing page for the vendor, shown as a link on the dashboard.
    pub link: Option<String>,
    pub parse_hints: ParseHints,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, kind: ProviderKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            url: url.into(),
            link: None,
            parse_hints: ParseHints::default(),
        }
    }

    pub fn statuspage(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, ProviderKind::Statuspage, url)
    }

    pub fn rss(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, ProviderKind::Rss, url)
    }

    pub fn with_hints(mut self, hints: ParseHints) -> Self {
        self.parse_hints = hints;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[cfg(test)]
impl ProviderDescriptor {
    pub fn slack(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(name, ProviderKind::Slack, url)
    }
}

const RSSHUB_INSTANCE: &str = "https://rsshub.app";
const OUTAGE_REPORT_LINK: &str = "https://outage.report";

/// Outage.Report entries to show as crowd signals: (name, slug, threshold).
///
/// Slugs follow outage.report naming (lowercase, hyphen-separated).  A wrong
/// slug just shows up as `unknown` on the dashboard.
const CROWD_ALLOWLIST: &[(&str, &str, u32)] = &[
    ("American Express", "american-express", 30),
    ("Visa", "visa", 30),
    ("Mastercard", "mastercard", 30),
    ("PayPal", "paypal", 30),
];

/// Number of recent reports RSSHub returns per crowd feed.
const CROWD_REPORT_COUNT: u32 = 5;

fn crowd_feed_url(slug: &str) -> String {
    format!("{RSSHUB_INSTANCE}/outagereport/{slug}/{CROWD_REPORT_COUNT}")
}

fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Ordered, validated, read-only provider list.
#[derive(Debug, Clone)]
pub struct Registry {
    providers: Vec<ProviderDescriptor>,
}

impl Registry {
    /// Validate and freeze a provider list.
    ///
    /// Fails on the first duplicate name, empty name, or URL (or link) that
    /// is not an absolute http(s) URL with a host.
    pub fn new(providers: Vec<ProviderDescriptor>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for p in &providers {
            if p.name.trim().is_empty() {
                return Err(ConfigError::EmptyName);
            }
            for url in std::iter::once(&p.url).chain(p.link.as_ref()) {
                if !is_http_url(url) {
                    return Err(ConfigError::InvalidUrl {
                        name: p.name.clone(),
                        url: url.clone(),
                    });
                }
            }
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigError::DuplicateName(p.name.clone()));
            }
        }
        Ok(Self { providers })
    }

    /// The provider list shipped with the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut providers = vec![
            ProviderDescriptor::statuspage("GitHub", "https://www.githubstatus.com/api/v2/status.json")
                .with_link("https://www.githubstatus.com"),
            ProviderDescriptor::statuspage(
                "Cloudflare",
                "https://www.cloudflarestatus.com/api/v2/status.json",
            )
            .with_link("https://www.cloudflarestatus.com"),
            ProviderDescriptor::statuspage("OpenAI", "https://status.openai.com/api/v2/status.json")
                .with_link("https://status.openai.com"),
            ProviderDescriptor::statuspage("Atlassian", "https://status.atlassian.com/api/v2/status.json")
                .with_link("https://status.atlassian.com"),
            // slack-status.com reports "ok" or "active" (an incident is open).
            ProviderDescriptor::statuspage("Slack", "https://slack-status.com/api/v2.0.0/current")
                .with_hints(ParseHints::default().status_pointer("/status"))
                .with_link("https://slack-status.com"),
            // AWS keeps resolved posts in the feed for days.
            ProviderDescriptor::rss("AWS", "https://status.aws.amazon.com/rss/all.rss")
                .with_hints(
                    ParseHints::default()
                        .window(Duration::hours(6))
                        .red_keywords(&["disruption", "outage", "unavailable", "impaired"]),
                )
                .with_link("https://health.aws.amazon.com/health/status"),
        ];

        providers.extend(CROWD_ALLOWLIST.iter().map(|&(name, slug, threshold)| {
            ProviderDescriptor::rss(format!("{name} (crowd)"), crowd_feed_url(slug))
                .with_hints(ParseHints::default().report_threshold(threshold))
                .with_link(OUTAGE_REPORT_LINK)
        }));

        Self::new(providers)
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
