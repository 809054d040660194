//! Payload interpretation, one sub-module per [`ProviderKind`].
//!
//! Parsers are pure: they take an already-fetched body plus the provider's
//! [`ParseHints`] and the current time, and return an [`Assessment`].  No I/O
//! happens here, so every rule can be tested with literal payloads.
//!
//! ## For contributors: adding a new kind
//!
//! 1. Add a variant to [`ProviderKind`].
//! 2. Create a file in this directory with a unit struct implementing
//!    [`StatusSource`].
//! 3. Return it from [`source_for`].
//!
//! The poller, cache, and both renderers are kind-agnostic.

mod feed_item;
mod keywords;
mod rss;
mod slack;
mod statuspage;

pub use self::rss::RssFeed;
pub use slack::SlackLog;
pub use statuspage::Statuspage;

use chrono::{DateTime, Duration, Utc};

use crate::error::ParseError;
use crate::registry::{ParseHints, ProviderKind};
use crate::status::Assessment;

/// Recency window used when a provider does not set one.
pub fn default_window() -> Duration {
    Duration::hours(24)
}

/// Message shown when a feed or log has nothing recent.
pub const ALL_CLEAR: &str = "no recent incidents";

/// Turns a raw payload into an indicator.
pub trait StatusSource: Send + Sync {
    fn assess(
        &self,
        body: &[u8],
        hints: &ParseHints,
        now: DateTime<Utc>,
    ) -> Result<Assessment, ParseError>;
}

/// The parser responsible for `kind`.
pub fn source_for(kind: ProviderKind) -> &'static dyn StatusSource {
    match kind {
        ProviderKind::Statuspage => &Statuspage,
        ProviderKind::Rss => &RssFeed,
        ProviderKind::Slack => &SlackLog,
    }
}

/// How far ahead of `now` a timestamp may be and still count as recent.
pub(crate) fn max_clock_skew() -> Duration {
    Duration::minutes(5)
}

/// `true` when `at` falls within `window` before `now`.
///
/// Up to [`max_clock_skew`] in the future is tolerated; anything later is a
/// bad date or a scheduled post and never counts.
pub(crate) fn is_recent(at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    at <= now + max_clock_skew() && now.signed_duration_since(at) <= window
}
