//! Error types.
//!
//! Fetch and parse failures are per-provider: the poller catches them and
//! turns them into an `unknown` [`StatusResult`](crate::status::StatusResult).
//! Only [`ConfigError`] is allowed to escape, and only at startup.

use thiserror::Error;

/// The request never produced a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, DNS failure, refused connection, broken body stream.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered, but not with a 2xx.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// The body arrived but could not be understood.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed feed: {0}")]
    Feed(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("unexpected payload shape: {0}")]
    InvalidShape(String),

    /// A configured keyword list could not be compiled.
    #[error("invalid keyword list: {0}")]
    Keywords(#[from] aho_corasick::BuildError),
}

/// The static provider list is unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duplicate provider name: {0}")]
    DuplicateName(String),

    #[error("provider name must not be empty")]
    EmptyName,

    #[error("provider {name}: url must be an absolute http(s) url with a host, got {url:?}")]
    InvalidUrl { name: String, url: String },
}
