//! Error types.
//!
//! * [`FetchError`]: everything that can go wrong while loading the catalog
//!   page.  Caught at the [`FeedController::load_all`] boundary, logged, and
//!   shown in the status bar.
//! * [`ConfigError`]: bad or missing environment configuration at startup.
//!
//! [`FeedController::load_all`]: crate::feed::FeedController::load_all

use thiserror::Error;

/// A failed attempt to load the trending videos.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The endpoint could not be reached, or the body could not be read.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with an `error.message` payload.
    #[error("catalog API error: {0}")]
    Upstream(String),

    /// Non-2xx answer without a readable error payload.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The body does not have the shape of a video list.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
