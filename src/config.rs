//! Runtime configuration from the environment.
//!
//! `.env` in the working directory is loaded first (if present), then each
//! setting is read from its variable.  Only the API key is required.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::feed::{FeedSettings, DEFAULT_BATCH_SIZE, DEFAULT_REVEAL_DELAY};
use crate::scroll::{ScrollSettings, DEFAULT_DEBOUNCE, DEFAULT_THRESHOLD_ROWS};
use crate::source::{CatalogConfig, DEFAULT_BASE_URL};

const DEFAULT_REGION_CODE: &str = "US";
const DEFAULT_LOG_FILE: &str = "trendscroll.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub feed: FeedSettings,
    pub scroll: ScrollSettings,
    /// Where tracing output goes; the terminal belongs to the UI.
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("YOUTUBE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))?;

        let batch_size = parse_or(&lookup, "FEED_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "FEED_BATCH_SIZE",
                value: "0".into(),
            });
        }

        Ok(Self {
            catalog: CatalogConfig {
                base_url: lookup("YOUTUBE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
                api_key,
                region_code: lookup("YOUTUBE_REGION_CODE")
                    .unwrap_or_else(|| DEFAULT_REGION_CODE.into()),
            },
            feed: FeedSettings {
                batch_size,
                reveal_delay: millis_or(&lookup, "FEED_REVEAL_DELAY_MS", DEFAULT_REVEAL_DELAY)?,
            },
            scroll: ScrollSettings {
                debounce: millis_or(&lookup, "SCROLL_DEBOUNCE_MS", DEFAULT_DEBOUNCE)?,
                threshold_rows: parse_or(&lookup, "SCROLL_THRESHOLD_ROWS", DEFAULT_THRESHOLD_ROWS)?,
            },
            log_file: lookup("TRENDSCROLL_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| DEFAULT_LOG_FILE.into()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn millis_or<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, name, default.as_millis() as u64).map(Duration::from_millis)
}
