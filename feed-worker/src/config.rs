//! Configuration module for environment variable parsing.
//!
//! Feed and webhook addresses are required; everything else falls back to a
//! default when absent or malformed.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::ConfigError;

/// Poll interval used when `POLL_INTERVAL_MINUTES` is absent or invalid.
pub const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 5;

/// Default location of the seen-entry file, relative to the working directory.
pub const DEFAULT_SEEN_STORE_PATH: &str = "SentData.txt";

/// Default timeout for the feed fetch and each webhook POST.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the syndication feed to poll
    pub feed_url: Url,

    /// Webhook endpoint receiving one notification per new entry
    pub webhook_url: Url,

    /// Minutes between poll cycles
    pub poll_interval_minutes: u64,

    /// Plain-text file holding recently dispatched entry ids
    pub seen_store_path: PathBuf,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Optional pool of user agents to rotate through
    pub user_agent_pool: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            feed_url: required_url(&lookup, "FEED_URL")?,

            webhook_url: required_url(&lookup, "WEBHOOK_URL")?,

            poll_interval_minutes: parse_interval_minutes(
                lookup("POLL_INTERVAL_MINUTES").as_deref(),
            ),

            seen_store_path: lookup("SEEN_STORE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_STORE_PATH)),

            request_timeout_ms: lookup("REQUEST_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&ms: &u64| ms > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),

            user_agent_pool: lookup("USER_AGENT_POOL").map(|raw| parse_csv(&raw)),
        })
    }

    /// Period between poll cycles.
    pub fn poll_interval(&self) -> Duration {
        let secs = self
            .poll_interval_minutes
            .checked_mul(60)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MINUTES * 60);
        Duration::from_secs(secs)
    }

    /// Timeout applied to every outbound request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Resolve the poll interval, accepting only a positive integer whose
/// length in seconds fits in a `u64`.
pub fn parse_interval_minutes(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return DEFAULT_POLL_INTERVAL_MINUTES;
    };

    match raw.trim().parse::<u64>() {
        Ok(minutes) if minutes > 0 && minutes.checked_mul(60).is_some() => minutes,
        _ => {
            warn!(
                env_var = "POLL_INTERVAL_MINUTES",
                value = %raw,
                default = DEFAULT_POLL_INTERVAL_MINUTES,
                "Invalid poll interval, using default"
            );
            DEFAULT_POLL_INTERVAL_MINUTES
        }
    }
}

fn required_url<F>(lookup: &F, name: &'static str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))?;

    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::InvalidUrl { name, value: raw }),
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
