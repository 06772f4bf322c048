use anyhow::Context;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Process configuration, read once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the news feed (newsapi.org).
    pub newsapi_key: String,
    pub port: u16,
    /// Bounded timeout applied to every outbound gateway call; a timeout
    /// surfaces as that call's missing-data failure.
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let newsapi_key = std::env::var("NEWSAPI_KEY").context("NEWSAPI_KEY is not set")?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let http_timeout = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        Ok(Self {
            newsapi_key,
            port,
            http_timeout,
        })
    }
}
