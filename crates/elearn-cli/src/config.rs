use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use elearn_client::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use elearn_client::DEFAULT_INTERVAL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub db_path: PathBuf,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take defaults; set but
    /// unparseable numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("ELEARN_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let db_path = lookup("ELEARN_DB_PATH").unwrap_or_else(|| "elearn-session.db".into());

        let poll_interval = match lookup("ELEARN_POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("ELEARN_POLL_INTERVAL_MS is not a number: {:?}", raw))?,
            ),
            None => DEFAULT_INTERVAL,
        };

        let http_timeout = match lookup("ELEARN_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("ELEARN_HTTP_TIMEOUT_SECS is not a number: {:?}", raw))?,
            ),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url,
            db_path: PathBuf::from(db_path),
            poll_interval,
            http_timeout,
        })
    }
}
