//! Repository configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryConfig;

/// Configuration for a [`MigrationRepository`](crate::MigrationRepository)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Retry policy applied to every store query
    #[serde(default)]
    pub retry: RetryConfig,
}

impl RepositoryConfig {
    /// Create configuration from environment variables
    ///
    /// Recognized variables, all optional:
    /// - `EVENTSHIFT_RETRY_ATTEMPTS`
    /// - `EVENTSHIFT_RETRY_INITIAL_DELAY_MS`
    /// - `EVENTSHIFT_RETRY_MAX_DELAY_MS`
    /// - `EVENTSHIFT_RETRY_JITTER` (`true`/`false`)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("EVENTSHIFT_RETRY_ATTEMPTS") {
            config.retry.max_attempts = raw
                .parse()
                .with_context(|| format!("invalid EVENTSHIFT_RETRY_ATTEMPTS: {raw}"))?;
        }

        if let Ok(raw) = std::env::var("EVENTSHIFT_RETRY_INITIAL_DELAY_MS") {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("invalid EVENTSHIFT_RETRY_INITIAL_DELAY_MS: {raw}"))?;
            config.retry.initial_delay = Duration::from_millis(ms);
        }

        if let Ok(raw) = std::env::var("EVENTSHIFT_RETRY_MAX_DELAY_MS") {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("invalid EVENTSHIFT_RETRY_MAX_DELAY_MS: {raw}"))?;
            config.retry.max_delay = Duration::from_millis(ms);
        }

        if let Ok(raw) = std::env::var("EVENTSHIFT_RETRY_JITTER") {
            config.retry.jitter = match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => anyhow::bail!("invalid EVENTSHIFT_RETRY_JITTER: {other}"),
            };
        }

        Ok(config)
    }
}
