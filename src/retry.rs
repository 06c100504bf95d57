//! Bounded retry policy for store queries
//!
//! Delays grow exponentially from `initial_delay` up to `max_delay`, with
//! optional jitter. The policy only computes delays; deciding whether a
//! failure is worth retrying belongs to the injected error classifier.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration for transient contention failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum query attempts, first attempt included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first reissue
    #[serde(with = "humantime_serde", default = "default_initial_delay")]
    pub initial_delay: Duration,

    /// Upper bound on any single delay
    #[serde(with = "humantime_serde", default = "default_max_delay")]
    pub max_delay: Duration,

    /// Exponential backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Randomize delays to spread reissues from competing callers
    #[serde(default = "default_true")]
    pub jitter: bool,

    /// Jitter spread as a fraction of the computed delay (0.0 to 1.0)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
            jitter_factor: default_jitter_factor(),
        }
    }
}

impl RetryConfig {
    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_another_attempt(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before reissuing after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let multiplier = self.backoff_multiplier.powi(exponent);
        let base = Duration::from_secs_f64(self.initial_delay.as_secs_f64() * multiplier);
        self.apply_jitter(base.min(self.max_delay))
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }

        let mut rng = rand::rng();
        let spread = delay.as_secs_f64() * self.jitter_factor;
        let offset = rng.random_range(-spread / 2.0..=spread / 2.0);
        Duration::from_secs_f64((delay.as_secs_f64() + offset).max(0.0))
    }
}

// Default value functions for serde
fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter_factor() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_jitter() -> RetryConfig {
        RetryConfig {
            jitter: false,
            ..Default::default()
        }
    }

    #[test]
    fn delays_grow_exponentially() {
        let config = without_jitter();

        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn delays_are_capped_at_max_delay() {
        let config = RetryConfig {
            max_delay: Duration::from_millis(250),
            ..without_jitter()
        };

        assert_eq!(config.delay_for(5), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_the_configured_spread() {
        let config = RetryConfig {
            jitter: true,
            jitter_factor: 0.5,
            ..Default::default()
        };

        for _ in 0..50 {
            let delay = config.delay_for(1).as_secs_f64();
            assert!((0.075..=0.125).contains(&delay), "delay {delay} out of range");
        }
    }

    #[test]
    fn attempt_budget_counts_the_first_attempt() {
        let config = RetryConfig {
            max_attempts: 3,
            ..without_jitter()
        };

        assert!(config.allows_another_attempt(1));
        assert!(config.allows_another_attempt(2));
        assert!(!config.allows_another_attempt(3));
    }

    #[test]
    fn deserializes_from_partial_config() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"max_attempts": 5, "initial_delay": "25ms"}"#).unwrap();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_delay, Duration::from_millis(25));
        assert_eq!(config.max_delay, Duration::from_secs(2));
        assert!(config.jitter);
    }
}
