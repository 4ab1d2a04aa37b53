//! Request cache configuration.
//!
//! Controls staleness, read-path retries and the detail entry bound via
//! the `[cache]` section of `blogspace.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

// Default values for cache configuration
const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
const DEFAULT_RETRY: u32 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
const DEFAULT_DETAIL_ENTRY_LIMIT: usize = 100;

/// Request cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long fetched data counts as fresh.
    pub stale_time: Duration,
    /// Additional attempts after a failed read.
    pub retry: u32,
    /// Delay before the first retry; doubles for each subsequent one.
    pub retry_delay: Duration,
    /// Upper bound for the retry delay.
    pub max_retry_delay: Duration,
    /// Maximum distinct `article-detail(id)` entries kept.
    pub detail_entry_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
            detail_entry_limit: DEFAULT_DETAIL_ENTRY_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            stale_time: settings.stale_time,
            retry: settings.retry,
            retry_delay: settings.retry_delay,
            max_retry_delay: settings.max_retry_delay,
            detail_entry_limit: settings.detail_entry_limit.get(),
        }
    }
}

impl CacheConfig {
    /// Total attempts a read makes before surfacing an error.
    pub fn max_attempts(&self) -> u32 {
        self.retry.saturating_add(1)
    }

    /// Delay before retry number `retry_index` (zero based).
    pub fn retry_delay_for(&self, retry_index: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry_index);
        self.retry_delay
            .saturating_mul(factor)
            .min(self.max_retry_delay)
    }

    /// Returns the detail entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn detail_entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.detail_entry_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Configuration with immediate retries, handy for tests and scripts.
    pub fn without_retry_delay() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.retry, 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.detail_entry_limit, 100);
    }

    #[test]
    fn retry_delay_doubles_and_caps() {
        let config = CacheConfig::default();
        assert_eq!(config.retry_delay_for(0), Duration::from_millis(1000));
        assert_eq!(config.retry_delay_for(1), Duration::from_millis(2000));
        assert_eq!(config.retry_delay_for(10), Duration::from_secs(30));
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            detail_entry_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.detail_entry_limit_non_zero().get(), 1);
    }
}
