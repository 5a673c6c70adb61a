use crate::config::FilterConfig;
use std::time::Duration;

/// How long admissions to a failing host are held back
///
/// The delay is zero with no consecutive failures and doubles with every
/// further one: `base × 2^(failures - 1)`, saturating, optionally capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max: Option<Duration>,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Option<Duration>) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            Duration::from_millis(config.backoff_base_ms),
            config.max_backoff_ms.map(Duration::from_millis),
        )
    }

    /// The admission delay for a number of consecutive failures
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        let delay = self.base.saturating_mul(factor);

        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
