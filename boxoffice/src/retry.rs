//! Retry configuration for contended reservations.

use std::time::Duration;

/// Configuration for the inventory manager's optimistic retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of reservation attempts before giving up.
    pub max_attempts: u32,
    /// Base delay between retry attempts.
    pub base_delay: Duration,
    /// Maximum delay between retry attempts (for exponential backoff).
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Time budget for a single attempt against the store.
    pub op_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            op_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// A configuration for high-throughput scenarios where fast failure is
    /// preferred over persistence.
    pub const fn fast() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 1.5,
            op_timeout: Duration::from_secs(1),
        }
    }

    /// Calculates the delay before the next retry attempt.
    ///
    /// Uses exponential backoff with ±25% jitter to prevent thundering herd
    /// problems when many callers race over the same event.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        use rand::Rng;

        let base_delay_ms = self.base_delay.as_millis() as f64;
        let max_delay_ms = self.max_delay.as_millis() as f64;

        let delay = base_delay_ms * self.backoff_multiplier.powi(attempt as i32);
        let delay = delay.min(max_delay_ms);

        let mut rng = rand::rng();
        let jitter = delay * 0.25 * (rng.random::<f64>() - 0.5) * 2.0;
        let final_delay = (delay + jitter).clamp(0.0, max_delay_ms) as u64;

        Duration::from_millis(final_delay)
    }
}
