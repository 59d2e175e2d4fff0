//! Rate limiter: hourly cap plus per-send pacing.
//!
//! Two independent tiers, both required by the downstream transport's
//! tolerance:
//! - an hourly cap (window starts at the first admitted send; once the cap
//!   is recorded, `admit` sleeps until one hour past window start),
//! - a fixed pause after every successful send.
//!
//! State lives on `tokio::time::Instant` (monotonic), so wall-clock
//! adjustments can neither shrink nor stretch the window, and tests run
//! under paused time.

use tokio::time::{sleep, sleep_until, Duration, Instant};

/// Limiter settings.
///
/// Example with `hourly_cap = 140`:
/// - sends 1..=140 are admitted as fast as pacing allows
/// - send 141 waits until one hour after send 1, then opens a new window
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Successful sends allowed per window.
    pub hourly_cap: u32,

    /// Window length. One hour in production; shorter only in tests.
    pub window: Duration,

    /// Pause after every successful send.
    pub per_send_delay: Duration,
}

impl RateLimiterConfig {
    pub fn new(hourly_cap: u32) -> Self {
        Self {
            hourly_cap,
            window: Duration::from_secs(3600),
            per_send_delay: Duration::from_secs(2),
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(140)
    }
}

/// Sliding-hour token counter gating the send loop.
///
/// The send loop is strictly sequential, so the limiter is plain mutable
/// state: no locking, no shared ownership.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    window_start: Option<Instant>,
    sent_in_window: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            window_start: None,
            sent_in_window: 0,
        }
    }

    /// Suspend until the next send may proceed.
    ///
    /// Returns immediately while the window has headroom or has elapsed;
    /// sleeps until one hour past window start when the cap is reached.
    /// Never busy-polls.
    pub async fn admit(&mut self) {
        let now = Instant::now();
        let start = match self.window_start {
            Some(start) if now < start + self.config.window => start,
            _ => {
                // First send, or the hour elapsed on its own.
                self.window_start = Some(now);
                self.sent_in_window = 0;
                return;
            }
        };

        if self.sent_in_window >= self.config.hourly_cap {
            tracing::info!(
                cap = self.config.hourly_cap,
                "hourly cap reached, pausing until the window resets"
            );
            sleep_until(start + self.config.window).await;
            self.window_start = Some(Instant::now());
            self.sent_in_window = 0;
        }
    }

    /// Count one successful send against the current window.
    ///
    /// Failed transport calls are not counted, so a run full of bad
    /// addresses cannot starve the cap.
    pub fn record_send(&mut self) {
        self.sent_in_window += 1;
    }

    /// Fixed pause after a successful send, independent of the cap.
    pub async fn pace(&self) {
        sleep(self.config.per_send_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(cap: u32) -> RateLimiterConfig {
        RateLimiterConfig::new(cap)
    }

    #[tokio::test(start_paused = true)]
    async fn admits_freely_under_the_cap() {
        let mut limiter = RateLimiter::new(config(3));

        let start = Instant::now();
        for _ in 0..3 {
            limiter.admit().await;
            limiter.record_send();
        }
        assert_eq!(Instant::now() - start, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_at_the_cap_until_the_window_resets() {
        let mut limiter = RateLimiter::new(config(2));

        let start = Instant::now();
        limiter.admit().await;
        limiter.record_send();
        limiter.admit().await;
        limiter.record_send();

        // Third admit must sleep out the remainder of the hour.
        limiter.admit().await;
        let waited = Instant::now() - start;
        assert!(waited >= Duration::from_secs(3600), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn an_elapsed_window_resets_without_blocking() {
        let mut limiter = RateLimiter::new(config(1));

        limiter.admit().await;
        limiter.record_send();

        // Let the hour pass with no sends; the cap must not carry over.
        tokio::time::advance(Duration::from_secs(3601)).await;

        let before = Instant::now();
        limiter.admit().await;
        assert_eq!(Instant::now() - before, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn pace_applies_the_per_send_delay() {
        let limiter = RateLimiter::new(config(10));

        let start = Instant::now();
        limiter.pace().await;
        assert!(Instant::now() - start >= Duration::from_secs(2));
    }
}
