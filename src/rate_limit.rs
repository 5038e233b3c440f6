//! Outbound pacing for broadcasts

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

/// Gap enforced between the end of one provider send and the start of the
/// next within a broadcast.
pub const SEND_INTERVAL: Duration = Duration::from_millis(50);

#[async_trait]
pub trait RateLimiter: Send {
    /// Wait until the next send is allowed.
    async fn acquire(&mut self);

    /// Mark the send that followed `acquire` as finished.
    fn completed(&mut self);
}

pub struct FixedInterval {
    period: Duration,
    last_completed: Option<Instant>,
}

impl FixedInterval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_completed: None,
        }
    }
}

#[async_trait]
impl RateLimiter for FixedInterval {
    async fn acquire(&mut self) {
        if let Some(last) = self.last_completed {
            time::sleep_until(last + self.period).await;
        }
    }

    fn completed(&mut self) {
        self.last_completed = Some(Instant::now());
    }
}

pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn acquire(&mut self) {}

    fn completed(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatePolicy {
    FixedInterval(Duration),
    Unlimited,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::FixedInterval(SEND_INTERVAL)
    }
}

impl RatePolicy {
    /// A fresh limiter, one per broadcast.
    pub fn limiter(&self) -> Box<dyn RateLimiter> {
        match *self {
            Self::FixedInterval(period) if !period.is_zero() => Box::new(FixedInterval::new(period)),
            _ => Box::new(Unlimited),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let mut limiter = RatePolicy::FixedInterval(Duration::from_millis(50)).limiter();
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_waits_full_period_after_slow_send() {
        let mut limiter = RatePolicy::FixedInterval(Duration::from_millis(30)).limiter();
        limiter.acquire().await;
        // a send slower than the period must not eat into the gap
        time::sleep(Duration::from_millis(60)).await;
        limiter.completed();

        let done = Instant::now();
        limiter.acquire().await;
        assert!(done.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_no_wait_once_period_has_passed() {
        let mut limiter = RatePolicy::FixedInterval(Duration::from_millis(20)).limiter();
        limiter.acquire().await;
        limiter.completed();
        time::sleep(Duration::from_millis(40)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_interval_is_unlimited() {
        let mut limiter = RatePolicy::FixedInterval(Duration::ZERO).limiter();
        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
            limiter.completed();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(RatePolicy::default(), RatePolicy::FixedInterval(Duration::from_millis(50)));
    }
}
