//! Clock, scheduler and retry policy.
//!
//! Polling loops never call timers directly. They consume a [`RetryPolicy`]
//! and a [`Scheduler`], so tests can substitute [`ManualClock`] and run a
//! full retry budget instantly.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

/// Wall-clock source in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Cooperative delay.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock whose time only moves on `advance` or `sleep`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.now
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Every duration passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scheduler for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}

/// Bounded (or page-lifetime) polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    /// `None` polls until the owning context goes away.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// `floor(max_wait / interval)` attempts spaced by `interval`.
    pub fn from_budget(max_wait: Duration, interval: Duration) -> Self {
        let interval_ms = interval.as_millis().max(1);
        let attempts = (max_wait.as_millis() / interval_ms).min(u32::MAX as u128) as u32;
        Self::bounded(interval, attempts)
    }

    /// Run `attempt` until it yields a value or the budget is spent.
    ///
    /// The closure receives the 1-based attempt number. No sleep follows the
    /// final attempt.
    pub async fn run<T, F, Fut>(&self, scheduler: &dyn Scheduler, mut attempt: F) -> Option<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut n = 0u32;
        loop {
            n += 1;
            if let Some(value) = attempt(n).await {
                return Some(value);
            }
            if let Some(max) = self.max_attempts {
                if n >= max {
                    return None;
                }
            }
            scheduler.sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_from_budget_floors() {
        let policy = RetryPolicy::from_budget(Duration::from_millis(10_000), Duration::from_millis(500));
        assert_eq!(policy.max_attempts, Some(20));

        let policy = RetryPolicy::from_budget(Duration::from_millis(1_250), Duration::from_millis(500));
        assert_eq!(policy.max_attempts, Some(2));
    }

    #[test]
    fn test_from_budget_smaller_than_interval_still_tries_once() {
        let policy = RetryPolicy::from_budget(Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(policy.max_attempts, Some(1));
    }

    #[tokio::test]
    async fn test_run_exhausts_budget() {
        let clock = ManualClock::new(0);
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::bounded(Duration::from_millis(500), 4);

        let result: Option<()> = policy
            .run(&clock, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { None }
            })
            .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(clock.sleeps().len(), 3);
        assert_eq!(clock.now_millis(), 1_500);
    }

    #[tokio::test]
    async fn test_run_stops_on_success() {
        let clock = ManualClock::new(0);
        let policy = RetryPolicy::bounded(Duration::from_millis(100), 10);

        let result = policy
            .run(&clock, |n| async move { (n == 3).then_some(n) })
            .await;

        assert_eq!(result, Some(3));
        assert_eq!(clock.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_unbounded_runs_until_ready() {
        let clock = ManualClock::new(0);
        let policy = RetryPolicy::unbounded(Duration::from_millis(500));

        let result = policy
            .run(&clock, |n| async move { (n == 50).then_some("ready") })
            .await;

        assert_eq!(result, Some("ready"));
        assert_eq!(clock.now_millis(), 49 * 500);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now_millis(), 3_000);
        clock.set(5);
        assert_eq!(clock.now_millis(), 5);
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.now_millis() > 1_600_000_000_000);
    }
}
