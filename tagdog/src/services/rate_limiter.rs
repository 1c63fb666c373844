//! Rate limiter for outbound API calls
//!
//! Calls made through [`RateLimiter::call`] start at least `min_interval` apart,
//! measured start to start on the monotonic clock. The lock is held for the whole
//! call, so overlapping callers from any number of tasks or threads run one at a
//! time in lock order.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Minimum-interval rate limiter
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
        }
    }

    /// Limiter allowing at most `max_per_second` calls per second
    ///
    /// A non-positive rate disables spacing (calls are still serialized).
    pub fn per_second(max_per_second: f64) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };
        Self::new(min_interval)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Run `f` once the interval since the previous call's start has elapsed
    pub async fn call<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Timestamps taken inside the wrapped call trail the limiter's own by a few µs
    const JITTER: Duration = Duration::from_millis(1);

    #[test]
    fn test_per_second_interval() {
        let limiter = RateLimiter::per_second(2.0);
        assert_eq!(limiter.min_interval(), Duration::from_millis(500));

        let limiter = RateLimiter::per_second(0.0);
        assert_eq!(limiter.min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_returns_wrapped_output() {
        let limiter = RateLimiter::new(Duration::from_millis(10));
        let value = limiter.call(|| async { 40 + 2 }).await;
        assert_eq!(value, 42);

        let result: Result<(), &str> = limiter.call(|| async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
    }

    #[tokio::test]
    async fn test_sequential_spacing() {
        let interval = Duration::from_millis(100);
        let limiter = RateLimiter::new(interval);
        let mut starts = Vec::new();

        for _ in 0..4 {
            let start = limiter.call(|| async { Instant::now() }).await;
            starts.push(start);
        }

        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] + JITTER >= interval,
                "calls started {:?} apart",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test]
    async fn test_first_call_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.call(|| async {}).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_spaced_and_serialized() {
        let interval = Duration::from_millis(50);
        let limiter = Arc::new(RateLimiter::new(interval));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let starts = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = Arc::clone(&limiter);
            let in_flight = Arc::clone(&in_flight);
            let starts = Arc::clone(&starts);
            handles.push(tokio::spawn(async move {
                limiter
                    .call(|| async {
                        let running = in_flight.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(running, 0, "wrapped calls overlapped");
                        starts.lock().unwrap().push(Instant::now());
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let mut starts = starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(starts.len(), 6);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] + JITTER >= interval);
        }
    }
}
