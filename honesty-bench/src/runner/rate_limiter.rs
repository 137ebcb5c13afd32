//! Sliding-window rate limiter for requests and tokens

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Requests-per-window and tokens-per-window limiter
pub struct RateLimiter {
    requests_per_window: u32,
    tokens_per_window: u32,
    window: Duration,
    last_requests: Mutex<VecDeque<Instant>>,
    token_usage: Mutex<VecDeque<(Instant, u32)>>,
}

impl RateLimiter {
    /// Limits are per minute
    pub fn new(requests_per_minute: u32, tokens_per_minute: u32) -> Self {
        Self {
            requests_per_window: requests_per_minute.max(1),
            tokens_per_window: tokens_per_minute,
            window: DEFAULT_WINDOW,
            last_requests: Mutex::new(VecDeque::new()),
            token_usage: Mutex::new(VecDeque::new()),
        }
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(u32::MAX, u32::MAX)
    }

    /// Override the sliding window length
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Wait until a request slot is free, then claim it
    pub async fn acquire(&self) -> RateLimitGuard {
        loop {
            let wait = {
                let mut last = self.last_requests.lock().await;
                let now = Instant::now();
                evict(&mut last, now, self.window, |t| *t);

                if last.len() < self.requests_per_window as usize {
                    last.push_back(now);
                    None
                } else {
                    last.front()
                        .map(|&oldest| self.window.saturating_sub(now.duration_since(oldest)) + Duration::from_millis(10))
                }
            };

            match wait {
                None => return RateLimitGuard { _private: () },
                Some(wait) => {
                    tracing::debug!("Request limit reached, waiting {}ms", wait.as_millis());
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Record token usage for rate limiting
    pub async fn record_tokens(&self, tokens: u32) {
        let mut usage = self.token_usage.lock().await;
        let now = Instant::now();
        evict(&mut usage, now, self.window, |(t, _)| *t);
        usage.push_back((now, tokens));
    }

    /// Tokens used inside the current window
    pub async fn current_token_usage(&self) -> u32 {
        let mut usage = self.token_usage.lock().await;
        evict(&mut usage, Instant::now(), self.window, |(t, _)| *t);
        usage.iter().fold(0u32, |acc, (_, t)| acc.saturating_add(*t))
    }

    /// Check if we have token capacity
    pub async fn has_token_capacity(&self, needed: u32) -> bool {
        // A single request larger than the whole budget only waits for an empty window
        let needed = needed.min(self.tokens_per_window);
        let current = self.current_token_usage().await;
        current.saturating_add(needed) <= self.tokens_per_window
    }

    /// Wait for token capacity
    pub async fn wait_for_token_capacity(&self, needed: u32) {
        while !self.has_token_capacity(needed).await {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

fn evict<T>(queue: &mut VecDeque<T>, now: Instant, window: Duration, at: impl Fn(&T) -> Instant) {
    while let Some(front) = queue.front() {
        if now.duration_since(at(front)) > window {
            queue.pop_front();
        } else {
            break;
        }
    }
}

/// Guard returned when rate limit permission is acquired
pub struct RateLimitGuard {
    _private: (),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_basic() {
        let limiter = RateLimiter::new(5, 1000);

        // Should be able to make 5 requests immediately
        for _ in 0..5 {
            let _guard = limiter.acquire().await;
        }
    }

    #[tokio::test]
    async fn test_waits_for_window() {
        let limiter = RateLimiter::new(2, 1000).with_window(Duration::from_millis(100));
        let start = Instant::now();
        for _ in 0..3 {
            let _guard = limiter.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_token_recording() {
        let limiter = RateLimiter::new(60, 1000);

        limiter.record_tokens(100).await;
        limiter.record_tokens(200).await;

        assert_eq!(limiter.current_token_usage().await, 300);
        assert!(limiter.has_token_capacity(700).await);
        assert!(!limiter.has_token_capacity(701).await);
    }

    #[tokio::test]
    async fn test_oversized_request_fits_empty_window() {
        let limiter = RateLimiter::new(60, 100);
        assert!(limiter.has_token_capacity(10_000).await);
        limiter.wait_for_token_capacity(10_000).await;
    }

    #[tokio::test]
    async fn test_unlimited_never_blocks() {
        let limiter = RateLimiter::unlimited();
        for _ in 0..1000 {
            let _guard = limiter.acquire().await;
        }
        assert!(limiter.has_token_capacity(u32::MAX).await);
    }
}
