//! Named token-bucket rate limiter
//!
//! Each bucket refills at `per_second` tokens per second and holds at most
//! `per_second` tokens. Unconfigured buckets are unlimited.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Token bucket for a single key
#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    tokens_per_second: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(tokens_per_second: f64) -> Self {
        Self {
            tokens: tokens_per_second,
            tokens_per_second,
            last_update: Instant::now(),
        }
    }

    /// Consume a token or report how long until one is available
    fn try_consume(&mut self) -> Result<(), Duration> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = elapsed
            .mul_add(self.tokens_per_second, self.tokens)
            .min(self.tokens_per_second);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(missing / self.tokens_per_second))
        }
    }
}

/// In-memory rate limiter keyed by bucket name
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    /// Create a limiter without any configured bucket
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure (or reset) a bucket; `0` removes the limit
    pub fn configure(&self, bucket: &str, per_second: u32) {
        let mut buckets = self.buckets.lock();
        if per_second == 0 {
            buckets.remove(bucket);
        } else {
            buckets.insert(bucket.to_string(), TokenBucket::new(f64::from(per_second)));
        }
    }

    /// True if the bucket has a limit
    pub fn is_limited(&self, bucket: &str) -> bool {
        self.buckets.lock().contains_key(bucket)
    }

    /// Take a slot without waiting
    ///
    /// # Errors
    ///
    /// Returns the time until the next slot frees up when the bucket is exhausted.
    pub fn try_acquire(&self, bucket: &str) -> Result<(), Duration> {
        self.buckets
            .lock()
            .get_mut(bucket)
            .map_or(Ok(()), TokenBucket::try_consume)
    }

    /// Wait until a slot is available and take it
    pub async fn acquire(&self, bucket: &str) {
        while let Err(wait) = self.try_acquire(bucket) {
            debug!(bucket, ?wait, "Rate limited, waiting for next slot");
            tokio::time::sleep(wait).await;
        }
    }
}
