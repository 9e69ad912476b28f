//! Response caching with rate limiting
//!
//! [`CacheManager::wrap`] is the single suspension point of every request: it
//! either returns a cached payload or runs the producer (the HTTP call) under
//! the configured rate limit.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::BoxFuture;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::RATE_LIMIT_BUCKET;
use crate::error::NominatimError;
use crate::rate_limit::RateLimiter;

/// Decoded response body as stored in the cache
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON object or array
    Json(Value),
    /// Raw text body
    Text(String),
}

/// Deferred computation of a payload (the HTTP call)
pub type Producer = BoxFuture<'static, Result<Payload, NominatimError>>;

/// Per-request caching and rate-limit options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fresh response is reused (zero disables caching)
    pub ttl: Duration,
    /// Rate-limit bucket the producer is charged to
    pub rate_limit_key: Option<String>,
    /// Return a previously cached response instead of waiting for the limiter
    pub serve_stale_if_limited: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 3600),
            rate_limit_key: Some(RATE_LIMIT_BUCKET.to_string()),
            serve_stale_if_limited: true,
        }
    }
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the fresh cache
    pub hits: u64,
    /// Requests that had to go through the producer path
    pub misses: u64,
    /// Requests answered from the stale store while rate limited
    pub stale_hits: u64,
}

/// Cache and rate-limit capability used by the client
#[async_trait]
pub trait CacheManager: Send + Sync + fmt::Debug {
    /// Return the cached payload for `key` or run `producer` to obtain it
    async fn wrap(
        &self,
        key: &str,
        producer: Producer,
        options: &CacheOptions,
    ) -> Result<Payload, NominatimError>;
}

/// Cached value with the TTL it was stored with
#[derive(Debug, Clone)]
struct CachedPayload {
    payload: Payload,
    ttl: Duration,
}

/// Longest TTL handed to moka, which rejects anything above 1000 years
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Expires each entry after its own TTL
struct PerEntryTtl;

impl Expiry<String, CachedPayload> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedPayload,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl.min(MAX_TTL))
    }
}

/// moka-backed cache manager
///
/// Concurrent requests for the same key share one producer run and its
/// outcome. Every successful payload is also kept in a longer-lived stale
/// store that backs `serve_stale_if_limited`.
pub struct MokaCacheManager {
    fresh: Cache<String, CachedPayload>,
    stale: Cache<String, Payload>,
    limiter: Arc<RateLimiter>,
    hits: AtomicU64,
    misses: AtomicU64,
    stale_hits: AtomicU64,
}

impl fmt::Debug for MokaCacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaCacheManager")
            .field("entries", &self.fresh.entry_count())
            .field("stale_entries", &self.stale.entry_count())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MokaCacheManager {
    /// Create a cache holding up to `max_entries` responses
    #[must_use]
    pub fn new(max_entries: u64, stale_ttl: Duration, limiter: Arc<RateLimiter>) -> Self {
        let fresh = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        let stale = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(stale_ttl.min(MAX_TTL))
            .build();

        Self {
            fresh,
            stale,
            limiter,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stale_hits: AtomicU64::new(0),
        }
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
        }
    }

    /// Run the producer under the rate limit, or fall back to a stale value
    async fn produce(
        &self,
        key: &str,
        producer: Producer,
        options: &CacheOptions,
    ) -> Result<CachedPayload, NominatimError> {
        if let Some(bucket) = options.rate_limit_key.as_deref() {
            if self.limiter.try_acquire(bucket).is_err() {
                if options.serve_stale_if_limited {
                    if let Some(payload) = self.stale.get(key).await {
                        self.stale_hits.fetch_add(1, Ordering::Relaxed);
                        debug!(key, bucket, "Rate limited, serving stale response");
                        return Ok(CachedPayload {
                            payload,
                            ttl: Duration::ZERO,
                        });
                    }
                }
                self.limiter.acquire(bucket).await;
            }
        }

        let payload = producer.await?;
        self.stale.insert(key.to_string(), payload.clone()).await;

        Ok(CachedPayload {
            payload,
            ttl: options.ttl,
        })
    }
}

#[async_trait]
impl CacheManager for MokaCacheManager {
    #[instrument(skip(self, producer, options), level = "debug")]
    async fn wrap(
        &self,
        key: &str,
        producer: Producer,
        options: &CacheOptions,
    ) -> Result<Payload, NominatimError> {
        if let Some(cached) = self.fresh.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "Cache hit");
            return Ok(cached.payload);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "Cache miss");

        if options.ttl.is_zero() {
            return self
                .produce(key, producer, options)
                .await
                .map(|cached| cached.payload);
        }

        self.fresh
            .try_get_with(key.to_string(), self.produce(key, producer, options))
            .await
            .map(|cached| cached.payload)
            .map_err(|e| (*e).clone())
    }
}

/// Cache manager that never stores anything
///
/// Still honours the rate limit, so disabling the cache does not disable
/// the service usage policy.
#[derive(Debug, Default)]
pub struct NoopCacheManager {
    limiter: Arc<RateLimiter>,
}

impl NoopCacheManager {
    /// Create a pass-through manager charging requests to `limiter`
    #[must_use]
    pub const fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl CacheManager for NoopCacheManager {
    async fn wrap(
        &self,
        _key: &str,
        producer: Producer,
        options: &CacheOptions,
    ) -> Result<Payload, NominatimError> {
        if let Some(bucket) = options.rate_limit_key.as_deref() {
            self.limiter.acquire(bucket).await;
        }
        producer.await
    }
}
