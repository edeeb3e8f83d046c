use ::moka::future::Cache;
use ::moka::Expiry;
use async_trait::async_trait;
use pinhole_core::cache::Result;
use pinhole_core::{CachedUrl, ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: CachedUrl,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Each entry carries its own TTL, so a URL expiring in five minutes is never
/// cached for longer than that. Suited to single-node deployments.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Entry>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache with a maximum of 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder().max_capacity(max_capacity).build().into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.value))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, value: &CachedUrl, ttl: Duration) -> Result<()> {
        trace!(code = %code, ttl_ms = ttl.as_millis() as u64, "Storing URL in Moka cache");

        let entry = Entry {
            value: value.clone(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), entry).await;
        debug!(code = %code, "Cached URL in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Removing URL from Moka cache");

        self.cache.invalidate(code.as_str()).await;
        debug!(code = %code, "Removed URL from Moka cache (if present)");
        Ok(())
    }
}

/// Configuration for creating a MokaUrlCache with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_MAX_CAPACITY)]
    max_capacity: u64,
    /// Upper bound on any entry's lifetime, regardless of the TTL it was written with.
    #[builder(default, setter(strip_option))]
    max_ttl: Option<Duration>,
}

impl From<CacheConfig> for MokaUrlCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl);

        if let Some(max_ttl) = config.max_ttl {
            builder = builder.time_to_live(max_ttl);
        }

        MokaUrlCache {
            cache: builder.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    const HOUR: Duration = Duration::from_secs(3600);

    fn cached(url: &str) -> CachedUrl {
        CachedUrl {
            original_url: url.to_string(),
            expires_at: None,
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn cache_get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");
        let value = cached("https://example.com");

        // Initially empty
        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache.set_url(&c, &value, HOUR).await.unwrap();

        let result = cache.get_url(&c).await.unwrap();
        assert_eq!(result, Some(value));
    }

    #[tokio::test]
    async fn cache_del_removes_entry() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache
            .set_url(&c, &cached("https://example.com"), HOUR)
            .await
            .unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_some());

        cache.del(&c).await.unwrap();

        assert!(cache.get_url(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cache_del_is_idempotent() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.del(&c).await.unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_none());
        cache.del(&c).await.unwrap();
    }

    #[tokio::test]
    async fn entry_expires_after_its_own_ttl() {
        let cache = MokaUrlCache::new();
        let short = code("short");
        let long = code("long");

        cache
            .set_url(&short, &cached("https://short.example"), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&long, &cached("https://long.example"), HOUR)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&short).await.unwrap().is_none());
        assert!(cache.get_url(&long).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn overwrite_resets_ttl() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache
            .set_url(&c, &cached("https://example.com"), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_url(&c, &cached("https://example.com"), HOUR)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&c).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn max_ttl_caps_entry_lifetime() {
        let cache: MokaUrlCache = MokaUrlCache::builder()
            .max_capacity(100)
            .max_ttl(Duration::from_millis(50))
            .build()
            .into();
        let c = code("abc123");

        cache
            .set_url(&c, &cached("https://example.com"), HOUR)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&c).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn keeps_expiry_alongside_url() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");
        let value = CachedUrl {
            original_url: "https://example.com".to_string(),
            expires_at: Some(Timestamp::now()),
        };

        cache.set_url(&c, &value, HOUR).await.unwrap();

        let got = cache.get_url(&c).await.unwrap().unwrap();
        assert_eq!(got.expires_at, value.expires_at);
    }
}
