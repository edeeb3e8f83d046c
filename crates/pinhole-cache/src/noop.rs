use async_trait::async_trait;
use pinhole_core::cache::Result;
use pinhole_core::{CachedUrl, ShortCode, UrlCache};
use std::time::Duration;

/// A cache that stores nothing.
///
/// Used when no cache backend is configured: every lookup misses and every
/// write is discarded, so all reads go to the repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUrlCache;

#[async_trait]
impl UrlCache for NoopUrlCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<CachedUrl>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _value: &CachedUrl, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn del(&self, _code: &ShortCode) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_misses() {
        let cache = NoopUrlCache;
        let code = ShortCode::new_unchecked("abc");
        let value = CachedUrl {
            original_url: "https://example.com".to_string(),
            expires_at: None,
        };

        cache
            .set_url(&code, &value, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get_url(&code).await.unwrap().is_none());
        cache.del(&code).await.unwrap();
    }
}
