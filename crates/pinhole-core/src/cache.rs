use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// The value cached for a short code.
///
/// The expiry travels with the URL so a hit can be rejected if the mapping
/// expired while the entry was still live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUrl {
    pub original_url: String,
    pub expires_at: Option<Timestamp>,
}

impl CachedUrl {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// A cache for resolved URLs, keyed by [`ShortCode`].
///
/// The cache is an accelerator only. Callers treat any error as a miss
/// (for reads) or a no-op (for writes).
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the cached URL for a short code.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>>;

    /// Store a URL that expires from the cache after `ttl`.
    async fn set_url(&self, code: &ShortCode, value: &CachedUrl, ttl: Duration) -> Result<()>;

    /// Remove the cached URL.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for std::sync::Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, value: &CachedUrl, ttl: Duration) -> Result<()> {
        (**self).set_url(code, value, ttl).await
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        (**self).del(code).await
    }
}
