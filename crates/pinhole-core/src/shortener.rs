use crate::algorithm::Algorithm;
use crate::error::ShortenerError;
use crate::mapping::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, Default)]
pub enum ExpirationPolicy {
    /// The shortened URL never expires.
    #[default]
    Never,
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(SignedDuration),
    /// The shortened URL expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

impl ExpirationPolicy {
    /// Converts the policy into an absolute expiry relative to `now`.
    pub fn expires_at(&self, now: Timestamp) -> Result<Option<Timestamp>> {
        match self {
            ExpirationPolicy::Never => Ok(None),
            ExpirationPolicy::AfterDuration(duration) => now
                .checked_add(*duration)
                .map(Some)
                .map_err(|e| ShortenerError::InvalidUrl(format!("invalid expiration: {e}"))),
            ExpirationPolicy::AtTimestamp(timestamp) => Ok(Some(*timestamp)),
        }
    }
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The strategy used to derive the short code.
    pub algorithm: Algorithm,
    /// The principal creating the mapping, if authenticated.
    pub owner_id: Option<u64>,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a mapping for the URL, or returns the existing one.
    async fn shorten(&self, params: ShortenParams) -> Result<UrlMapping>;

    /// Resolves a short code to its original URL.
    ///
    /// Fails with `NotFound` for unknown codes and `Expired` for codes past
    /// their expiration time.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns every stored mapping.
    async fn list(&self) -> Result<Vec<UrlMapping>>;

    /// Deletes expired mappings from durable storage and returns how many were removed.
    async fn cleanup_expired(&self) -> Result<u64>;
}
