use crate::error::StorageError;
use crate::mapping::{NewMapping, UrlMapping};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable storage for [`UrlMapping`]s.
///
/// Implementations only need per-call atomicity. Lookups return `Ok(None)`
/// rather than an error when nothing matches.
#[async_trait]
pub trait MappingRepository: Send + Sync + 'static {
    /// Finds the mapping holding `code`. Pending mappings never match.
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Finds the most recently inserted mapping for `original_url`.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>>;

    /// Persists a pending mapping and returns it with its assigned id.
    async fn insert(&self, mapping: NewMapping) -> Result<UrlMapping>;

    /// Replaces the stored mapping with the same id.
    ///
    /// Returns `Err(Conflict)` if `short_code` is already held by another mapping.
    async fn update(&self, mapping: &UrlMapping) -> Result<()>;

    /// Returns every stored mapping, ordered by id.
    async fn list_all(&self) -> Result<Vec<UrlMapping>>;

    /// Deletes every mapping whose `expires_at` is set and earlier than `now`.
    /// Returns the number of deleted mappings.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64>;
}
