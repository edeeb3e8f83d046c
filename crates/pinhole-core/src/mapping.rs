use crate::algorithm::Algorithm;
use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A durable mapping from a short code to an original URL.
///
/// Mappings are created in two phases: inserted without a short code to
/// obtain an `id`, then updated once the code derived from that id is known.
/// A mapping whose `short_code` is still `None` is pending and never resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// Store-assigned identifier. Unique and immutable.
    pub id: u64,
    pub short_code: Option<ShortCode>,
    pub original_url: String,
    pub algorithm: Algorithm,
    /// Number of successful store-backed resolutions. Never decreases.
    pub visits: u64,
    /// When the mapping expires, if ever.
    pub expires_at: Option<Timestamp>,
    /// The authenticated principal that created the mapping, if any.
    pub owner_id: Option<u64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UrlMapping {
    /// Whether the mapping has passed its expiration time at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    /// Whether the mapping has a short code and has not expired.
    pub fn is_resolvable(&self) -> bool {
        self.short_code.is_some() && !self.is_expired()
    }

    /// The cache lifetime for this mapping: the shorter of `default_ttl` and
    /// the time left until `expires_at`.
    ///
    /// Returns `None` when the mapping is already expired and must not be cached.
    pub fn cache_ttl(&self, default_ttl: Duration, now: Timestamp) -> Option<Duration> {
        let Some(expires_at) = self.expires_at else {
            return Some(default_ttl);
        };

        let remaining = Duration::try_from(now.duration_until(expires_at)).ok()?;
        if remaining.is_zero() {
            return None;
        }
        Some(remaining.min(default_ttl))
    }
}

/// The fields of a mapping known before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapping {
    pub original_url: String,
    pub algorithm: Algorithm,
    pub expires_at: Option<Timestamp>,
    pub owner_id: Option<u64>,
}

impl NewMapping {
    /// Builds the pending mapping the store persists for this request.
    pub fn into_mapping(self, id: u64, now: Timestamp) -> UrlMapping {
        UrlMapping {
            id,
            short_code: None,
            original_url: self.original_url,
            algorithm: self.algorithm,
            visits: 0,
            expires_at: self.expires_at,
            owner_id: self.owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}
