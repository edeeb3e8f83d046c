use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Settings for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    /// Upper bound on how long a resolved URL stays cached.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    /// How many codes a non-base62 strategy may try before giving up.
    #[builder(default = DEFAULT_MAX_GENERATION_ATTEMPTS)]
    pub max_generation_attempts: u32,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
