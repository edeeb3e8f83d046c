use crate::config::ShortenerConfig;
use async_trait::async_trait;
use jiff::Timestamp;
use pinhole_core::{
    CachedUrl, MappingRepository, NewMapping, ShortCode, ShortenParams, Shortener,
    ShortenerError, StorageError, UrlCache, UrlMapping,
};
use pinhole_generator::{base62, generator_for};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Characters of base62 salt leading a retry input. Base64 codes cover only
/// the first six input bytes, so the salt alone has to tell retries apart.
const RETRY_SALT_WIDTH: usize = 6;

/// 62^6, the number of distinct salts.
const RETRY_SALT_SPACE: u64 = 56_800_235_584;

/// Generator input for retry `attempt` of mapping `id`.
///
/// The salt is `id * attempts + attempt` in fixed-width base62, distinct for
/// every (id, attempt) pair while `id * attempts` stays below 62^6.
fn retry_input(id: u64, attempt: u32, attempts: u32, original_url: &str) -> String {
    let salt = id
        .wrapping_mul(u64::from(attempts))
        .wrapping_add(u64::from(attempt))
        % RETRY_SALT_SPACE;
    format!(
        "{:0>width$}:{original_url}",
        base62::encode(salt),
        width = RETRY_SALT_WIDTH
    )
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service combines a [`MappingRepository`] and a [`UrlCache`] to handle:
/// - Two-phase creation (insert pending, derive the code from the id, update)
/// - Deduplication of original URLs
/// - Collision retry for content-based and random strategies
/// - Cache-aside resolution with visit counting
///
/// Cache failures are logged and treated as misses; they never change the
/// outcome of a call.
#[derive(Debug)]
pub struct ShortenerService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    config: ShortenerConfig,
}

impl<R, C> Clone for ShortenerService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

impl<R: MappingRepository, C: UrlCache> ShortenerService<R, C> {
    pub fn new(repository: R, cache: C, config: ShortenerConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            config,
        }
    }

    /// Returns a reference to the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Validates that the URL has an http(s) scheme and a host.
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain whitespace or control characters: {url:?}"
            )));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {url}"
            )));
        };

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {scheme}"
            )));
        }

        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {url}"
            )));
        }

        Ok(())
    }

    /// Derives a code for a pending mapping and persists it.
    ///
    /// Base62 codes are unique by construction and are written directly.
    /// Other strategies check the code against the store and retry with a
    /// disambiguated input when another mapping already holds it.
    async fn assign_code(&self, mut mapping: UrlMapping) -> Result<UrlMapping> {
        let generator = generator_for(mapping.algorithm);

        if mapping.algorithm.is_collision_free() {
            mapping.short_code = Some(generator.generate(&mapping.original_url, mapping.id));
            mapping.updated_at = Timestamp::now();
            self.repository.update(&mapping).await?;
            return Ok(mapping);
        }

        let attempts = self.config.max_generation_attempts.max(1);
        for attempt in 0..attempts {
            let input = if attempt == 0 {
                Cow::Borrowed(mapping.original_url.as_str())
            } else {
                Cow::Owned(retry_input(
                    mapping.id,
                    attempt,
                    attempts,
                    &mapping.original_url,
                ))
            };
            let code = generator.generate(&input, mapping.id);

            if let Some(holder) = self.repository.find_by_code(&code).await? {
                if holder.id != mapping.id {
                    debug!(code = %code, attempt, holder = holder.id, "Generated code collides");
                    continue;
                }
            }

            mapping.short_code = Some(code);
            mapping.updated_at = Timestamp::now();
            match self.repository.update(&mapping).await {
                Ok(()) => return Ok(mapping),
                Err(StorageError::Conflict(code)) => {
                    debug!(code = %code, attempt, "Store rejected generated code");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            id = mapping.id,
            algorithm = %mapping.algorithm,
            attempts,
            "Could not generate a unique short code"
        );
        Err(ShortenerError::GenerationConflict(attempts))
    }

    /// Writes the mapping to the cache for at most the configured TTL, and
    /// never past its expiry. Failures are logged and ignored.
    async fn write_through(&self, mapping: &UrlMapping) {
        let Some(code) = &mapping.short_code else {
            return;
        };
        let Some(ttl) = mapping.cache_ttl(self.config.cache_ttl, Timestamp::now()) else {
            trace!(code = %code, "Mapping expires too soon to cache");
            return;
        };

        let value = CachedUrl {
            original_url: mapping.original_url.clone(),
            expires_at: mapping.expires_at,
        };
        if let Err(e) = self.cache.set_url(code, &value, ttl).await {
            warn!(code = %code, error = %e, "Failed to write mapping to cache");
        }
    }

    async fn evict(&self, code: &ShortCode) {
        if let Err(e) = self.cache.del(code).await {
            warn!(code = %code, error = %e, "Failed to evict cache entry");
        }
    }
}

#[async_trait]
impl<R: MappingRepository, C: UrlCache> Shortener for ShortenerService<R, C> {
    async fn shorten(&self, params: ShortenParams) -> Result<UrlMapping> {
        Self::validate_url(&params.original_url)?;

        let now = Timestamp::now();
        let expires_at = params.expiration.expires_at(now)?;
        if expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(ShortenerError::InvalidUrl(
                "expiration must be in the future".to_string(),
            ));
        }

        if let Some(existing) = self
            .repository
            .find_by_original_url(&params.original_url)
            .await?
        {
            if existing.short_code.is_some() && !existing.is_expired_at(now) {
                debug!(id = existing.id, "URL already shortened, returning existing mapping");
                return Ok(existing);
            }
            trace!(id = existing.id, "Existing mapping is pending or expired");
        }

        let pending = self
            .repository
            .insert(NewMapping {
                original_url: params.original_url,
                algorithm: params.algorithm,
                expires_at,
                owner_id: params.owner_id,
            })
            .await?;
        let mapping = self.assign_code(pending).await?;

        self.write_through(&mapping).await;

        if let Some(code) = &mapping.short_code {
            info!(id = mapping.id, code = %code, algorithm = %mapping.algorithm, "Created short URL");
        }
        Ok(mapping)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "Resolving short code");
        let now = Timestamp::now();

        match self.cache.get_url(code).await {
            Ok(Some(cached)) if cached.is_expired_at(now) => {
                debug!(code = %code, "Cached entry outlived its mapping");
                self.evict(code).await;
                return Err(ShortenerError::Expired);
            }
            Ok(Some(cached)) => {
                debug!(code = %code, "Resolved from cache");
                return Ok(cached.original_url);
            }
            Ok(None) => trace!(code = %code, "Cache miss"),
            Err(e) => warn!(code = %code, error = %e, "Cache error on get, falling back to storage"),
        }

        let Some(mut mapping) = self.repository.find_by_code(code).await? else {
            debug!(code = %code, "Short code not found");
            return Err(ShortenerError::NotFound);
        };

        if mapping.is_expired_at(now) {
            debug!(code = %code, "Mapping has expired");
            return Err(ShortenerError::Expired);
        }

        mapping.visits += 1;
        mapping.updated_at = now;
        if let Err(e) = self.repository.update(&mapping).await {
            warn!(code = %code, error = %e, "Failed to record visit");
        }

        self.write_through(&mapping).await;

        debug!(code = %code, visits = mapping.visits, "Resolved from storage");
        Ok(mapping.original_url)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        Ok(self.repository.list_all().await?)
    }

    async fn cleanup_expired(&self) -> Result<u64> {
        let deleted = self.repository.delete_expired(Timestamp::now()).await?;
        debug!(deleted, "Deleted expired mappings");
        Ok(deleted)
    }
}
