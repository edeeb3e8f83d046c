use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use pinhole_core::repository::{MappingRepository, Result};
use pinhole_core::{NewMapping, ShortCode, StorageError, UrlMapping};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory implementation of [`MappingRepository`] using DashMap.
///
/// Mappings are keyed by id, with secondary indexes from short code and
/// original URL to id. DashMap's sharded locks let concurrent requests touch
/// different mappings without blocking each other.
#[derive(Debug)]
pub struct InMemoryRepository {
    mappings: DashMap<u64, UrlMapping>,
    codes: DashMap<String, u64>,
    originals: DashMap<String, u64>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository. Ids start at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates an empty repository whose first insert gets `first_id`.
    pub fn starting_at(first_id: u64) -> Self {
        Self {
            mappings: DashMap::new(),
            codes: DashMap::new(),
            originals: DashMap::new(),
            next_id: AtomicU64::new(first_id.max(1)),
        }
    }

    /// Number of stored mappings, including pending ones.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingRepository for InMemoryRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let Some(id) = self.codes.get(code.as_str()).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.mappings.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let Some(id) = self.originals.get(original_url).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.mappings.get(&id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, mapping: NewMapping) -> Result<UrlMapping> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mapping = mapping.into_mapping(id, Timestamp::now());

        self.mappings.insert(id, mapping.clone());
        // The newest mapping for a URL wins the dedupe lookup.
        self.originals.insert(mapping.original_url.clone(), id);

        trace!(id, "Inserted pending mapping");
        Ok(mapping)
    }

    async fn update(&self, mapping: &UrlMapping) -> Result<()> {
        let Some(mut stored) = self.mappings.get_mut(&mapping.id) else {
            return Err(StorageError::Operation(format!(
                "no mapping with id {}",
                mapping.id
            )));
        };

        if let Some(code) = &mapping.short_code {
            match self.codes.entry(code.as_str().to_owned()) {
                Entry::Occupied(entry) if *entry.get() != mapping.id => {
                    return Err(StorageError::Conflict(code.to_string()));
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(mapping.id);
                }
            }
        }

        if stored.short_code != mapping.short_code {
            if let Some(old) = &stored.short_code {
                self.codes.remove_if(old.as_str(), |_, id| *id == mapping.id);
            }
        }

        *stored = mapping.clone();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let mut mappings: Vec<UrlMapping> = self
            .mappings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        mappings.sort_by_key(|mapping| mapping.id);
        Ok(mappings)
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let is_expired =
            |mapping: &UrlMapping| mapping.expires_at.is_some_and(|expires_at| expires_at < now);

        // Collect first: removing while iterating would deadlock on the shard lock.
        let expired: Vec<u64> = self
            .mappings
            .iter()
            .filter(|entry| is_expired(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut deleted = 0;
        for id in expired {
            let Some((_, mapping)) = self.mappings.remove_if(&id, |_, m| is_expired(m)) else {
                continue;
            };
            if let Some(code) = &mapping.short_code {
                self.codes.remove_if(code.as_str(), |_, held| *held == id);
            }
            self.originals
                .remove_if(&mapping.original_url, |_, held| *held == id);
            deleted += 1;
        }

        Ok(deleted)
    }
}
