//! Artwork cache - memoize finished artwork by request hash
//!
//! Lives outside the generation path: the generator never consults it.
//! Bounded by entry count with least-recently-used eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::generator::{Artwork, ArtworkGenerator, ArtworkRequest};
use crate::hashing::compute_request_hash;
use crate::ENGINE_VERSION;

/// Configuration for the artwork cache.
#[derive(Debug, Clone)]
pub struct ArtworkCacheConfig {
    /// Maximum number of entries. Zero disables caching.
    pub max_entries: usize,
}

impl Default for ArtworkCacheConfig {
    fn default() -> Self {
        Self { max_entries: 16 }
    }
}

struct CacheEntry {
    artwork: Arc<Artwork>,
    /// Access tick, higher is more recent
    last_accessed: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tick: u64,
    evictions: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn get(&mut self, key: &str) -> Option<Arc<Artwork>> {
        let tick = self.next_tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_accessed = tick;
        Some(Arc::clone(&entry.artwork))
    }

    /// Insert unless a racing caller already did; returns the cached value.
    fn insert(&mut self, key: String, artwork: Arc<Artwork>, max_entries: usize) -> Arc<Artwork> {
        if let Some(existing) = self.get(&key) {
            return existing;
        }
        if max_entries == 0 {
            return artwork;
        }
        while self.entries.len() >= max_entries {
            self.evict_lru();
        }
        let last_accessed = self.next_tick();
        self.entries.insert(key, CacheEntry { artwork: Arc::clone(&artwork), last_accessed });
        artwork
    }

    fn evict_lru(&mut self) {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest_key {
            self.entries.remove(&key);
            self.evictions += 1;
            tracing::debug!(%key, "artwork cache eviction");
        }
    }
}

#[derive(Default)]
pub struct ArtworkCache {
    config: ArtworkCacheConfig,
    state: Mutex<CacheState>,
}

impl ArtworkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ArtworkCacheConfig) -> Self {
        Self { config, state: Mutex::default() }
    }

    /// Cached artwork for `request`, generating it on a miss.
    ///
    /// Unavailable artwork is not cached. Generation runs without the lock
    /// held; two racing misses both generate and the first insert wins.
    pub fn get_or_generate(&self, generator: &ArtworkGenerator, request: &ArtworkRequest) -> Option<Arc<Artwork>> {
        let normalized = generator.normalize(request);
        let key = match compute_request_hash(&normalized, generator.config().color_pipeline, ENGINE_VERSION) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(error = %e, "request not hashable, bypassing cache");
                return generator.generate(request).map(Arc::new);
            }
        };

        if let Some(hit) = self.lock().get(&key) {
            tracing::debug!(%key, "artwork cache hit");
            return Some(hit);
        }

        let artwork = Arc::new(generator.generate(request)?);
        Some(self.lock().insert(key, artwork, self.config.max_entries))
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries dropped to stay within `max_entries`.
    pub fn evictions(&self) -> u64 {
        self.lock().evictions
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // entries stay valid even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seed: &str) -> ArtworkRequest {
        ArtworkRequest::new(vec!["meaning".into()]).with_seed(seed).with_size(32, 32)
    }

    fn bounded(max_entries: usize) -> ArtworkCache {
        ArtworkCache::with_config(ArtworkCacheConfig { max_entries })
    }

    #[test]
    fn test_hit_returns_same_artwork() {
        let generator = ArtworkGenerator::default();
        let cache = ArtworkCache::new();

        let first = cache.get_or_generate(&generator, &request("a")).unwrap();
        let second = cache.get_or_generate(&generator, &request("a")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.get_or_generate(&generator, &request("b")).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unavailable_not_cached() {
        let generator = ArtworkGenerator::default();
        let cache = ArtworkCache::new();
        let oversize = request("a").with_size(100_000, 1);
        assert!(cache.get_or_generate(&generator, &oversize).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_len_stays_at_cap() {
        let generator = ArtworkGenerator::default();
        let cache = bounded(3);

        for seed in ["a", "b", "c", "d", "e", "f"] {
            cache.get_or_generate(&generator, &request(seed)).unwrap();
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.evictions(), 3);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let generator = ArtworkGenerator::default();
        let cache = bounded(2);

        let a = cache.get_or_generate(&generator, &request("a")).unwrap();
        cache.get_or_generate(&generator, &request("b")).unwrap();
        // touch a so b becomes the oldest
        cache.get_or_generate(&generator, &request("a")).unwrap();
        cache.get_or_generate(&generator, &request("c")).unwrap();

        assert_eq!(cache.len(), 2);
        let a_again = cache.get_or_generate(&generator, &request("a")).unwrap();
        assert!(Arc::ptr_eq(&a, &a_again));
        assert_eq!(cache.evictions(), 1);
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let generator = ArtworkGenerator::default();
        let cache = bounded(0);
        assert!(cache.get_or_generate(&generator, &request("a")).is_some());
        assert!(cache.is_empty());
    }
}
