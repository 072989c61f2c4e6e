//! In-memory cache for hot public reads.
//!
//! Only the category tree and the public site info are cached; both change
//! rarely and are fetched on every storefront page. Writes through the API
//! invalidate the affected entry immediately, so the TTL only bounds
//! staleness from out-of-band edits (CLI seeding, manual SQL).
//!
//! Readers fill the cache after a database read, so a write can land between
//! the read and the fill. Each key has a generation counter that every
//! invalidation bumps; a fill taken at an older generation is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::models::{Category, SiteInfo};

const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Categories,
    SiteInfo,
}

impl CacheKey {
    const fn slot(self) -> usize {
        match self {
            Self::Categories => 0,
            Self::SiteInfo => 1,
        }
    }
}

/// Generation of a cache key, read before the database query that fills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug, Clone)]
enum CacheValue {
    Categories(Vec<Category>),
    SiteInfo(Box<SiteInfo>),
}

/// Cached category tree and site info.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<CacheKey, CacheValue>,
    generations: Arc<[AtomicU64; 2]>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();
        Self {
            cache,
            generations: Arc::new([AtomicU64::new(0), AtomicU64::new(0)]),
        }
    }

    fn generation(&self, key: CacheKey) -> Generation {
        Generation(self.generations[key.slot()].load(Ordering::SeqCst))
    }

    /// Insert `value` unless `key` was invalidated since `seen`.
    ///
    /// The generation is checked again after the insert so an invalidation
    /// racing with the insert still evicts the stale value.
    async fn fill(&self, key: CacheKey, seen: Generation, value: CacheValue) -> bool {
        if self.generation(key) != seen {
            return false;
        }
        self.cache.insert(key, value).await;
        if self.generation(key) == seen {
            return true;
        }
        self.cache.invalidate(&key).await;
        debug!(?key, "Dropped cache fill after concurrent invalidation");
        false
    }

    async fn invalidate(&self, key: CacheKey) {
        self.generations[key.slot()].fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(&key).await;
    }

    pub async fn categories(&self) -> Option<Vec<Category>> {
        match self.cache.get(&CacheKey::Categories).await {
            Some(CacheValue::Categories(categories)) => {
                debug!("Cache hit for categories");
                Some(categories)
            }
            _ => None,
        }
    }

    /// Take before reading the category tree from the database.
    #[must_use]
    pub fn categories_generation(&self) -> Generation {
        self.generation(CacheKey::Categories)
    }

    /// Cache a tree read at generation `seen`. Returns whether it was kept.
    pub async fn set_categories(&self, seen: Generation, categories: Vec<Category>) -> bool {
        self.fill(CacheKey::Categories, seen, CacheValue::Categories(categories))
            .await
    }

    pub async fn invalidate_categories(&self) {
        self.invalidate(CacheKey::Categories).await;
    }

    pub async fn site_info(&self) -> Option<SiteInfo> {
        match self.cache.get(&CacheKey::SiteInfo).await {
            Some(CacheValue::SiteInfo(info)) => {
                debug!("Cache hit for site info");
                Some(*info)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn site_info_generation(&self) -> Generation {
        self.generation(CacheKey::SiteInfo)
    }

    pub async fn set_site_info(&self, seen: Generation, info: SiteInfo) -> bool {
        self.fill(CacheKey::SiteInfo, seen, CacheValue::SiteInfo(Box::new(info)))
            .await
    }

    pub async fn invalidate_site_info(&self) {
        self.invalidate(CacheKey::SiteInfo).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;

    #[tokio::test]
    async fn test_site_info_round_trip_and_invalidate() {
        let cache = CatalogCache::new();
        assert!(cache.site_info().await.is_none());

        let seen = cache.site_info_generation();
        assert!(cache.set_site_info(seen, Settings::default().into()).await);
        let info = cache.site_info().await;
        assert_eq!(info.map(|i| i.site_name).as_deref(), Some("Souq"));

        cache.invalidate_site_info().await;
        assert!(cache.site_info().await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = CatalogCache::new();
        let categories_seen = cache.categories_generation();
        let site_seen = cache.site_info_generation();
        cache.set_categories(categories_seen, Vec::new()).await;
        cache.set_site_info(site_seen, Settings::default().into()).await;

        cache.invalidate_categories().await;
        assert!(cache.categories().await.is_none());
        assert!(cache.site_info().await.is_some());
    }

    #[tokio::test]
    async fn test_fill_after_invalidation_is_dropped() {
        let cache = CatalogCache::new();

        // Reader snapshots, a writer invalidates, then the reader fills
        // with what it read before the write.
        let seen = cache.categories_generation();
        cache.invalidate_categories().await;
        assert!(!cache.set_categories(seen, Vec::new()).await);
        assert!(cache.categories().await.is_none());

        // The next reader sees the new generation and may fill.
        let seen = cache.categories_generation();
        assert!(cache.set_categories(seen, Vec::new()).await);
        assert!(cache.categories().await.is_some());
    }

    #[tokio::test]
    async fn test_clones_share_generations() {
        let cache = CatalogCache::new();
        let writer = cache.clone();

        let seen = cache.site_info_generation();
        writer.invalidate_site_info().await;
        assert!(!cache.set_site_info(seen, Settings::default().into()).await);
        assert!(cache.site_info().await.is_none());
    }
}
