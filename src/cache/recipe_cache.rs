//! Read-Through Recipe Cache
//!
//! Maps recipe ids to their last read projection. Entries are filled on a
//! read miss and dropped when the recipe is rated. There is no TTL and no
//! capacity bound.

use std::future::Future;

use dashmap::DashMap;
use tracing::debug;

use crate::cache::stats::{CacheStats, StatsCounters};
use crate::models::{Recipe, RecipeId};
use crate::store::{RecipeStore, StoreError};

// == Recipe Cache ==
/// Process-wide read-through cache, safe to share across requests.
///
/// Per-key locking comes from the sharded map; there is no global lock.
/// Each id carries an invalidation epoch that guards fills: a projection
/// fetched before an invalidation of the same id is discarded instead of
/// being left in the map. Invalidating one id never drops fills of another.
#[derive(Debug, Default)]
pub struct RecipeCache {
    entries: DashMap<RecipeId, Recipe>,
    epochs: DashMap<RecipeId, u64>,
    stats: StatsCounters,
}

impl RecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the cached recipe, or fetches it from `store` and caches it.
    ///
    /// Errors, `NotFound` included, are returned without caching anything.
    pub async fn get(&self, id: RecipeId, store: &dyn RecipeStore) -> Result<Recipe, StoreError> {
        self.get_or_fetch(id, |id| store.find_by_id(id)).await
    }

    /// Same as [`RecipeCache::get`] with an arbitrary fetch function.
    pub async fn get_or_fetch<F, Fut>(&self, id: RecipeId, fetch: F) -> Result<Recipe, StoreError>
    where
        F: FnOnce(RecipeId) -> Fut,
        Fut: Future<Output = Result<Recipe, StoreError>>,
    {
        if let Some(cached) = self.entries.get(&id).map(|entry| entry.value().clone()) {
            self.stats.record_hit();
            debug!("Recipe cache hit: {}", id);
            return Ok(cached);
        }

        self.stats.record_miss();
        debug!("Recipe cache miss: {}", id);

        let epoch = self.epoch_of(id);
        let recipe = fetch(id).await?;

        self.entries.insert(id, recipe.clone());
        if self.epoch_of(id) != epoch {
            // Invalidated mid-fetch; the projection may predate the write.
            self.entries.remove(&id);
            debug!("Discarded racing cache fill for {}", id);
        }

        Ok(recipe)
    }

    // == Invalidate ==
    /// Drops any cached projection for `id`. Returns whether one existed.
    pub fn invalidate(&self, id: RecipeId) -> bool {
        *self.epochs.entry(id).or_insert(0) += 1;
        let removed = self.entries.remove(&id).is_some();
        self.stats.record_invalidation();
        debug!("Recipe cache invalidated: {} (entry present: {})", id, removed);
        removed
    }

    fn epoch_of(&self, id: RecipeId) -> u64 {
        self.epochs.get(&id).map(|epoch| *epoch).unwrap_or(0)
    }

    /// Whether `id` currently has a cached projection. Does not touch stats.
    pub fn contains(&self, id: RecipeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewRecipe, Rating};
    use crate::store::MemoryRecipeStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn seeded_store() -> (MemoryRecipeStore, RecipeId) {
        let store = MemoryRecipeStore::new();
        let new = NewRecipe::new(
            "Pancakes".into(),
            "Fluffy".into(),
            vec!["flour".into(), "milk".into()],
            "/uploads/p.jpg".into(),
        );
        let id = store.insert(&new).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (store, id) = seeded_store().await;
        let cache = RecipeCache::new();

        let first = cache.get(id, &store).await.unwrap();
        assert!(cache.contains(id));
        let second = cache.get(id, &store).await.unwrap();
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_hit_does_not_call_store() {
        let (store, id) = seeded_store().await;
        let cache = RecipeCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_fetch(id, |id| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    store.find_by_id(id)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let store = MemoryRecipeStore::new();
        let cache = RecipeCache::new();
        let id = RecipeId::new();

        let result = cache.get(id, &store).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (store, id) = seeded_store().await;
        let cache = RecipeCache::new();

        let before = cache.get(id, &store).await.unwrap();
        assert_eq!(before.avg_rating, None);

        store.append_rating(id, Rating::new(4).unwrap()).await.unwrap();
        // Still stale until invalidated.
        assert_eq!(cache.get(id, &store).await.unwrap().avg_rating, None);

        assert!(cache.invalidate(id));
        let after = cache.get(id, &store).await.unwrap();
        assert_eq!(after.avg_rating, Some(4.0));
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[tokio::test]
    async fn test_invalidate_absent_key() {
        let cache = RecipeCache::new();
        assert!(!cache.invalidate(RecipeId::new()));
    }

    #[tokio::test]
    async fn test_fill_racing_invalidation_is_discarded() {
        let (store, id) = seeded_store().await;
        let cache = RecipeCache::new();

        let recipe = cache
            .get_or_fetch(id, |id| {
                // An invalidation lands while this fetch is in flight.
                cache.invalidate(id);
                store.find_by_id(id)
            })
            .await
            .unwrap();

        assert_eq!(recipe.id, id);
        assert!(!cache.contains(id));
    }

    #[tokio::test]
    async fn test_invalidating_other_id_keeps_fill() {
        let (store, id) = seeded_store().await;
        let cache = RecipeCache::new();
        let other = RecipeId::new();

        cache
            .get_or_fetch(id, |id| {
                cache.invalidate(other);
                store.find_by_id(id)
            })
            .await
            .unwrap();

        assert!(cache.contains(id));
        cache.get(id, &store).await.unwrap();
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_and_invalidations() {
        let (store, id) = seeded_store().await;
        let store = Arc::new(store);
        let cache = Arc::new(RecipeCache::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                if i % 4 == 0 {
                    cache.invalidate(id);
                } else {
                    cache.get(id, store.as_ref()).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 24);
        assert_eq!(stats.invalidations, 8);
        assert!(cache.len() <= 1);
    }
}
