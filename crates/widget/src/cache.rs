//! Item cache.
//!
//! Maps ASINs to product records, backed by a single JSON blob in the option
//! store under the `cache` key.
//!
//! # Behavior
//!
//! - Hydrated lazily from the store on first access; a missing or corrupt
//!   blob is treated as empty
//! - A failed store read leaves the cache unhydrated: the item is fetched
//!   but not persisted, and the next access retries the read
//! - No expiry and no size bound; a hit is returned as-is
//! - A miss fetches the item, inserts it and persists the whole map
//! - Concurrent misses for the same ASIN share one fetch
//! - Failed fetches are never persisted

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use amazon_product_widget_core::{Asin, ProductRecord};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::amazon::AmazonError;
use crate::store::{OptionStore, StoreError, option_keys};

/// Source of product records on a cache miss.
pub trait ItemFetcher: Send + Sync {
    /// Fetch the record for `asin` from upstream.
    fn fetch_item(
        &self,
        asin: &Asin,
    ) -> impl Future<Output = Result<ProductRecord, AmazonError>> + Send;
}

impl<T: ItemFetcher> ItemFetcher for Arc<T> {
    fn fetch_item(
        &self,
        asin: &Asin,
    ) -> impl Future<Output = Result<ProductRecord, AmazonError>> + Send {
        (**self).fetch_item(asin)
    }
}

/// Errors surfaced by [`ItemCache::try_get`] and [`ItemCache::clear`].
#[derive(Debug, Error)]
pub enum CacheError {
    /// The upstream fetch failed. Shared between coalesced callers.
    #[error("fetch failed: {0}")]
    Fetch(Arc<AmazonError>),

    /// The option store rejected the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

type Entries = RwLock<BTreeMap<Asin, ProductRecord>>;

/// Lazily hydrated, persisted ASIN to product record cache.
pub struct ItemCache<S, F> {
    store: S,
    fetcher: F,
    entries: OnceCell<Entries>,
    in_flight: moka::future::Cache<Asin, ProductRecord>,
    persist_lock: Mutex<()>,
}

impl<S, F> std::fmt::Debug for ItemCache<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemCache")
            .field("hydrated", &self.entries.initialized())
            .finish_non_exhaustive()
    }
}

impl<S: OptionStore, F: ItemFetcher> ItemCache<S, F> {
    /// Create a cache over `store` that fetches misses through `fetcher`.
    ///
    /// Nothing is read from the store until the first lookup.
    #[must_use]
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            entries: OnceCell::new(),
            in_flight: moka::future::Cache::new(1024),
            persist_lock: Mutex::new(()),
        }
    }

    /// The backing option store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The upstream fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Return the record for `asin`, fetching it on a miss.
    ///
    /// Never fails: if the record cannot be obtained, a record carrying only
    /// the identifier is returned and nothing is cached.
    pub async fn get(&self, asin: &Asin) -> ProductRecord {
        match self.try_get(asin).await {
            Ok(record) => record,
            Err(e) => {
                warn!(asin = %asin, error = %e, "Item lookup failed, rendering empty record");
                ProductRecord::empty(asin.clone())
            }
        }
    }

    /// Return the record for `asin`, fetching it on a miss.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Fetch` if the upstream lookup fails.
    #[instrument(skip(self), fields(asin = %asin))]
    pub async fn try_get(&self, asin: &Asin) -> Result<ProductRecord, CacheError> {
        let entries = match self.entries().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to read item cache, fetching without caching");
                return self
                    .fetcher
                    .fetch_item(asin)
                    .await
                    .map_err(|e| CacheError::Fetch(Arc::new(e)));
            }
        };

        if let Some(record) = entries.read().await.get(asin).cloned() {
            debug!("Cache hit for item");
            return Ok(record);
        }

        debug!("Cache miss for item");
        let result = self
            .in_flight
            .try_get_with(asin.clone(), self.fetch_and_store(entries, asin))
            .await;
        self.in_flight.invalidate(asin).await;

        result.map_err(CacheError::Fetch)
    }

    /// Number of cached records. Zero while the store is unreadable.
    pub async fn len(&self) -> usize {
        match self.loaded().await {
            Some(entries) => entries.read().await.len(),
            None => 0,
        }
    }

    /// Returns `true` if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns `true` if `asin` is cached.
    pub async fn contains(&self, asin: &Asin) -> bool {
        match self.loaded().await {
            Some(entries) => entries.read().await.contains_key(asin),
            None => false,
        }
    }

    /// Drop every cached record and delete the persisted blob.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Store` if the blob cannot be deleted.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CacheError> {
        let _guard = self.persist_lock.lock().await;
        if let Some(entries) = self.entries.get() {
            entries.write().await.clear();
        }
        self.in_flight.invalidate_all();
        self.store.delete(option_keys::CACHE).await?;
        info!("Item cache cleared");
        Ok(())
    }

    async fn fetch_and_store(
        &self,
        entries: &Entries,
        asin: &Asin,
    ) -> Result<ProductRecord, AmazonError> {
        // A coalesced caller may arrive after the first fetch has landed.
        if let Some(record) = entries.read().await.get(asin).cloned() {
            return Ok(record);
        }

        let record = self.fetcher.fetch_item(asin).await?;
        entries.write().await.insert(asin.clone(), record.clone());
        self.persist(entries).await;

        Ok(record)
    }

    /// Write the whole map to the store. Failures are logged, not returned.
    async fn persist(&self, entries: &Entries) {
        let _guard = self.persist_lock.lock().await;

        let blob = {
            let entries = entries.read().await;
            serde_json::to_string(&*entries)
        };

        let result = match blob {
            Ok(blob) => self.store.set(option_keys::CACHE, &blob).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist item cache");
        }
    }

    /// The hydrated map. A store read error leaves the cell empty so the
    /// next call retries.
    async fn entries(&self) -> Result<&Entries, StoreError> {
        self.entries
            .get_or_try_init(|| async { self.hydrate().await.map(RwLock::new) })
            .await
    }

    async fn loaded(&self) -> Option<&Entries> {
        match self.entries().await {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(error = %e, "Failed to read item cache");
                None
            }
        }
    }

    async fn hydrate(&self) -> Result<BTreeMap<Asin, ProductRecord>, StoreError> {
        let blob = match self.store.get(option_keys::CACHE).await? {
            Some(blob) if !blob.trim().is_empty() => blob,
            _ => return Ok(BTreeMap::new()),
        };

        match serde_json::from_str::<BTreeMap<Asin, ProductRecord>>(&blob) {
            Ok(entries) => {
                debug!(count = entries.len(), "Item cache hydrated");
                Ok(entries)
            }
            Err(e) => {
                warn!(error = %e, "Persisted item cache is corrupt, starting empty");
                Ok(BTreeMap::new())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::store::MemoryStore;

    struct StaticFetcher {
        calls: AtomicUsize,
    }

    impl ItemFetcher for StaticFetcher {
        async fn fetch_item(&self, asin: &Asin) -> Result<ProductRecord, AmazonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut record = ProductRecord::empty(asin.clone());
            record.description = format!("Item {asin}");
            Ok(record)
        }
    }

    struct NotFoundFetcher;

    impl ItemFetcher for NotFoundFetcher {
        async fn fetch_item(&self, asin: &Asin) -> Result<ProductRecord, AmazonError> {
            Err(AmazonError::ItemNotFound(asin.clone()))
        }
    }

    fn asin() -> Asin {
        Asin::parse("0439136369").unwrap()
    }

    #[tokio::test]
    async fn test_hit_after_miss() {
        let cache = ItemCache::new(
            MemoryStore::new(),
            StaticFetcher {
                calls: AtomicUsize::new(0),
            },
        );

        let first = cache.get(&asin()).await;
        let second = cache.get(&asin()).await;

        assert_eq!(first, second);
        assert_eq!(first.description, "Item 0439136369");
        assert_eq!(cache.fetcher().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.store().writes(), 1);
    }

    #[tokio::test]
    async fn test_try_get_surfaces_failure() {
        let cache = ItemCache::new(MemoryStore::new(), NotFoundFetcher);

        let err = cache.try_get(&asin()).await.unwrap_err();
        assert_eq!(err.to_string(), "fetch failed: Item not found: 0439136369");
        assert!(!cache.contains(&asin()).await);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_empty_record() {
        let cache = ItemCache::new(MemoryStore::new(), NotFoundFetcher);

        let record = cache.get(&asin()).await;
        assert_eq!(record, ProductRecord::empty(asin()));
        assert_eq!(cache.store().writes(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let store = MemoryStore::with_values([(option_keys::CACHE, "{not json")]);
        let cache = ItemCache::new(
            store,
            StaticFetcher {
                calls: AtomicUsize::new(0),
            },
        );

        assert!(cache.is_empty().await);
        cache.get(&asin()).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_hydration_is_lazy() {
        let cache = ItemCache::new(MemoryStore::new(), NotFoundFetcher);
        assert_eq!(format!("{cache:?}"), "ItemCache { hydrated: false, .. }");

        cache.len().await;
        assert_eq!(format!("{cache:?}"), "ItemCache { hydrated: true, .. }");
    }
}
