//! Concurrent TinyLFU Cache Implementation
//!
//! [`ConcurrentTinyLfuCache`] shares one [`TinyLfuCache`] between threads
//! through a `parking_lot::RwLock`. All policy decisions are made by the
//! inner cache; this type only chooses the lock mode per operation and guards
//! the eviction callback against re-entry.
//!
//! Values are returned by clone so that no lock is held after a call
//! returns. Use [`get_with`](ConcurrentTinyLfuCache::get_with) to read a
//! value in place.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use hashbrown::DefaultHashBuilder;
use parking_lot::RwLock;

use super::ReentrancyGuard;
use crate::config::{SegmentLayout, TinyLfuCacheConfig};
use crate::error::Error;
use crate::metrics::CacheMetrics;
use crate::stats::Stats;
use crate::tinylfu::TinyLfuCache;

/// A thread-safe TinyLFU cache.
///
/// # Panics
///
/// Every method panics when called from inside this cache's own eviction
/// callback. The callback runs under the write lock, so such a call could
/// never make progress.
///
/// # Examples
///
/// ```
/// use tinylfu_cache::ConcurrentTinyLfuCache;
///
/// let cache = ConcurrentTinyLfuCache::new(100).unwrap();
/// cache.put("a".to_string(), 1);
/// assert_eq!(cache.get("a"), Some(1));
/// assert_eq!(cache.get_with("a", |v| v * 10), Some(10));
/// ```
pub struct ConcurrentTinyLfuCache<K, V, S = DefaultHashBuilder> {
    inner: RwLock<TinyLfuCache<K, V, S>>,
    guard: Arc<ReentrancyGuard>,
}

impl<K, V> ConcurrentTinyLfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Creates a concurrent cache holding up to `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::from_config(TinyLfuCacheConfig::new(capacity))
    }

    /// Creates a concurrent cache that hands every evicted entry to
    /// `on_evict`. The callback runs under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn with_evict<F>(capacity: usize, on_evict: F) -> Result<Self, Error>
    where
        F: FnMut(K, V) + Send + Sync + 'static,
    {
        let cache = Self::new(capacity)?;
        cache.set_eviction_callback(on_evict);
        Ok(cache)
    }

    /// Creates a concurrent cache from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn from_config(config: TinyLfuCacheConfig) -> Result<Self, Error> {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ConcurrentTinyLfuCache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
    S: BuildHasher + Clone + Send + Sync,
{
    /// Creates a concurrent cache from a configuration and hash builder.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn with_hasher(config: TinyLfuCacheConfig, hash_builder: S) -> Result<Self, Error> {
        Ok(ConcurrentTinyLfuCache {
            inner: RwLock::new(TinyLfuCache::with_hasher(config, hash_builder)?),
            guard: Arc::new(ReentrancyGuard::new()),
        })
    }

    /// Installs (or replaces) the eviction callback.
    pub fn set_eviction_callback<F>(&self, mut on_evict: F)
    where
        F: FnMut(K, V) + Send + Sync + 'static,
    {
        self.guard.check("set_eviction_callback");
        let guard = Arc::clone(&self.guard);
        self.inner.write().set_eviction_callback(move |key, value| {
            let _scope = guard.enter();
            on_evict(key, value);
        });
    }

    /// Returns a clone of the value for `key`, recording the access.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.guard.check("get");
        self.inner.write().get(key).cloned()
    }

    /// Records an access to `key` and applies `f` to its value under the lock.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.guard.check("get_with");
        self.inner.write().get(key).map(f)
    }

    /// Inserts or updates `key`. Returns `true` if an entry left the cache.
    pub fn put(&self, key: K, value: V) -> bool {
        self.guard.check("put");
        self.inner.write().put(key, value)
    }

    /// Removes `key` without invoking the eviction callback.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.guard.check("remove");
        self.inner.write().remove(key)
    }

    /// Returns `true` if `key` is cached. Does not count as an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.guard.check("contains");
        self.inner.read().contains(key)
    }

    /// Returns a clone of the value for `key` without counting an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.guard.check("peek");
        self.inner.read().peek(key).cloned()
    }

    /// Estimated access frequency of `key`.
    pub fn frequency<Q>(&self, key: &Q) -> u8
    where
        Q: ?Sized + Hash,
    {
        self.guard.check("frequency");
        self.inner.read().frequency(key)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.guard.check("len");
        self.inner.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.guard.check("is_empty");
        self.inner.read().is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn cap(&self) -> usize {
        self.guard.check("cap");
        self.inner.read().cap()
    }

    /// Returns the current segment capacities.
    pub fn layout(&self) -> SegmentLayout {
        self.guard.check("layout");
        self.inner.read().layout()
    }

    /// Evicts every entry through the callback and resets the sketch.
    pub fn clear(&self) {
        self.guard.check("clear");
        self.inner.write().clear();
    }

    /// Changes the capacity, evicting whatever no longer fits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn resize(&self, capacity: usize) -> Result<(), Error> {
        self.guard.check("resize");
        self.inner.write().resize(capacity)
    }

    /// Snapshot of all keys: protected, then probation, then window.
    pub fn keys(&self) -> Vec<K> {
        self.guard.check("keys");
        self.inner.read().keys()
    }

    /// Snapshot of all values in [`keys`](Self::keys) order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.guard.check("values");
        self.inner.read().values()
    }

    /// Snapshot of all entries in [`keys`](Self::keys) order.
    pub fn items(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.guard.check("items");
        self.inner.read().items()
    }

    /// Returns a snapshot of segment sizes and capacities.
    pub fn stats(&self) -> Stats {
        self.guard.check("stats");
        self.inner.read().stats()
    }
}

impl<K, V, S> CacheMetrics for ConcurrentTinyLfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.guard.check("metrics");
        self.inner.read().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentTinyLFU"
    }
}

impl<K, V, S> fmt::Debug for ConcurrentTinyLfuCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_read() {
            Some(inner) => f
                .debug_struct("ConcurrentTinyLfuCache")
                .field("inner", &*inner)
                .finish(),
            None => f
                .debug_struct("ConcurrentTinyLfuCache")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}
