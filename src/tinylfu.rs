//! Window TinyLFU Cache Implementation
//!
//! TinyLFU puts a frequency-based admission filter in front of a segmented
//! LRU. New entries land in a small **window** segment; when the window
//! overflows, its least recently used entry becomes a *candidate* for the
//! main area and is admitted only if it looks more popular than the entry it
//! would push out. Popularity is estimated with a Count-Min Sketch that ages
//! over time.
//!
//! # How the Algorithm Works
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                              TinyLFU Cache                                │
//! │                                                                           │
//! │   put(new) ──▶ ┌──────────────── WINDOW (≈1%) ────────────────┐          │
//! │                │ MRU ◀──▶ [w_1] ◀──▶ ... ◀──▶ [candidate] LRU │          │
//! │                └───────────────────────────────┬──────────────┘          │
//! │                                                │ overflow                 │
//! │                                                ▼                          │
//! │                        ┌───────── admission filter ─────────┐            │
//! │                        │ doorkeeper: seen before?            │──▶ evict   │
//! │                        │ freq(candidate) > freq(victim)?     │──▶ evict   │
//! │                        └────────────────┬────────────────────┘            │
//! │                                         │ admit                           │
//! │   ┌──────────────────────── MAIN (≈99%) ┼───────────────────────────┐    │
//! │   │  ┌──────── PROBATION (20%) ─────────▼─────┐                      │    │
//! │   │  │ MRU ◀──▶ ... ◀──▶ [victim] LRU ────────┼──▶ evict             │    │
//! │   │  └────────────────────┬───────────────▲───┘                      │    │
//! │   │              hit: promote        demote                          │    │
//! │   │  ┌────────────────────▼───────────────┴───┐                      │    │
//! │   │  │ PROTECTED (80%)  MRU ◀──▶ ... ◀──▶ LRU │                      │    │
//! │   │  └────────────────────────────────────────┘                      │    │
//! │   └──────────────────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Lifecycle
//!
//! 1. **Insert**: a new key is pushed to the front of the window. If the
//!    window is full its tail is run through the admission filter first.
//! 2. **Admission**: a candidate is rejected the first time the doorkeeper
//!    sees it. Afterwards it is admitted only when its estimated frequency is
//!    strictly greater than the probation tail's (or probation is empty).
//! 3. **Promotion**: a hit in probation moves the entry to protected. A full
//!    protected segment demotes its tail back to probation first.
//! 4. **Eviction**: rejected candidates and probation tails leave the cache
//!    and are handed to the eviction callback.
//!
//! ## Aging
//!
//! Every `put` and every hit touches the sketch. After
//! `sample_factor × capacity` new keys have been inserted, the sketch halves
//! all its counters and the doorkeeper forgets everything, so yesterday's
//! popular keys lose their advantage.
//!
//! ## Operations
//!
//! | Operation | Action | Time |
//! |-----------|--------|------|
//! | `get(key)` | Touch sketch, move to front or promote | O(1) |
//! | `put(key, value)` | Touch sketch, insert into window, may evict | O(1) |
//! | `remove(key)` | Unlink from its segment, no callback | O(1) |
//! | `peek(key)` / `contains(key)` | Lookup only | O(1) |
//! | `resize(capacity)` | Recompute segments, evict the excess | O(excess) |
//! | `clear()` | Evict everything through the callback | O(n) |
//!
//! # Thread Safety
//!
//! `TinyLfuCache` is **not thread-safe**. Use `ConcurrentTinyLfuCache`
//! (requires the `concurrent` feature) for shared access.
//!
//! # Examples
//!
//! ```
//! use tinylfu_cache::TinyLfuCache;
//!
//! let mut cache = TinyLfuCache::new(100).unwrap();
//! cache.put("a", 1);
//! assert_eq!(cache.get(&"a"), Some(&1));
//!
//! // "a" leaves the window; this is its first sighting, so it is rejected
//! cache.put("b", 2);
//! assert!(!cache.contains(&"a"));
//! assert_eq!(cache.peek(&"b"), Some(&2));
//! ```

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::Chain;
use core::mem;

use hashbrown::{DefaultHashBuilder, HashMap};
use tracing::{debug, trace};

use crate::admission;
use crate::config::{SegmentLayout, TinyLfuCacheConfig};
use crate::doorkeeper::Doorkeeper;
use crate::error::Error;
use crate::list::{self, Arena, Handle, List};
use crate::metrics::{CacheMetrics, TinyLfuCacheMetrics};
use crate::sketch::FrequencySketch;
use crate::stats::Stats;

/// Callback invoked with the key and value of every entry the cache evicts.
///
/// It runs synchronously inside the evicting call and must not call back
/// into the same cache.
pub type EvictionCallback<K, V> = Box<dyn FnMut(K, V) + Send + Sync>;

/// Segment that currently orders an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment {
    Window,
    Probation,
    Protected,
}

struct Entry<K, V> {
    key: K,
    value: V,
    segment: Segment,
}

/// A Window TinyLFU cache.
///
/// Entries live in an arena and are ordered by three recency lists (window,
/// probation, protected). The key index maps every cached key to its arena
/// handle; an entry is reachable from the index if and only if exactly one
/// of the three lists links it.
///
/// # Examples
///
/// ```
/// use tinylfu_cache::TinyLfuCache;
///
/// let mut cache = TinyLfuCache::new(10).unwrap();
///
/// cache.put("a", 1);
/// cache.put("b", 2); // "a" rejected: first time the doorkeeper sees it
/// cache.put("a", 1); // "b" rejected, "a" back in the window
/// cache.put("c", 3); // "a" seen before and probation empty: admitted
///
/// let stats = cache.stats();
/// assert_eq!(stats.probation_size, 1);
/// assert_eq!(stats.window_size, 1);
///
/// // A hit in probation promotes to protected
/// assert_eq!(cache.get(&"a"), Some(&1));
/// assert_eq!(cache.stats().protected_size, 1);
/// ```
pub struct TinyLfuCache<K, V, S = DefaultHashBuilder> {
    config: TinyLfuCacheConfig,
    layout: SegmentLayout,
    map: HashMap<K, Handle, S>,
    entries: Arena<Entry<K, V>>,
    window: List,
    probation: List,
    protected: List,
    sketch: FrequencySketch<S>,
    doorkeeper: Doorkeeper<K, S>,
    inserts_since_aging: usize,
    on_evict: Option<EvictionCallback<K, V>>,
    evicted: Vec<(K, V)>,
    metrics: TinyLfuCacheMetrics,
}

impl<K: Hash + Eq + Clone, V> TinyLfuCache<K, V, DefaultHashBuilder> {
    /// Creates a cache holding up to `capacity` entries with the default
    /// segment ratios.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::from_config(TinyLfuCacheConfig::new(capacity))
    }

    /// Creates a cache that hands every evicted entry to `on_evict`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use tinylfu_cache::TinyLfuCache;
    ///
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&evicted);
    /// let mut cache = TinyLfuCache::with_evict(3, move |k, v| {
    ///     sink.lock().unwrap().push((k, v));
    /// })
    /// .unwrap();
    ///
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// assert_eq!(*evicted.lock().unwrap(), vec![("a", 1)]);
    /// ```
    pub fn with_evict<F>(capacity: usize, on_evict: F) -> Result<Self, Error>
    where
        F: FnMut(K, V) + Send + Sync + 'static,
    {
        let mut cache = Self::new(capacity)?;
        cache.set_eviction_callback(on_evict);
        Ok(cache)
    }

    /// Creates a cache from a configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinylfu_cache::config::TinyLfuCacheConfig;
    /// use tinylfu_cache::TinyLfuCache;
    ///
    /// let config = TinyLfuCacheConfig {
    ///     window_ratio: 0.1,
    ///     ..TinyLfuCacheConfig::new(1000)
    /// };
    /// let cache: TinyLfuCache<u64, String> = TinyLfuCache::from_config(config).unwrap();
    /// assert_eq!(cache.stats().window_capacity, 100);
    /// ```
    pub fn from_config(config: TinyLfuCacheConfig) -> Result<Self, Error> {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher + Clone> TinyLfuCache<K, V, S> {
    /// Creates a cache from a configuration, hashing keys with
    /// `hash_builder`. The index, the doorkeeper and the sketch each get a
    /// clone of it.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn with_hasher(config: TinyLfuCacheConfig, hash_builder: S) -> Result<Self, Error> {
        let layout = config.layout()?;
        debug!(
            capacity = layout.capacity,
            window = layout.window,
            probation = layout.probation,
            protected = layout.protected,
            "created tinylfu cache"
        );
        Ok(TinyLfuCache {
            map: HashMap::with_capacity_and_hasher(layout.capacity, hash_builder.clone()),
            entries: Arena::with_capacity(layout.capacity),
            window: List::new(),
            probation: List::new(),
            protected: List::new(),
            sketch: FrequencySketch::with_hasher(
                layout.capacity,
                config.effective_sample_factor(),
                hash_builder.clone(),
            ),
            doorkeeper: Doorkeeper::with_hasher(hash_builder),
            inserts_since_aging: 0,
            on_evict: None,
            evicted: Vec::new(),
            metrics: TinyLfuCacheMetrics::new(layout.capacity as u64),
            config,
            layout,
        })
    }
}

impl<K, V, S> TinyLfuCache<K, V, S> {
    /// Installs (or replaces) the eviction callback.
    pub fn set_eviction_callback<F>(&mut self, on_evict: F)
    where
        F: FnMut(K, V) + Send + Sync + 'static,
    {
        self.on_evict = Some(Box::new(on_evict));
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn cap(&self) -> usize {
        self.layout.capacity
    }

    /// Returns the number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the current segment capacities.
    #[inline]
    pub fn layout(&self) -> SegmentLayout {
        self.layout
    }

    /// Iterates over all entries: protected first, then probation, then
    /// window, each from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self
                .protected
                .iter(&self.entries)
                .chain(self.probation.iter(&self.entries))
                .chain(self.window.iter(&self.entries)),
        }
    }

    /// Snapshot of all keys in [`iter`](Self::iter) order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Snapshot of all values in [`iter`](Self::iter) order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Snapshot of all entries in [`iter`](Self::iter) order.
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn segment_len(&self) -> usize {
        self.window.len() + self.probation.len() + self.protected.len()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> TinyLfuCache<K, V, S> {
    /// Returns a reference to the value for `key`, recording the access.
    ///
    /// A hit touches the frequency sketch and moves the entry: to the front
    /// of its segment, or from probation into protected. A miss changes
    /// nothing but the request counters.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.access(key)?;
        self.flush_evictions();
        Some(&self.entries[handle].value)
    }

    /// Like [`get`](Self::get), but returns a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.access(key)?;
        self.flush_evictions();
        Some(&mut self.entries[handle].value)
    }

    /// Inserts or updates `key`.
    ///
    /// The sketch is touched unconditionally. An existing key gets its value
    /// replaced and is moved exactly as a `get` would move it; `false` is
    /// returned. A new key enters the window, which may push the window tail
    /// through admission. Returns `true` if some entry left the cache
    /// entirely during this call (an admission into probation does not count).
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.sketch.increment(&key);

        if let Some(&handle) = self.map.get(&key) {
            self.entries[handle].value = value;
            self.metrics.core.record_update();
            self.touch(handle);
            self.flush_evictions();
            return false;
        }

        let mut evicted = false;
        while self.window.len() >= self.layout.window {
            evicted |= self.evict_from_window();
        }

        let handle = self.entries.insert(Entry {
            key: key.clone(),
            value,
            segment: Segment::Window,
        });
        self.window.push_front(&mut self.entries, handle);
        self.map.insert(key, handle);
        self.metrics.core.record_insertion();

        self.inserts_since_aging += 1;
        if self.inserts_since_aging >= self.aging_threshold() {
            self.age();
        }

        self.flush_evictions();
        evicted
    }

    /// Removes `key` and returns its value. The eviction callback is not
    /// invoked.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let handle = self.map.remove(key)?;
        self.unlink(handle);
        let entry = self.entries.remove(handle)?;
        self.metrics.core.record_removal();
        Some(entry.value)
    }

    /// Returns `true` if `key` is cached. Does not count as an access.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Returns the value for `key` without counting an access.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).map(|&handle| &self.entries[handle].value)
    }

    /// Estimated access frequency of `key` in the current aging epoch.
    pub fn frequency<Q>(&self, key: &Q) -> u8
    where
        Q: ?Sized + Hash,
    {
        self.sketch.estimate(key)
    }

    /// Evicts every entry through the callback, then halves the sketch and
    /// clears the doorkeeper.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.map.clear();
        self.window.clear();
        self.probation.clear();
        self.protected.clear();
        let notify = self.on_evict.is_some();
        for entry in self.entries.drain() {
            self.metrics.core.record_eviction();
            if notify {
                self.evicted.push((entry.key, entry.value));
            }
        }
        self.sketch.reset();
        self.doorkeeper.clear();
        self.inserts_since_aging = 0;
        debug!(evicted = count, "cleared tinylfu cache");
        self.flush_evictions();
    }

    /// Changes the capacity and evicts whatever no longer fits.
    ///
    /// Shrinking evicts window tails first, then probation tails, then
    /// protected tails until the total fits. The segments are then brought
    /// back within their own capacities. Every eviction goes through the
    /// callback. The sketch keeps its width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero; the cache is
    /// left untouched.
    pub fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        let config = TinyLfuCacheConfig {
            capacity,
            ..self.config
        };
        let layout = config.layout()?;
        let old_capacity = self.layout.capacity;
        let before = self.len();
        self.config = config;
        self.layout = layout;
        self.metrics.core.capacity = capacity as u64;

        while self.segment_len() > layout.capacity {
            let tail = self
                .window
                .back()
                .or_else(|| self.probation.back())
                .or_else(|| self.protected.back());
            match tail {
                Some(handle) => self.evict(handle),
                None => break,
            }
        }
        while self.window.len() > layout.window {
            match self.window.back() {
                Some(handle) => self.evict(handle),
                None => break,
            }
        }
        while self.protected.len() > layout.protected {
            self.demote();
        }
        while self.probation.len() > layout.probation {
            match self.probation.back() {
                Some(handle) => self.evict(handle),
                None => break,
            }
        }

        debug!(
            old_capacity,
            new_capacity = capacity,
            evicted = before - self.len(),
            "resized tinylfu cache"
        );
        self.flush_evictions();
        Ok(())
    }

    /// Returns a snapshot of segment sizes and capacities.
    pub fn stats(&self) -> Stats {
        Stats {
            size: self.segment_len(),
            capacity: self.layout.capacity,
            window_size: self.window.len(),
            probation_size: self.probation.len(),
            protected_size: self.protected.len(),
            window_capacity: self.layout.window,
            main_capacity: self.layout.main,
            sketch_size: self.sketch.size(),
            doorkeeper_size: self.doorkeeper.len(),
        }
    }

    /// Shared hit path of `get`/`get_mut`.
    fn access<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(&handle) = self.map.get(key) else {
            self.metrics.core.record_miss();
            return None;
        };
        self.sketch.increment(key);
        match self.entries[handle].segment {
            Segment::Window => self.metrics.record_window_hit(),
            Segment::Probation => self.metrics.record_probation_hit(),
            Segment::Protected => self.metrics.record_protected_hit(),
        }
        self.touch(handle);
        Some(handle)
    }

    /// Applies the recency move for an access to a cached entry.
    fn touch(&mut self, handle: Handle) {
        let segment = self.entries[handle].segment;
        match segment {
            Segment::Window => self.window.move_to_front(&mut self.entries, handle),
            Segment::Probation => self.promote(handle),
            Segment::Protected => self.protected.move_to_front(&mut self.entries, handle),
        }
    }

    fn promote(&mut self, handle: Handle) {
        // No protected segment to promote into: stay in probation.
        if self.layout.protected == 0 {
            self.probation.move_to_front(&mut self.entries, handle);
            return;
        }

        self.probation.detach(&mut self.entries, handle);
        if self.protected.len() >= self.layout.protected {
            self.demote();
        }
        self.protected.push_front(&mut self.entries, handle);
        self.entries[handle].segment = Segment::Protected;
        self.metrics.record_promotion();
        trace!("promoted entry to protected");
    }

    /// Moves the protected tail to the front of probation, making room there
    /// first. Without a probation segment the tail is evicted instead.
    fn demote(&mut self) {
        let Some(handle) = self.protected.back() else {
            return;
        };
        if self.layout.probation == 0 {
            self.evict(handle);
            return;
        }

        self.protected.detach(&mut self.entries, handle);
        self.make_room_in_probation();
        self.probation.push_front(&mut self.entries, handle);
        self.entries[handle].segment = Segment::Probation;
        self.metrics.record_demotion();
        trace!("demoted entry to probation");
    }

    /// Runs the window tail through admission. Returns `true` if an entry
    /// left the cache.
    fn evict_from_window(&mut self) -> bool {
        let Some(candidate) = self.window.back() else {
            return false;
        };
        let victim = self.probation.back();
        let admitted = admission::admit(
            &self.entries[candidate].key,
            victim.map(|handle| &self.entries[handle].key),
            &mut self.doorkeeper,
            &self.sketch,
        );
        let admitted = admitted && self.layout.probation > 0;
        self.metrics.record_admission(admitted);

        if !admitted {
            trace!("window candidate rejected");
            self.evict(candidate);
            return true;
        }

        self.window.detach(&mut self.entries, candidate);
        let evicted = self.make_room_in_probation();
        self.probation.push_front(&mut self.entries, candidate);
        self.entries[candidate].segment = Segment::Probation;
        trace!("window candidate admitted to probation");
        evicted
    }

    /// Evicts probation tails until one more entry fits.
    fn make_room_in_probation(&mut self) -> bool {
        let mut evicted = false;
        while self.probation.len() >= self.layout.probation {
            let Some(tail) = self.probation.back() else {
                break;
            };
            self.evict(tail);
            evicted = true;
        }
        evicted
    }

    /// Detaches `handle` from whichever list holds it.
    fn unlink(&mut self, handle: Handle) -> Segment {
        let segment = self.entries[handle].segment;
        match segment {
            Segment::Window => self.window.detach(&mut self.entries, handle),
            Segment::Probation => self.probation.detach(&mut self.entries, handle),
            Segment::Protected => self.protected.detach(&mut self.entries, handle),
        }
        segment
    }

    /// Removes an entry on behalf of the policy and queues it for the
    /// callback. Queued entries are delivered by `flush_evictions`.
    fn evict(&mut self, handle: Handle) {
        let segment = self.unlink(handle);
        match segment {
            Segment::Window => self.metrics.record_window_eviction(),
            Segment::Probation => self.metrics.record_probation_eviction(),
            Segment::Protected => self.metrics.record_protected_eviction(),
        }
        if let Some(entry) = self.entries.remove(handle) {
            self.map.remove(&entry.key);
            trace!(?segment, "evicted entry");
            if self.on_evict.is_some() {
                self.evicted.push((entry.key, entry.value));
            }
        }
    }

    /// Hands queued evictions to the callback. Runs last in every mutating
    /// operation, so a panicking callback leaves the segments consistent.
    fn flush_evictions(&mut self) {
        if self.evicted.is_empty() {
            return;
        }
        let mut evicted = mem::take(&mut self.evicted);
        if let Some(on_evict) = self.on_evict.as_mut() {
            for (key, value) in evicted.drain(..) {
                on_evict(key, value);
            }
        }
        evicted.clear();
        self.evicted = evicted;
    }

    fn aging_threshold(&self) -> usize {
        self.layout
            .capacity
            .saturating_mul(self.config.effective_sample_factor())
    }

    fn age(&mut self) {
        self.sketch.reset();
        self.doorkeeper.clear();
        self.inserts_since_aging = 0;
        self.metrics.record_sketch_reset();
        debug!(
            capacity = self.layout.capacity,
            "aged frequency sketch and cleared doorkeeper"
        );
    }
}

impl<K, V, S> CacheMetrics for TinyLfuCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.metrics.clone();
        metrics.update_segment_sizes(
            self.window.len() as u64,
            self.probation.len() as u64,
            self.protected.len() as u64,
        );
        metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

impl<K, V, S> fmt::Debug for TinyLfuCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TinyLfuCache")
            .field("capacity", &self.layout.capacity)
            .field("len", &self.map.len())
            .field("window", &self.window.len())
            .field("probation", &self.probation.len())
            .field("protected", &self.protected.len())
            .field("sketch", &self.sketch)
            .field("doorkeeper", &self.doorkeeper)
            .finish()
    }
}

type SegmentIter<'a, K, V> = list::Iter<'a, Entry<K, V>>;

/// Iterator over the entries of a [`TinyLfuCache`], created by
/// [`TinyLfuCache::iter`].
pub struct Iter<'a, K, V> {
    inner: Chain<Chain<SegmentIter<'a, K, V>, SegmentIter<'a, K, V>>, SegmentIter<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.inner.size_hint().0)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::sync::Arc;
    use alloc::vec;
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;

    fn segment_of<K, V, S>(cache: &TinyLfuCache<K, V, S>, key: &K) -> Option<Segment>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        cache.map.get(key).map(|&h| cache.entries[h].segment)
    }

    /// Makes `key` known to the doorkeeper and adds `times` to its frequency.
    fn warm(cache: &mut TinyLfuCache<&'static str, i32>, key: &'static str, times: usize) {
        cache.doorkeeper.mark(key);
        for _ in 0..times {
            cache.sketch.increment(&key);
        }
    }

    fn recorder() -> (
        Arc<Mutex<Vec<(&'static str, i32)>>>,
        impl FnMut(&'static str, i32) + Send + Sync + 'static,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |k, v| sink.lock().unwrap().push((k, v)))
    }

    fn assert_invariants<K: Hash + Eq, V, S: BuildHasher>(cache: &TinyLfuCache<K, V, S>) {
        let layout = cache.layout;
        assert_eq!(cache.map.len(), cache.segment_len());
        assert_eq!(cache.entries.len(), cache.segment_len());
        assert!(cache.segment_len() <= layout.capacity);
        assert!(cache.window.len() <= layout.window);
        assert!(cache.protected.len() <= layout.protected);
        assert!(cache.probation.len() <= layout.probation);
        for (segment, list) in [
            (Segment::Window, &cache.window),
            (Segment::Probation, &cache.probation),
            (Segment::Protected, &cache.protected),
        ] {
            for entry in list.iter(&cache.entries) {
                assert_eq!(entry.segment, segment);
                assert!(cache.map.contains_key(&entry.key));
            }
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result: Result<TinyLfuCache<u32, u32>, _> = TinyLfuCache::new(0);
        assert_eq!(result.err(), Some(Error::InvalidCapacity(0)));
    }

    #[test]
    fn test_first_sighting_rejected_from_window() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        assert!(!cache.put("a", 1));
        assert!(cache.put("b", 2));

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.stats().doorkeeper_size, 1);
        assert_invariants(&cache);
    }

    #[test]
    fn test_window_probation_protected_path() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        // Admission into probation is not a full eviction
        assert!(!cache.put("c", 3));

        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Probation));
        assert_eq!(segment_of(&cache, &"c"), Some(Segment::Window));
        assert!(!cache.contains(&"b"));

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Protected));

        // Protected hits only reorder
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Protected));
        assert_eq!(cache.metrics.promotions, 1);
        assert_invariants(&cache);
    }

    #[test]
    fn test_update_promotes_like_get() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        cache.put("c", 3);
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Probation));

        assert!(!cache.put("a", 10));
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Protected));
        assert_eq!(cache.peek(&"a"), Some(&10));
    }

    #[test]
    fn test_demotion_when_protected_full() {
        // capacity 4: window 1, protected 2, probation 1
        let mut cache = TinyLfuCache::new(4).unwrap();
        for key in ["a", "b", "c", "d", "e"] {
            warm(&mut cache, key, 3);
        }

        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        cache.put("c", 3);
        cache.get(&"b");
        cache.put("d", 4);
        cache.get(&"c");

        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Probation));
        assert_eq!(segment_of(&cache, &"b"), Some(Segment::Protected));
        assert_eq!(segment_of(&cache, &"c"), Some(Segment::Protected));
        assert_eq!(segment_of(&cache, &"d"), Some(Segment::Window));
        assert_eq!(cache.metrics.promotions, 3);
        assert_eq!(cache.metrics.demotions, 1);
        assert_eq!(cache.keys(), vec!["c", "b", "a", "d"]);
        assert_invariants(&cache);
    }

    #[test]
    fn test_admission_against_probation_victim() {
        let mut cache = TinyLfuCache::new(4).unwrap();
        let (log, on_evict) = recorder();
        cache.set_eviction_callback(on_evict);
        for key in ["a", "b"] {
            warm(&mut cache, key, 3);
        }

        cache.put("a", 1);
        cache.put("b", 2); // a admitted to probation, freq 4
        cache.get(&"b"); // b freq 5
        assert!(cache.put("c", 3)); // b vs a: 5 > 4, admitted; probation full evicts a

        assert_eq!(*log.lock().unwrap(), vec![("a", 1)]);
        assert_eq!(segment_of(&cache, &"b"), Some(Segment::Probation));

        // c passes the doorkeeper but is far below b: rejected
        warm(&mut cache, "c", 0);
        assert!(cache.put("d", 4));
        assert_eq!(log.lock().unwrap().last(), Some(&("c", 3)));
        assert_eq!(segment_of(&cache, &"b"), Some(Segment::Probation));
        assert_invariants(&cache);
    }

    #[test]
    fn test_remove_skips_callback() {
        let (log, on_evict) = recorder();
        let mut cache = TinyLfuCache::with_evict(10, on_evict).unwrap();
        cache.put("a", 1);
        assert_eq!(cache.remove(&"a"), Some(1));
        assert_eq!(cache.remove(&"a"), None);
        assert!(cache.is_empty());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(cache.metrics.core.removals, 1);
        assert_invariants(&cache);
    }

    #[test]
    fn test_peek_and_contains_do_not_touch() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        let before = cache.frequency(&"a");
        for _ in 0..5 {
            assert_eq!(cache.peek(&"a"), Some(&1));
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"missing"));
        }
        assert_eq!(cache.frequency(&"a"), before);
        assert_eq!(cache.stats().sketch_size, 1);
        assert_eq!(cache.metrics.core.requests, 0);
    }

    #[test]
    fn test_get_miss_does_not_touch_sketch() {
        let mut cache: TinyLfuCache<&str, i32> = TinyLfuCache::new(10).unwrap();
        assert_eq!(cache.get(&"nope"), None);
        assert_eq!(cache.frequency(&"nope"), 0);
        assert_eq!(cache.stats().sketch_size, 0);
        assert_eq!(cache.metrics.core.requests, 1);
    }

    #[test]
    fn test_aging_after_sample_period() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        for i in 0..99u32 {
            cache.put(i, i);
        }
        assert_eq!(cache.stats().sketch_size, 99);
        assert!(cache.stats().doorkeeper_size > 0);

        // Updates do not count towards the aging period
        cache.put(98, 98);
        assert_eq!(cache.metrics.sketch_resets, 0);

        cache.put(99, 99);
        let stats = cache.stats();
        assert_eq!(stats.sketch_size, 0);
        assert_eq!(stats.doorkeeper_size, 0);
        assert_eq!(cache.metrics.sketch_resets, 1);
    }

    #[test]
    fn test_capacity_one() {
        let (log, on_evict) = recorder();
        let mut cache = TinyLfuCache::with_evict(1, on_evict).unwrap();
        for key in ["a", "b", "a", "b", "a"] {
            cache.put(key, 0);
            assert!(cache.len() <= 1);
            assert_invariants(&cache);
        }
        // Admitted candidates have nowhere to go either, so every window
        // overflow counts as a rejection
        assert_eq!(log.lock().unwrap().len(), 4);
        assert_eq!(cache.keys(), vec!["a"]);
        assert_eq!(cache.metrics.admissions, 0);
        assert_eq!(cache.metrics.rejections, 4);
    }

    #[test]
    fn test_panicking_callback_leaves_segments_consistent() {
        let armed = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&armed);
        let mut cache = TinyLfuCache::with_evict(10, move |key: &'static str, _: i32| {
            if trigger.load(Ordering::SeqCst) {
                panic!("eviction of {key} failed");
            }
        })
        .unwrap();

        for key in [
            "a", "b", "a", "a", "a", "c", "b", "b", "b", "b", "x", "c", "c", "c", "c", "c",
        ] {
            cache.put(key, 0);
        }
        assert_eq!(cache.keys(), vec!["b", "a", "c"]);

        // c is admitted and pushes a out of a full probation segment
        armed.store(true, Ordering::SeqCst);
        let result = panic::catch_unwind(AssertUnwindSafe(|| cache.put("y", 0)));
        assert!(result.is_err());
        assert_invariants(&cache);
        assert_eq!(cache.keys(), vec!["c", "b", "y"]);
        assert!(!cache.contains(&"a"));

        armed.store(false, Ordering::SeqCst);
        assert_eq!(cache.get(&"c"), Some(&0));
        assert_eq!(segment_of(&cache, &"c"), Some(Segment::Protected));
        assert_invariants(&cache);

        // Shrinking commits the new layout before the first callback runs
        armed.store(true, Ordering::SeqCst);
        let result = panic::catch_unwind(AssertUnwindSafe(|| cache.resize(2)));
        assert!(result.is_err());
        assert_eq!(cache.cap(), 2);
        assert_eq!(cache.keys(), vec!["c"]);
        assert_invariants(&cache);
    }

    #[test]
    fn test_no_protected_segment_keeps_hits_in_probation() {
        // capacity 2: window 1, protected 0, probation 1
        let mut cache = TinyLfuCache::new(2).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        cache.put("c", 3);
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Probation));

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(segment_of(&cache, &"a"), Some(Segment::Probation));
        assert_eq!(cache.metrics.promotions, 0);
        assert_invariants(&cache);
    }

    #[test]
    fn test_clear_fires_callback_and_resets() {
        let (log, on_evict) = recorder();
        let mut cache = TinyLfuCache::with_evict(10, on_evict).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        cache.put("c", 3);
        let remaining = cache.len();
        log.lock().unwrap().clear();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(log.lock().unwrap().len(), remaining);
        let stats = cache.stats();
        assert_eq!(stats.sketch_size, 0);
        assert_eq!(stats.doorkeeper_size, 0);
        assert_eq!(cache.inserts_since_aging, 0);

        // Still usable afterwards
        cache.put("z", 26);
        assert_eq!(cache.get(&"z"), Some(&26));
        assert_invariants(&cache);
    }

    #[test]
    fn test_resize_rejects_zero_and_keeps_state() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        assert_eq!(cache.resize(0), Err(Error::InvalidCapacity(0)));
        assert_eq!(cache.cap(), 10);
        assert!(cache.contains(&"a"));
    }

    #[test]
    fn test_resize_shrink_restores_segment_bounds() {
        let evictions = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&evictions);
        let mut cache = TinyLfuCache::with_evict(100, move |_: u32, _: u32| {
            *counter.lock().unwrap() += 1;
        })
        .unwrap();

        for k in 0..80u32 {
            cache.put(k, k);
        }
        for k in 0..80u32 {
            let prev = if k == 0 { 79 } else { k - 1 };
            cache.put(k, k);
            cache.get(&prev);
        }
        assert_eq!(cache.len(), 80);
        assert_eq!(cache.stats().protected_size, 79);
        *evictions.lock().unwrap() = 0;

        cache.resize(10).unwrap();
        assert_eq!(cache.cap(), 10);
        assert!(cache.len() <= 10);
        assert_eq!(*evictions.lock().unwrap(), 80 - cache.len());
        assert_invariants(&cache);
    }

    #[test]
    fn test_resize_grow_keeps_entries() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        cache.resize(1000).unwrap();
        assert_eq!(cache.cap(), 1000);
        assert_eq!(cache.stats().window_capacity, 10);
        assert_eq!(cache.peek(&"a"), Some(&1));
        // The sketch keeps its original width
        assert_eq!(cache.sketch.width(), 100);
    }

    #[test]
    fn test_get_mut_and_iter_order() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("a", 1);
        cache.put("c", 3);
        cache.get(&"a");

        if let Some(v) = cache.get_mut(&"c") {
            *v = 30;
        }
        let items: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(items, vec![("a", 1), ("c", 30)]);
        assert_eq!(cache.items(), items);
        assert_eq!(cache.values(), vec![1, 30]);
    }

    #[test]
    fn test_metrics_report() {
        let mut cache = TinyLfuCache::new(10).unwrap();
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"x");
        cache.put("b", 2);

        let metrics = cache.metrics();
        assert_eq!(cache.algorithm_name(), "TinyLFU");
        assert_eq!(metrics.get("cache_hits"), Some(&1.0));
        assert_eq!(metrics.get("cache_misses"), Some(&1.0));
        assert_eq!(metrics.get("insertions"), Some(&2.0));
        assert_eq!(metrics.get("rejections"), Some(&1.0));
        assert_eq!(metrics.get("window_evictions"), Some(&1.0));
        assert_eq!(metrics.get("window_size"), Some(&1.0));
    }

    #[test]
    fn test_random_workload_keeps_invariants() {
        let mut cache = TinyLfuCache::new(20).unwrap();
        let mut state = 0x2545_f491_4f6c_dd1du64;
        for step in 0..5_000u32 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let key = (state % 60) as u32;
            match state % 7 {
                0 => {
                    cache.remove(&key);
                }
                1 | 2 => {
                    cache.get(&key);
                }
                _ => {
                    cache.put(key, step);
                }
            }
            if step == 2_500 {
                cache.resize(7).unwrap();
            }
            assert_invariants(&cache);
        }
    }
}
