//! Cache Metrics System
//!
//! Counters collected by the cache while it serves requests, reported through
//! the [`CacheMetrics`] trait as a `BTreeMap<String, f64>`.
//!
//! # Why BTreeMap over HashMap?
//!
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Simulation runs can be diffed line by line
//! - **Stable serialization**: CSV exports have predictable column ordering
//!
//! The performance difference is negligible with a few dozen metric keys.
//!
//! Metrics are only recorded by operations that already hold exclusive access
//! to the cache (`get`, `put`, `remove`, `clear`, `resize`). Pure lookups such
//! as `peek` and `contains` never touch them.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod tinylfu;

pub use tinylfu::TinyLfuCacheMetrics;

/// Request and occupancy counters shared by every cache algorithm.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups (`get`) made to the cache
    pub requests: u64,

    /// Number of lookups that found their key
    pub cache_hits: u64,

    /// Number of new keys written into the cache
    pub insertions: u64,

    /// Number of writes that replaced the value of a present key
    pub updates: u64,

    /// Number of entries dropped by the eviction policy
    pub evictions: u64,

    /// Number of entries removed explicitly by the caller
    pub removals: u64,

    /// Maximum number of entries
    pub capacity: u64,
}

impl CoreCacheMetrics {
    /// Creates an empty set of counters for a cache of `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Records a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that did not find its key.
    /// Misses are derived as `requests - cache_hits`.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a write of a new key.
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a write that replaced an existing value.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records an entry dropped by the eviction policy.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records an entry removed by the caller.
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Hit rate in `[0.0, 1.0]`, or 0.0 before the first request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate in `[0.0, 1.0]`, or 0.0 before the first request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts core metrics to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        // Basic counters
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("updates".to_string(), self.updates as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("capacity".to_string(), self.capacity as f64);

        // Rates (0.0 to 1.0)
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Trait that all caches implement for metrics reporting
///
/// Gives the simulator and any external collector a uniform way to read
/// counters, independent of the cache's own API.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. "TinyLFU")
    fn algorithm_name(&self) -> &'static str;
}
