#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Quick Reference
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TinyLfuCache`] | Window TinyLFU cache, `&mut self` API, `no_std` |
//! | `ConcurrentTinyLfuCache` | The same cache behind a read/write lock (feature `concurrent`) |
//! | [`FrequencySketch`](sketch::FrequencySketch) | 4-row Count-Min Sketch with 4-bit counters |
//! | [`Doorkeeper`](doorkeeper::Doorkeeper) | "Seen once" gate in front of admission |
//!
//! ## Performance Characteristics
//!
//! | Operation | Time | Lock (concurrent) |
//! |-----------|------|-------------------|
//! | `get` | O(1) | write |
//! | `put` | O(1) | write |
//! | `remove` | O(1) | write |
//! | `peek` / `contains` | O(1) | read |
//! | `keys` / `values` / `items` | O(n) | read |
//! | `resize` | O(evicted) | write |
//! | `clear` | O(n) | write |
//!
//! Memory: one arena slot per entry (key, value, two links, segment tag),
//! the key a second time in the index, plus `4 × max(64, 10 × capacity)`
//! bytes of sketch counters.
//!
//! ## Capacity Errors
//!
//! ```rust
//! use tinylfu_cache::{Error, TinyLfuCache};
//!
//! let result = TinyLfuCache::<u32, u32>::new(0);
//! assert_eq!(result.err(), Some(Error::InvalidCapacity(0)));
//!
//! let mut cache = TinyLfuCache::<u32, u32>::new(100).unwrap();
//! assert!(cache.resize(0).is_err());
//! assert_eq!(cache.cap(), 100);
//! ```
//!
//! ## Modules
//!
//! - [`tinylfu`]: the single-threaded cache
//! - [`sketch`]: frequency estimation
//! - [`doorkeeper`]: first-sighting filter
//! - [`config`]: capacity and segment ratios
//! - [`stats`]: occupancy snapshot
//! - [`metrics`]: counters for monitoring and simulation
//! - [`error`]: construction and resize errors
//! - `concurrent`: thread-safe wrapper (requires `concurrent` feature)

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

extern crate alloc;

/// Arena-backed doubly linked lists used as the cache segments.
pub(crate) mod list;

/// Count-Min Sketch frequency estimator.
pub mod sketch;

/// First-sighting filter consulted before the frequency comparison.
pub mod doorkeeper;

/// Admission decision for entries leaving the window.
pub(crate) mod admission;

/// Cache configuration structures.
pub mod config;

/// Errors returned by construction and resizing.
pub mod error;

/// Occupancy snapshot returned by `stats()`.
pub mod stats;

/// Cache metrics system.
///
/// Tracks hits, misses, admissions, segment moves and evictions, and reports
/// them through the [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

/// Window TinyLFU cache implementation.
///
/// A fixed-capacity cache that filters window overflow through a
/// frequency-based admission policy before it can displace anything in the
/// main segments.
pub mod tinylfu;

/// Concurrent cache implementation.
///
/// Provides a thread-safe TinyLFU cache guarded by one `parking_lot::RwLock`.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use config::TinyLfuCacheConfig;
pub use error::Error;
pub use stats::Stats;
pub use tinylfu::{EvictionCallback, TinyLfuCache};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentTinyLfuCache;
