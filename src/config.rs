//! Cache Configuration Module
//!
//! Configuration for the TinyLFU cache. The config struct has public fields
//! for simple instantiation, with [`TinyLfuCacheConfig::new`] filling in the
//! default ratios.
//!
//! | Config | Cache | Description |
//! |--------|-------|-------------|
//! | `TinyLfuCacheConfig` | [`TinyLfuCache`](crate::TinyLfuCache) | Window TinyLFU |
//! | `TinyLfuCacheConfig` | `ConcurrentTinyLfuCache` | Same cache behind a read/write lock (requires `concurrent`) |
//!
//! # Examples
//!
//! ```
//! use tinylfu_cache::config::TinyLfuCacheConfig;
//! use tinylfu_cache::TinyLfuCache;
//!
//! let config = TinyLfuCacheConfig {
//!     capacity: 1000,
//!     window_ratio: 0.01,
//!     protected_ratio: 0.8,
//!     sample_factor: 10,
//! };
//!
//! let cache: TinyLfuCache<String, i32> = TinyLfuCache::from_config(config).unwrap();
//! assert_eq!(cache.cap(), 1000);
//! ```

pub mod tinylfu;

pub use tinylfu::{SegmentLayout, TinyLfuCacheConfig};
