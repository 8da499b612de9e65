//! Configuration for the TinyLFU cache.
//!
//! # Segment Sizing
//!
//! The total `capacity` is split into three LRU segments:
//!
//! ```text
//! capacity
//! ├── window     = max(1, round(capacity × window_ratio))      (default 1%)
//! └── main       = capacity − window
//!     ├── protected = floor(main × protected_ratio)            (default 80%)
//!     └── probation = main − protected
//! ```
//!
//! The frequency sketch uses `max(64, sample_factor × capacity)` counters per
//! row and is aged after `sample_factor × capacity` new-key admissions.
//!
//! # Examples
//!
//! ```
//! use tinylfu_cache::config::TinyLfuCacheConfig;
//! use tinylfu_cache::TinyLfuCache;
//!
//! // Defaults: 1% window, 80% of the main area protected
//! let config = TinyLfuCacheConfig::new(10_000);
//! let cache: TinyLfuCache<String, Vec<u8>> = TinyLfuCache::from_config(config).unwrap();
//! assert_eq!(cache.cap(), 10_000);
//!
//! // A larger admission window for bursty, recency-heavy traffic
//! let config = TinyLfuCacheConfig {
//!     window_ratio: 0.2,
//!     ..TinyLfuCacheConfig::new(1_000)
//! };
//! assert_eq!(config.layout().unwrap().window, 200);
//! ```

use crate::error::Error;

/// Default share of the capacity given to the admission window.
pub const DEFAULT_WINDOW_RATIO: f64 = 0.01;

/// Default share of the main area given to the protected segment.
pub const DEFAULT_PROTECTED_RATIO: f64 = 0.8;

/// Default multiplier for sketch width and aging period.
pub const DEFAULT_SAMPLE_FACTOR: usize = 10;

/// Configuration for a TinyLFU cache.
///
/// # Fields
///
/// - `capacity`: Maximum number of entries. Must be positive.
/// - `window_ratio`: Fraction of `capacity` used by the window segment.
/// - `protected_ratio`: Fraction of the main area used by the protected segment.
/// - `sample_factor`: Sketch width and aging period, in multiples of `capacity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TinyLfuCacheConfig {
    /// Maximum number of entries the cache can hold.
    pub capacity: usize,
    /// Fraction of the capacity reserved for the admission window.
    pub window_ratio: f64,
    /// Fraction of the main area reserved for the protected segment.
    pub protected_ratio: f64,
    /// Sketch width and aging period, as multiples of the capacity.
    pub sample_factor: usize,
}

impl TinyLfuCacheConfig {
    /// Creates a configuration with the default ratios.
    pub fn new(capacity: usize) -> Self {
        TinyLfuCacheConfig {
            capacity,
            window_ratio: DEFAULT_WINDOW_RATIO,
            protected_ratio: DEFAULT_PROTECTED_RATIO,
            sample_factor: DEFAULT_SAMPLE_FACTOR,
        }
    }

    /// Checks the capacity and both ratios.
    pub fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::InvalidCapacity(self.capacity));
        }
        check_ratio("window_ratio", self.window_ratio)?;
        check_ratio("protected_ratio", self.protected_ratio)
    }

    /// Computes the segment capacities for `self.capacity`.
    pub fn layout(&self) -> Result<SegmentLayout, Error> {
        self.validate()?;
        Ok(SegmentLayout::compute(
            self.capacity,
            self.window_ratio,
            self.protected_ratio,
        ))
    }

    /// Sample factor with the lower bound of one applied.
    pub(crate) fn effective_sample_factor(&self) -> usize {
        self.sample_factor.max(1)
    }
}

fn check_ratio(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidRatio { name, value })
    }
}

/// Capacities of the individual segments for one total capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    /// Total capacity.
    pub capacity: usize,
    /// Window segment capacity.
    pub window: usize,
    /// Main area capacity (probation + protected).
    pub main: usize,
    /// Protected segment capacity.
    pub protected: usize,
    /// Probation segment capacity.
    pub probation: usize,
}

impl SegmentLayout {
    pub(crate) fn compute(capacity: usize, window_ratio: f64, protected_ratio: f64) -> Self {
        let window = round(capacity as f64 * window_ratio).clamp(1, capacity);
        let main = capacity - window;
        let protected = floor(main as f64 * protected_ratio).min(main);
        SegmentLayout {
            capacity,
            window,
            main,
            protected,
            probation: main - protected,
        }
    }
}

// `f64::floor`/`f64::round` live in std; inputs here are finite and non-negative.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor(x: f64) -> usize {
    x as usize
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round(x: f64) -> usize {
    let whole = x as usize;
    if x - whole as f64 >= 0.5 {
        whole + 1
    } else {
        whole
    }
}
