//! Count-Min Sketch Frequency Estimator
//!
//! A fixed-memory structure that estimates how often a key has been seen.
//! The table has [`DEPTH`] rows of `width` saturating 4-bit counters. Each row
//! is addressed by an independent hash of the key; an `increment` bumps one
//! counter per row and an `estimate` reads the minimum of the four.
//!
//! ```text
//!            hash_0(k) ──▶ row 0: [0][0][3][0][1][0] ... [0]
//!            hash_1(k) ──▶ row 1: [0][2][0][0][0][3] ... [0]
//!   key k ──▶hash_2(k) ──▶ row 2: [3][0][0][1][0][0] ... [0]   estimate(k) = min = 3
//!            hash_3(k) ──▶ row 3: [0][0][0][0][4][0] ... [0]
//! ```
//!
//! Collisions can only push a counter up, so the estimate never falls below
//! the true count (up to saturation at [`MAX_COUNT`]); it may over-estimate.
//!
//! # Aging
//!
//! [`FrequencySketch::reset`] halves every counter and zeroes the running
//! sample size, so old popularity decays instead of accumulating forever.
//! The owning cache decides when to call it.
//!
//! # Example
//!
//! ```
//! use tinylfu_cache::sketch::FrequencySketch;
//!
//! let mut sketch = FrequencySketch::new(100);
//! for _ in 0..3 {
//!     sketch.increment(&"hot");
//! }
//! assert!(sketch.estimate(&"hot") >= 3);
//! assert_eq!(sketch.size(), 3);
//!
//! sketch.reset();
//! assert_eq!(sketch.size(), 0);
//! ```

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use hashbrown::DefaultHashBuilder;

/// Number of independent hash rows.
pub const DEPTH: usize = 4;

/// Counters saturate at this value (4 bits).
pub const MAX_COUNT: u8 = 15;

/// Lower bound on the number of counters per row.
pub const MIN_WIDTH: usize = 64;

/// Default ratio between counters per row and cache capacity.
pub const DEFAULT_WIDTH_FACTOR: usize = 10;

// Per-row seeds mixed into the key hash; odd 64-bit constants.
const ROW_SEEDS: [u64; DEPTH] = [
    0xc3a5_c85c_97cb_3127,
    0xb492_b66f_be98_f273,
    0x9ae1_6a3b_2f90_404f,
    0xcbf2_9ce4_8422_2325,
];

/// Count-Min Sketch with 4-bit saturating counters and halving-based aging.
pub struct FrequencySketch<S = DefaultHashBuilder> {
    rows: [Vec<u8>; DEPTH],
    width: usize,
    size: usize,
    hash_builder: S,
}

impl FrequencySketch<DefaultHashBuilder> {
    /// Creates a sketch sized for a cache of `capacity` entries:
    /// `max(64, 10 × capacity)` counters per row.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(
            capacity,
            DEFAULT_WIDTH_FACTOR,
            DefaultHashBuilder::default(),
        )
    }
}

impl<S: BuildHasher> FrequencySketch<S> {
    /// Creates a sketch with `max(64, width_factor × capacity)` counters per
    /// row, hashing keys with `hash_builder`.
    pub fn with_hasher(capacity: usize, width_factor: usize, hash_builder: S) -> Self {
        let width = capacity
            .saturating_mul(width_factor.max(1))
            .max(MIN_WIDTH);
        FrequencySketch {
            rows: core::array::from_fn(|_| vec![0u8; width]),
            width,
            size: 0,
            hash_builder,
        }
    }

    /// Number of counters in each row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of `increment` calls since the last `reset`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Records one occurrence of `key`, bumping one counter per row.
    /// Counters that already hold [`MAX_COUNT`] stay there.
    pub fn increment<Q>(&mut self, key: &Q)
    where
        Q: ?Sized + Hash,
    {
        let hash = self.hash_builder.hash_one(key);
        self.size += 1;
        for row in 0..DEPTH {
            let idx = self.index_of(hash, row);
            let counter = &mut self.rows[row][idx];
            if *counter < MAX_COUNT {
                *counter += 1;
            }
        }
    }

    /// Returns the estimated number of occurrences of `key`: the smallest of
    /// its per-row counters.
    pub fn estimate<Q>(&self, key: &Q) -> u8
    where
        Q: ?Sized + Hash,
    {
        let hash = self.hash_builder.hash_one(key);
        let mut min = MAX_COUNT;
        for row in 0..DEPTH {
            let count = self.rows[row][self.index_of(hash, row)];
            if count < min {
                min = count;
            }
        }
        min
    }

    /// Halves every counter and zeroes the sample size.
    pub fn reset(&mut self) {
        self.size = 0;
        for row in self.rows.iter_mut() {
            for counter in row.iter_mut() {
                *counter /= 2;
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn index_of(&self, hash: u64, row: usize) -> usize {
        // Seed, then finalize (murmur3 fmix64) so that every row sees an
        // independent spread of the same key hash.
        let mut h = hash ^ ROW_SEEDS[row];
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        (h % self.width as u64) as usize
    }
}

impl<S> fmt::Debug for FrequencySketch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencySketch")
            .field("depth", &DEPTH)
            .field("width", &self.width)
            .field("size", &self.size)
            .finish()
    }
}
