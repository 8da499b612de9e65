//! TinyLFU Cache Metrics
//!
//! Metrics specific to the window / probation / protected layout and the
//! admission filter in front of it.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// TinyLFU-specific metrics (extends CoreCacheMetrics)
#[derive(Debug, Clone)]
pub struct TinyLfuCacheMetrics {
    /// Core metrics common to all cache algorithms
    pub core: CoreCacheMetrics,

    /// Number of items currently in the window segment
    pub window_size: u64,

    /// Number of items currently in the probation segment
    pub probation_size: u64,

    /// Number of items currently in the protected segment
    pub protected_size: u64,

    /// Window overflow candidates accepted into probation
    pub admissions: u64,

    /// Window overflow candidates refused (doorkeeper or frequency check)
    pub rejections: u64,

    /// Moves from probation to protected
    pub promotions: u64,

    /// Moves from protected back to probation
    pub demotions: u64,

    /// Hits served from the window segment
    pub window_hits: u64,

    /// Hits served from the probation segment
    pub probation_hits: u64,

    /// Hits served from the protected segment
    pub protected_hits: u64,

    /// Entries evicted from the window segment
    pub window_evictions: u64,

    /// Entries evicted from the probation segment
    pub probation_evictions: u64,

    /// Entries evicted from the protected segment
    pub protected_evictions: u64,

    /// Number of times the sketch was halved and the doorkeeper cleared
    pub sketch_resets: u64,
}

impl TinyLfuCacheMetrics {
    /// Creates a zeroed set of metrics for a cache of `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(capacity),
            window_size: 0,
            probation_size: 0,
            protected_size: 0,
            admissions: 0,
            rejections: 0,
            promotions: 0,
            demotions: 0,
            window_hits: 0,
            probation_hits: 0,
            protected_hits: 0,
            window_evictions: 0,
            probation_evictions: 0,
            protected_evictions: 0,
            sketch_resets: 0,
        }
    }

    /// Records the outcome of one admission decision.
    pub fn record_admission(&mut self, admitted: bool) {
        if admitted {
            self.admissions += 1;
        } else {
            self.rejections += 1;
        }
    }

    /// Records a promotion from probation to protected.
    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    /// Records a demotion from protected to probation.
    pub fn record_demotion(&mut self) {
        self.demotions += 1;
    }

    /// Records a hit in the window segment.
    pub fn record_window_hit(&mut self) {
        self.core.record_hit();
        self.window_hits += 1;
    }

    /// Records a hit in the probation segment.
    pub fn record_probation_hit(&mut self) {
        self.core.record_hit();
        self.probation_hits += 1;
    }

    /// Records a hit in the protected segment.
    pub fn record_protected_hit(&mut self) {
        self.core.record_hit();
        self.protected_hits += 1;
    }

    /// Records an eviction from the window segment.
    pub fn record_window_eviction(&mut self) {
        self.core.record_eviction();
        self.window_evictions += 1;
    }

    /// Records an eviction from the probation segment.
    pub fn record_probation_eviction(&mut self) {
        self.core.record_eviction();
        self.probation_evictions += 1;
    }

    /// Records an eviction from the protected segment.
    pub fn record_protected_eviction(&mut self) {
        self.core.record_eviction();
        self.protected_evictions += 1;
    }

    /// Records one aging step.
    pub fn record_sketch_reset(&mut self) {
        self.sketch_resets += 1;
    }

    /// Updates the segment sizes
    pub fn update_segment_sizes(&mut self, window: u64, probation: u64, protected: u64) {
        self.window_size = window;
        self.probation_size = probation;
        self.protected_size = protected;
    }

    /// Fraction of admission decisions that let the candidate in.
    pub fn admission_rate(&self) -> f64 {
        let decisions = self.admissions + self.rejections;
        if decisions > 0 {
            self.admissions as f64 / decisions as f64
        } else {
            0.0
        }
    }

    /// Converts TinyLFU metrics to a BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();

        // Segment occupancy
        metrics.insert("window_size".to_string(), self.window_size as f64);
        metrics.insert("probation_size".to_string(), self.probation_size as f64);
        metrics.insert("protected_size".to_string(), self.protected_size as f64);

        // Admission filter
        metrics.insert("admissions".to_string(), self.admissions as f64);
        metrics.insert("rejections".to_string(), self.rejections as f64);
        metrics.insert("admission_rate".to_string(), self.admission_rate());
        metrics.insert("sketch_resets".to_string(), self.sketch_resets as f64);

        // Movement between segments
        metrics.insert("total_promotions".to_string(), self.promotions as f64);
        metrics.insert("total_demotions".to_string(), self.demotions as f64);

        // Per-segment hits and evictions
        metrics.insert("window_hits".to_string(), self.window_hits as f64);
        metrics.insert("probation_hits".to_string(), self.probation_hits as f64);
        metrics.insert("protected_hits".to_string(), self.protected_hits as f64);
        metrics.insert(
            "window_evictions".to_string(),
            self.window_evictions as f64,
        );
        metrics.insert(
            "probation_evictions".to_string(),
            self.probation_evictions as f64,
        );
        metrics.insert(
            "protected_evictions".to_string(),
            self.protected_evictions as f64,
        );

        metrics
    }
}

impl CacheMetrics for TinyLfuCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "TinyLFU"
    }
}
