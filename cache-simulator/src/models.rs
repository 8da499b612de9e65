// Data models for cache simulation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A single cache request, one row of a traffic log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unix timestamp of the request in seconds
    pub timestamp: u64,
    /// Cache key
    pub key: String,
    /// Size of the object in bytes
    pub size: u64,
}

impl Request {
    /// Create a new request
    pub fn new(timestamp: u64, key: String, size: u64) -> Self {
        Self {
            timestamp,
            key,
            size,
        }
    }
}

/// Cache implementations supported for simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheAlgorithm {
    /// `tinylfu_cache::TinyLfuCache`
    TinyLfu,
    /// `tinylfu_cache::ConcurrentTinyLfuCache`
    ConcurrentTinyLfu,
    /// Plain LRU baseline from the `lru` crate
    Lru,
    /// Moka cache (external crate for comparison)
    Moka,
}

impl CacheAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheAlgorithm::TinyLfu => "TinyLFU",
            CacheAlgorithm::ConcurrentTinyLfu => "ConcurrentTinyLFU",
            CacheAlgorithm::Lru => "LRU",
            CacheAlgorithm::Moka => "Moka",
        }
    }

    /// Parse a command line name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tinylfu" | "tlfu" => Some(CacheAlgorithm::TinyLfu),
            "concurrent" | "concurrent-tinylfu" | "ctlfu" => Some(CacheAlgorithm::ConcurrentTinyLfu),
            "lru" => Some(CacheAlgorithm::Lru),
            "moka" => Some(CacheAlgorithm::Moka),
            _ => None,
        }
    }

    /// Get all available algorithms
    pub fn all() -> Vec<CacheAlgorithm> {
        vec![
            CacheAlgorithm::TinyLfu,
            CacheAlgorithm::ConcurrentTinyLfu,
            CacheAlgorithm::Lru,
            CacheAlgorithm::Moka,
        ]
    }
}

impl fmt::Display for CacheAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Directory containing input log files
    pub input_dir: PathBuf,
    /// Cache capacity in number of entries
    pub capacity: usize,
    /// Share of the capacity used by the TinyLFU window
    pub window_ratio: f64,
    /// Caches to simulate
    pub algorithms: Vec<CacheAlgorithm>,
}

/// Results of a simulation run
#[derive(Debug)]
pub struct SimulationResult {
    /// Statistics for each cache
    pub stats: HashMap<CacheAlgorithm, AlgorithmStats>,
    /// Total number of requests processed
    pub total_requests: usize,
    /// Total bytes requested
    pub total_bytes: u64,
    /// Number of unique keys in the dataset
    pub unique_objects: usize,
    /// Wall time of the whole simulation
    pub duration: Duration,
    /// Cache capacity used
    pub capacity: usize,
}

/// Statistics for a single cache
#[derive(Debug, Default, Clone)]
pub struct AlgorithmStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Bytes served from cache (hits)
    pub bytes_hit: u64,
    /// Bytes served from backend (misses)
    pub bytes_miss: u64,
    /// Entries that left the cache, where the cache reports it
    pub evictions: Option<u64>,
    /// Time spent in cache operations only
    pub elapsed: Duration,
    /// Entries resident when the replay finished
    pub final_entries: usize,
}

impl AlgorithmStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one lookup
    pub fn record(&mut self, hit: bool, size: u64) {
        if hit {
            self.hits += 1;
            self.bytes_hit += size;
        } else {
            self.misses += 1;
            self.bytes_miss += size;
        }
    }

    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate byte hit rate as percentage
    pub fn byte_hit_rate(&self) -> f64 {
        let total = self.bytes_hit + self.bytes_miss;
        if total > 0 {
            (self.bytes_hit as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Cache operations per second
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.hits + self.misses) as f64 / secs
        } else {
            0.0
        }
    }
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub algorithm: String,
    pub capacity: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub byte_hit_rate: f64,
    pub bytes_hit: u64,
    pub bytes_miss: u64,
    pub evictions: Option<u64>,
    pub final_entries: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}
