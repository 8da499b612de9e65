//! Simulation runner
//!
//! Replays one request stream against every selected cache. Each request is
//! a read-through lookup: a hit is counted when the key is cached, otherwise
//! the key is inserted with its object size as the value. Only the time spent
//! inside cache calls is measured; log parsing is excluded.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::time::Instant;

use ahash::RandomState as AHashRandomState;
use lru::LruCache;
use moka::sync::Cache as MokaCache;
use tinylfu_cache::config::TinyLfuCacheConfig;
use tinylfu_cache::metrics::CacheMetrics;
use tinylfu_cache::{ConcurrentTinyLfuCache, TinyLfuCache};
use tracing::{debug, info};

use crate::input::LogReader;
use crate::models::{AlgorithmStats, CacheAlgorithm, Request, SimulationConfig, SimulationResult};

/// Wrapper enum over every cache implementation under test
enum CacheWrapper {
    TinyLfu(TinyLfuCache<String, u64>),
    ConcurrentTinyLfu(ConcurrentTinyLfuCache<String, u64>),
    Lru(LruCache<String, u64>),
    Moka(MokaCache<String, u64, AHashRandomState>),
}

impl CacheWrapper {
    fn create(algorithm: CacheAlgorithm, config: &SimulationConfig) -> Result<Self, String> {
        let tinylfu_config = TinyLfuCacheConfig {
            window_ratio: config.window_ratio,
            ..TinyLfuCacheConfig::new(config.capacity)
        };
        let capacity = NonZeroUsize::new(config.capacity)
            .ok_or_else(|| "capacity must be positive".to_string())?;

        Ok(match algorithm {
            CacheAlgorithm::TinyLfu => CacheWrapper::TinyLfu(
                TinyLfuCache::from_config(tinylfu_config).map_err(|e| e.to_string())?,
            ),
            CacheAlgorithm::ConcurrentTinyLfu => CacheWrapper::ConcurrentTinyLfu(
                ConcurrentTinyLfuCache::from_config(tinylfu_config).map_err(|e| e.to_string())?,
            ),
            CacheAlgorithm::Lru => CacheWrapper::Lru(LruCache::new(capacity)),
            CacheAlgorithm::Moka => CacheWrapper::Moka(
                MokaCache::builder()
                    .max_capacity(capacity.get() as u64)
                    .build_with_hasher(AHashRandomState::new()),
            ),
        })
    }

    /// Read-through access; returns `true` on a hit
    fn access(&mut self, request: &Request) -> bool {
        let key = request.key.as_str();
        let hit = match self {
            CacheWrapper::TinyLfu(c) => c.get(key).is_some(),
            CacheWrapper::ConcurrentTinyLfu(c) => c.get_with(key, |_| ()).is_some(),
            CacheWrapper::Lru(c) => c.get(key).is_some(),
            CacheWrapper::Moka(c) => c.get(key).is_some(),
        };
        if !hit {
            let key = request.key.clone();
            match self {
                CacheWrapper::TinyLfu(c) => {
                    c.put(key, request.size);
                }
                CacheWrapper::ConcurrentTinyLfu(c) => {
                    c.put(key, request.size);
                }
                CacheWrapper::Lru(c) => {
                    c.put(key, request.size);
                }
                CacheWrapper::Moka(c) => c.insert(key, request.size),
            }
        }
        hit
    }

    fn len(&self) -> usize {
        match self {
            CacheWrapper::TinyLfu(c) => c.len(),
            CacheWrapper::ConcurrentTinyLfu(c) => c.len(),
            CacheWrapper::Lru(c) => c.len(),
            CacheWrapper::Moka(c) => {
                c.run_pending_tasks();
                c.entry_count() as usize
            }
        }
    }

    fn evictions(&self) -> Option<u64> {
        let metrics = match self {
            CacheWrapper::TinyLfu(c) => c.metrics(),
            CacheWrapper::ConcurrentTinyLfu(c) => c.metrics(),
            CacheWrapper::Lru(_) | CacheWrapper::Moka(_) => return None,
        };
        metrics.get("evictions").map(|&v| v as u64)
    }
}

/// Runs a configured simulation
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Replay the input directory against every selected cache
    pub fn run(&self) -> Result<SimulationResult, String> {
        let reader = LogReader::new(&self.config.input_dir);
        let requests = reader.stream_requests().map_err(|e| e.to_string())?;
        self.run_requests(requests.map(|r| r.map_err(|e| e.to_string())))
    }

    /// Replay an arbitrary request stream
    pub fn run_requests<I>(&self, requests: I) -> Result<SimulationResult, String>
    where
        I: IntoIterator<Item = Result<Request, String>>,
    {
        let start = Instant::now();
        let mut caches = Vec::with_capacity(self.config.algorithms.len());
        for &algorithm in &self.config.algorithms {
            caches.push((algorithm, CacheWrapper::create(algorithm, &self.config)?));
        }
        let mut stats: HashMap<CacheAlgorithm, AlgorithmStats> = self
            .config
            .algorithms
            .iter()
            .map(|&a| (a, AlgorithmStats::new()))
            .collect();

        let mut total_requests = 0usize;
        let mut total_bytes = 0u64;
        let mut unique_keys = HashSet::new();

        for request in requests {
            let request = request?;
            total_requests += 1;
            total_bytes += request.size;
            if !unique_keys.contains(&request.key) {
                unique_keys.insert(request.key.clone());
            }

            for (algorithm, cache) in caches.iter_mut() {
                let op_start = Instant::now();
                let hit = cache.access(&request);
                let elapsed = op_start.elapsed();
                if let Some(entry) = stats.get_mut(&*algorithm) {
                    entry.record(hit, request.size);
                    entry.elapsed += elapsed;
                }
            }

            if total_requests % 1_000_000 == 0 {
                debug!(total_requests, "replay progress");
            }
        }

        for (algorithm, cache) in &caches {
            if let Some(entry) = stats.get_mut(algorithm) {
                entry.final_entries = cache.len();
                entry.evictions = cache.evictions();
                info!(
                    algorithm = %algorithm,
                    hit_rate = entry.hit_rate(),
                    final_entries = entry.final_entries,
                    "replay finished"
                );
            }
        }

        Ok(SimulationResult {
            stats,
            total_requests,
            total_bytes,
            unique_objects: unique_keys.len(),
            duration: start.elapsed(),
            capacity: self.config.capacity,
        })
    }
}
