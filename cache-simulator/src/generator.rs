//! Synthetic traffic log generation
//!
//! Writes `timestamp,key,size` CSV logs with a hot set / cold set split:
//! `hot_traffic_percent` of the requests go to the first
//! `hot_objects_percent` of the key space, the rest are spread uniformly over
//! the whole key space. Optional scan bursts replay a run of never-seen keys,
//! the pattern that frequency-based admission is meant to resist.

use crate::models::Request;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Parameters for generating traffic logs
#[derive(Debug, Clone)]
pub struct TrafficLogConfig {
    /// Total number of requests across all files
    pub requests: u64,
    /// Number of distinct keys in the regular key space
    pub unique_objects: u32,
    /// Percentage of traffic going to the hot set
    pub hot_traffic_percent: u8,
    /// Percentage of keys that make up the hot set
    pub hot_objects_percent: u8,
    /// Insert a scan burst after every this many requests (0 disables scans)
    pub scan_every: u64,
    /// Number of one-off keys in each scan burst
    pub scan_length: u64,
    /// Minimum object size in bytes
    pub min_size: u64,
    /// Maximum object size in bytes
    pub max_size: u64,
    /// Requests per second, used to advance timestamps
    pub rps: u32,
    /// Number of output files the requests are split into
    pub files: u32,
    /// RNG seed; the same seed reproduces the same logs
    pub seed: u64,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Default for TrafficLogConfig {
    fn default() -> Self {
        Self {
            requests: 1_000_000,
            unique_objects: 10_000,
            hot_traffic_percent: 80,
            hot_objects_percent: 20,
            scan_every: 0,
            scan_length: 0,
            min_size: 1024,        // 1KB
            max_size: 1024 * 1024, // 1MB
            rps: 100,
            files: 1,
            seed: 42,
            output_dir: PathBuf::from("traffic_logs"),
        }
    }
}

/// Generator for synthetic traffic logs
pub struct TrafficLogGenerator {
    config: TrafficLogConfig,
}

impl TrafficLogGenerator {
    /// Create a new generator with the given configuration
    pub fn new(config: TrafficLogConfig) -> Self {
        Self { config }
    }

    /// Generate the logs and return the paths written
    pub fn generate(&self) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let config = &self.config;
        if config.unique_objects == 0 {
            return Err("unique_objects must be positive".into());
        }
        if config.min_size > config.max_size {
            return Err("min_size must not exceed max_size".into());
        }
        fs::create_dir_all(&config.output_dir)?;

        let hot_objects = ((u64::from(config.unique_objects) * u64::from(config.hot_objects_percent))
            / 100)
            .max(1);
        info!(
            requests = config.requests,
            unique_objects = config.unique_objects,
            hot_objects,
            hot_traffic_percent = config.hot_traffic_percent,
            scan_every = config.scan_every,
            output_dir = %config.output_dir.display(),
            "generating traffic logs"
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let files = config.files.max(1);
        let per_file = config.requests.div_ceil(u64::from(files));
        let mut timestamp = 1_700_000_000u64;
        let mut written = 0u64;
        let mut scan_key = 0u64;
        let mut paths = Vec::with_capacity(files as usize);

        for file_index in 0..files {
            let path = config
                .output_dir
                .join(format!("traffic_{file_index:03}.csv"));
            let mut writer = csv::Writer::from_path(&path)?;
            let file_end = (written + per_file).min(config.requests);

            while written < file_end {
                let in_scan = config.scan_every > 0
                    && config.scan_length > 0
                    && written % (config.scan_every + config.scan_length) >= config.scan_every;
                let key = if in_scan {
                    scan_key += 1;
                    format!("scan_{scan_key}")
                } else if rng.gen_range(0..100) < config.hot_traffic_percent {
                    format!("key_{}", rng.gen_range(0..hot_objects))
                } else {
                    format!("key_{}", rng.gen_range(0..u64::from(config.unique_objects)))
                };
                let size = rng.gen_range(config.min_size..=config.max_size);

                writer.serialize(Request::new(timestamp, key, size))?;
                written += 1;
                if config.rps > 0 && written % u64::from(config.rps) == 0 {
                    timestamp += 1;
                }
            }

            writer.flush()?;
            debug!(path = %path.display(), written, "finished traffic log");
            paths.push(path);
        }

        info!(files = paths.len(), requests = written, "traffic generation complete");
        Ok(paths)
    }
}
