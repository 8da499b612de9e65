// Statistics reporting for cache simulation

use crate::models::{AlgorithmStats, CacheAlgorithm, CsvResultRow, SimulationResult};
use std::path::Path;

/// Sorted, printable view of a simulation result
pub struct SimulationStats {
    rows: Vec<(CacheAlgorithm, AlgorithmStats)>,
    total_requests: usize,
    total_bytes: u64,
    unique_objects: usize,
    capacity: usize,
}

impl SimulationStats {
    /// Create SimulationStats from a SimulationResult, best hit rate first
    pub fn from_result(result: &SimulationResult) -> Self {
        let mut rows: Vec<_> = result
            .stats
            .iter()
            .map(|(algorithm, stats)| (*algorithm, stats.clone()))
            .collect();
        rows.sort_by(|(a_algo, a), (b_algo, b)| {
            b.hit_rate()
                .total_cmp(&a.hit_rate())
                .then_with(|| a_algo.cmp(b_algo))
        });

        Self {
            rows,
            total_requests: result.total_requests,
            total_bytes: result.total_bytes,
            unique_objects: result.unique_objects,
            capacity: result.capacity,
        }
    }

    /// Algorithms in report order
    pub fn ranking(&self) -> Vec<CacheAlgorithm> {
        self.rows.iter().map(|(algorithm, _)| *algorithm).collect()
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nCache Simulation Summary");
        println!("========================");
        println!("Total requests: {}", self.total_requests);
        println!("Unique objects: {}", self.unique_objects);
        println!(
            "Total bytes: {} ({:.2} MB)",
            self.total_bytes,
            self.total_bytes as f64 / (1024.0 * 1024.0)
        );
        println!("Cache capacity: {} entries", self.capacity);

        println!(
            "\n{:<18} {:>8} {:>10} {:>10} {:>10} {:>12} {:>12}",
            "Algorithm", "HitRate", "ByteHit%", "Entries", "Evictions", "Time", "Ops/sec"
        );
        println!("{}", "-".repeat(86));

        for (algorithm, stats) in &self.rows {
            let evictions = stats
                .evictions
                .map(|e| e.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<18} {:>7.2}% {:>9.2}% {:>10} {:>10} {:>11.3}s {:>12.0}",
                algorithm.as_str(),
                stats.hit_rate(),
                stats.byte_hit_rate(),
                stats.final_entries,
                evictions,
                stats.elapsed.as_secs_f64(),
                stats.ops_per_sec()
            );
        }
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;

        for (algorithm, stats) in &self.rows {
            writer.serialize(CsvResultRow {
                algorithm: algorithm.as_str().to_string(),
                capacity: self.capacity,
                hits: stats.hits,
                misses: stats.misses,
                hit_rate: stats.hit_rate(),
                byte_hit_rate: stats.byte_hit_rate(),
                bytes_hit: stats.bytes_hit,
                bytes_miss: stats.bytes_miss,
                evictions: stats.evictions,
                final_entries: stats.final_entries,
                elapsed_ms: stats.elapsed.as_secs_f64() * 1000.0,
                ops_per_sec: stats.ops_per_sec(),
            })?;
        }

        writer.flush()?;
        Ok(())
    }
}
