//! Concurrent TinyLFU Usage
//!
//! Demonstrates multi-threaded usage of `ConcurrentTinyLfuCache`.
//!
//! Run with: cargo run --example concurrent_usage --features concurrent

extern crate tinylfu_cache;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tinylfu_cache::metrics::CacheMetrics;
use tinylfu_cache::ConcurrentTinyLfuCache;

fn main() {
    println!("Concurrent TinyLFU Usage");
    println!("========================\n");

    basic_concurrent_usage();
    println!();

    zero_copy_get_with();
    println!();

    eviction_callback();
    println!();

    throughput();
}

/// Basic multi-threaded cache usage
fn basic_concurrent_usage() {
    println!("1. Basic Concurrent Usage");
    println!("   -----------------------");

    let cache = Arc::new(ConcurrentTinyLfuCache::new(1000).unwrap());

    let num_threads = 4;
    let ops_per_thread = 1000;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = format!("thread{}-key{}", thread_id, i % 100);
                    let value = thread_id * 10000 + i;

                    cache.put(key.clone(), value);
                    if let Some(v) = cache.get(&key) {
                        assert!(v / 10000 < num_threads);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "   Completed {} operations across {} threads",
        num_threads * ops_per_thread * 2,
        num_threads
    );
    let stats = cache.stats();
    println!(
        "   Final size: {} ({} window / {} probation / {} protected)",
        stats.size, stats.window_size, stats.probation_size, stats.protected_size
    );
}

/// Reading a value in place with get_with()
fn zero_copy_get_with() {
    println!("2. Zero-Copy Access with get_with()");
    println!("   ----------------------------------");

    let cache: ConcurrentTinyLfuCache<String, Vec<u8>> = ConcurrentTinyLfuCache::new(100).unwrap();
    cache.put("large_key".to_string(), vec![1u8; 1024]);

    let sum: Option<u64> = cache.get_with("large_key", |data| data.iter().map(|&x| x as u64).sum());
    println!("   Computed sum without cloning: {}", sum.unwrap_or_default());
    println!("   get() returns a clone - use get_with() to avoid cloning");
}

/// Counting evictions from several writers
fn eviction_callback() {
    println!("3. Eviction Callback");
    println!("   ------------------");

    let evicted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evicted);
    let cache = Arc::new(
        ConcurrentTinyLfuCache::with_evict(256, move |_key: u64, _value: u64| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..10_000u64 {
                    cache.put(t * 10_000 + i, i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    println!(
        "   40000 unique keys written: {} resident + {} evicted",
        cache.len(),
        evicted.load(Ordering::Relaxed)
    );
    println!("   The callback must not call back into the same cache.");
}

/// Rough throughput for a skewed read-heavy workload
fn throughput() {
    println!("4. Throughput");
    println!("   ----------");

    for num_threads in [1usize, 2, 4, 8] {
        let cache: Arc<ConcurrentTinyLfuCache<u64, u64>> =
            Arc::new(ConcurrentTinyLfuCache::new(10_000).unwrap());
        let ops_per_thread = 100_000u64;
        let start = Instant::now();

        let handles: Vec<_> = (0..num_threads as u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let mut state = 0x2545_f491_4f6c_dd1d ^ (t + 1);
                    for _ in 0..ops_per_thread {
                        state ^= state << 13;
                        state ^= state >> 7;
                        state ^= state << 17;
                        let key = if state % 10 < 8 { state % 2_000 } else { state % 100_000 };
                        if cache.get(&key).is_none() {
                            cache.put(key, key);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let elapsed = start.elapsed();
        let total = num_threads as f64 * ops_per_thread as f64;
        let metrics = cache.metrics();
        println!(
            "   {:>2} threads: {:>10.0} ops/sec, hit rate {:.2}%",
            num_threads,
            total / elapsed.as_secs_f64(),
            metrics.get("hit_rate").copied().unwrap_or_default() * 100.0
        );
    }
}
