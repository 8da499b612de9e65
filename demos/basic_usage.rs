//! Basic TinyLFU Usage
//!
//! Walks through admission, promotion, eviction callbacks and metrics on a
//! small cache so that every decision is visible.
//!
//! Run with: cargo run --example basic_usage

extern crate tinylfu_cache;

use std::sync::{Arc, Mutex};

use tinylfu_cache::metrics::CacheMetrics;
use tinylfu_cache::{TinyLfuCache, TinyLfuCacheConfig};

fn main() {
    println!("TinyLFU Cache Walkthrough");
    println!("=========================\n");

    admission_walkthrough();
    println!();

    custom_configuration();
    println!();

    metrics_report();
}

fn print_segments(cache: &TinyLfuCache<&'static str, i32>) {
    let stats = cache.stats();
    println!(
        "   window {}/{}  probation {}  protected {}  (main capacity {})",
        stats.window_size,
        stats.window_capacity,
        stats.probation_size,
        stats.protected_size,
        stats.main_capacity
    );
}

/// One key at a time through window, probation and protected
fn admission_walkthrough() {
    println!("1. Admission and Promotion");
    println!("   ------------------------");

    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    let mut cache = TinyLfuCache::with_evict(10, move |key, value| {
        sink.lock().unwrap().push((key, value));
    })
    .unwrap();

    cache.put("apple", 1);
    cache.put("banana", 2);
    println!("   put apple, put banana");
    println!(
        "   apple was seen once, so it was rejected: {:?}",
        evicted.lock().unwrap()
    );
    print_segments(&cache);

    cache.put("apple", 1);
    cache.put("banana", 2);
    println!("   put apple, put banana again");
    println!("   apple is known now and probation had room:");
    print_segments(&cache);

    cache.get(&"apple");
    println!("   get apple promotes it to protected:");
    print_segments(&cache);

    println!("   snapshot (protected, probation, window): {:?}", cache.keys());
    println!("   estimated frequency of apple: {}", cache.frequency(&"apple"));

    cache.clear();
    println!("   after clear, callback saw: {:?}", evicted.lock().unwrap());
}

/// Larger window and a different protected share
fn custom_configuration() {
    println!("2. Custom Configuration");
    println!("   ---------------------");

    let config = TinyLfuCacheConfig {
        capacity: 1000,
        window_ratio: 0.2,
        protected_ratio: 0.5,
        sample_factor: 5,
    };
    let mut cache: TinyLfuCache<u64, String> = TinyLfuCache::from_config(config).unwrap();
    let layout = cache.layout();
    println!(
        "   capacity {} = window {} + probation {} + protected {}",
        layout.capacity, layout.window, layout.probation, layout.protected
    );

    for i in 0..5_000u64 {
        cache.put(i % 1_500, format!("value-{i}"));
    }
    println!("   after 5000 puts over 1500 keys: {} entries", cache.len());

    cache.resize(100).unwrap();
    let stats = cache.stats();
    println!(
        "   resized to {}: {} entries ({} window / {} probation / {} protected)",
        stats.capacity, stats.size, stats.window_size, stats.probation_size, stats.protected_size
    );
}

/// A skewed workload and the resulting counters
fn metrics_report() {
    println!("3. Metrics");
    println!("   -------");

    let mut cache = TinyLfuCache::new(100).unwrap();
    let mut state = 42u64;
    for _ in 0..20_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        // Most requests go to 50 hot keys, the rest to a long tail
        let key = if state % 10 < 8 { state % 50 } else { state % 10_000 };
        if cache.get(&key).is_none() {
            cache.put(key, key);
        }
    }

    println!("   algorithm: {}", cache.algorithm_name());
    for (name, value) in cache.metrics() {
        println!("   {name:<24} {value:>12.4}");
    }
}
