//! Stress Tests for the Concurrent TinyLFU Cache
//!
//! These tests verify thread safety and correctness under high contention.

#![cfg(feature = "concurrent")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use tinylfu_cache::config::TinyLfuCacheConfig;
use tinylfu_cache::ConcurrentTinyLfuCache;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 10_000;

fn make_cache(capacity: usize) -> Arc<ConcurrentTinyLfuCache<usize, usize>> {
    Arc::new(ConcurrentTinyLfuCache::new(capacity).unwrap())
}

/// Test high contention with many threads hammering the same keys
#[test]
fn stress_high_contention() {
    let cache = make_cache(100);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = i % 10; // Only 10 keys for high contention
                if t % 2 == 0 {
                    cache.put(key, t * OPS_PER_THREAD + i);
                } else {
                    let _ = cache.get(&key);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= 10);
}

/// Test with a range of window and protected ratios
#[test]
fn stress_segment_ratios() {
    for (window_ratio, protected_ratio) in [(0.01, 0.8), (0.2, 0.5), (0.5, 0.0), (1.0, 0.8)] {
        let config = TinyLfuCacheConfig {
            window_ratio,
            protected_ratio,
            ..TinyLfuCacheConfig::new(1000)
        };
        let cache: Arc<ConcurrentTinyLfuCache<usize, usize>> =
            Arc::new(ConcurrentTinyLfuCache::from_config(config).unwrap());

        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    cache.put(t * 1000 + i, i);
                    let _ = cache.get(&(t * 1000 + i / 2));
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let stats = cache.stats();
        assert!(stats.size <= 1000);
        assert!(stats.window_size <= stats.window_capacity);
        assert!(stats.probation_size + stats.protected_size <= stats.main_capacity);
    }
}

/// Test edge case: empty cache operations
#[test]
fn stress_empty_cache() {
    let cache = make_cache(100);

    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                assert!(cache.get(&i).is_none());
                assert!(cache.peek(&i).is_none());
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.is_empty());
    assert_eq!(cache.stats().sketch_size, 0);
}

/// Test edge case: single entry cache
#[test]
fn stress_single_entry_cache() {
    let cache = make_cache(1);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..1000 {
                cache.put(t, i);
                let _ = cache.get(&t);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= 1);
}

/// Test capacity limits under concurrent access
#[test]
fn stress_capacity_limits() {
    let capacity = 100;
    let cache = make_cache(capacity);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                cache.put(t * OPS_PER_THREAD + i, i);
                if i % 100 == 0 {
                    assert!(cache.len() <= capacity);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= capacity);
}

/// Test eviction callbacks account for every key under contention
#[test]
fn stress_eviction_callback_accounting() {
    let evictions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evictions);
    let cache: Arc<ConcurrentTinyLfuCache<usize, usize>> = Arc::new(
        ConcurrentTinyLfuCache::with_evict(256, move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap(),
    );

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD / 10 {
                cache.put(t * OPS_PER_THREAD + i, i);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Keys are unique, so each one is either resident or evicted exactly once
    let written = NUM_THREADS * (OPS_PER_THREAD / 10);
    assert_eq!(cache.len() + evictions.load(Ordering::Relaxed), written);
}

/// Test mixed operations including resize and clear
#[test]
fn stress_mixed_operations() {
    let cache = make_cache(500);

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD / 10 {
                let key = (t * 13 + i) % 1000;
                match i % 10 {
                    0..=4 => {
                        cache.put(key, i);
                    }
                    5..=7 => {
                        let _ = cache.get(&key);
                    }
                    8 => {
                        let _ = cache.remove(&key);
                    }
                    _ => {
                        let _ = cache.contains(&key);
                        let _ = cache.frequency(&key);
                    }
                }

                if t == 0 && i % 250 == 0 {
                    cache.resize(100 + (i % 500)).unwrap();
                }
                if t == 1 && i == 500 {
                    cache.clear();
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let stats = cache.stats();
    assert!(stats.size <= stats.capacity);
    assert_eq!(
        stats.size,
        stats.window_size + stats.probation_size + stats.protected_size
    );
    assert_eq!(cache.keys().len(), stats.size);
}

/// Test readers running alongside a single writer
#[test]
fn stress_readers_and_writer() {
    let cache = make_cache(1000);
    // Second pass gets keys past the doorkeeper
    for _ in 0..2 {
        for i in 0..1000 {
            cache.put(i, i);
        }
    }
    assert!(!cache.is_empty());

    let reads = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for _ in 0..NUM_THREADS - 1 {
        let cache = Arc::clone(&cache);
        let reads = Arc::clone(&reads);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                if cache.peek(&(i % 2000)).is_some() {
                    reads.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                cache.put(i % 2000, i);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert!(cache.len() <= 1000);
    assert!(reads.load(Ordering::Relaxed) > 0);
}
