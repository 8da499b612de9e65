//! Concurrent Cache Implementation
//!
//! A thread-safe wrapper around [`TinyLfuCache`](crate::TinyLfuCache).
//!
//! # Architecture
//!
//! The whole cache sits behind a single `parking_lot::RwLock`:
//!
//! - `get`, `put`, `remove`, `clear` and `resize` take the **write** lock. A
//!   hit reorders segments and touches the frequency sketch, so reads are
//!   writes here.
//! - `contains`, `peek`, `len`, `cap`, `stats`, `keys`, `values` and `items`
//!   take the **read** lock and may run in parallel with each other.
//!
//! ## Why Not Shard?
//!
//! Promotion, demotion and admission move entries between two segments and
//! compare against a victim picked from the global probation order. Splitting
//! the key space into independently locked shards would give every shard its
//! own window, sketch and victim, which changes what gets admitted. One lock
//! keeps every operation atomic with respect to all the others.
//!
//! # Eviction Callbacks
//!
//! The eviction callback runs while the write lock is held. A callback that
//! calls back into the same cache would deadlock, so the cache remembers which
//! thread is currently inside its callback and panics on such a call instead.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use tinylfu_cache::ConcurrentTinyLfuCache;
//!
//! let cache = Arc::new(ConcurrentTinyLfuCache::new(1000).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..1000 {
//!                 let key = format!("key_{}_{}", t, i);
//!                 cache.put(key.clone(), i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert!(cache.len() <= cache.cap());
//! ```

use core::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

mod tinylfu;

pub use self::tinylfu::ConcurrentTinyLfuCache;

/// Tracks the thread currently running an eviction callback.
#[derive(Debug, Default)]
pub(crate) struct ReentrancyGuard {
    active: AtomicBool,
    owner: Mutex<Option<ThreadId>>,
}

impl ReentrancyGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Panics if the calling thread is inside this cache's eviction callback.
    #[inline]
    pub(crate) fn check(&self, operation: &'static str) {
        if self.active.load(Ordering::Acquire) && *self.owner.lock() == Some(thread::current().id())
        {
            panic!("`{operation}` called from inside this cache's eviction callback");
        }
    }

    /// Marks the calling thread as running the callback until the returned
    /// scope is dropped.
    pub(crate) fn enter(&self) -> CallbackScope<'_> {
        *self.owner.lock() = Some(thread::current().id());
        self.active.store(true, Ordering::Release);
        CallbackScope { guard: self }
    }
}

#[derive(Debug)]
pub(crate) struct CallbackScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for CallbackScope<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Release);
        *self.guard.owner.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_guard_is_idle_by_default() {
        let guard = ReentrancyGuard::new();
        guard.check("get");
    }

    #[test]
    #[should_panic(expected = "eviction callback")]
    fn test_guard_panics_inside_scope() {
        let guard = ReentrancyGuard::new();
        let _scope = guard.enter();
        guard.check("put");
    }

    #[test]
    fn test_guard_ignores_other_threads() {
        let guard = Arc::new(ReentrancyGuard::new());
        let _scope = guard.enter();
        let other = Arc::clone(&guard);
        std::thread::spawn(move || other.check("len")).join().unwrap();
    }

    #[test]
    fn test_scope_drop_releases() {
        let guard = ReentrancyGuard::new();
        drop(guard.enter());
        guard.check("get");
    }
}
