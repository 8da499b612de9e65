//! Doorkeeper: a "seen at least once" gate in front of the admission policy.
//!
//! The first time a candidate is considered for admission it is only
//! recorded here and rejected; a key has to show up again within the same
//! aging epoch before its frequency is even compared against a victim.
//! One-hit wonders therefore never displace anything.
//!
//! The set is exact (it stores the keys themselves) and unbounded; the owning
//! cache clears it together with the frequency sketch at every aging step,
//! which bounds its growth.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use hashbrown::{DefaultHashBuilder, HashSet};

/// Membership set of keys seen during the current aging epoch.
pub struct Doorkeeper<K, S = DefaultHashBuilder> {
    seen: HashSet<K, S>,
}

impl<K: Hash + Eq> Doorkeeper<K, DefaultHashBuilder> {
    /// Creates an empty doorkeeper.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq> Default for Doorkeeper<K, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, S: BuildHasher> Doorkeeper<K, S> {
    /// Creates an empty doorkeeper using `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Doorkeeper {
            seen: HashSet::with_hasher(hash_builder),
        }
    }

    /// Returns `true` if `key` was marked since the last `clear`.
    pub fn seen<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.seen.contains(key)
    }

    /// Marks `key` as seen. Returns `true` if it was not marked before.
    pub fn mark(&mut self, key: K) -> bool {
        self.seen.insert(key)
    }

    /// Number of distinct keys marked since the last `clear`.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been marked since the last `clear`.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

impl<K, S> fmt::Debug for Doorkeeper<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Doorkeeper")
            .field("len", &self.seen.len())
            .finish()
    }
}
