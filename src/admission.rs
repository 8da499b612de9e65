//! Admission policy applied to entries leaving the window segment.
//!
//! A candidate must first pass the doorkeeper (it has to have been seen
//! before in the current aging epoch), and then beat the probation victim's
//! estimated frequency. Ties keep the victim.

use core::hash::{BuildHasher, Hash};

use crate::doorkeeper::Doorkeeper;
use crate::sketch::FrequencySketch;

/// Decides whether `candidate` may enter the probation segment.
///
/// `victim` is the key at the tail of the probation segment, or `None` when
/// probation is empty. A candidate unknown to the doorkeeper is marked and
/// rejected without consulting the sketch.
pub(crate) fn admit<K, S>(
    candidate: &K,
    victim: Option<&K>,
    doorkeeper: &mut Doorkeeper<K, S>,
    sketch: &FrequencySketch<S>,
) -> bool
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    if !doorkeeper.seen(candidate) {
        doorkeeper.mark(candidate.clone());
        return false;
    }

    match victim {
        Some(victim) => sketch.estimate(candidate) > sketch.estimate(victim),
        None => true,
    }
}
