//! Point-in-time snapshot of cache occupancy.

/// Sizes and capacities of a cache at the moment [`stats`] was called.
///
/// [`stats`]: crate::TinyLfuCache::stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Total number of entries.
    pub size: usize,
    /// Total capacity.
    pub capacity: usize,
    /// Entries in the window segment.
    pub window_size: usize,
    /// Entries in the probation segment.
    pub probation_size: usize,
    /// Entries in the protected segment.
    pub protected_size: usize,
    /// Capacity of the window segment.
    pub window_capacity: usize,
    /// Capacity of the main area (probation + protected).
    pub main_capacity: usize,
    /// Sketch increments since the last aging step.
    pub sketch_size: usize,
    /// Keys held by the doorkeeper.
    pub doorkeeper_size: usize,
}
