//! Error type returned by cache construction and resizing.
//!
//! Only capacity management can fail. Every other operation reports a missing
//! key through `Option`/`bool` instead of an error.

/// Errors produced when building or resizing a cache.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested capacity is not a positive number of entries.
    #[error("capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    /// A segment ratio in the configuration is not a finite value in `[0, 1]`.
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRatio {
        /// Name of the offending configuration field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}
