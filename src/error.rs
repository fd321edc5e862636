//! Error types for chronoline.

use thiserror::Error;

/// Result type alias using chronoline's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for timeline operations.
///
/// Lookups that find nothing are not errors: they return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Capacity or slot layout rejected at configure time.
    #[error("invalid timeline configuration: {0}")]
    Configuration(String),

    /// More concurrently-live blocks were requested than the pool holds.
    #[error("memory pool exhausted: all {capacity} blocks are in use")]
    PoolExhausted {
        /// Number of blocks in the pool.
        capacity: usize,
    },

    /// The arena could not be allocated.
    #[error("memory allocation failed: {0}")]
    AllocationFailed(String),

    /// A buffer from another pool or with another layout was pushed.
    #[error("incompatible buffer: {0}")]
    IncompatibleBuffer(String),

    /// A mutating operation was attempted before `configure`.
    #[error("timeline is not configured")]
    NotConfigured,

    /// Checked slot access outside the buffer's element count.
    #[error("element index {index} out of bounds (element count {count})")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of slots in the buffer.
        count: usize,
    },
}
