//! Temporal types for timestamp-keyed storage.
//!
//! - [`Timestamp`]: floating-point millisecond clock value with a total order
//! - [`Direction`]: constraint for nearest-timestamp lookups

mod timestamp;

pub use timestamp::{Direction, Timestamp};
