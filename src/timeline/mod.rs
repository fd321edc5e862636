//! The timeline: a bounded, thread-safe, timestamp-ordered buffer store.
//!
//! - [`TimelineConfig`]: slot layout and capacity
//! - [`Timeline`]: the store itself, untyped (slots are raw bytes)
//!
//! Typed wrappers over [`Timeline`] live in [`crate::typed`].

mod config;
mod store;

pub use config::{DEFAULT_PRODUCERS, TimelineConfig};
pub use store::Timeline;
