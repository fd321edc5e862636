//! # Chronoline
//!
//! Bounded, thread-safe, pool-backed timelines that carry live acquisition
//! data (video frames, tracking matrices) from producer threads to consumer
//! threads.
//!
//! A [`Timeline`](timeline::Timeline) is an ordered map from
//! [`Timestamp`](temporal::Timestamp) to [`Buffer`](buffer::Buffer). Every
//! buffer is one block from a fixed [`PoolAllocator`](memory::PoolAllocator)
//! split into slots with per-slot presence flags.
//!
//! ## Features
//!
//! - **Bounded memory**: the pool is allocated once at configure time; a full
//!   timeline evicts its oldest entry
//! - **Nearest lookup**: exact, past, future, or closest-either-way retrieval
//! - **Decoupled liveness**: published buffers are `Arc`s, so a consumer's
//!   handle stays valid after eviction
//! - **Typed payloads**: [`GenericTimeline<T>`](typed::GenericTimeline) for any
//!   `bytemuck::Pod` record, plus matrix and frame timelines
//!
//! ## Quick Start
//!
//! ```rust
//! use chronoline::prelude::*;
//!
//! let tracker = MatrixTimeline::with_capacity(4, 100, 1)?;
//!
//! // Producer
//! let mut buffer = tracker.create_buffer(Timestamp::from_millis(1000.0))?;
//! buffer.set_element(0, &IDENTITY);
//! tracker.push(buffer)?;
//!
//! // Consumer
//! let snapshot = TimelineReader::new()
//!     .read(&tracker, Timestamp::from_millis(1004.0), &[0, 1])
//!     .expect("a buffer is resident");
//! assert_eq!(snapshot.unsynchronized().collect::<Vec<_>>(), vec![1]);
//! # Ok::<(), chronoline::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod error;
pub mod memory;
pub mod observability;
pub mod reader;
pub mod temporal;
pub mod timeline;
pub mod typed;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::error::{Error, Result};
    pub use crate::reader::{SlotEvent, Snapshot, TimelineReader};
    pub use crate::temporal::{Direction, Timestamp};
    pub use crate::timeline::{Timeline, TimelineConfig};
    pub use crate::typed::{
        FrameFormat, FrameTimeline, GenericTimeline, IDENTITY, Matrix4, MatrixTimeline,
        SharedBuffer, TypedBuffer,
    };
}

pub use error::{Error, Result};
