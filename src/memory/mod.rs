//! Memory management for timelines.
//!
//! - [`PoolAllocator`]: fixed-size blocks carved from one aligned arena
//! - [`PoolBlock`]: RAII guard that returns its block to the issuing pool on drop
//! - [`SlotMask`]: per-slot presence flags for a buffer
//!
//! # Example
//!
//! ```rust
//! use chronoline::memory::PoolAllocator;
//!
//! // 16 blocks of 64KB each
//! let pool = PoolAllocator::new(64 * 1024, 16).unwrap();
//!
//! let mut block = pool.acquire().expect("pool not exhausted");
//! block.data_mut()[..5].copy_from_slice(b"hello");
//!
//! // Block is returned to the pool when dropped
//! ```

mod mask;
mod pool;

pub use mask::SlotMask;
pub use pool::{BLOCK_ALIGN, PoolAllocator, PoolBlock};
