//! Timelines bound to a concrete slot payload.
//!
//! - [`GenericTimeline<T>`]: one `T: Pod` record per slot, typed access
//! - [`MatrixTimeline`]: tracking matrices (`[f32; 16]`)
//! - [`FrameTimeline`]: raw video frames described by a [`FrameFormat`]
//!
//! Each payload is its own type; there is no runtime downcasting between
//! kinds of timeline.

mod frame;
mod generic;
mod matrix;

pub use frame::{ComponentType, FrameFormat, FrameTimeline, PixelFormat};
pub use generic::{GenericTimeline, SharedBuffer, TypedBuffer};
pub use matrix::{
    IDENTITY, Matrix4, MatrixBuffer, MatrixTimeline, SharedMatrixBuffer, matrix_at, matrix_config,
};
