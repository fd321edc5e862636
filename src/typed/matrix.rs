//! Timelines of 4x4 tracking matrices.

use super::generic::{GenericTimeline, SharedBuffer, TypedBuffer};
use crate::error::Result;
use crate::timeline::TimelineConfig;

/// A row-major 4x4 transform: element `(row, col)` is at `row * 4 + col`.
pub type Matrix4 = [f32; 16];

/// The identity transform.
pub const IDENTITY: Matrix4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// One slot per tracked object (a marker, a tool), each holding its pose.
pub type MatrixTimeline = GenericTimeline<Matrix4>;

/// A matrix buffer being filled by a tracker.
pub type MatrixBuffer = TypedBuffer<Matrix4>;

/// A published matrix buffer.
pub type SharedMatrixBuffer = SharedBuffer<Matrix4>;

/// Configuration for `max_matrices` tracked objects per instant.
pub fn matrix_config(
    max_matrices: usize,
    max_resident: usize,
    retained: usize,
) -> Result<TimelineConfig> {
    MatrixTimeline::record_config(max_matrices, max_resident, retained)
}

/// Read element `(row, col)` of a row-major matrix.
#[inline]
pub fn matrix_at(matrix: &Matrix4, row: usize, col: usize) -> f32 {
    matrix[row * 4 + col]
}
