//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

/// Create a span for bulk work on a timeline (configure, clear, deep copy).
///
/// # Example
///
/// ```rust
/// use chronoline::observability::span_timeline;
///
/// let span = span_timeline("frames", "deep_copy");
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_timeline(name: &str, operation: &'static str) -> Span {
    span!(Level::DEBUG, "timeline", name = %name, operation = operation)
}

/// Log a buffer published into a timeline.
#[inline]
pub fn trace_buffer_pushed(timeline: &str, timestamp: f64, resident: usize) {
    tracing::trace!(
        timeline = %timeline,
        timestamp,
        resident,
        "buffer pushed"
    );
}

/// Log a buffer evicted to respect the capacity.
#[inline]
pub fn trace_buffer_evicted(timeline: &str, timestamp: f64) {
    tracing::trace!(
        timeline = %timeline,
        timestamp,
        "oldest buffer evicted"
    );
}

/// Log a rejected push.
#[inline]
pub fn trace_push_rejected(timeline: &str, reason: &str) {
    tracing::warn!(
        timeline = %timeline,
        reason = %reason,
        "incompatible buffer rejected"
    );
}
