//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and gauges via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! All metrics carry a `timeline` label.
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `chronoline_buffers_pushed` | Counter | Buffers published |
//! | `chronoline_buffers_evicted` | Counter | Buffers evicted at capacity |
//! | `chronoline_buffers_replaced` | Counter | Buffers replaced at an existing timestamp |
//! | `chronoline_buffers_rejected` | Counter | Incompatible pushes |
//! | `chronoline_lookup_misses` | Counter | Consumer lookups with no result |
//! | `chronoline_slots_unsynchronized` | Counter | Absent slots seen by consumers |
//! | `chronoline_resident_buffers` | Gauge | Resident buffers |
//! | `chronoline_pool_blocks_available` | Gauge | Free pool blocks |
//!
//! The library installs no recorder or subscriber; the application picks them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chronoline::observability::init_metrics;
//!
//! // Describe metrics once at startup, then install an exporter.
//! init_metrics();
//! ```

mod metrics;
mod tracing_support;

pub use metrics::{TimelineMetrics, init_metrics, record_lookup_miss, record_slots_unsynchronized};
pub use tracing_support::{
    span_timeline, trace_buffer_evicted, trace_buffer_pushed, trace_push_rejected,
};
