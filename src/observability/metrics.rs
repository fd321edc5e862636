//! Metrics collection using metrics-rs.

use metrics::{Counter, Gauge, Unit, counter, gauge};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

const BUFFERS_PUSHED: &str = "chronoline_buffers_pushed";
const BUFFERS_EVICTED: &str = "chronoline_buffers_evicted";
const BUFFERS_REPLACED: &str = "chronoline_buffers_replaced";
const BUFFERS_REJECTED: &str = "chronoline_buffers_rejected";
const LOOKUP_MISSES: &str = "chronoline_lookup_misses";
const SLOTS_UNSYNCHRONIZED: &str = "chronoline_slots_unsynchronized";
const RESIDENT_BUFFERS: &str = "chronoline_resident_buffers";
const POOL_BLOCKS_AVAILABLE: &str = "chronoline_pool_blocks_available";

/// Initialize metrics descriptions.
///
/// Call this once at application startup before using any metrics.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        BUFFERS_PUSHED,
        Unit::Count,
        "Buffers published into a timeline"
    );
    metrics::describe_counter!(
        BUFFERS_EVICTED,
        Unit::Count,
        "Buffers evicted because the timeline was full"
    );
    metrics::describe_counter!(
        BUFFERS_REPLACED,
        Unit::Count,
        "Buffers replaced by a push at the same timestamp"
    );
    metrics::describe_counter!(
        BUFFERS_REJECTED,
        Unit::Count,
        "Pushes rejected as incompatible"
    );
    metrics::describe_counter!(
        LOOKUP_MISSES,
        Unit::Count,
        "Consumer lookups that found no buffer"
    );
    metrics::describe_counter!(
        SLOTS_UNSYNCHRONIZED,
        Unit::Count,
        "Requested slots absent from the buffer read by a consumer"
    );
    metrics::describe_gauge!(
        RESIDENT_BUFFERS,
        Unit::Count,
        "Buffers currently resident in a timeline"
    );
    metrics::describe_gauge!(
        POOL_BLOCKS_AVAILABLE,
        Unit::Count,
        "Free blocks in a timeline's pool"
    );
}

/// Record a consumer lookup that found nothing.
#[inline]
pub fn record_lookup_miss(timeline: &str) {
    counter!(LOOKUP_MISSES, "timeline" => timeline.to_string()).increment(1);
}

/// Record slots a consumer expected but found absent.
#[inline]
pub fn record_slots_unsynchronized(timeline: &str, count: u64) {
    counter!(SLOTS_UNSYNCHRONIZED, "timeline" => timeline.to_string()).increment(count);
}

/// Metrics collector for one timeline.
///
/// Handles are resolved once with the timeline's label so the push path
/// does not format labels.
#[derive(Clone)]
pub struct TimelineMetrics {
    name: String,
    pushed: Counter,
    evicted: Counter,
    replaced: Counter,
    rejected: Counter,
    resident: Gauge,
    pool_available: Gauge,
}

impl TimelineMetrics {
    /// Create a collector labelled with the timeline name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pushed: counter!(BUFFERS_PUSHED, "timeline" => name.to_string()),
            evicted: counter!(BUFFERS_EVICTED, "timeline" => name.to_string()),
            replaced: counter!(BUFFERS_REPLACED, "timeline" => name.to_string()),
            rejected: counter!(BUFFERS_REJECTED, "timeline" => name.to_string()),
            resident: gauge!(RESIDENT_BUFFERS, "timeline" => name.to_string()),
            pool_available: gauge!(POOL_BLOCKS_AVAILABLE, "timeline" => name.to_string()),
        }
    }

    /// Record a published buffer and the resulting resident count.
    #[inline]
    pub fn record_push(&self, resident: usize) {
        self.pushed.increment(1);
        self.resident.set(resident as f64);
    }

    /// Record evicted buffers.
    #[inline]
    pub fn record_evicted(&self, count: u64) {
        self.evicted.increment(count);
    }

    /// Record a buffer replaced at an existing timestamp.
    #[inline]
    pub fn record_replaced(&self) {
        self.replaced.increment(1);
    }

    /// Record a rejected push.
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.increment(1);
    }

    /// Record the resident count after a removal.
    #[inline]
    pub fn record_resident(&self, resident: usize) {
        self.resident.set(resident as f64);
    }

    /// Record free pool blocks.
    #[inline]
    pub fn record_pool_available(&self, available: usize) {
        self.pool_available.set(available as f64);
    }

    /// Get the timeline name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TimelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineMetrics")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
