//! Timestamp and search direction types.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock value in floating-point milliseconds.
///
/// Timestamps key every timeline. They are totally ordered so they can live
/// in a `BTreeMap`: NaN is rejected at construction and `-0.0` is folded
/// into `0.0`, which leaves `f64::total_cmp` agreeing with numeric order.
///
/// Uniqueness is not enforced here; pushing twice at the same timestamp
/// replaces the earlier entry.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    /// Milliseconds since the clock's epoch.
    millis: f64,
}

impl Timestamp {
    /// Create a timestamp from milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `millis` is NaN.
    pub fn from_millis(millis: f64) -> Self {
        assert!(!millis.is_nan(), "timestamp must not be NaN");
        let millis = if millis == 0.0 { 0.0 } else { millis };
        Self { millis }
    }

    /// Create a timestamp from fractional seconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::from_millis(secs * 1_000.0)
    }

    /// Create a timestamp from a Duration since the epoch.
    pub fn from_duration(duration: Duration) -> Self {
        Self::from_millis(duration.as_secs_f64() * 1_000.0)
    }

    /// Current wall-clock time in milliseconds since the Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self::from_duration(duration)
    }

    /// The epoch.
    pub const fn zero() -> Self {
        Self { millis: 0.0 }
    }

    /// Get the raw millisecond value.
    pub const fn as_millis(&self) -> f64 {
        self.millis
    }

    /// Get the timestamp in fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.millis / 1_000.0
    }

    /// Absolute distance to another timestamp, in milliseconds.
    pub fn abs_diff(&self, other: &Self) -> f64 {
        (self.millis - other.millis).abs()
    }

    /// Check if this timestamp is within a tolerance of another.
    pub fn within_tolerance(&self, other: &Self, tolerance: Duration) -> bool {
        self.abs_diff(other) <= tolerance.as_secs_f64() * 1_000.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.millis.total_cmp(&other.millis)
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.millis.to_bits().hash(state);
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::from_millis(self.millis + rhs.as_secs_f64() * 1_000.0)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self::from_millis(self.millis - rhs.as_secs_f64() * 1_000.0)
    }
}

/// Signed difference in milliseconds.
impl Sub<Timestamp> for Timestamp {
    type Output = f64;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.millis - rhs.millis
    }
}

impl From<f64> for Timestamp {
    fn from(millis: f64) -> Self {
        Self::from_millis(millis)
    }
}

impl From<Duration> for Timestamp {
    fn from(d: Duration) -> Self {
        Self::from_duration(d)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}ms", self.millis)
    }
}

/// Constraint applied when searching for the buffer nearest a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Nearest key at or before the query.
    Past,
    /// Nearest key at or after the query.
    Future,
    /// Nearest key by absolute distance; ties go to the earlier key.
    #[default]
    Both,
}
