//! Timeline configuration.

use crate::error::{Error, Result};

/// Default number of producer threads filling buffers at the same time.
///
/// Each producer holds one block between `create_buffer` and `push`.
pub const DEFAULT_PRODUCERS: usize = 1;

/// Slot layout and capacity of a timeline.
///
/// The capacity is always explicit; there is no process-wide default.
/// So is the retention budget: the number of evicted buffers consumers may
/// still hold at the same time. Handles to resident buffers cost nothing
/// extra. The pool is sized so that producers never run out of blocks as
/// long as consumers stay within that budget.
///
/// # Example
///
/// ```rust
/// use chronoline::timeline::TimelineConfig;
///
/// // Up to 8 tracked matrices per instant, 50 instants kept, and a
/// // renderer that may keep 2 evicted buffers alive.
/// let config = TimelineConfig::new(16 * 4, 8, 50, 2)
///     .with_name("tracker")
///     .with_producers(2);
/// assert_eq!(config.block_size().unwrap(), 512);
/// assert_eq!(config.pool_blocks().unwrap(), 54);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Name used in logs and metric labels.
    pub name: String,
    /// Bytes per slot.
    pub element_size: usize,
    /// Slots per buffer.
    pub element_count: usize,
    /// Maximum number of resident buffers.
    pub max_resident: usize,
    /// Producers that may each hold one unpublished buffer.
    pub producers: usize,
    /// Evicted buffers consumers may hold at once.
    pub retained: usize,
}

impl TimelineConfig {
    /// Create a configuration with the default name and a single producer.
    pub fn new(
        element_size: usize,
        element_count: usize,
        max_resident: usize,
        retained: usize,
    ) -> Self {
        Self {
            name: "timeline".to_string(),
            element_size,
            element_count,
            max_resident,
            producers: DEFAULT_PRODUCERS,
            retained,
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of concurrent producers.
    pub fn with_producers(mut self, producers: usize) -> Self {
        self.producers = producers;
        self
    }

    /// Set the retention budget.
    pub fn with_retained(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// Set the resident capacity.
    pub fn with_max_resident(mut self, max_resident: usize) -> Self {
        self.max_resident = max_resident;
        self
    }

    /// Bytes per buffer: `element_size * element_count`.
    pub fn block_size(&self) -> Result<usize> {
        self.element_size
            .checked_mul(self.element_count)
            .ok_or_else(|| Error::Configuration("buffer size overflow".into()))
    }

    /// Blocks in the backing pool: `max_resident + producers + retained`.
    pub fn pool_blocks(&self) -> Result<usize> {
        self.max_resident
            .checked_add(self.producers)
            .and_then(|n| n.checked_add(self.retained))
            .ok_or_else(|| Error::Configuration("pool block count overflow".into()))
    }

    /// Check that the layout and capacity are usable.
    pub fn validate(&self) -> Result<()> {
        if self.element_size == 0 {
            return Err(Error::Configuration("element size must be > 0".into()));
        }
        if self.element_count == 0 {
            return Err(Error::Configuration("element count must be > 0".into()));
        }
        if self.max_resident == 0 {
            return Err(Error::Configuration("max resident buffers must be > 0".into()));
        }
        if self.producers == 0 {
            return Err(Error::Configuration("producer count must be > 0".into()));
        }
        self.block_size()?;
        self.pool_blocks()?;
        Ok(())
    }
}
