//! Timelines bound to a slot record type.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::memory::BLOCK_ALIGN;
use crate::temporal::{Direction, Timestamp};
use crate::timeline::{Timeline, TimelineConfig};
use bytemuck::Pod;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

/// A [`Timeline`] whose slots each hold one `T`.
///
/// The slot size is `size_of::<T>()`, so producers and consumers work with
/// `&T` instead of byte slices. One instantiation exists per record type.
///
/// # Example
///
/// ```rust
/// use chronoline::temporal::Timestamp;
/// use chronoline::typed::GenericTimeline;
///
/// // Up to 3 markers of [x, y, z] per instant, 10 instants kept, no
/// // handles retained past eviction.
/// let timeline = GenericTimeline::<[f32; 3]>::with_capacity(3, 10, 0).unwrap();
///
/// let mut buffer = timeline.create_buffer(Timestamp::from_millis(1.0)).unwrap();
/// buffer.set_element(1, &[0.5, 1.0, 1.5]);
/// timeline.push(buffer).unwrap();
///
/// let buffer = timeline.newest_buffer().unwrap();
/// assert!(!buffer.is_present(0));
/// assert_eq!(buffer.element(1), &[0.5, 1.0, 1.5]);
/// ```
pub struct GenericTimeline<T: Pod> {
    timeline: Timeline,
    _record: PhantomData<fn() -> T>,
}

impl<T: Pod> GenericTimeline<T> {
    /// Create an unconfigured timeline.
    pub fn new() -> Self {
        Self {
            timeline: Timeline::new(),
            _record: PhantomData,
        }
    }

    /// Build a configuration for `element_count` records per buffer.
    ///
    /// `retained` is the number of evicted buffers consumers may hold at
    /// once. See [`TimelineConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `T` is zero-sized or aligned
    /// beyond the pool's block alignment.
    pub fn record_config(
        element_count: usize,
        max_resident: usize,
        retained: usize,
    ) -> Result<TimelineConfig> {
        check_record::<T>()?;
        Ok(TimelineConfig::new(
            std::mem::size_of::<T>(),
            element_count,
            max_resident,
            retained,
        ))
    }

    /// Create and configure in one step.
    pub fn with_capacity(
        element_count: usize,
        max_resident: usize,
        retained: usize,
    ) -> Result<Self> {
        Self::with_config(Self::record_config(element_count, max_resident, retained)?)
    }

    /// Create with a full configuration.
    pub fn with_config(config: TimelineConfig) -> Result<Self> {
        let timeline = Self::new();
        timeline.configure(config)?;
        Ok(timeline)
    }

    /// Configure, checking that the slot size matches `T`.
    pub fn configure(&self, config: TimelineConfig) -> Result<()> {
        check_record::<T>()?;
        if config.element_size != std::mem::size_of::<T>() {
            return Err(Error::Configuration(format!(
                "element size {} does not match record size {}",
                config.element_size,
                std::mem::size_of::<T>()
            )));
        }
        self.timeline.configure(config)
    }

    /// Acquire a zeroed buffer for `timestamp`.
    pub fn create_buffer(&self, timestamp: Timestamp) -> Result<TypedBuffer<T>> {
        let buffer = self.timeline.create_buffer(timestamp)?;
        Ok(TypedBuffer::from_buffer(buffer))
    }

    /// Publish a buffer. See [`Timeline::push`].
    pub fn push(&self, buffer: TypedBuffer<T>) -> Result<SharedBuffer<T>> {
        self.timeline.push(buffer.buffer).map(SharedBuffer::from_arc)
    }

    /// Remove and return the entry at exactly `timestamp`.
    pub fn pop(&self, timestamp: Timestamp) -> Result<Option<SharedBuffer<T>>> {
        Ok(self.timeline.pop(timestamp)?.map(SharedBuffer::from_arc))
    }

    /// Drop every resident buffer.
    pub fn clear(&self) -> Result<()> {
        self.timeline.clear()
    }

    /// Get the entry at exactly `timestamp`.
    pub fn get_buffer(&self, timestamp: Timestamp) -> Option<SharedBuffer<T>> {
        self.timeline.get_buffer(timestamp).map(SharedBuffer::from_arc)
    }

    /// Get the entry nearest to `timestamp`. See [`Timeline::get_closest_buffer`].
    pub fn get_closest_buffer(
        &self,
        timestamp: Timestamp,
        direction: Direction,
    ) -> Option<SharedBuffer<T>> {
        self.timeline
            .get_closest_buffer(timestamp, direction)
            .map(SharedBuffer::from_arc)
    }

    /// Get the entry with the largest timestamp.
    pub fn newest_buffer(&self) -> Option<SharedBuffer<T>> {
        self.timeline.newest_buffer().map(SharedBuffer::from_arc)
    }

    /// Get the largest resident timestamp.
    pub fn newest_timestamp(&self) -> Option<Timestamp> {
        self.timeline.newest_timestamp()
    }

    /// Get the entry with the smallest timestamp.
    pub fn oldest_buffer(&self) -> Option<SharedBuffer<T>> {
        self.timeline.oldest_buffer().map(SharedBuffer::from_arc)
    }

    /// Get the smallest resident timestamp.
    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        self.timeline.oldest_timestamp()
    }

    /// Snapshot of resident timestamps in ascending order.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.timeline.timestamps()
    }

    /// Number of resident buffers.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Whether no buffer is resident.
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Configured capacity.
    pub fn max_resident(&self) -> Option<usize> {
        self.timeline.max_resident()
    }

    /// Records per buffer.
    pub fn element_count(&self) -> Option<usize> {
        self.timeline.config().map(|c| c.element_count)
    }

    /// Get a copy of the current configuration.
    pub fn config(&self) -> Option<TimelineConfig> {
        self.timeline.config()
    }

    /// Free blocks in the current pool.
    pub fn pool_available(&self) -> Option<usize> {
        self.timeline.pool_available()
    }

    /// Whether `buffer` could be pushed here.
    pub fn is_buffer_valid(&self, buffer: &Buffer) -> bool {
        self.timeline.is_buffer_valid(buffer)
    }

    /// The untyped timeline underneath.
    pub fn as_timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Whether both timelines have the same slot count and capacity.
    ///
    /// Contents and names are ignored. Two unconfigured timelines match.
    pub fn same_layout(&self, other: &Self) -> bool {
        match (self.config(), other.config()) {
            (Some(a), Some(b)) => {
                a.element_count == b.element_count && a.max_resident == b.max_resident
            }
            (None, None) => true,
            _ => false,
        }
    }

    /// Replace this timeline's contents with a copy of `source`.
    /// See [`Timeline::deep_copy_from`].
    pub fn deep_copy_from(&self, source: &Self) -> Result<()> {
        self.timeline.deep_copy_from(&source.timeline)
    }
}

impl<T: Pod> Default for GenericTimeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Pod> std::fmt::Debug for GenericTimeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericTimeline")
            .field("record", &std::any::type_name::<T>())
            .field("timeline", &self.timeline)
            .finish()
    }
}

fn check_record<T: Pod>() -> Result<()> {
    if std::mem::size_of::<T>() == 0 {
        return Err(Error::Configuration("record type is zero-sized".into()));
    }
    if std::mem::align_of::<T>() > BLOCK_ALIGN {
        return Err(Error::Configuration(format!(
            "record alignment {} exceeds block alignment {}",
            std::mem::align_of::<T>(),
            BLOCK_ALIGN
        )));
    }
    Ok(())
}

/// An unpublished buffer of `T` records, owned by its producer.
///
/// Dereferences to [`Buffer`] for presence queries and raw bytes.
pub struct TypedBuffer<T: Pod> {
    buffer: Buffer,
    _record: PhantomData<fn() -> T>,
}

impl<T: Pod> TypedBuffer<T> {
    /// Wrap a raw buffer.
    ///
    /// # Panics
    ///
    /// Panics if the slot size is not `size_of::<T>()`.
    pub fn from_buffer(buffer: Buffer) -> Self {
        assert_eq!(
            buffer.element_size(),
            std::mem::size_of::<T>(),
            "record type size does not match slot size"
        );
        Self {
            buffer,
            _record: PhantomData,
        }
    }

    /// Read a record, present or not.
    pub fn element(&self, index: usize) -> &T {
        self.buffer.element_as(index)
    }

    /// Get a writable record and mark it present.
    pub fn add_element(&mut self, index: usize) -> &mut T {
        self.buffer.add_element_as(index)
    }

    /// Store a record and mark it present.
    pub fn set_element(&mut self, index: usize, value: &T) {
        self.buffer.set_element_as(index, value);
    }

    /// Iterate over present records as `(index, record)`.
    pub fn present_elements(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.buffer
            .presence()
            .iter_set()
            .map(|i| (i, self.buffer.element_as::<T>(i)))
    }

    /// Copy another buffer's records and presence flags into this one.
    pub fn deep_copy_from(&mut self, other: &Buffer) {
        self.buffer.deep_copy_from(other);
    }

    /// Unwrap into the raw buffer.
    pub fn into_inner(self) -> Buffer {
        self.buffer
    }
}

impl<T: Pod> Deref for TypedBuffer<T> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buffer
    }
}

impl<T: Pod> std::fmt::Debug for TypedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedBuffer").field(&self.buffer).finish()
    }
}

/// A published, immutable buffer of `T` records.
///
/// Cloning is cheap. The backing block returns to its pool when the last
/// clone is dropped, even if the timeline evicted the entry long before.
pub struct SharedBuffer<T: Pod> {
    buffer: Arc<Buffer>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Pod> SharedBuffer<T> {
    fn from_arc(buffer: Arc<Buffer>) -> Self {
        Self {
            buffer,
            _record: PhantomData,
        }
    }

    /// Read a record, present or not.
    pub fn element(&self, index: usize) -> &T {
        self.buffer.element_as(index)
    }

    /// Read a record only if it is present.
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.buffer.element_count() && self.buffer.is_present(index))
            .then(|| self.element(index))
    }

    /// Iterate over present records as `(index, record)`.
    pub fn present_elements(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.buffer
            .presence()
            .iter_set()
            .map(|i| (i, self.buffer.element_as::<T>(i)))
    }

    /// The shared raw buffer.
    pub fn as_arc(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Unwrap into the shared raw buffer.
    pub fn into_arc(self) -> Arc<Buffer> {
        self.buffer
    }
}

impl<T: Pod> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self::from_arc(Arc::clone(&self.buffer))
    }
}

impl<T: Pod> Deref for SharedBuffer<T> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buffer
    }
}

impl<T: Pod> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedBuffer").field(&self.buffer).finish()
    }
}
