//! Timestamped buffers made of fixed-size slots.

use crate::error::{Error, Result};
use crate::memory::{PoolBlock, SlotMask};
use crate::temporal::Timestamp;
use bytemuck::Pod;
use std::ops::Range;

/// One timestamped snapshot backed by a single pool block.
///
/// The block is split into `element_count` slots of `element_size` bytes.
/// Each slot carries a presence flag telling consumers whether the producer
/// actually wrote it for this instant (a tracker may lose a marker, a camera
/// may drop a frame).
///
/// # Lifecycle
///
/// A producer gets a `Buffer` from `Timeline::create_buffer`, fills slots
/// through `&mut` access, then hands it to `Timeline::push`, which publishes
/// it as an `Arc<Buffer>`. Published buffers are immutable. The block goes
/// back to its pool when the last `Arc` is dropped, which may be well after
/// the timeline evicted it.
///
/// # Example
///
/// ```rust
/// use chronoline::buffer::Buffer;
/// use chronoline::memory::PoolAllocator;
/// use chronoline::temporal::Timestamp;
///
/// let pool = PoolAllocator::new(3 * 4, 1).unwrap();
/// let mut buffer = Buffer::new(Timestamp::from_millis(10.0), pool.acquire().unwrap(), 4, 3);
///
/// buffer.set_element(0, &[1, 2, 3, 4]);
/// buffer.add_element(2).copy_from_slice(&[5, 6, 7, 8]);
///
/// assert!(buffer.is_present(0));
/// assert!(!buffer.is_present(1));
/// assert_eq!(buffer.mask(), 0b101);
/// assert_eq!(buffer.element(1), &[0, 0, 0, 0]);
/// ```
pub struct Buffer {
    /// Key of this buffer in its timeline.
    timestamp: Timestamp,
    /// Backing storage, exactly element_size * element_count bytes.
    block: PoolBlock,
    /// Bytes per slot.
    element_size: usize,
    /// Number of slots.
    element_count: usize,
    /// Which slots were written.
    presence: SlotMask,
}

impl Buffer {
    /// Wrap a pool block as a buffer with every slot absent and zeroed.
    ///
    /// # Panics
    ///
    /// Panics if the block size differs from `element_size * element_count`.
    pub fn new(
        timestamp: Timestamp,
        mut block: PoolBlock,
        element_size: usize,
        element_count: usize,
    ) -> Self {
        assert_eq!(
            Some(block.len()),
            element_size.checked_mul(element_count),
            "block size does not match slot layout"
        );
        block.data_mut().fill(0);

        Self {
            timestamp,
            block,
            element_size,
            element_count,
            presence: SlotMask::new(element_count),
        }
    }

    /// Get the buffer's timestamp.
    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Bytes per slot.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of slots.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Number of present slots.
    pub fn present_count(&self) -> usize {
        self.presence.count_set()
    }

    /// Presence bits of the first 64 slots, slot 0 in the lowest bit.
    pub fn mask(&self) -> u64 {
        self.presence.low_word()
    }

    /// Full presence mask.
    pub fn presence(&self) -> &SlotMask {
        &self.presence
    }

    /// Check whether a slot was written.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn is_present(&self, index: usize) -> bool {
        self.presence.is_set(index)
    }

    fn slot_range(&self, index: usize) -> Range<usize> {
        assert!(
            index < self.element_count,
            "element index {} out of bounds (element count {})",
            index,
            self.element_count
        );
        let start = index * self.element_size;
        start..start + self.element_size
    }

    /// Read a slot's bytes, present or not.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn element(&self, index: usize) -> &[u8] {
        let range = self.slot_range(index);
        &self.block.data()[range]
    }

    /// Read a slot's bytes, reporting a bad index as an error.
    pub fn try_element(&self, index: usize) -> Result<&[u8]> {
        if index >= self.element_count {
            return Err(Error::IndexOutOfBounds {
                index,
                count: self.element_count,
            });
        }
        Ok(self.element(index))
    }

    /// Get a writable slot and mark it present.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn add_element(&mut self, index: usize) -> &mut [u8] {
        let range = self.slot_range(index);
        self.presence.set(index);
        &mut self.block.data_mut()[range]
    }

    /// Copy bytes into a slot and mark it present.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `bytes` is not exactly one slot long.
    pub fn set_element(&mut self, index: usize, bytes: &[u8]) {
        assert_eq!(
            bytes.len(),
            self.element_size,
            "element data must be exactly one slot long"
        );
        self.add_element(index).copy_from_slice(bytes);
    }

    /// Iterate over present slots as `(index, bytes)`, in index order.
    pub fn present_elements(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        self.presence.iter_set().map(|i| (i, self.element(i)))
    }

    /// Whole block, all slots back to back.
    pub fn as_bytes(&self) -> &[u8] {
        self.block.data()
    }

    /// Size of the block in bytes.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// Check if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// ID of the pool arena backing this buffer.
    pub fn pool_id(&self) -> u64 {
        self.block.pool_id()
    }

    /// Copy another buffer's slot bytes and presence flags into this one.
    ///
    /// The timestamp is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the two buffers have different slot layouts.
    pub fn deep_copy_from(&mut self, other: &Buffer) {
        assert!(
            self.element_size == other.element_size && self.element_count == other.element_count,
            "cannot copy between buffers with different slot layouts"
        );
        self.block.data_mut().copy_from_slice(other.block.data());
        self.presence.copy_from(&other.presence);
    }

    fn check_record<T: Pod>(&self) {
        assert_eq!(
            std::mem::size_of::<T>(),
            self.element_size,
            "record type size does not match slot size"
        );
    }

    /// View a slot as a typed record.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `size_of::<T>()` is not the slot size.
    pub fn element_as<T: Pod>(&self, index: usize) -> &T {
        self.check_record::<T>();
        bytemuck::from_bytes(self.element(index))
    }

    /// Get a slot as a writable typed record and mark it present.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or `size_of::<T>()` is not the slot size.
    pub fn add_element_as<T: Pod>(&mut self, index: usize) -> &mut T {
        self.check_record::<T>();
        bytemuck::from_bytes_mut(self.add_element(index))
    }

    /// Store a typed record in a slot and mark it present.
    pub fn set_element_as<T: Pod>(&mut self, index: usize, value: &T) {
        *self.add_element_as::<T>(index) = *value;
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("timestamp", &self.timestamp)
            .field("element_size", &self.element_size)
            .field("element_count", &self.element_count)
            .field("presence", &self.presence)
            .field("block", &self.block)
            .finish()
    }
}
