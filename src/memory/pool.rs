//! Fixed-size block pool with RAII return-to-pool handles.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Alignment of every block in the arena (one cache line).
pub const BLOCK_ALIGN: usize = 64;

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_pool_id() -> u64 {
    POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A pool of fixed-size blocks carved out of one pre-allocated arena.
///
/// Acquiring and releasing a block never touches the general heap: the
/// arena is allocated once at construction and blocks are handed out from a
/// free list guarded by its own mutex.
///
/// # Memory Layout
///
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │   ...   │ Block N │
/// └─────────┴─────────┴─────────┴─────────┘
/// ^
/// base (64-byte aligned), block i at base + i * stride
/// ```
///
/// `stride` is `block_size` rounded up to [`BLOCK_ALIGN`], so every block
/// starts on a cache line.
///
/// # Ownership
///
/// Each [`PoolBlock`] holds an `Arc` to the arena, so the arena outlives
/// every block it backs even if the allocator handle is reconfigured or
/// dropped. Dropping the block returns it to the pool that issued it.
///
/// # Example
///
/// ```rust
/// use chronoline::memory::PoolAllocator;
///
/// let pool = PoolAllocator::new(256, 4).unwrap();
/// let mut block = pool.acquire().unwrap();
/// block.data_mut()[..5].copy_from_slice(b"hello");
/// assert_eq!(pool.available(), 3);
///
/// drop(block);
/// assert_eq!(pool.available(), 4);
/// ```
#[derive(Clone)]
pub struct PoolAllocator {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    /// Unique ID used to recognize blocks from this arena.
    id: u64,
    /// Base pointer of the arena.
    base: NonNull<u8>,
    /// Layout the arena was allocated with.
    layout: Layout,
    /// Usable bytes per block.
    block_size: usize,
    /// Distance between consecutive blocks.
    stride: usize,
    /// Number of blocks.
    block_count: usize,
    /// Free-list state, independent of any timeline lock.
    free: Mutex<FreeList>,
}

struct FreeList {
    /// Indices of free blocks; acquire pops from the end.
    stack: Vec<usize>,
    /// Whether each block is currently handed out.
    live: Vec<bool>,
}

impl PoolInner {
    fn new(block_size: usize, block_count: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::Configuration("block size must be > 0".into()));
        }
        if block_count == 0 {
            return Err(Error::Configuration("block count must be > 0".into()));
        }

        let stride = block_size
            .checked_next_multiple_of(BLOCK_ALIGN)
            .ok_or_else(|| Error::Configuration("block size overflow".into()))?;
        let total_size = stride
            .checked_mul(block_count)
            .ok_or_else(|| Error::Configuration("arena size overflow".into()))?;
        let layout = Layout::from_size_align(total_size, BLOCK_ALIGN)
            .map_err(|e| Error::Configuration(format!("arena layout: {}", e)))?;

        // SAFETY: layout has a non-zero size (block_size and block_count are > 0).
        let ptr = unsafe { alloc_zeroed(layout) };
        let base = NonNull::new(ptr).ok_or_else(|| {
            Error::AllocationFailed(format!("could not allocate {} byte arena", total_size))
        })?;

        Ok(Self {
            id: next_pool_id(),
            base,
            layout,
            block_size,
            stride,
            block_count,
            free: Mutex::new(FreeList {
                stack: (0..block_count).rev().collect(),
                live: vec![false; block_count],
            }),
        })
    }

    fn release(&self, index: usize) {
        let mut free = self.free.lock();
        assert!(free.live[index], "block {} released twice", index);
        free.live[index] = false;
        free.stack.push(index);
    }

    #[inline]
    fn block_ptr(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.block_count);
        // SAFETY: index < block_count, so the offset stays inside the arena.
        unsafe { self.base.as_ptr().add(index * self.stride) }
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        // SAFETY: base was returned by alloc_zeroed with this exact layout.
        unsafe { dealloc(self.base.as_ptr(), self.layout) }
    }
}

// SAFETY: PoolInner is Send + Sync because:
// - The free list is behind a mutex
// - Each block's bytes are reachable only through the unique PoolBlock for it
unsafe impl Send for PoolInner {}
unsafe impl Sync for PoolInner {}

impl PoolAllocator {
    /// Create a pool of `block_count` blocks of `block_size` bytes each.
    ///
    /// The arena is zero-initialized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either argument is zero or the
    /// arena size overflows, and [`Error::AllocationFailed`] if the
    /// allocator returns null.
    pub fn new(block_size: usize, block_count: usize) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(PoolInner::new(block_size, block_count)?),
        })
    }

    /// Replace the arena with a fresh one of the given geometry.
    ///
    /// Blocks acquired from the previous arena stay valid and still return
    /// to it when dropped. On error the current arena is kept.
    pub fn configure(&mut self, block_size: usize, block_count: usize) -> Result<()> {
        self.inner = Arc::new(PoolInner::new(block_size, block_count)?);
        Ok(())
    }

    /// Take a free block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolExhausted`] when every block is live.
    pub fn acquire(&self) -> Result<PoolBlock> {
        let index = {
            let mut free = self.inner.free.lock();
            let index = free.stack.pop().ok_or(Error::PoolExhausted {
                capacity: self.inner.block_count,
            })?;
            free.live[index] = true;
            index
        };

        Ok(PoolBlock {
            pool: Arc::clone(&self.inner),
            index,
        })
    }

    /// Return a block explicitly.
    ///
    /// Equivalent to dropping it, with an ownership check.
    ///
    /// # Panics
    ///
    /// Panics if the block was issued by another pool.
    pub fn release(&self, block: PoolBlock) {
        assert!(
            Arc::ptr_eq(&block.pool, &self.inner),
            "block released to a foreign pool"
        );
        drop(block);
    }

    /// Check whether a block was issued by this pool's current arena.
    pub fn owns(&self, block: &PoolBlock) -> bool {
        Arc::ptr_eq(&block.pool, &self.inner)
    }

    /// Unique ID of the current arena.
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Usable bytes per block.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.inner.block_size
    }

    /// Total number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.inner.block_count
    }

    /// Number of free blocks.
    ///
    /// Note: This is a snapshot and may change immediately after returning.
    pub fn available(&self) -> usize {
        self.inner.free.lock().stack.len()
    }

    /// Number of blocks currently handed out.
    pub fn in_use(&self) -> usize {
        self.block_count() - self.available()
    }

    /// Arena size in bytes, including alignment padding.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.inner.layout.size()
    }
}

impl std::fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("id", &self.id())
            .field("block_size", &self.block_size())
            .field("block_count", &self.block_count())
            .field("available", &self.available())
            .finish()
    }
}

/// A block loaned from a [`PoolAllocator`].
///
/// This is an RAII guard: when dropped, the block goes back to the free list
/// of the arena that issued it, exactly once.
pub struct PoolBlock {
    /// Keeps the arena alive while the block exists.
    pool: Arc<PoolInner>,
    /// Index of this block in the arena.
    index: usize,
}

impl PoolBlock {
    /// Get the block as a byte slice.
    #[inline]
    pub fn data(&self) -> &[u8] {
        // SAFETY: the block range is inside the arena, which self.pool keeps
        // alive, and no other PoolBlock refers to the same index.
        unsafe { std::slice::from_raw_parts(self.pool.block_ptr(self.index), self.pool.block_size) }
    }

    /// Get the block as a mutable byte slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        // SAFETY: as for data(), and &mut self guarantees exclusive access.
        unsafe {
            std::slice::from_raw_parts_mut(self.pool.block_ptr(self.index), self.pool.block_size)
        }
    }

    /// Usable size of the block in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.pool.block_size
    }

    /// Returns true if the block has zero size (which shouldn't happen).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of this block in its arena.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// ID of the arena that issued this block.
    #[inline]
    pub fn pool_id(&self) -> u64 {
        self.pool.id
    }
}

impl Drop for PoolBlock {
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl std::fmt::Debug for PoolBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBlock")
            .field("pool_id", &self.pool_id())
            .field("index", &self.index)
            .field("len", &self.len())
            .finish()
    }
}
