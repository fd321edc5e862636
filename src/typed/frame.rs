//! Timelines of raw video frames.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::temporal::{Direction, Timestamp};
use crate::timeline::{Timeline, TimelineConfig};
use parking_lot::RwLock;
use std::sync::Arc;

/// Scalar type of one pixel component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 8-bit unsigned.
    U8,
    /// 16-bit unsigned (depth cameras, medical video).
    U16,
    /// 32-bit float.
    F32,
}

impl ComponentType {
    /// Bytes per component.
    pub const fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Channel layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Single channel.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
    /// RGB with alpha.
    Rgba,
    /// BGR with alpha.
    Bgra,
}

impl PixelFormat {
    /// Components per pixel.
    pub const fn components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }
}

/// Geometry and pixel layout of the frames in a [`FrameTimeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameFormat {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Scalar type of each component.
    pub component_type: ComponentType,
    /// Channel layout.
    pub pixel_format: PixelFormat,
}

impl FrameFormat {
    /// Create a frame format.
    pub fn new(
        width: usize,
        height: usize,
        component_type: ComponentType,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            width,
            height,
            component_type,
            pixel_format,
        }
    }

    /// Components per pixel.
    pub fn components(&self) -> usize {
        self.pixel_format.components()
    }

    /// Bytes per row.
    pub fn stride(&self) -> Option<usize> {
        self.width
            .checked_mul(self.components())?
            .checked_mul(self.component_type.size())
    }

    /// Bytes per frame, or an error on overflow or an empty frame.
    pub fn frame_size(&self) -> Result<usize> {
        let size = self
            .stride()
            .and_then(|stride| stride.checked_mul(self.height))
            .ok_or_else(|| Error::Configuration("frame size overflow".into()))?;
        if size == 0 {
            return Err(Error::Configuration(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }
        Ok(size)
    }

    /// Configuration with one frame slot per buffer.
    ///
    /// `retained` is the number of evicted frames consumers may hold at once.
    pub fn config(&self, max_resident: usize, retained: usize) -> Result<TimelineConfig> {
        self.config_with_slots(1, max_resident, retained)
    }

    /// Configuration with `frames_per_buffer` frame slots per buffer
    /// (stereo or multi-camera rigs).
    pub fn config_with_slots(
        &self,
        frames_per_buffer: usize,
        max_resident: usize,
        retained: usize,
    ) -> Result<TimelineConfig> {
        Ok(TimelineConfig::new(
            self.frame_size()?,
            frames_per_buffer,
            max_resident,
            retained,
        ))
    }
}

/// A timeline of raw frames sharing one [`FrameFormat`].
///
/// Slots are raw pixel bytes, `format.frame_size()` long, rows packed
/// without padding.
///
/// # Example
///
/// ```rust
/// use chronoline::temporal::Timestamp;
/// use chronoline::typed::{ComponentType, FrameFormat, FrameTimeline, PixelFormat};
///
/// let format = FrameFormat::new(4, 2, ComponentType::U8, PixelFormat::Rgb);
/// let frames = FrameTimeline::with_format(format, 3, 1).unwrap();
///
/// let mut buffer = frames.create_buffer(Timestamp::from_millis(33.0)).unwrap();
/// buffer.add_element(0).fill(255);
/// frames.push(buffer).unwrap();
///
/// assert_eq!(frames.newest_buffer().unwrap().element(0).len(), 24);
/// ```
#[derive(Default)]
pub struct FrameTimeline {
    timeline: Timeline,
    /// Locked before the timeline whenever both are needed.
    format: RwLock<Option<FrameFormat>>,
}

impl FrameTimeline {
    /// Create an unconfigured frame timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timeline holding up to `max_resident` single frames, with
    /// room for `retained` evicted frames still held by consumers.
    pub fn with_format(format: FrameFormat, max_resident: usize, retained: usize) -> Result<Self> {
        let frames = Self::new();
        frames.configure(format, format.config(max_resident, retained)?)?;
        Ok(frames)
    }

    /// Set the frame format and timeline configuration together.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the slot size is not the frame
    /// size, plus any error from [`Timeline::configure`].
    pub fn configure(&self, format: FrameFormat, config: TimelineConfig) -> Result<()> {
        let frame_size = format.frame_size()?;
        if config.element_size != frame_size {
            return Err(Error::Configuration(format!(
                "element size {} does not match frame size {}",
                config.element_size, frame_size
            )));
        }

        let mut current = self.format.write();
        self.timeline.configure(config)?;
        *current = Some(format);
        Ok(())
    }

    /// Current frame format.
    pub fn format(&self) -> Option<FrameFormat> {
        *self.format.read()
    }

    /// Acquire a zeroed frame buffer.
    pub fn create_buffer(&self, timestamp: Timestamp) -> Result<Buffer> {
        self.timeline.create_buffer(timestamp)
    }

    /// Publish a frame buffer. See [`Timeline::push`].
    pub fn push(&self, buffer: Buffer) -> Result<Arc<Buffer>> {
        self.timeline.push(buffer)
    }

    /// Get the frame buffer at exactly `timestamp`.
    pub fn get_buffer(&self, timestamp: Timestamp) -> Option<Arc<Buffer>> {
        self.timeline.get_buffer(timestamp)
    }

    /// Get the frame buffer nearest to `timestamp`.
    pub fn get_closest_buffer(
        &self,
        timestamp: Timestamp,
        direction: Direction,
    ) -> Option<Arc<Buffer>> {
        self.timeline.get_closest_buffer(timestamp, direction)
    }

    /// Get the most recent frame buffer.
    pub fn newest_buffer(&self) -> Option<Arc<Buffer>> {
        self.timeline.newest_buffer()
    }

    /// Get the most recent frame timestamp.
    pub fn newest_timestamp(&self) -> Option<Timestamp> {
        self.timeline.newest_timestamp()
    }

    /// Drop every resident frame.
    pub fn clear(&self) -> Result<()> {
        self.timeline.clear()
    }

    /// Number of resident frame buffers.
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// Whether no frame is resident.
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// The untyped timeline underneath, for the remaining queries.
    pub fn as_timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Whether both timelines have the same frame format, slot count and
    /// capacity.
    pub fn same_layout(&self, other: &Self) -> bool {
        let slots = |t: &Self| {
            t.timeline
                .config()
                .map(|c| (c.element_count, c.max_resident))
        };
        self.format() == other.format() && slots(self) == slots(other)
    }

    /// Replace this timeline's format and contents with a copy of `source`.
    ///
    /// Both formats stay locked for the whole copy, so a concurrent
    /// [`configure`](Self::configure) of `source` lands either entirely
    /// before or entirely after it.
    pub fn deep_copy_from(&self, source: &Self) -> Result<()> {
        if std::ptr::eq(self, source) {
            return Ok(());
        }

        // Address order, so opposite copies between two timelines cannot
        // deadlock.
        let (source_format, mut current) = if (self as *const Self) < (source as *const Self) {
            let current = self.format.write();
            (source.format.read(), current)
        } else {
            let source_format = source.format.read();
            (source_format, self.format.write())
        };
        let format = (*source_format).ok_or(Error::NotConfigured)?;

        self.timeline.deep_copy_from(&source.timeline)?;
        *current = Some(format);
        Ok(())
    }
}

impl std::fmt::Debug for FrameTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTimeline")
            .field("format", &self.format())
            .field("timeline", &self.timeline)
            .finish()
    }
}
