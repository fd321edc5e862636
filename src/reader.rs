//! Consumer side: read the closest buffer and report per-slot presence.
//!
//! A consumer (renderer, cross-timeline synchronizer) looks up the buffer
//! nearest to "now", copies out the slots it cares about, and must react
//! differently to slots the producer did not write this time. A
//! [`TimelineReader`] does the lookup and turns each requested slot into a
//! [`SlotEvent`]: the copied value, or an unsynchronized notice.
//!
//! ```rust
//! use chronoline::reader::{SlotEvent, TimelineReader};
//! use chronoline::temporal::Timestamp;
//! use chronoline::typed::{IDENTITY, MatrixTimeline};
//! use std::time::Duration;
//!
//! let tracker = MatrixTimeline::with_capacity(2, 10, 0).unwrap();
//! let mut buffer = tracker.create_buffer(Timestamp::from_millis(100.0)).unwrap();
//! buffer.set_element(0, &IDENTITY);
//! tracker.push(buffer).unwrap();
//!
//! // The tracker lags the video by 20 ms.
//! let reader = TimelineReader::new().with_delay(Duration::from_millis(20));
//! let snapshot = reader.read(&tracker, Timestamp::from_millis(120.0), &[0, 1]).unwrap();
//!
//! assert_eq!(snapshot.timestamp, Timestamp::from_millis(100.0));
//! assert!(matches!(snapshot.events[0], SlotEvent::Synchronized { index: 0, .. }));
//! assert_eq!(snapshot.events[1], SlotEvent::Unsynchronized { index: 1 });
//! ```

use crate::buffer::Buffer;
use crate::observability::{record_lookup_miss, record_slots_unsynchronized};
use crate::temporal::{Direction, Timestamp};
use crate::timeline::Timeline;
use crate::typed::GenericTimeline;
use bytemuck::Pod;
use std::time::Duration;

/// Outcome of reading one requested slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotEvent<V> {
    /// The slot was present; `value` is a copy of it.
    Synchronized {
        /// Slot index.
        index: usize,
        /// Copied slot contents.
        value: V,
    },
    /// The producer did not write this slot in the buffer that was read.
    Unsynchronized {
        /// Slot index.
        index: usize,
    },
}

impl<V> SlotEvent<V> {
    /// Slot index of the event.
    pub fn index(&self) -> usize {
        match self {
            Self::Synchronized { index, .. } | Self::Unsynchronized { index } => *index,
        }
    }

    /// Whether the slot was present.
    pub fn is_synchronized(&self) -> bool {
        matches!(self, Self::Synchronized { .. })
    }
}

/// Slots copied out of one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    /// Timestamp the lookup was made for (`now - delay`).
    pub requested: Timestamp,
    /// Timestamp of the buffer actually read.
    pub timestamp: Timestamp,
    /// One event per requested slot, in request order.
    pub events: Vec<SlotEvent<V>>,
}

impl<V> Snapshot<V> {
    /// Iterate over the present slots as `(index, value)`.
    pub fn synchronized(&self) -> impl Iterator<Item = (usize, &V)> + '_ {
        self.events.iter().filter_map(|event| match event {
            SlotEvent::Synchronized { index, value } => Some((*index, value)),
            SlotEvent::Unsynchronized { .. } => None,
        })
    }

    /// Indices of the absent slots.
    pub fn unsynchronized(&self) -> impl Iterator<Item = usize> + '_ {
        self.events
            .iter()
            .filter(|event| !event.is_synchronized())
            .map(SlotEvent::index)
    }

    /// Whether every requested slot was present.
    pub fn is_complete(&self) -> bool {
        self.events.iter().all(SlotEvent::is_synchronized)
    }
}

/// Looks up buffers for a consumer, with a fixed delay and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineReader {
    delay: Duration,
    direction: Direction,
}

impl Default for TimelineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineReader {
    /// No delay, nearest buffer in either direction.
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            direction: Direction::Both,
        }
    }

    /// Subtract `delay` from every lookup time, to line up a source that
    /// lags the others.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Restrict lookups to one side of the requested time.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Configured direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Read typed records from the buffer closest to `now - delay`.
    ///
    /// Returns `None` if no buffer matches. Misses are counted in
    /// `chronoline_lookup_misses` and logged at debug level only, since a
    /// renderer polling an empty timeline misses on every frame.
    ///
    /// # Panics
    ///
    /// Panics if the timeline is not configured or a requested slot index
    /// is out of bounds.
    pub fn read<T: Pod>(
        &self,
        timeline: &GenericTimeline<T>,
        now: Timestamp,
        slots: &[usize],
    ) -> Option<Snapshot<T>> {
        self.read_with(timeline.as_timeline(), now, slots, |buffer, index| {
            *buffer.element_as::<T>(index)
        })
    }

    /// Read raw slot bytes from the buffer closest to `now - delay`.
    ///
    /// # Panics
    ///
    /// Panics if the timeline is not configured or a requested slot index
    /// is out of bounds.
    pub fn read_raw(
        &self,
        timeline: &Timeline,
        now: Timestamp,
        slots: &[usize],
    ) -> Option<Snapshot<Vec<u8>>> {
        self.read_with(timeline, now, slots, |buffer, index| {
            buffer.element(index).to_vec()
        })
    }

    fn read_with<V>(
        &self,
        timeline: &Timeline,
        now: Timestamp,
        slots: &[usize],
        copy: impl Fn(&Buffer, usize) -> V,
    ) -> Option<Snapshot<V>> {
        let requested = now - self.delay;
        let Some(buffer) = timeline.get_closest_buffer(requested, self.direction) else {
            let name = timeline.name().unwrap_or_default();
            tracing::debug!(
                timeline = %name,
                %requested,
                direction = ?self.direction,
                "no buffer found for timestamp"
            );
            record_lookup_miss(&name);
            return None;
        };

        let events: Vec<_> = slots
            .iter()
            .map(|&index| {
                if buffer.is_present(index) {
                    SlotEvent::Synchronized {
                        index,
                        value: copy(&*buffer, index),
                    }
                } else {
                    SlotEvent::Unsynchronized { index }
                }
            })
            .collect();

        let missing = events.iter().filter(|e| !e.is_synchronized()).count();
        if missing > 0 {
            let name = timeline.name().unwrap_or_default();
            tracing::debug!(
                timeline = %name,
                timestamp = %buffer.timestamp(),
                missing,
                "slots unsynchronized"
            );
            record_slots_unsynchronized(&name, missing as u64);
        }

        Some(Snapshot {
            requested,
            timestamp: buffer.timestamp(),
            events,
        })
    }
}
