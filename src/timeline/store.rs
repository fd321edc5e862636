//! Bounded, timestamp-ordered buffer store.

use super::config::TimelineConfig;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::memory::PoolAllocator;
use crate::observability::{
    TimelineMetrics, span_timeline, trace_buffer_evicted, trace_buffer_pushed, trace_push_rejected,
};
use crate::temporal::{Direction, Timestamp};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A bounded map from timestamp to buffer, shared between producer and
/// consumer threads.
///
/// Producers call [`create_buffer`](Self::create_buffer), fill slots, then
/// [`push`](Self::push). Consumers query with
/// [`get_closest_buffer`](Self::get_closest_buffer) and keep the returned
/// `Arc<Buffer>` as long as they like: eviction removes the map entry, not
/// the memory.
///
/// # Locking
///
/// One reader-writer lock guards the map. Mutations take it exclusively,
/// queries take it shared. The pool's own mutex is never taken while this
/// lock is held: blocks are acquired after the lock is released, and
/// buffers leaving the map are dropped after it is released.
///
/// # States
///
/// A timeline starts unconfigured. Until [`configure`](Self::configure)
/// succeeds, mutating operations return [`Error::NotConfigured`] and
/// queries panic, so a missing configure is never mistaken for an empty
/// timeline. [`is_configured`](Self::is_configured),
/// [`config`](Self::config), [`max_resident`](Self::max_resident) and
/// [`pool_available`](Self::pool_available) report the state instead.
///
/// # Retention
///
/// A consumer may keep any number of handles to resident buffers. Handles
/// that outlive eviction keep their block out of the pool, and the pool has
/// room for [`TimelineConfig::retained`] of them. Within that budget
/// producers never see [`Error::PoolExhausted`].
///
/// # Example
///
/// ```rust
/// use chronoline::temporal::{Direction, Timestamp};
/// use chronoline::timeline::{Timeline, TimelineConfig};
///
/// let timeline = Timeline::with_config(TimelineConfig::new(4, 2, 3, 0)).unwrap();
///
/// for ts in [10.0, 20.0, 30.0] {
///     let mut buffer = timeline.create_buffer(Timestamp::from_millis(ts)).unwrap();
///     buffer.set_element(0, &(ts as u32).to_le_bytes());
///     timeline.push(buffer).unwrap();
/// }
///
/// let closest = timeline
///     .get_closest_buffer(Timestamp::from_millis(24.0), Direction::Both)
///     .unwrap();
/// assert_eq!(closest.timestamp(), Timestamp::from_millis(20.0));
/// ```
#[derive(Default)]
pub struct Timeline {
    state: RwLock<Option<Resident>>,
}

/// Everything that exists once a timeline is configured.
struct Resident {
    config: TimelineConfig,
    pool: PoolAllocator,
    buffers: BTreeMap<Timestamp, Arc<Buffer>>,
    metrics: TimelineMetrics,
}

impl Resident {
    fn new(config: TimelineConfig) -> Result<Self> {
        config.validate()?;
        let pool = PoolAllocator::new(config.block_size()?, config.pool_blocks()?)?;
        let metrics = TimelineMetrics::new(&config.name);
        metrics.record_resident(0);
        metrics.record_pool_available(pool.available());

        Ok(Self {
            config,
            pool,
            buffers: BTreeMap::new(),
            metrics,
        })
    }

    /// Explain why a buffer cannot be pushed here, if it cannot.
    fn incompatibility(&self, buffer: &Buffer) -> Option<String> {
        if buffer.element_size() != self.config.element_size
            || buffer.element_count() != self.config.element_count
        {
            return Some(format!(
                "layout {}x{} does not match timeline layout {}x{}",
                buffer.element_count(),
                buffer.element_size(),
                self.config.element_count,
                self.config.element_size
            ));
        }
        if buffer.pool_id() != self.pool.id() {
            return Some(format!(
                "buffer comes from pool {}, timeline uses pool {}",
                buffer.pool_id(),
                self.pool.id()
            ));
        }
        None
    }

    fn closest(&self, timestamp: Timestamp, direction: Direction) -> Option<&Arc<Buffer>> {
        let past = || self.buffers.range(..=timestamp).next_back();
        let future = || self.buffers.range(timestamp..).next();

        let entry = match direction {
            Direction::Past => past(),
            Direction::Future => future(),
            Direction::Both => match (past(), future()) {
                (Some(before), Some(after)) => {
                    // Ties go to the earlier entry.
                    if timestamp - *before.0 <= *after.0 - timestamp {
                        Some(before)
                    } else {
                        Some(after)
                    }
                }
                (before, after) => before.or(after),
            },
        };
        entry.map(|(_, buffer)| buffer)
    }
}

/// The resident state of a configured timeline.
///
/// # Panics
///
/// Panics if the timeline has not been configured.
#[track_caller]
fn configured(state: &Option<Resident>) -> &Resident {
    match state {
        Some(resident) => resident,
        None => panic!("timeline queried before configure"),
    }
}

impl Timeline {
    /// Create an unconfigured timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and configure a timeline in one step.
    pub fn with_config(config: TimelineConfig) -> Result<Self> {
        let timeline = Self::new();
        timeline.configure(config)?;
        Ok(timeline)
    }

    /// Set the slot layout and capacity, allocating a fresh pool.
    ///
    /// Any resident buffers are dropped from the map. Buffers still held by
    /// callers stay readable (they keep the old arena alive) but are no
    /// longer accepted by [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for zero sizes or overflow, and
    /// [`Error::AllocationFailed`] if the arena cannot be allocated. On
    /// error the previous state is kept.
    pub fn configure(&self, config: TimelineConfig) -> Result<()> {
        let span = span_timeline(&config.name, "configure");
        let _guard = span.enter();

        let resident = Resident::new(config)?;
        tracing::debug!(
            element_size = resident.config.element_size,
            element_count = resident.config.element_count,
            max_resident = resident.config.max_resident,
            pool_blocks = resident.pool.block_count(),
            "timeline configured"
        );

        let previous = self.state.write().replace(resident);
        drop(previous);
        Ok(())
    }

    /// Whether [`configure`](Self::configure) has succeeded.
    pub fn is_configured(&self) -> bool {
        self.state.read().is_some()
    }

    /// Get a copy of the current configuration.
    pub fn config(&self) -> Option<TimelineConfig> {
        self.state.read().as_ref().map(|r| r.config.clone())
    }

    /// Acquire a zeroed buffer for `timestamp`.
    ///
    /// The buffer is not published until it is passed to
    /// [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] before configure, and
    /// [`Error::PoolExhausted`] when more buffers are held than the
    /// configured producers and retention budget allow.
    pub fn create_buffer(&self, timestamp: Timestamp) -> Result<Buffer> {
        let (pool, element_size, element_count) = {
            let state = self.state.read();
            let resident = state.as_ref().ok_or(Error::NotConfigured)?;
            (
                resident.pool.clone(),
                resident.config.element_size,
                resident.config.element_count,
            )
        };

        let block = pool.acquire().inspect_err(|e| {
            tracing::warn!(error = %e, %timestamp, "could not create buffer");
        })?;
        Ok(Buffer::new(timestamp, block, element_size, element_count))
    }

    /// Publish a buffer, keyed by its timestamp.
    ///
    /// If the timestamp is already resident the entry is replaced. Otherwise,
    /// when the timeline is full, the oldest entry is evicted first.
    ///
    /// Returns the published handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleBuffer`] for a buffer created by another
    /// timeline or before the last reconfigure; the timeline is unchanged.
    pub fn push(&self, buffer: Buffer) -> Result<Arc<Buffer>> {
        let timestamp = buffer.timestamp();
        let mut released = Vec::new();

        let (pool, metrics, published) = {
            let mut state = self.state.write();
            let resident = state.as_mut().ok_or(Error::NotConfigured)?;

            if let Some(reason) = resident.incompatibility(&buffer) {
                resident.metrics.record_rejected();
                trace_push_rejected(&resident.config.name, &reason);
                return Err(Error::IncompatibleBuffer(reason));
            }

            if !resident.buffers.contains_key(&timestamp)
                && resident.buffers.len() >= resident.config.max_resident
            {
                if let Some((oldest, evicted)) = resident.buffers.pop_first() {
                    trace_buffer_evicted(&resident.config.name, oldest.as_millis());
                    resident.metrics.record_evicted(1);
                    released.push(evicted);
                }
            }

            let published = Arc::new(buffer);
            if let Some(replaced) = resident.buffers.insert(timestamp, Arc::clone(&published)) {
                resident.metrics.record_replaced();
                released.push(replaced);
            }

            let len = resident.buffers.len();
            resident.metrics.record_push(len);
            trace_buffer_pushed(&resident.config.name, timestamp.as_millis(), len);

            (resident.pool.clone(), resident.metrics.clone(), published)
        };

        drop(released);
        metrics.record_pool_available(pool.available());
        Ok(published)
    }

    /// Remove and return the entry at exactly `timestamp`.
    pub fn pop(&self, timestamp: Timestamp) -> Result<Option<Arc<Buffer>>> {
        let mut state = self.state.write();
        let resident = state.as_mut().ok_or(Error::NotConfigured)?;
        let popped = resident.buffers.remove(&timestamp);
        resident.metrics.record_resident(resident.buffers.len());
        Ok(popped)
    }

    /// Drop every resident buffer.
    pub fn clear(&self) -> Result<()> {
        let (drained, pool, metrics) = {
            let mut state = self.state.write();
            let resident = state.as_mut().ok_or(Error::NotConfigured)?;
            resident.metrics.record_resident(0);
            (
                std::mem::take(&mut resident.buffers),
                resident.pool.clone(),
                resident.metrics.clone(),
            )
        };

        let span = span_timeline(metrics.name(), "clear");
        let _guard = span.enter();
        tracing::debug!(dropped = drained.len(), "timeline cleared");
        drop(drained);
        metrics.record_pool_available(pool.available());
        Ok(())
    }

    /// Get the entry at exactly `timestamp`.
    ///
    /// # Panics
    ///
    /// Panics if the timeline is not configured.
    pub fn get_buffer(&self, timestamp: Timestamp) -> Option<Arc<Buffer>> {
        let state = self.state.read();
        configured(&state).buffers.get(&timestamp).cloned()
    }

    /// Get the entry nearest to `timestamp` in the given direction.
    ///
    /// With [`Direction::Both`], an exact tie resolves to the earlier entry.
    ///
    /// # Panics
    ///
    /// Panics if the timeline is not configured.
    pub fn get_closest_buffer(
        &self,
        timestamp: Timestamp,
        direction: Direction,
    ) -> Option<Arc<Buffer>> {
        let state = self.state.read();
        configured(&state).closest(timestamp, direction).cloned()
    }

    /// Get the entry with the largest timestamp.
    pub fn newest_buffer(&self) -> Option<Arc<Buffer>> {
        let state = self.state.read();
        configured(&state).buffers.last_key_value().map(|(_, b)| Arc::clone(b))
    }

    /// Get the largest resident timestamp.
    pub fn newest_timestamp(&self) -> Option<Timestamp> {
        let state = self.state.read();
        configured(&state).buffers.last_key_value().map(|(ts, _)| *ts)
    }

    /// Get the entry with the smallest timestamp.
    pub fn oldest_buffer(&self) -> Option<Arc<Buffer>> {
        let state = self.state.read();
        configured(&state).buffers.first_key_value().map(|(_, b)| Arc::clone(b))
    }

    /// Get the smallest resident timestamp.
    pub fn oldest_timestamp(&self) -> Option<Timestamp> {
        let state = self.state.read();
        configured(&state).buffers.first_key_value().map(|(ts, _)| *ts)
    }

    /// Snapshot of resident timestamps in ascending order.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        let state = self.state.read();
        configured(&state).buffers.keys().copied().collect()
    }

    /// Number of resident buffers.
    pub fn len(&self) -> usize {
        configured(&self.state.read()).buffers.len()
    }

    /// Whether no buffer is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn max_resident(&self) -> Option<usize> {
        self.state.read().as_ref().map(|r| r.config.max_resident)
    }

    /// Free blocks in the current pool.
    pub fn pool_available(&self) -> Option<usize> {
        let pool = self.state.read().as_ref().map(|r| r.pool.clone())?;
        Some(pool.available())
    }

    /// Whether `buffer` could be pushed here: same pool and same layout.
    pub fn is_buffer_valid(&self, buffer: &Buffer) -> bool {
        let state = self.state.read();
        configured(&state).incompatibility(buffer).is_none()
    }

    /// Name used in logs and metric labels.
    pub(crate) fn name(&self) -> Option<String> {
        self.state.read().as_ref().map(|r| r.config.name.clone())
    }

    /// Replace this timeline's contents with a copy of `source`.
    ///
    /// The destination takes the source's layout and capacity, gets a pool
    /// of its own, and receives a byte copy of every resident buffer at the
    /// same timestamps. A configured destination keeps its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] if `source` is unconfigured, and
    /// allocation errors from the new pool. On error the destination is
    /// unchanged.
    pub fn deep_copy_from(&self, source: &Timeline) -> Result<()> {
        if std::ptr::eq(self, source) {
            return Ok(());
        }

        let (mut config, snapshot) = {
            let state = source.state.read();
            let resident = state.as_ref().ok_or(Error::NotConfigured)?;
            let snapshot: Vec<Arc<Buffer>> = resident.buffers.values().cloned().collect();
            (resident.config.clone(), snapshot)
        };
        if let Some(name) = self.name() {
            config.name = name;
        }

        let span = span_timeline(&config.name, "deep_copy");
        let _guard = span.enter();

        let mut copy = Resident::new(config)?;
        for original in &snapshot {
            let block = copy.pool.acquire()?;
            let mut buffer = Buffer::new(
                original.timestamp(),
                block,
                copy.config.element_size,
                copy.config.element_count,
            );
            buffer.deep_copy_from(original);
            copy.buffers.insert(buffer.timestamp(), Arc::new(buffer));
        }
        drop(snapshot);

        let copied = copy.buffers.len();
        copy.metrics.record_resident(copied);
        copy.metrics.record_pool_available(copy.pool.available());

        let previous = self.state.write().replace(copy);
        drop(previous);
        tracing::debug!(copied, "timeline deep copied");
        Ok(())
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        match state.as_ref() {
            Some(resident) => f
                .debug_struct("Timeline")
                .field("config", &resident.config)
                .field("resident", &resident.buffers.len())
                .field("pool_id", &resident.pool.id())
                .finish(),
            None => f.debug_struct("Timeline").field("config", &None::<()>).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: f64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    fn timeline_with(keys: &[f64], max_resident: usize) -> Timeline {
        let config = TimelineConfig::new(8, 2, max_resident, 1);
        let timeline = Timeline::with_config(config).unwrap();
        for &key in keys {
            let mut buffer = timeline.create_buffer(ts(key)).unwrap();
            buffer.set_element(0, &key.to_le_bytes());
            timeline.push(buffer).unwrap();
        }
        timeline
    }

    fn key_of(buffer: &Buffer) -> f64 {
        f64::from_le_bytes(buffer.element(0).try_into().unwrap())
    }

    #[test]
    fn test_unconfigured_timeline() {
        let timeline = Timeline::new();

        assert!(!timeline.is_configured());
        assert_eq!(timeline.create_buffer(ts(1.0)).unwrap_err(), Error::NotConfigured);
        assert_eq!(timeline.clear().unwrap_err(), Error::NotConfigured);
        assert_eq!(timeline.pop(ts(1.0)).unwrap_err(), Error::NotConfigured);
        assert!(timeline.config().is_none());
        assert!(timeline.max_resident().is_none());
        assert!(timeline.pool_available().is_none());
    }

    #[test]
    #[should_panic(expected = "before configure")]
    fn test_unconfigured_closest_lookup_panics() {
        let _ = Timeline::new().get_closest_buffer(ts(1.0), Direction::Both);
    }

    #[test]
    #[should_panic(expected = "before configure")]
    fn test_unconfigured_exact_lookup_panics() {
        let _ = Timeline::new().get_buffer(ts(1.0));
    }

    #[test]
    #[should_panic(expected = "before configure")]
    fn test_unconfigured_newest_panics() {
        let _ = Timeline::new().newest_timestamp();
    }

    #[test]
    #[should_panic(expected = "before configure")]
    fn test_unconfigured_len_panics() {
        let _ = Timeline::new().is_empty();
    }

    #[test]
    fn test_configure_rejects_invalid() {
        let timeline = Timeline::new();
        let err = timeline.configure(TimelineConfig::new(4, 1, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!timeline.is_configured());
    }

    #[test]
    fn test_push_and_get() {
        let timeline = timeline_with(&[10.0, 20.0, 30.0], 5);

        assert_eq!(timeline.len(), 3);
        assert_eq!(key_of(&timeline.get_buffer(ts(20.0)).unwrap()), 20.0);
        assert!(timeline.get_buffer(ts(21.0)).is_none());
        assert_eq!(timeline.newest_timestamp(), Some(ts(30.0)));
        assert_eq!(timeline.oldest_timestamp(), Some(ts(10.0)));
        assert_eq!(timeline.timestamps(), vec![ts(10.0), ts(20.0), ts(30.0)]);
    }

    #[test]
    fn test_out_of_order_push_is_sorted() {
        let timeline = timeline_with(&[30.0, 10.0, 20.0], 5);
        assert_eq!(timeline.timestamps(), vec![ts(10.0), ts(20.0), ts(30.0)]);
        assert_eq!(key_of(&timeline.newest_buffer().unwrap()), 30.0);
        assert_eq!(key_of(&timeline.oldest_buffer().unwrap()), 10.0);
    }

    #[test]
    fn test_eviction_removes_oldest() {
        let timeline = timeline_with(&[20.0, 10.0, 30.0, 40.0], 3);

        assert_eq!(timeline.len(), 3);
        assert!(timeline.get_buffer(ts(10.0)).is_none());
        assert_eq!(timeline.timestamps(), vec![ts(20.0), ts(30.0), ts(40.0)]);
    }

    #[test]
    fn test_push_existing_timestamp_replaces() {
        let timeline = timeline_with(&[10.0, 20.0], 2);

        let mut buffer = timeline.create_buffer(ts(20.0)).unwrap();
        buffer.set_element(1, &[1; 8]);
        timeline.push(buffer).unwrap();

        assert_eq!(timeline.len(), 2);
        assert!(timeline.get_buffer(ts(10.0)).is_some());
        let replaced = timeline.get_buffer(ts(20.0)).unwrap();
        assert!(!replaced.is_present(0));
        assert!(replaced.is_present(1));
    }

    #[test]
    fn test_closest_directions() {
        let timeline = timeline_with(&[10.0, 20.0, 30.0], 5);
        let closest = |t, d| timeline.get_closest_buffer(ts(t), d).map(|b| key_of(&b));

        assert_eq!(closest(24.0, Direction::Both), Some(20.0));
        assert_eq!(closest(25.0, Direction::Both), Some(20.0));
        assert_eq!(closest(26.0, Direction::Both), Some(30.0));
        assert_eq!(closest(24.0, Direction::Past), Some(20.0));
        assert_eq!(closest(24.0, Direction::Future), Some(30.0));
        assert_eq!(closest(20.0, Direction::Future), Some(20.0));
        assert_eq!(closest(20.0, Direction::Past), Some(20.0));

        assert_eq!(closest(5.0, Direction::Past), None);
        assert_eq!(closest(5.0, Direction::Future), Some(10.0));
        assert_eq!(closest(5.0, Direction::Both), Some(10.0));
        assert_eq!(closest(35.0, Direction::Future), None);
        assert_eq!(closest(35.0, Direction::Past), Some(30.0));
        assert_eq!(closest(35.0, Direction::Both), Some(30.0));
    }

    #[test]
    fn test_closest_on_empty() {
        let timeline = timeline_with(&[], 2);
        for direction in [Direction::Past, Direction::Future, Direction::Both] {
            assert!(timeline.get_closest_buffer(ts(1.0), direction).is_none());
        }
    }

    #[test]
    fn test_reject_foreign_buffer() {
        let a = timeline_with(&[1.0], 4);
        let b = timeline_with(&[], 4);

        let foreign = a.create_buffer(ts(2.0)).unwrap();
        assert!(!b.is_buffer_valid(&foreign));
        assert!(matches!(b.push(foreign), Err(Error::IncompatibleBuffer(_))));
        assert!(b.is_empty());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_reject_buffer_from_previous_configuration() {
        let timeline = timeline_with(&[1.0], 4);
        let stale = timeline.create_buffer(ts(2.0)).unwrap();
        assert!(timeline.is_buffer_valid(&stale));

        timeline.configure(TimelineConfig::new(8, 2, 4, 1)).unwrap();
        assert!(timeline.is_empty());
        assert!(!timeline.is_buffer_valid(&stale));
        assert!(matches!(timeline.push(stale), Err(Error::IncompatibleBuffer(_))));
    }

    #[test]
    fn test_pop_and_clear() {
        let timeline = timeline_with(&[1.0, 2.0, 3.0], 3);

        let popped = timeline.pop(ts(2.0)).unwrap().unwrap();
        assert_eq!(key_of(&popped), 2.0);
        assert!(timeline.pop(ts(2.0)).unwrap().is_none());
        assert_eq!(timeline.len(), 2);

        timeline.clear().unwrap();
        assert!(timeline.is_empty());
        assert!(timeline.newest_buffer().is_none());
        // One block of five is still held by `popped`.
        assert_eq!(timeline.pool_available(), Some(4));
    }

    #[test]
    fn test_evicted_buffer_stays_readable() {
        let timeline = timeline_with(&[1.0], 1);
        let held = timeline.get_buffer(ts(1.0)).unwrap();

        let buffer = timeline.create_buffer(ts(2.0)).unwrap();
        timeline.push(buffer).unwrap();

        assert!(timeline.get_buffer(ts(1.0)).is_none());
        assert_eq!(key_of(&held), 1.0);
        assert_eq!(timeline.pool_available(), Some(1));
        drop(held);
        assert_eq!(timeline.pool_available(), Some(2));
    }

    #[test]
    fn test_producer_never_stalls_within_retention_budget() {
        let timeline = Timeline::with_config(TimelineConfig::new(4, 1, 3, 1)).unwrap();
        for key in 0..3 {
            timeline.push(timeline.create_buffer(ts(key as f64)).unwrap()).unwrap();
        }
        let held = timeline.get_closest_buffer(ts(0.0), Direction::Both).unwrap();

        for key in 3..20 {
            let buffer = timeline.create_buffer(ts(key as f64)).unwrap();
            timeline.push(buffer).unwrap();
        }
        assert_eq!(held.timestamp(), ts(0.0));
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_pool_exhaustion_beyond_retention_budget() {
        let timeline = Timeline::with_config(TimelineConfig::new(4, 1, 1, 1)).unwrap();
        timeline.push(timeline.create_buffer(ts(1.0)).unwrap()).unwrap();
        let first = timeline.newest_buffer().unwrap();
        timeline.push(timeline.create_buffer(ts(2.0)).unwrap()).unwrap();
        let second = timeline.newest_buffer().unwrap();
        timeline.push(timeline.create_buffer(ts(3.0)).unwrap()).unwrap();

        // Two evicted handles against a budget of one.
        assert_eq!(
            timeline.create_buffer(ts(4.0)).unwrap_err(),
            Error::PoolExhausted { capacity: 3 }
        );
        drop(first);
        assert!(timeline.create_buffer(ts(4.0)).is_ok());
        drop(second);
    }

    #[test]
    fn test_deep_copy() {
        let source = timeline_with(&[1.0, 2.0, 3.0], 4);
        let config = TimelineConfig::new(1, 1, 1, 0).with_name("dest");
        let dest = Timeline::with_config(config).unwrap();

        dest.deep_copy_from(&source).unwrap();

        let config = dest.config().unwrap();
        assert_eq!(config.name, "dest");
        assert_eq!(config.max_resident, 4);
        assert_eq!(dest.timestamps(), source.timestamps());
        for key in [1.0, 2.0, 3.0] {
            let a = source.get_buffer(ts(key)).unwrap();
            let b = dest.get_buffer(ts(key)).unwrap();
            assert_eq!(a.as_bytes(), b.as_bytes());
            assert_eq!(a.presence(), b.presence());
            assert_ne!(a.pool_id(), b.pool_id());
        }
    }

    #[test]
    fn test_deep_copy_from_unconfigured() {
        let dest = timeline_with(&[1.0], 2);
        assert_eq!(dest.deep_copy_from(&Timeline::new()).unwrap_err(), Error::NotConfigured);
        assert_eq!(dest.len(), 1);
    }
}
