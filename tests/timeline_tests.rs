//! Integration tests for the untyped timeline.
//!
//! These cover capacity, nearest-timestamp lookup, round-tripping of slot
//! data and the link between eviction and pool memory.

use chronoline::memory::PoolAllocator;
use chronoline::prelude::*;

fn ts(millis: f64) -> Timestamp {
    Timestamp::from_millis(millis)
}

/// A timeline with one 4-byte slot per buffer holding the key as u32, and
/// room for one evicted buffer held by a consumer.
fn keyed_timeline(keys: &[f64], max_resident: usize) -> Timeline {
    let timeline = Timeline::with_config(TimelineConfig::new(4, 1, max_resident, 1)).unwrap();
    for &key in keys {
        let mut buffer = timeline.create_buffer(ts(key)).unwrap();
        buffer.set_element(0, &(key as u32).to_le_bytes());
        timeline.push(buffer).unwrap();
    }
    timeline
}

fn key(buffer: &Buffer) -> u32 {
    u32::from_le_bytes(buffer.element(0).try_into().unwrap())
}

// ============================================================================
// Capacity
// ============================================================================

/// Resident count never exceeds capacity, and overflow drops the smallest key.
#[test]
fn test_capacity_invariant() {
    let timeline = keyed_timeline(&[], 4);
    let pushes = [50.0, 10.0, 70.0, 30.0, 20.0, 90.0, 60.0, 5.0, 80.0, 40.0];

    let mut expected: Vec<f64> = Vec::new();
    for &key in &pushes {
        let buffer = timeline.create_buffer(ts(key)).unwrap();
        timeline.push(buffer).unwrap();

        expected.push(key);
        expected.sort_by(f64::total_cmp);
        if expected.len() > 4 {
            expected.remove(0);
        }

        assert!(timeline.len() <= 4);
        let resident: Vec<f64> = timeline.timestamps().iter().map(|t| t.as_millis()).collect();
        assert_eq!(resident, expected);
    }
}

/// A late push older than everything resident is itself the eviction victim.
#[test]
fn test_late_push_is_evicted_first() {
    let timeline = keyed_timeline(&[10.0, 20.0, 30.0], 3);

    // Eviction happens before insertion, so 10 goes and 5 stays.
    let buffer = timeline.create_buffer(ts(5.0)).unwrap();
    timeline.push(buffer).unwrap();

    assert_eq!(timeline.timestamps(), vec![ts(5.0), ts(20.0), ts(30.0)]);
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_nearest_match() {
    let timeline = keyed_timeline(&[10.0, 20.0, 30.0], 10);

    let at = |t: f64, d: Direction| timeline.get_closest_buffer(ts(t), d).map(|b| key(&b));

    assert_eq!(at(24.0, Direction::Both), Some(20));
    // Exact tie resolves to the earlier entry.
    assert_eq!(at(25.0, Direction::Both), Some(20));
}

#[test]
fn test_direction_boundaries() {
    let timeline = keyed_timeline(&[10.0, 20.0, 30.0], 10);

    let at = |t: f64, d: Direction| timeline.get_closest_buffer(ts(t), d).map(|b| key(&b));

    assert_eq!(at(5.0, Direction::Past), None);
    assert_eq!(at(5.0, Direction::Future), Some(10));
    assert_eq!(at(5.0, Direction::Both), Some(10));

    assert_eq!(at(40.0, Direction::Future), None);
    assert_eq!(at(40.0, Direction::Past), Some(30));
    assert_eq!(at(40.0, Direction::Both), Some(30));
}

#[test]
fn test_exact_match() {
    let timeline = keyed_timeline(&[10.0, 20.0, 30.0], 10);

    assert_eq!(timeline.get_buffer(ts(20.0)).map(|b| key(&b)), Some(20));
    assert!(timeline.get_buffer(ts(21.0)).is_none());
}

#[test]
fn test_newest_and_empty() {
    let timeline = keyed_timeline(&[], 3);
    assert!(timeline.newest_buffer().is_none());
    assert!(timeline.newest_timestamp().is_none());

    for key in [2.0, 7.0, 4.0] {
        timeline.push(timeline.create_buffer(ts(key)).unwrap()).unwrap();
    }
    assert_eq!(timeline.newest_timestamp(), Some(ts(7.0)));
    assert_eq!(timeline.newest_buffer().unwrap().timestamp(), ts(7.0));

    timeline.clear().unwrap();
    assert!(timeline.newest_buffer().is_none());
}

// ============================================================================
// Data
// ============================================================================

/// Presence and bytes survive publication unchanged.
#[test]
fn test_round_trip_presence_and_content() {
    let timeline = Timeline::with_config(TimelineConfig::new(6, 3, 2, 0)).unwrap();

    let mut buffer = timeline.create_buffer(ts(1.0)).unwrap();
    buffer.set_element(0, b"slot-0");
    buffer.add_element(2).copy_from_slice(b"slot-2");
    timeline.push(buffer).unwrap();

    let read = timeline.get_buffer(ts(1.0)).unwrap();
    assert!(read.is_present(0));
    assert!(!read.is_present(1));
    assert!(read.is_present(2));
    assert_eq!(read.element(0), b"slot-0");
    assert_eq!(read.element(1), &[0; 6]);
    assert_eq!(read.element(2), b"slot-2");
    assert_eq!(read.present_count(), 2);
    assert_eq!(read.mask(), 0b101);
}

/// Slot counts beyond 64 keep working past the low mask word.
#[test]
fn test_many_slots() {
    let timeline = Timeline::with_config(TimelineConfig::new(1, 130, 1, 0)).unwrap();

    let mut buffer = timeline.create_buffer(ts(1.0)).unwrap();
    buffer.set_element(3, &[3]);
    buffer.set_element(100, &[100]);
    buffer.set_element(129, &[129]);
    let read = timeline.push(buffer).unwrap();

    let present: Vec<usize> = read.present_elements().map(|(i, _)| i).collect();
    assert_eq!(present, vec![3, 100, 129]);
    assert_eq!(read.mask(), 1 << 3);
}

// ============================================================================
// Memory
// ============================================================================

/// Eviction returns exactly one block and the next buffer reuses it.
#[test]
fn test_eviction_releases_memory() {
    let timeline = keyed_timeline(&[1.0, 2.0, 3.0], 3);
    let capacity = timeline.config().unwrap().pool_blocks().unwrap();
    assert_eq!(timeline.pool_available(), Some(capacity - 3));

    let buffer = timeline.create_buffer(ts(4.0)).unwrap();
    assert_eq!(timeline.pool_available(), Some(capacity - 4));
    timeline.push(buffer).unwrap();

    // One evicted, so back to three in use.
    assert_eq!(timeline.pool_available(), Some(capacity - 3));

    for key in 5..50 {
        let buffer = timeline.create_buffer(ts(key as f64)).unwrap();
        timeline.push(buffer).unwrap();
    }
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline.pool_available(), Some(capacity - 3));
}

/// A consumer keeps a handle across evictions while the producer keeps
/// pushing; the block comes back when the handle is dropped.
#[test]
fn test_handle_outlives_eviction() {
    let timeline = keyed_timeline(&[0.0, 1.0, 2.0], 3);
    let capacity = timeline.config().unwrap().pool_blocks().unwrap();
    let held = timeline
        .get_closest_buffer(ts(0.0), Direction::Both)
        .unwrap();

    for k in 3..50 {
        let mut buffer = timeline.create_buffer(ts(k as f64)).unwrap();
        buffer.set_element(0, &(k as u32).to_le_bytes());
        timeline.push(buffer).unwrap();
    }

    assert!(timeline.get_buffer(ts(0.0)).is_none());
    assert_eq!(timeline.timestamps(), vec![ts(47.0), ts(48.0), ts(49.0)]);
    assert_eq!(key(&held), 0);
    assert_eq!(timeline.pool_available(), Some(capacity - 4));

    drop(held);
    assert_eq!(timeline.pool_available(), Some(capacity - 3));
}

/// Every consumer handle within the budget can outlive eviction at once.
#[test]
fn test_retention_budget_covers_every_held_handle() {
    let timeline = Timeline::with_config(TimelineConfig::new(4, 1, 2, 3)).unwrap();

    let mut held = Vec::new();
    for k in 0..40 {
        let buffer = timeline.create_buffer(ts(k as f64)).unwrap();
        let published = timeline.push(buffer).unwrap();
        if k % 10 == 0 {
            held.push(published);
        }
        // The oldest handle goes once the budget of three is reached.
        if held.len() > 3 {
            held.remove(0);
        }
    }
    assert_eq!(held.len(), 3);
    assert_eq!(timeline.len(), 2);
}

/// Handles survive the timeline itself.
#[test]
fn test_handle_outlives_timeline() {
    let timeline = keyed_timeline(&[7.0], 2);
    let held = timeline.get_buffer(ts(7.0)).unwrap();
    drop(timeline);
    assert_eq!(key(&held), 7);
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_push_foreign_buffer_rejected() {
    let timeline = keyed_timeline(&[1.0], 4);
    let before = timeline.timestamps();

    let pool = PoolAllocator::new(4, 1).unwrap();
    let stray = Buffer::new(ts(2.0), pool.acquire().unwrap(), 4, 1);

    assert!(matches!(timeline.push(stray), Err(Error::IncompatibleBuffer(_))));
    assert_eq!(timeline.timestamps(), before);
    // The stray block went back to its own pool.
    assert_eq!(pool.available(), 1);
}

#[test]
fn test_unconfigured_fails_fast() {
    let timeline = Timeline::new();
    assert_eq!(timeline.create_buffer(ts(1.0)).unwrap_err(), Error::NotConfigured);
    assert_eq!(timeline.clear().unwrap_err(), Error::NotConfigured);
    assert!(!timeline.is_configured());
}

#[test]
#[should_panic(expected = "before configure")]
fn test_unconfigured_lookup_panics() {
    let timeline = Timeline::new();
    let _ = timeline.get_closest_buffer(ts(1.0), Direction::Both);
}

#[test]
#[should_panic(expected = "before configure")]
fn test_unconfigured_timestamps_panic() {
    let _ = GenericTimeline::<u32>::new().timestamps();
}

#[test]
fn test_reconfigure_clears() {
    let timeline = keyed_timeline(&[1.0, 2.0], 4);
    let held = timeline.get_buffer(ts(1.0)).unwrap();

    timeline.configure(TimelineConfig::new(8, 2, 2, 0)).unwrap();

    assert!(timeline.is_empty());
    assert_eq!(timeline.max_resident(), Some(2));
    assert!(!timeline.is_buffer_valid(&held));
    let buffer = timeline.create_buffer(ts(3.0)).unwrap();
    assert_eq!(buffer.len(), 16);
    // Old handles still read from the old arena.
    assert_eq!(key(&held), 1);
}
