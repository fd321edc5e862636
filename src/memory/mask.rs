//! Word-packed presence bitmask for buffer slots.

/// One presence bit per slot: 1 = written by the producer, 0 = absent.
///
/// The mask is mutated only while a buffer is still owned by its producer,
/// so plain words are enough; no atomics are needed once it is published.
///
/// # Performance
///
/// - `set` / `clear` / `is_set`: O(1)
/// - `count_set`: O(n/64)
#[derive(Clone, PartialEq, Eq)]
pub struct SlotMask {
    /// 64-bit words, least significant bit first.
    words: Box<[u64]>,
    /// Number of slots (may be less than words.len() * 64).
    num_slots: usize,
}

impl SlotMask {
    /// Create a mask with every slot absent.
    pub fn new(num_slots: usize) -> Self {
        let num_words = num_slots.div_ceil(64);
        Self {
            words: vec![0u64; num_words].into_boxed_slice(),
            num_slots,
        }
    }

    #[inline]
    fn locate(&self, slot_idx: usize) -> (usize, u64) {
        assert!(
            slot_idx < self.num_slots,
            "slot index {} out of bounds (slot count {})",
            slot_idx,
            self.num_slots
        );
        (slot_idx / 64, 1u64 << (slot_idx % 64))
    }

    /// Mark a slot present.
    ///
    /// # Panics
    ///
    /// Panics if `slot_idx` is out of bounds.
    pub fn set(&mut self, slot_idx: usize) {
        let (word, bit) = self.locate(slot_idx);
        self.words[word] |= bit;
    }

    /// Mark a slot absent.
    ///
    /// # Panics
    ///
    /// Panics if `slot_idx` is out of bounds.
    pub fn clear(&mut self, slot_idx: usize) {
        let (word, bit) = self.locate(slot_idx);
        self.words[word] &= !bit;
    }

    /// Check whether a slot is present.
    ///
    /// # Panics
    ///
    /// Panics if `slot_idx` is out of bounds.
    pub fn is_set(&self, slot_idx: usize) -> bool {
        let (word, bit) = self.locate(slot_idx);
        self.words[word] & bit != 0
    }

    /// Mark every slot absent.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Count present slots.
    pub fn count_set(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over present slot indices in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| SetBits { word }.map(move |bit| word_idx * 64 + bit))
    }

    /// Presence bits of the first 64 slots.
    pub fn low_word(&self) -> u64 {
        self.words.first().copied().unwrap_or(0)
    }

    /// Overwrite this mask with another of the same size.
    ///
    /// # Panics
    ///
    /// Panics if the slot counts differ.
    pub fn copy_from(&mut self, other: &SlotMask) {
        assert_eq!(self.num_slots, other.num_slots, "slot mask size mismatch");
        self.words.copy_from_slice(&other.words);
    }

    /// Get the total number of slots.
    pub fn capacity(&self) -> usize {
        self.num_slots
    }
}

impl std::fmt::Debug for SlotMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter_set()).finish()
    }
}

/// Yields the positions of set bits in one word, lowest first.
struct SetBits {
    word: u64,
}

impl Iterator for SetBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.word == 0 {
            return None;
        }
        let bit = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_basic() {
        let mut mask = SlotMask::new(10);
        assert_eq!(mask.capacity(), 10);
        assert_eq!(mask.count_set(), 0);

        mask.set(0);
        mask.set(2);
        mask.set(2);
        assert_eq!(mask.count_set(), 2);
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(2));
        assert_eq!(mask.low_word(), 0b101);

        mask.clear(0);
        assert!(!mask.is_set(0));
        assert_eq!(mask.low_word(), 0b100);
    }

    #[test]
    fn test_mask_iter_set() {
        let mut mask = SlotMask::new(5);
        mask.set(4);
        mask.set(0);
        mask.set(2);
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn test_mask_non_aligned_size() {
        let mut mask = SlotMask::new(100);
        for i in (0..100).step_by(3) {
            mask.set(i);
        }
        assert_eq!(mask.count_set(), 34);
        assert!(mask.is_set(99));
        assert_eq!(mask.iter_set().last(), Some(99));

        mask.clear_all();
        assert_eq!(mask.count_set(), 0);
    }

    #[test]
    fn test_mask_copy_from() {
        let mut src = SlotMask::new(70);
        src.set(1);
        src.set(65);
        let mut dst = SlotMask::new(70);
        dst.set(3);

        dst.copy_from(&src);
        assert_eq!(dst, src);
        assert!(!dst.is_set(3));
    }

    #[test]
    fn test_mask_zero_slots() {
        let mask = SlotMask::new(0);
        assert_eq!(mask.low_word(), 0);
        assert_eq!(mask.iter_set().count(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_mask_out_of_bounds() {
        let mut mask = SlotMask::new(10);
        mask.set(10);
    }
}
