use std::time::Instant;

/// Number of network samples kept for the sparkline.
pub const HISTORY_CAPACITY: usize = 60;

/// One observation of a pair of cumulative counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: Instant,
    /// Received bytes for network samples.
    pub counter_a: u64,
    /// Transmitted bytes for network samples.
    pub counter_b: u64,
}

impl Sample {
    pub fn new(timestamp: Instant, counter_a: u64, counter_b: u64) -> Self {
        Self {
            timestamp,
            counter_a,
            counter_b,
        }
    }
}

/// Fixed-capacity circular store of the last `N` values.
///
/// Insertion overwrites slot `total_inserts % N`; the buffer never allocates
/// after construction.
#[derive(Clone, Debug)]
pub struct RingBuffer<T, const N: usize> {
    slots: [Option<T>; N],
    total_inserts: usize,
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            total_inserts: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        self.slots[self.total_inserts % N] = Some(value);
        self.total_inserts += 1;
    }

    /// Value `back` positions before the most recent one; `at(0)` is the newest.
    pub fn at(&self, back: usize) -> Option<&T> {
        if back >= self.len() {
            return None;
        }
        let seq = self.total_inserts - 1 - back;
        self.slots[seq % N].as_ref()
    }

    /// Value with insertion sequence number `seq`, if it is still retained.
    pub fn by_sequence(&self, seq: usize) -> Option<&T> {
        if seq >= self.total_inserts || seq < self.oldest_sequence() {
            return None;
        }
        self.slots[seq % N].as_ref()
    }

    pub fn len(&self) -> usize {
        self.total_inserts.min(N)
    }

    pub fn is_empty(&self) -> bool {
        self.total_inserts == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of values ever pushed, including evicted ones.
    pub fn total_inserts(&self) -> usize {
        self.total_inserts
    }

    /// Sequence number of the oldest retained value.
    pub fn oldest_sequence(&self) -> usize {
        self.total_inserts - self.len()
    }

    /// Retained values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (self.oldest_sequence()..self.total_inserts)
            .filter_map(move |seq| self.slots[seq % N].as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_to_capacity() {
        let mut buf: RingBuffer<u32, 3> = RingBuffer::new();
        buf.push(1);
        buf.push(2);
        buf.push(3);
        buf.push(4);
        let hist: Vec<u32> = buf.iter().copied().collect();
        assert_eq!(hist, vec![2, 3, 4]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.total_inserts(), 4);
        assert_eq!(buf.at(0), Some(&4));
        assert_eq!(buf.at(2), Some(&2));
        assert_eq!(buf.at(3), None);
    }

    #[test]
    fn partial_fill_reports_inserted_count() {
        let mut buf: RingBuffer<u32, HISTORY_CAPACITY> = RingBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.at(0), None);
        buf.push(7);
        buf.push(8);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.at(0), Some(&8));
        assert_eq!(buf.at(1), Some(&7));
        assert_eq!(buf.capacity(), HISTORY_CAPACITY);
    }

    #[test]
    fn newest_is_always_at_zero_once_wrapped() {
        let mut buf: RingBuffer<usize, HISTORY_CAPACITY> = RingBuffer::new();
        for i in 0..(HISTORY_CAPACITY * 3 + 7) {
            buf.push(i);
            if i + 1 >= HISTORY_CAPACITY {
                assert_eq!(buf.len(), HISTORY_CAPACITY);
            }
            assert_eq!(buf.at(0), Some(&i));
        }
    }

    #[test]
    fn sequence_lookup_respects_eviction() {
        let mut buf: RingBuffer<usize, 4> = RingBuffer::new();
        for i in 0..10 {
            buf.push(i * 10);
        }
        assert_eq!(buf.oldest_sequence(), 6);
        assert_eq!(buf.by_sequence(5), None);
        assert_eq!(buf.by_sequence(6), Some(&60));
        assert_eq!(buf.by_sequence(9), Some(&90));
        assert_eq!(buf.by_sequence(10), None);
    }
}
