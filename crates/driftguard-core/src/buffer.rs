//! Bounded FIFO storage shared by the KSWIN window and detector history.

// ── Ring Buffer ─────────────────────────────────────────────────────────

/// A bounded circular buffer.
///
/// When full, pushing evicts the oldest item and hands it back to the
/// caller. Logical index 0 is always the oldest retained item.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    buffer: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create a ring buffer with the given capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            buffer: vec![None; cap],
            head: 0,
            len: 0,
        }
    }

    /// Push an item, returning the evicted oldest item if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = self.buffer[self.head].replace(item);
        self.head = (self.head + 1) % self.buffer.len();
        if self.len < self.buffer.len() {
            self.len += 1;
            None
        } else {
            evicted
        }
    }

    /// Item at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let pos = (self.start() + index) % self.buffer.len();
        self.buffer[pos].as_ref()
    }

    /// Most recently pushed item.
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over items in insertion order (oldest first).
    pub fn iter(&self) -> RingBufferIter<'_, T> {
        RingBufferIter {
            buffer: &self.buffer,
            pos: self.start(),
            remaining: self.len,
        }
    }

    /// Number of items currently in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next push will evict.
    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Maximum capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Clear all items, keeping the capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.buffer {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    fn start(&self) -> usize {
        if self.len < self.buffer.len() {
            0
        } else {
            self.head
        }
    }
}

/// Iterator over a RingBuffer.
pub struct RingBufferIter<'a, T> {
    buffer: &'a [Option<T>],
    pos: usize,
    remaining: usize,
}

impl<'a, T> Iterator for RingBufferIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.buffer[self.pos].as_ref();
        self.pos = (self.pos + 1) % self.buffer.len();
        self.remaining -= 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RingBufferIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full_then_evicts_oldest() {
        let mut rb = RingBuffer::new(3);
        assert_eq!(rb.push(1), None);
        assert_eq!(rb.push(2), None);
        assert_eq!(rb.push(3), None);
        assert!(rb.is_full());
        assert_eq!(rb.push(4), Some(1));
        assert_eq!(rb.push(5), Some(2));
        assert_eq!(rb.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn logical_indexing_follows_insertion_order() {
        let mut rb = RingBuffer::new(4);
        for i in 0..10 {
            rb.push(i);
        }
        assert_eq!(rb.get(0), Some(&6));
        assert_eq!(rb.get(3), Some(&9));
        assert_eq!(rb.get(4), None);
        assert_eq!(rb.last(), Some(&9));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut rb = RingBuffer::new(0);
        assert_eq!(rb.capacity(), 1);
        rb.push("a");
        assert_eq!(rb.push("b"), Some("a"));
        assert_eq!(rb.len(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut rb = RingBuffer::new(5);
        for i in 0..7 {
            rb.push(i);
        }
        rb.clear();
        assert!(rb.is_empty());
        assert_eq!(rb.capacity(), 5);
        assert_eq!(rb.last(), None);
        rb.push(42);
        assert_eq!(rb.get(0), Some(&42));
    }

    #[test]
    fn iterator_reports_exact_size() {
        let mut rb = RingBuffer::new(3);
        rb.push(1.0);
        rb.push(2.0);
        assert_eq!(rb.iter().len(), 2);
    }
}
