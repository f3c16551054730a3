/// Bounded circular buffer used by endpoints to hold chunks and events until
/// a consumer drains them.
///
/// Wrap in `parking_lot::Mutex` for cross-thread access.
///
/// Overflow behavior: drops oldest items.
#[derive(Debug)]
pub struct RingBuffer<T> {
    buffer: Vec<Option<T>>,
    write_index: usize,
    read_index: usize,
    available: usize,
    dropped: u64,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || None);
        Self {
            buffer,
            write_index: 0,
            read_index: 0,
            available: 0,
            dropped: 0,
        }
    }

    /// Append one item, evicting the oldest if the buffer is full.
    pub fn push(&mut self, item: T) {
        let capacity = self.capacity();
        if self.available == capacity {
            self.buffer[self.read_index] = None;
            self.read_index = (self.read_index + 1) % capacity;
            self.available -= 1;
            self.dropped += 1;
        }
        self.buffer[self.write_index] = Some(item);
        self.write_index = (self.write_index + 1) % capacity;
        self.available += 1;
    }

    /// Remove and return up to `count` items, oldest first.
    pub fn drain(&mut self, count: usize) -> Vec<T> {
        let to_read = count.min(self.available);
        let capacity = self.capacity();
        let mut result = Vec::with_capacity(to_read);
        for _ in 0..to_read {
            if let Some(item) = self.buffer[self.read_index].take() {
                result.push(item);
            }
            self.read_index = (self.read_index + 1) % capacity;
        }
        self.available -= to_read;
        result
    }

    /// Number of items currently held.
    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Items evicted by overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_push_drain() {
        let mut buf = RingBuffer::new(10);
        buf.push(1);
        buf.push(2);
        buf.push(3);

        assert_eq!(buf.count(), 3);
        assert_eq!(buf.drain(3), vec![1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_partial() {
        let mut buf = RingBuffer::new(10);
        for i in 1..=5 {
            buf.push(i);
        }

        assert_eq!(buf.drain(3), vec![1, 2, 3]);
        assert_eq!(buf.count(), 2);

        let rest = buf.drain(10); // request more than available
        assert_eq!(rest, vec![4, 5]);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = RingBuffer::new(4);
        for i in 1..=6 {
            buf.push(i);
        }

        assert_eq!(buf.count(), 4);
        assert_eq!(buf.dropped(), 2);
        assert_eq!(buf.drain(4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn wraparound() {
        let mut buf = RingBuffer::new(4);
        buf.push("a");
        buf.push("b");
        buf.push("c");
        buf.drain(2);

        buf.push("d");
        buf.push("e");
        buf.push("f");

        assert_eq!(buf.count(), 4);
        assert_eq!(buf.drain(4), vec!["c", "d", "e", "f"]);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut buf = RingBuffer::new(0);
        buf.push(1);
        buf.push(2);
        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.drain(5), vec![2]);
    }
}
