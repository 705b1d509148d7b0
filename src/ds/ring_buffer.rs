#![allow(clippy::len_without_is_empty)]
use std::ops::Index;

/// A fixed-capacity circular buffer
///
/// Fills up to `capacity`, then reuses slots round-robin: each push overwrites
/// the slot whose turn comes next, regardless of what it holds.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    next_ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Initialize a new `RingBuffer` with a given capacity
    ///
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "`capacity` must be positive");
        Self {
            buffer: Vec::with_capacity(capacity),
            next_ix: 0,
            capacity,
        }
    }

    /// Returns the number of populated slots
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an element, overwriting the slot at the cursor once the buffer is
    /// full, and return the slot index written
    pub fn push(&mut self, item: T) -> usize {
        let ix = self.next_ix;
        if ix < self.buffer.len() {
            self.buffer[ix] = item;
        } else {
            self.buffer.push(item);
        }
        self.next_ix = (ix + 1) % self.capacity;
        ix
    }

    /// Get a slice view of the populated slots
    pub fn view(&self) -> &[T] {
        &self.buffer
    }
}

impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.buffer[index]
    }
}
