use rand::{seq::SliceRandom, thread_rng};

use crate::ds::RingBuffer;

use super::{Exp, ExpBatch};

/// A fixed-size memory storage for reinforcement learning experiences
///
/// This structure uses a ring buffer to store transitions, overwriting slots
/// round-robin once it reaches its capacity.
///
/// ### Type Parameters
/// - `O`: Observation
/// - `A`: Action
pub struct ReplayMemory<O, A> {
    memory: RingBuffer<Exp<O, A>>,
}

impl<O: Clone, A: Clone> ReplayMemory<O, A> {
    /// Initialize a new `ReplayMemory` with a given capacity
    ///
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Returns the number of stored transitions
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Add a new experience to the memory, overwriting the oldest write once at
    /// capacity
    ///
    /// **Returns** the slot index written
    pub fn push(&mut self, exp: Exp<O, A>) -> usize {
        self.memory.push(exp)
    }

    /// Sample a batch of `batch_size` distinct experiences uniformly at random,
    /// without replacement
    ///
    /// ### Returns
    /// - `None` if there are fewer experiences stored than can fill a batch
    /// - `Some(experiences)` otherwise
    pub fn sample(&self, batch_size: usize) -> Option<Vec<&Exp<O, A>>> {
        if batch_size > self.memory.len() {
            return None;
        }
        Some(
            self.memory
                .view()
                .choose_multiple(&mut thread_rng(), batch_size)
                .collect(),
        )
    }

    /// Sample a batch of `batch_size` distinct experiences uniformly at random
    /// and zip them into parallel field sequences
    ///
    /// ### Returns
    /// - `None` if there are fewer experiences stored than can fill a batch
    /// - `Some(batch)` otherwise
    pub fn sample_zipped(&self, batch_size: usize) -> Option<ExpBatch<O, A>> {
        if batch_size > self.memory.len() {
            return None;
        }
        let experiences = self
            .memory
            .view()
            .choose_multiple(&mut thread_rng(), batch_size)
            .cloned();
        Some(ExpBatch::from_iter(experiences, batch_size))
    }

    /// Clone the experiences at the provided slot indices into a zipped batch
    ///
    /// **Panics** if any index is out of the populated range
    pub fn gather(&self, idxes: &[usize]) -> ExpBatch<O, A> {
        ExpBatch::from_iter(idxes.iter().map(|&ix| self.memory[ix].clone()), idxes.len())
    }
}
