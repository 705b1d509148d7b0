use rand::{
    distributions::{Distribution, Uniform},
    thread_rng,
};

use crate::{
    assert_interval,
    ds::{MinTree, SumTree},
};

use super::{Exp, ExpBatch, ReplayMemory};

/// A prioritized replay memory, as described in [this paper](https://arxiv.org/abs/1511.05952)
///
/// An improvement over the base replay memory, this implementation samples
/// "surprising" or "valuable" experiences more often, where the amount of
/// surprise is typically approximated by the temporal difference error. A sum
/// tree over the priorities resolves a cumulative-mass draw to a slot in
/// O(log n), and a min tree provides the normalizer for the importance
/// sampling weights in O(1).
///
/// ### Type Parameters
/// - `O`: Observation
/// - `A`: Action
pub struct PrioritizedReplayMemory<O, A> {
    memory: ReplayMemory<O, A>,
    sum_tree: SumTree,
    min_tree: MinTree,
    max_priority: f32,
    alpha: f32,
}

impl<O: Clone, A: Clone> PrioritizedReplayMemory<O, A> {
    /// Initialize a new `PrioritizedReplayMemory`
    ///
    /// ### Arguments
    /// - `capacity`: the maximum number of stored transitions; the internal
    ///   trees round it up to the next power of two
    /// - `alpha`: how strongly sampling favors high-priority transitions, in
    ///   `[0, 1]` where `0` degenerates to uniform sampling
    ///
    /// **Panics** if `capacity` is zero or `alpha` is outside `[0, 1]`
    pub fn new(capacity: usize, alpha: f32) -> Self {
        assert_interval!(alpha, 0.0, 1.0);
        Self {
            memory: ReplayMemory::new(capacity),
            sum_tree: SumTree::new(capacity),
            min_tree: MinTree::new(capacity),
            max_priority: 1.0,
            alpha,
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

    /// Add a new experience to the memory at the maximum priority reported so
    /// far, so fresh experiences are sampled at least once before their real
    /// priority is known
    ///
    /// **Returns** the slot index written; pass it to
    /// [`update_priorities`](PrioritizedReplayMemory::update_priorities) once a
    /// real priority is available
    pub fn push(&mut self, exp: Exp<O, A>) -> usize {
        let ix = self.memory.push(exp);
        let priority = self.max_priority.powf(self.alpha);
        self.sum_tree.set(ix, priority);
        self.min_tree.set(ix, priority);
        ix
    }

    /// Draw `batch_size` slot indices with probability proportional to their
    /// priority mass
    ///
    /// The total mass is partitioned into `batch_size` equal-width segments and
    /// one point is drawn uniformly inside each, so the batch spreads across
    /// the whole mass instead of clustering. Duplicate indices are possible.
    fn sample_proportional(&self, batch_size: usize) -> Vec<usize> {
        let p_total = self.sum_tree.sum(0, self.memory.len());
        assert!(p_total > 0.0, "total priority mass must be positive");
        let segment = p_total / batch_size as f32;

        let mut rng = thread_rng();
        (0..batch_size)
            .map(|i| {
                let mass = Uniform::new(segment * i as f32, segment * (i + 1) as f32)
                    .sample(&mut rng);
                self.sum_tree.prefix_sum_idx(mass)
            })
            .collect()
    }

    /// Sample a batch of prioritized experiences and compute the importance
    /// sampling weight for each
    ///
    /// `beta` controls the strength of the bias correction, where `0` applies
    /// none and `1` fully compensates for the non-uniform sampling. It is
    /// typically annealed toward `1` over training, e.g. with
    /// [`schedule::Linear`](crate::schedule::Linear).
    ///
    /// ### Returns
    /// - `None` if there are fewer experiences stored than can fill a batch
    /// - `Some((batch, weights, idxes))` otherwise
    ///   - `batch`: the sampled experiences, zipped into parallel field sequences
    ///   - `weights`: the importance sampling weights, normalized so the largest
    ///     possible weight is `1.0`
    ///   - `idxes`: the slot indices of the sampled experiences - hold on to
    ///     this and pass it back to
    ///     [`update_priorities`](PrioritizedReplayMemory::update_priorities)
    ///     along with the computed priorities
    ///
    /// **Panics** if `batch_size` is zero or `beta` is outside `[0, 1]`
    pub fn sample(
        &self,
        batch_size: usize,
        beta: f32,
    ) -> Option<(ExpBatch<O, A>, Vec<f32>, Vec<usize>)> {
        assert!(batch_size > 0, "`batch_size` must be positive");
        assert_interval!(beta, 0.0, 1.0);

        let n = self.memory.len();
        if batch_size > n {
            log::warn!("requested a batch of {batch_size} but only {n} experiences are stored");
            return None;
        }

        let idxes = self.sample_proportional(batch_size);

        let total = self.sum_tree.total();
        let p_min = self.min_tree.min_all() / total;
        let max_weight = (p_min * n as f32).powf(-beta);

        let weights = idxes
            .iter()
            .map(|&ix| {
                let p_sample = self.sum_tree.get(ix) / total;
                (p_sample * n as f32).powf(-beta) / max_weight
            })
            .collect();

        let batch = self.memory.gather(&idxes);

        Some((batch, weights, idxes))
    }

    /// Update the priorities of previously sampled experiences, typically to
    /// `|TD error| + ε` after training on them
    ///
    /// Writes `priority^alpha` into both trees at each slot and raises the
    /// running maximum priority used for fresh pushes.
    ///
    /// **Panics** if `idxes` and `priorities` do not have the same length, or
    /// if any priority is negative
    pub fn update_priorities(&mut self, idxes: &[usize], priorities: &[f32]) {
        assert_eq!(
            idxes.len(),
            priorities.len(),
            "`idxes` and `priorities` are the same length"
        );

        for (&ix, &priority) in idxes.iter().zip(priorities) {
            assert!(priority >= 0.0, "priorities must be non-negative");
            let value = priority.powf(self.alpha);
            self.sum_tree.set(ix, value);
            self.min_tree.set(ix, value);
            self.max_priority = self.max_priority.max(priority);
        }

        log::trace!(
            "updated {} priorities, max priority is now {}",
            idxes.len(),
            self.max_priority
        );
    }
}

#[cfg(test)]
mod tests {
    use statrs::distribution::Binomial;
    use statrs::statistics::Distribution;

    use super::*;

    const MEMORY_CAP: usize = 4;

    fn mock_exp(i: i32) -> Exp<i32, i32> {
        Exp {
            obs: i,
            action: i + 1,
            reward: 1.0,
            next_obs: i + 1,
            done: false,
        }
    }

    fn filled_memory(alpha: f32) -> PrioritizedReplayMemory<i32, i32> {
        let mut memory = PrioritizedReplayMemory::new(MEMORY_CAP, alpha);
        for i in 0..MEMORY_CAP as i32 {
            memory.push(mock_exp(i));
        }
        memory
    }

    #[test]
    fn priorities_track_adds_and_updates() {
        let mut memory = filled_memory(1.0);
        assert_eq!(
            memory.sum_tree.total(),
            4.0,
            "fresh experiences carry the initial max priority of 1.0"
        );

        memory.update_priorities(&[0, 1, 2, 3], &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(memory.sum_tree.total(), 10.0, "total tracks updates");
        assert_eq!(memory.max_priority, 4.0, "max priority raised");
        assert_eq!(memory.min_tree.min_all(), 1.0, "min tree tracks updates");

        assert_eq!(memory.sum_tree.prefix_sum_idx(0.5), 0, "priority 1 spans [0, 1)");
        assert_eq!(memory.sum_tree.prefix_sum_idx(2.5), 1, "priority 2 spans [1, 3)");
        assert_eq!(memory.sum_tree.prefix_sum_idx(9.9), 3, "priority 4 spans [6, 10)");
    }

    #[test]
    fn fresh_push_uses_max_priority_at_insertion_time() {
        let mut memory = PrioritizedReplayMemory::new(MEMORY_CAP, 1.0);
        let first = memory.push(mock_exp(0));
        assert_eq!(memory.sum_tree.get(first), 1.0);

        memory.update_priorities(&[first], &[5.0]);
        let second = memory.push(mock_exp(1));
        assert_eq!(
            memory.sum_tree.get(second),
            5.0,
            "new push takes the raised max priority"
        );

        memory.update_priorities(&[second], &[10.0]);
        assert_eq!(
            memory.sum_tree.get(first),
            5.0,
            "earlier slot keeps the priority it was given at insertion"
        );
    }

    #[test]
    fn alpha_transforms_written_priorities() {
        let mut memory = filled_memory(0.5);
        memory.update_priorities(&[0], &[4.0]);
        assert!(
            (memory.sum_tree.get(0) - 2.0).abs() < 1e-6,
            "priority^alpha is written into the tree"
        );

        let ix = memory.push(mock_exp(9));
        assert!(
            (memory.sum_tree.get(ix) - 2.0).abs() < 1e-6,
            "fresh push writes max_priority^alpha"
        );
    }

    #[test]
    fn update_priorities_is_idempotent() {
        let mut memory = filled_memory(1.0);
        memory.update_priorities(&[1], &[3.0]);
        let total = memory.sum_tree.total();
        let min = memory.min_tree.min_all();

        memory.update_priorities(&[1], &[3.0]);
        assert_eq!(memory.sum_tree.total(), total, "repeated update leaves the sum");
        assert_eq!(memory.min_tree.min_all(), min, "repeated update leaves the min");
        assert_eq!(memory.max_priority, 3.0);
    }

    #[test]
    fn eviction_resets_priority_of_reused_slot() {
        let mut memory = filled_memory(1.0);
        memory.update_priorities(&[0, 1, 2, 3], &[1.0, 2.0, 3.0, 4.0]);

        // Slot 0 is the next to be reused; its stale priority 1.0 is replaced
        // by the current max priority
        let ix = memory.push(mock_exp(9));
        assert_eq!(ix, 0, "round-robin reuse of slot 0");
        assert_eq!(memory.len(), MEMORY_CAP, "length stays at capacity");
        assert_eq!(
            memory.sum_tree.total(),
            13.0,
            "evicted slot now carries the max priority of 4.0"
        );
    }

    #[test]
    fn sample_rejects_oversized_batch() {
        let mut memory = PrioritizedReplayMemory::new(MEMORY_CAP, 1.0);
        assert!(memory.sample(1, 1.0).is_none(), "sample none when empty");

        memory.push(mock_exp(0));
        assert!(
            memory.sample(2, 1.0).is_none(),
            "sample none when too few experiences"
        );
        assert!(memory.sample(1, 1.0).is_some(), "sample works at the boundary");
    }

    #[test]
    fn sample_weights_are_normalized() {
        let mut memory = filled_memory(1.0);

        let (batch, weights, idxes) = memory.sample(4, 1.0).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(idxes.len(), 4);
        assert!(
            weights.iter().all(|&w| (w - 1.0).abs() < 1e-6),
            "uniform priorities give every sample full weight"
        );

        memory.update_priorities(&[0, 1, 2, 3], &[1.0, 2.0, 3.0, 4.0]);
        let (_, weights, idxes) = memory.sample(4, 1.0).unwrap();
        for (w, ix) in weights.iter().zip(&idxes) {
            assert!(*w > 0.0 && *w <= 1.0 + 1e-6, "weights lie in (0, 1]");
            if *ix == 0 {
                assert!(
                    (w - 1.0).abs() < 1e-6,
                    "the minimum-priority slot takes the maximum weight"
                );
            }
        }

        let (_, weights, _) = memory.sample(4, 0.0).unwrap();
        assert!(
            weights.iter().all(|&w| (w - 1.0).abs() < 1e-6),
            "beta 0 applies no correction"
        );
    }

    #[test]
    fn sampled_batch_matches_indices() {
        let memory = filled_memory(1.0);
        let (batch, _, idxes) = memory.sample(3, 0.5).unwrap();
        for (i, &ix) in idxes.iter().enumerate() {
            assert_eq!(batch.obs[i], ix as i32, "batch field rows line up with idxes");
            assert_eq!(batch.actions[i], ix as i32 + 1);
        }
    }

    #[test]
    fn sampling_frequency_follows_priority_mass() {
        let mut memory = filled_memory(1.0);
        memory.update_priorities(&[0, 1, 2, 3], &[1.0, 2.0, 3.0, 4.0]);

        const ROUNDS: usize = 2000;
        const BATCH: usize = 4;
        let mut counts = [0u64; MEMORY_CAP];
        for _ in 0..ROUNDS {
            for ix in memory.sample_proportional(BATCH) {
                counts[ix] += 1;
            }
        }

        // Stratification only lowers the variance, so a binomial bound is safe
        let draws = (ROUNDS * BATCH) as u64;
        for (ix, &count) in counts.iter().enumerate() {
            let p = memory.sum_tree.get(ix) as f64 / memory.sum_tree.total() as f64;
            let binomial = Binomial::new(p, draws).unwrap();
            let mean = binomial.mean().unwrap();
            let sd = binomial.std_dev().unwrap();
            assert!(
                (count as f64 - mean).abs() < 5.0 * sd,
                "index {ix} sampled {count} times, expected {mean:.0} ± {:.0}",
                5.0 * sd
            );
        }
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn update_priorities_rejects_mismatched_lengths() {
        filled_memory(1.0).update_priorities(&[0, 1], &[1.0]);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn update_priorities_rejects_negative_priority() {
        filled_memory(1.0).update_priorities(&[0], &[-1.0]);
    }

    #[test]
    #[should_panic(expected = "Invalid value for `alpha`")]
    fn new_rejects_alpha_out_of_range() {
        PrioritizedReplayMemory::<i32, i32>::new(MEMORY_CAP, 1.5);
    }
}
