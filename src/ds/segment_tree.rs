use std::marker::PhantomData;

/// An associative reduction used to aggregate the nodes of a [`SegmentTree`]
pub trait TreeOp {
    /// The identity element of the operation: `combine(IDENTITY, x) == x`
    const IDENTITY: f32;

    /// Combine two child aggregates into their parent's value
    ///
    /// Must be associative.
    fn combine(a: f32, b: f32) -> f32;
}

/// Addition, identity `0.0`
pub enum Sum {}

impl TreeOp for Sum {
    const IDENTITY: f32 = 0.0;

    fn combine(a: f32, b: f32) -> f32 {
        a + b
    }
}

/// Minimum, identity `+∞`
pub enum Min {}

impl TreeOp for Min {
    const IDENTITY: f32 = f32::INFINITY;

    fn combine(a: f32, b: f32) -> f32 {
        a.min(b)
    }
}

/// A binary tree over a fixed-size array of values where each parent node holds
/// the reduction of its two children
///
/// Supports O(log n) point updates and O(log n) range reductions. The reduction
/// operation is supplied as a type parameter, so specializations like [`SumTree`]
/// and [`MinTree`] share the same mechanics.
///
/// Nodes are stored 1-rooted: node `k` has children `2k` and `2k + 1`, and leaf
/// `i` lives at `capacity + i`. Leaves that were never set hold the operation's
/// identity and therefore do not distort aggregate queries.
pub struct SegmentTree<O: TreeOp> {
    value: Vec<f32>,
    capacity: usize,
    op: PhantomData<O>,
}

impl<O: TreeOp> SegmentTree<O> {
    /// Initialize a new `SegmentTree` with a given capacity, rounded up to the
    /// next power of two
    ///
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "`capacity` must be positive");
        let capacity = capacity.next_power_of_two();
        Self {
            value: vec![O::IDENTITY; 2 * capacity],
            capacity,
            op: PhantomData,
        }
    }

    /// Returns the leaf capacity (always a power of two)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write `value` at leaf `ix` and recompute every ancestor up to the root
    ///
    /// **Panics** if `ix` is out of bounds
    pub fn set(&mut self, ix: usize, value: f32) {
        assert!(
            ix < self.capacity,
            "index {ix} out of bounds for capacity {}",
            self.capacity
        );

        let mut node = ix + self.capacity;
        self.value[node] = value;
        node /= 2;
        while node >= 1 {
            self.value[node] = O::combine(self.value[2 * node], self.value[2 * node + 1]);
            node /= 2;
        }
    }

    /// Get the raw value stored at leaf `ix`
    ///
    /// **Panics** if `ix` is out of bounds
    pub fn get(&self, ix: usize) -> f32 {
        assert!(
            ix < self.capacity,
            "index {ix} out of bounds for capacity {}",
            self.capacity
        );
        self.value[self.capacity + ix]
    }

    /// Reduce the leaves in the half-open range `[start, end)`
    ///
    /// The range is decomposed recursively, visiting only subtrees that overlap
    /// it. An empty range reduces to the identity.
    ///
    /// **Panics** if `start > end` or `end > capacity`
    pub fn reduce(&self, start: usize, end: usize) -> f32 {
        assert!(
            start <= end && end <= self.capacity,
            "invalid range [{start}, {end}) for capacity {}",
            self.capacity
        );
        if start == end {
            return O::IDENTITY;
        }
        self.reduce_node(start, end, 1, 0, self.capacity)
    }

    /// Reduce all leaves, i.e. the value at the root
    pub fn reduce_all(&self) -> f32 {
        self.value[1]
    }

    // `node` spans the leaf range `[node_start, node_end)`; the query range is
    // non-empty and contained within it
    fn reduce_node(
        &self,
        start: usize,
        end: usize,
        node: usize,
        node_start: usize,
        node_end: usize,
    ) -> f32 {
        if start == node_start && end == node_end {
            return self.value[node];
        }

        let mid = (node_start + node_end) / 2;
        if end <= mid {
            self.reduce_node(start, end, 2 * node, node_start, mid)
        } else if start >= mid {
            self.reduce_node(start, end, 2 * node + 1, mid, node_end)
        } else {
            O::combine(
                self.reduce_node(start, mid, 2 * node, node_start, mid),
                self.reduce_node(mid, end, 2 * node + 1, mid, node_end),
            )
        }
    }
}

/// A [`SegmentTree`] where each parent node is the sum of its children
pub type SumTree = SegmentTree<Sum>;

/// A [`SegmentTree`] where each parent node is the minimum of its children
pub type MinTree = SegmentTree<Min>;

impl SegmentTree<Sum> {
    /// Sum of the leaves in `[start, end)`
    pub fn sum(&self, start: usize, end: usize) -> f32 {
        self.reduce(start, end)
    }

    /// Sum of all leaves
    pub fn total(&self) -> f32 {
        self.reduce_all()
    }

    /// Find the smallest leaf index `i` such that the sum of leaves `[0, i]`
    /// exceeds `mass`
    ///
    /// Walks from the root in O(log n): descends left when the left child alone
    /// outweighs the remaining mass, otherwise subtracts it and descends right.
    /// A right child holding zero mass also forces a left descent, so a `mass`
    /// at or beyond the total lands on the last leaf with nonzero value rather
    /// than overrunning into unpopulated leaves.
    pub fn prefix_sum_idx(&self, mass: f32) -> usize {
        let mut mass = mass;
        let mut node = 1;
        while node < self.capacity {
            let left = self.value[2 * node];
            if left > mass || self.value[2 * node + 1] == 0.0 {
                node *= 2;
            } else {
                mass -= left;
                node = 2 * node + 1;
            }
        }
        node - self.capacity
    }
}

impl SegmentTree<Min> {
    /// Minimum of the leaves in `[start, end)`
    pub fn min(&self, start: usize, end: usize) -> f32 {
        self.reduce(start, end)
    }

    /// Minimum of all leaves
    pub fn min_all(&self) -> f32 {
        self.reduce_all()
    }
}
