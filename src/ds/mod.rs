mod ring_buffer;
mod segment_tree;

pub use ring_buffer::RingBuffer;
pub use segment_tree::{Min, MinTree, SegmentTree, Sum, SumTree, TreeOp};
