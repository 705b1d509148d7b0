mod base;
mod exp;
mod prioritized;

pub use base::ReplayMemory;
pub use exp::*;
pub use prioritized::PrioritizedReplayMemory;
