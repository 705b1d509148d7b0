/// Represents a single experience or transition in the environment
///
/// The memory stores and returns these verbatim; it never interprets the
/// observation or action fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Exp<O, A> {
    /// The observation before taking the action
    pub obs: O,
    /// The action taken given the observation
    pub action: A,
    /// The reward received after taking the action
    pub reward: f32,
    /// The observation after the action is taken
    pub next_obs: O,
    /// Whether the episode terminated on this transition
    pub done: bool,
}

/// A zipped batch of [experiences](Exp), one sequence per field, for vectorized
/// consumption by a training loop
#[derive(Clone, Debug)]
pub struct ExpBatch<O, A> {
    /// The observations before taking the actions
    pub obs: Vec<O>,
    /// The actions taken given the observations
    pub actions: Vec<A>,
    /// The rewards received after taking the actions
    pub rewards: Vec<f32>,
    /// The observations after the actions were taken
    pub next_obs: Vec<O>,
    /// The terminal flags of the transitions
    pub dones: Vec<bool>,
}

impl<O, A> ExpBatch<O, A> {
    /// Construct an `ExpBatch` from an iterator of [experiences](Exp) and a
    /// specified batch size
    pub fn from_iter(iter: impl IntoIterator<Item = Exp<O, A>>, batch_size: usize) -> Self {
        let batch = Self {
            obs: Vec::with_capacity(batch_size),
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
            next_obs: Vec::with_capacity(batch_size),
            dones: Vec::with_capacity(batch_size),
        };

        iter.into_iter().fold(batch, |mut b, e| {
            b.obs.push(e.obs);
            b.actions.push(e.action);
            b.rewards.push(e.reward);
            b.next_obs.push(e.next_obs);
            b.dones.push(e.done);
            b
        })
    }

    /// Returns the number of transitions in the batch
    pub fn len(&self) -> usize {
        self.obs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }
}
