/// Data structures backing the replay memories
pub mod ds;

/// Experience replay memories
pub mod memory;

/// Time-varying hyperparameter schedules
pub mod schedule;

mod util;
