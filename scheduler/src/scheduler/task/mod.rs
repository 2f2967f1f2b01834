//! Task records and their lifecycle

pub mod state;
pub mod task;

pub use state::{validate_transition, TaskState};
pub use task::{Heuristics, Task, TaskId, TaskSpec};
