//! Time management
//!
//! Every elapsed-time computation in the scheduler goes through a [`Clock`]:
//! the real one is monotonic (immune to wall-clock steps), the simulated one
//! only moves when somebody sleeps on it or advances it explicitly.

pub mod clock;

// Re-exports
pub use clock::{Clock, MonotonicClock, SimClock, Timestamp};
