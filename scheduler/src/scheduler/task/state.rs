//! State - Task state machine
//!
//! `Ready → Running → {Stopped ⇄ Running} → Completed`
//!
//! "Awaiting arrival" is not a state: it is derived from the clock by the
//! selector (`elapsed < arrival`), so it can never desync from time.

use core::fmt;

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Registered, never dispatched
    Ready,

    /// Holds the (simulated) CPU
    Running,

    /// Suspended after a slice, still has work
    Stopped,

    /// Terminal
    Completed,
}

impl TaskState {
    /// Can the selector pick a task in this state?
    pub fn is_schedulable(self) -> bool {
        matches!(self, Self::Ready | Self::Stopped)
    }

    /// Is this the terminal state?
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Validate state transition
pub fn validate_transition(from: TaskState, to: TaskState) -> bool {
    use TaskState::*;

    match (from, to) {
        // Dispatch / re-dispatch
        (Ready, Running) | (Stopped, Running) => true,

        // Preemption at the end of a slice
        (Running, Stopped) => true,

        // Suspending an already stopped task is a no-op
        (Stopped, Stopped) => true,

        // Budget exhausted or natural exit
        (Running, Completed) => true,

        _ => false,
    }
}
