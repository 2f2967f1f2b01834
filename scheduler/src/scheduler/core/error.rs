//! Scheduler Error Handling
//!
//! Typed errors with recovery hints. Two families:
//! - configuration errors, returned before the loop starts (fatal)
//! - process-control errors, logged and swallowed by the loop (non-fatal)
//!
//! Arithmetic invariant violations are not errors: they go through
//! [`sched_assert!`](crate::sched_assert) and panic.

use core::fmt;

/// Scheduler error types with detailed context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    // ═══════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════
    /// No task to schedule
    EmptyWorkload,

    /// More tasks than the configured capacity
    CapacityExceeded { requested: usize, max: usize },

    /// A task asks for no CPU time at all
    InvalidBurst { task: usize, burst_ms: u64 },

    /// Inconsistent scheduler tunables
    InvalidConfig { reason: &'static str },

    // ═══════════════════════════════════════════════════════════════
    // Process-Control Errors
    // ═══════════════════════════════════════════════════════════════
    /// Signal delivery failed (target gone, permission, ...)
    Signal {
        pid: i32,
        signal: &'static str,
        errno: i32,
    },

    /// `waitpid` failed
    Reap { pid: i32, errno: i32 },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWorkload => write!(f, "Workload is empty"),
            Self::CapacityExceeded { requested, max } => {
                write!(f, "Task capacity exceeded: {}/{}", requested, max)
            }
            Self::InvalidBurst { task, burst_ms } => {
                write!(f, "Task {} has invalid burst {} ms", task, burst_ms)
            }
            Self::InvalidConfig { reason } => write!(f, "Invalid config: {}", reason),
            Self::Signal { pid, signal, errno } => {
                write!(f, "{} to pid {} failed (errno {})", signal, pid, errno)
            }
            Self::Reap { pid, errno } => write!(f, "waitpid({}) failed (errno {})", pid, errno),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Get recovery hint for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::EmptyWorkload => "Provide at least one task",
            Self::CapacityExceeded { .. } => "Raise max_tasks or split the workload",
            Self::InvalidBurst { .. } => "Burst time must be > 0 ms",
            Self::InvalidConfig { .. } => "Check scheduler configuration",
            Self::Signal { .. } => "Process may have already exited; next poll will tell",
            Self::Reap { .. } => "Process may have been reaped elsewhere",
        }
    }

    /// Is this a recoverable error?
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Signal { .. } | Self::Reap { .. })
    }
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Macro for critical scheduler assertions
#[macro_export]
macro_rules! sched_assert {
    ($cond:expr, $reason:expr) => {
        if !$cond {
            panic!("[SCHED CRITICAL] Invariant violated: {}", $reason);
        }
    };
}
