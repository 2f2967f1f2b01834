//! HCFS - Heuristic Completely Fair Scheduler (user space)
//!
//! Coordinates real OS processes with external suspend/resume signals and
//! picks who runs next with CFS virtual-runtime fairness, biased by three
//! deterministic heuristics:
//! - **Aging**: long waiters get a score boost (bounded starvation)
//! - **Burst estimation**: short predicted bursts get an interactivity bonus
//! - **Interactivity score**: reported metric derived from remaining work
//!
//! # Layout
//! - `time`: monotonic clock + deterministic simulated clock
//! - `process`: the suspend/resume/reap capability and its implementations
//! - `scheduler`: tasks, weight table, heuristics, accountant, selector and
//!   the execution loop, plus FCFS/SJF/SRTF/Priority/RR baselines for
//!   comparison runs
//!
//! The core never prints; it logs through `log` and exposes read-only task
//! accessors so a caller can render reports.

pub mod process;
pub mod scheduler;
pub mod time;

#[cfg(test)]
mod tests;

// Re-exports
pub use process::{ExitStatus, ProcessHandle, SignalProcess, SimProcess};
pub use scheduler::{
    weight_for, BaselinePolicy, BaselineRun, BurstEstimator, GanttEntry, RunSummary, SchedConfig,
    Scheduler, SchedulerError, SchedulerResult, SchedulerStats, Step, Task, TaskId, TaskOutcome,
    TaskSpec, TaskState, TraceEvent, NICE_0_WEIGHT,
};
pub use time::{Clock, MonotonicClock, SimClock, Timestamp};
