//! Scheduler subsystem
//!
//! CFS virtual-runtime fairness with aging, burst-estimation and
//! interactivity heuristics, over externally controlled processes.
//! `baseline` holds the classic policies it is compared against.

pub mod baseline;
pub mod core;
pub mod prediction;
pub mod task;

// Re-exports
pub use baseline::{BaselinePolicy, BaselineRun};
pub use self::core::{
    weight_for, BurstEstimator, GanttEntry, RunSummary, SchedConfig, Scheduler, SchedulerError,
    SchedulerResult, SchedulerStats, Step, TaskOutcome, TraceEvent, NICE_0_WEIGHT, NICE_MAX, NICE_MIN,
};
pub use prediction::HeuristicEngine;
pub use task::{Task, TaskId, TaskSpec, TaskState};
