//! Scheduler core
//!
//! - `policy`: weight table, tunables
//! - `accounting`: vruntime + `min_vruntime`
//! - `selector`: composite score pick
//! - `scheduler`: the execution loop
//! - `statistics` / `trace`: what the loop records for reporting

pub mod accounting;
pub mod error;
pub mod policy;
pub mod scheduler;
pub mod selector;
pub mod statistics;
pub mod trace;

pub use accounting::VruntimeAccountant;
pub use error::{SchedulerError, SchedulerResult};
pub use policy::{
    clamp_nice, weight_for, BurstEstimator, SchedConfig, NICE_0_WEIGHT, NICE_MAX, NICE_MIN,
    NICE_TO_WEIGHT,
};
pub use scheduler::{Scheduler, Step};
pub use selector::{Selection, Selector};
pub use statistics::{RunSummary, SchedulerStats, TaskOutcome};
pub use trace::{GanttEntry, Trace, TraceEvent};
