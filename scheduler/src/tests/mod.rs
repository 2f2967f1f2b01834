//! Scenario tests - full execution loop on simulated processes
//!
//! Every test runs on a `SimClock` shared between the scheduler and its
//! `SimProcess` handles; nothing is forked.

mod scenario_tests;

use crate::process::SimProcess;
use crate::scheduler::{SchedConfig, Scheduler, TaskSpec};
use crate::time::SimClock;

/// The six-task reference workload
pub(crate) const REFERENCE_WORKLOAD: [TaskSpec; 6] = [
    TaskSpec::new(0, 60, 0),
    TaskSpec::new(10, 20, -5),
    TaskSpec::new(15, 80, 5),
    TaskSpec::new(20, 30, 0),
    TaskSpec::new(30, 15, -10),
    TaskSpec::new(35, 50, 0),
];

/// Scheduler over simulated processes whose work equals their burst
pub(crate) fn sim_scheduler(
    clock: &SimClock,
    specs: &[TaskSpec],
    config: SchedConfig,
) -> Scheduler<SimProcess, SimClock> {
    let workload = specs
        .iter()
        .map(|spec| (*spec, SimProcess::new(clock.clone(), spec.burst_ms)))
        .collect();
    Scheduler::new(config, clock.clone(), workload).unwrap()
}
