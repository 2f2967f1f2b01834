//! Task - per-task scheduling record
//!
//! Sections:
//! 1. Identity & timing: id, arrival, burst total/remaining
//! 2. CFS fields: nice, weight, vruntime
//! 3. Heuristic fields (owned by the heuristic engine)
//! 4. Accounting, written once at the matching lifecycle transition
//!
//! All times are milliseconds relative to scheduler start, except
//! `vruntime` which is in nanoseconds.

use core::fmt;

use super::state::{validate_transition, TaskState};
use crate::process::ExitStatus;
use crate::scheduler::core::policy::{clamp_nice, weight_for};

/// Workload entry: `(arrival, burst, nice)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskSpec {
    /// Offset from scheduler start at which the task becomes eligible (ms)
    pub arrival_ms: u64,
    /// Required CPU time (ms), must be > 0
    pub burst_ms: u64,
    /// Priority in [-20, 19] (clamped)
    pub nice: i32,
}

impl TaskSpec {
    pub const fn new(arrival_ms: u64, burst_ms: u64, nice: i32) -> Self {
        Self {
            arrival_ms,
            burst_ms,
            nice,
        }
    }
}

/// Logical task identifier (position in the workload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Heuristic metrics, recomputed each time the task is a selection candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heuristics {
    /// Accumulated time spent eligible but not running (ms)
    pub total_wait_ms: u64,
    /// Anti-starvation level, 0..=aging cap
    pub aging_boost: u32,
    /// Predicted CPU burst (ms), 0 = never estimated
    pub estimated_burst_ms: u64,
    /// Remaining-work percentage (+ interactive bonus), report only
    pub interactivity_score: u32,
    /// Time of the last evaluation (ms)
    pub last_decision_ms: u64,
}

impl Heuristics {
    fn new(arrival_ms: u64) -> Self {
        Self {
            total_wait_ms: 0,
            aging_boost: 0,
            estimated_burst_ms: 0,
            interactivity_score: 100,
            last_decision_ms: arrival_ms,
        }
    }
}

/// Scheduled unit of work wrapping a process handle
#[derive(Debug)]
pub struct Task<P> {
    handle: P,
    id: TaskId,

    arrival_ms: u64,
    burst_total_ms: u64,
    burst_remaining_ms: u64,

    nice: i32,
    weight: u32,
    vruntime_ns: u64,

    state: TaskState,
    pub(crate) heuristics: Heuristics,

    response_time_ms: Option<u64>,
    start_time_ms: Option<u64>,
    finish_time_ms: Option<u64>,
    time_slice_ms: u64,
    slices: u64,
    exit_status: Option<ExitStatus>,
}

impl<P> Task<P> {
    /// Create a Ready task whose vruntime starts at `min_vruntime_ns`
    pub fn new(id: TaskId, spec: TaskSpec, handle: P, min_vruntime_ns: u64) -> Self {
        let nice = clamp_nice(spec.nice);
        Self {
            handle,
            id,
            arrival_ms: spec.arrival_ms,
            burst_total_ms: spec.burst_ms,
            burst_remaining_ms: spec.burst_ms,
            nice,
            weight: weight_for(nice),
            vruntime_ns: min_vruntime_ns,
            state: TaskState::Ready,
            heuristics: Heuristics::new(spec.arrival_ms),
            response_time_ms: None,
            start_time_ms: None,
            finish_time_ms: None,
            time_slice_ms: 0,
            slices: 0,
            exit_status: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn arrival_ms(&self) -> u64 {
        self.arrival_ms
    }

    pub fn burst_total_ms(&self) -> u64 {
        self.burst_total_ms
    }

    pub fn burst_remaining_ms(&self) -> u64 {
        self.burst_remaining_ms
    }

    pub fn nice(&self) -> i32 {
        self.nice
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn vruntime_ns(&self) -> u64 {
        self.vruntime_ns
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    pub fn total_wait_ms(&self) -> u64 {
        self.heuristics.total_wait_ms
    }

    pub fn aging_boost(&self) -> u32 {
        self.heuristics.aging_boost
    }

    pub fn estimated_burst_ms(&self) -> u64 {
        self.heuristics.estimated_burst_ms
    }

    pub fn interactivity_score(&self) -> u32 {
        self.heuristics.interactivity_score
    }

    /// Has the task been dispatched at least once?
    pub fn first_scheduled(&self) -> bool {
        self.response_time_ms.is_some()
    }

    /// Delay between arrival and first dispatch
    pub fn response_time_ms(&self) -> Option<u64> {
        self.response_time_ms
    }

    /// First dispatch time
    pub fn start_time_ms(&self) -> Option<u64> {
        self.start_time_ms
    }

    /// Completion time
    pub fn finish_time_ms(&self) -> Option<u64> {
        self.finish_time_ms
    }

    /// Arrival to completion
    pub fn turnaround_ms(&self) -> Option<u64> {
        self.finish_time_ms
            .map(|finish| finish.saturating_sub(self.arrival_ms))
    }

    /// Turnaround minus required burst; negative if the process finished
    /// its work faster than its nominal burst
    pub fn wait_time_ms(&self) -> Option<i64> {
        self.turnaround_ms()
            .map(|turnaround| turnaround as i64 - self.burst_total_ms as i64)
    }

    /// Slice granted at the last dispatch (ms)
    pub fn time_slice_ms(&self) -> u64 {
        self.time_slice_ms
    }

    /// Number of slices executed
    pub fn slices(&self) -> u64 {
        self.slices
    }

    /// Exit status observed by the completion poll, if any
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    pub fn handle(&self) -> &P {
        &self.handle
    }

    pub(crate) fn handle_mut(&mut self) -> &mut P {
        &mut self.handle
    }

    /// Has the task arrived at `elapsed_ms`?
    pub fn has_arrived(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.arrival_ms
    }

    pub(crate) fn set_state(&mut self, to: TaskState) {
        crate::sched_assert!(
            validate_transition(self.state, to),
            "illegal task state transition"
        );
        self.state = to;
    }

    /// Record first-dispatch accounting (once)
    pub(crate) fn mark_dispatched(&mut self, elapsed_ms: u64, slice_ms: u64) {
        if self.response_time_ms.is_none() {
            self.response_time_ms = Some(elapsed_ms.saturating_sub(self.arrival_ms));
            self.start_time_ms = Some(elapsed_ms);
        }
        self.time_slice_ms = slice_ms;
    }

    /// Burn `executed_ms` of the remaining work (floored at 0)
    pub(crate) fn consume(&mut self, executed_ms: u64) {
        self.burst_remaining_ms = self.burst_remaining_ms.saturating_sub(executed_ms);
        self.slices += 1;
    }

    pub(crate) fn add_vruntime(&mut self, delta_ns: u64) {
        self.vruntime_ns = self.vruntime_ns.saturating_add(delta_ns);
    }

    pub(crate) fn mark_completed(&mut self, elapsed_ms: u64, exit_status: Option<ExitStatus>) {
        self.set_state(TaskState::Completed);
        self.finish_time_ms = Some(elapsed_ms);
        self.exit_status = exit_status;
    }

    /// Late exit status, collected at shutdown
    pub(crate) fn record_exit(&mut self, status: ExitStatus) {
        if self.exit_status.is_none() {
            self.exit_status = Some(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(spec: TaskSpec) -> Task<()> {
        Task::new(TaskId(0), spec, (), 0)
    }

    #[test]
    fn test_task_new() {
        let t = task(TaskSpec::new(15, 80, 5));
        assert_eq!(t.state(), TaskState::Ready);
        assert_eq!(t.weight(), 335);
        assert_eq!(t.burst_remaining_ms(), 80);
        assert_eq!(t.vruntime_ns(), 0);
        assert_eq!(t.interactivity_score(), 100);
        assert_eq!(t.heuristics().last_decision_ms, 15);
        assert!(!t.first_scheduled());
    }

    #[test]
    fn test_task_nice_clamped() {
        let t = task(TaskSpec::new(0, 10, -42));
        assert_eq!(t.nice(), -20);
        assert_eq!(t.weight(), 88761);
    }

    #[test]
    fn test_consume_floors_at_zero() {
        let mut t = task(TaskSpec::new(0, 10, 0));
        t.consume(7);
        assert_eq!(t.burst_remaining_ms(), 3);
        t.consume(7);
        assert_eq!(t.burst_remaining_ms(), 0);
        assert_eq!(t.slices(), 2);
    }

    #[test]
    fn test_dispatch_accounting_written_once() {
        let mut t = task(TaskSpec::new(10, 20, 0));
        t.mark_dispatched(25, 10);
        t.mark_dispatched(60, 10);
        assert_eq!(t.response_time_ms(), Some(15));
        assert_eq!(t.start_time_ms(), Some(25));
    }

    #[test]
    fn test_completion_accounting() {
        let mut t = task(TaskSpec::new(10, 20, 0));
        t.set_state(TaskState::Running);
        t.mark_completed(50, Some(ExitStatus::Exited(0)));
        assert_eq!(t.turnaround_ms(), Some(40));
        assert_eq!(t.wait_time_ms(), Some(20));
        assert_eq!(t.exit_status(), Some(ExitStatus::Exited(0)));
    }

    #[test]
    #[should_panic(expected = "illegal task state transition")]
    fn test_illegal_transition_panics() {
        let mut t = task(TaskSpec::new(0, 10, 0));
        t.set_state(TaskState::Completed);
    }
}
