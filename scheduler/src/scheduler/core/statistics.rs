//! Statistics - run counters and end-of-run summary
//!
//! `SchedulerStats` is updated by the execution loop as it goes.
//! `RunSummary` is computed once from the task records after the loop, or
//! from the outcomes of a baseline policy run on the same workload.

use crate::scheduler::task::{Task, TaskId};

/// Execution loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Slices handed out
    pub dispatches: u64,

    /// Dispatches of a task other than the previous one
    pub context_switches: u64,

    /// Selector invocations
    pub selections: u64,

    /// Ticks spent with nothing eligible
    pub idle_ticks: u64,

    /// Slices that ended with the task suspended
    pub preemptions: u64,

    /// Tasks that reached Completed
    pub completions: u64,

    /// Suspend/resume/poll failures that were logged and ignored
    pub signal_failures: u64,
}

impl SchedulerStats {
    pub const fn new() -> Self {
        Self {
            dispatches: 0,
            context_switches: 0,
            selections: 0,
            idle_ticks: 0,
            preemptions: 0,
            completions: 0,
            signal_failures: 0,
        }
    }

    /// Record a dispatch; `switched` is true when the CPU changes hands
    pub fn record_dispatch(&mut self, switched: bool) {
        self.dispatches += 1;
        if switched {
            self.context_switches += 1;
        }
    }

    pub fn record_selection(&mut self) {
        self.selections += 1;
    }

    pub fn record_idle(&mut self) {
        self.idle_ticks += 1;
    }

    pub fn record_preemption(&mut self) {
        self.preemptions += 1;
    }

    pub fn record_completion(&mut self) {
        self.completions += 1;
    }

    pub fn record_signal_failure(&mut self) {
        self.signal_failures += 1;
    }
}

/// Timing of one completed task, whatever policy ran it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task: TaskId,
    pub arrival_ms: u64,
    /// Nominal burst the wait time is measured against
    pub burst_ms: u64,
    pub start_ms: u64,
    pub finish_ms: u64,
}

impl TaskOutcome {
    pub fn turnaround_ms(&self) -> u64 {
        self.finish_ms.saturating_sub(self.arrival_ms)
    }

    pub fn response_ms(&self) -> u64 {
        self.start_ms.saturating_sub(self.arrival_ms)
    }

    /// Negative if the work was done faster than the nominal burst
    pub fn wait_ms(&self) -> i64 {
        self.turnaround_ms() as i64 - self.burst_ms as i64
    }

    /// `None` until the task has both started and finished
    pub fn of_task<P>(task: &Task<P>) -> Option<Self> {
        Some(Self {
            task: task.id(),
            arrival_ms: task.arrival_ms(),
            burst_ms: task.burst_total_ms(),
            start_ms: task.start_time_ms()?,
            finish_ms: task.finish_time_ms()?,
        })
    }
}

/// Aggregate metrics over completed tasks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Completed tasks the figures are computed over
    pub tasks: usize,
    pub avg_wait_ms: f64,
    pub min_wait_ms: i64,
    pub max_wait_ms: i64,
    pub avg_turnaround_ms: f64,
    pub avg_response_ms: f64,
    /// Earliest arrival to last completion
    pub makespan_ms: u64,
    /// Completed tasks per second of makespan
    pub throughput_per_sec: f64,
    /// Sum of bursts over makespan, in percent
    pub cpu_utilization: f64,
}

impl RunSummary {
    /// Summarise the completed tasks; `None` when nothing completed
    pub fn from_tasks<P>(tasks: &[Task<P>]) -> Option<Self> {
        let done: Vec<TaskOutcome> = tasks.iter().filter_map(TaskOutcome::of_task).collect();
        Self::from_outcomes(&done)
    }

    pub fn from_outcomes(done: &[TaskOutcome]) -> Option<Self> {
        if done.is_empty() {
            return None;
        }

        let n = done.len();
        let waits: Vec<i64> = done.iter().map(TaskOutcome::wait_ms).collect();
        let turnaround: u64 = done.iter().map(TaskOutcome::turnaround_ms).sum();
        let response: u64 = done.iter().map(TaskOutcome::response_ms).sum();
        let busy: u64 = done.iter().map(|t| t.burst_ms).sum();

        let first_arrival = done.iter().map(|t| t.arrival_ms).min().unwrap_or(0);
        let last_finish = done.iter().map(|t| t.finish_ms).max().unwrap_or(0);
        let makespan_ms = last_finish.saturating_sub(first_arrival);

        let (throughput_per_sec, cpu_utilization) = if makespan_ms > 0 {
            (
                n as f64 * 1000.0 / makespan_ms as f64,
                busy as f64 * 100.0 / makespan_ms as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Some(Self {
            tasks: n,
            avg_wait_ms: waits.iter().sum::<i64>() as f64 / n as f64,
            min_wait_ms: waits.iter().copied().min().unwrap_or(0),
            max_wait_ms: waits.iter().copied().max().unwrap_or(0),
            avg_turnaround_ms: turnaround as f64 / n as f64,
            avg_response_ms: response as f64 / n as f64,
            makespan_ms,
            throughput_per_sec,
            cpu_utilization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::task::{TaskId, TaskSpec, TaskState};

    fn finished(id: usize, arrival: u64, burst: u64, start: u64, finish: u64) -> Task<()> {
        let mut t = Task::new(TaskId(id), TaskSpec::new(arrival, burst, 0), (), 0);
        t.set_state(TaskState::Running);
        t.mark_dispatched(start, 10);
        t.consume(burst);
        t.mark_completed(finish, None);
        t
    }

    #[test]
    fn test_stats_counters() {
        let mut stats = SchedulerStats::new();
        stats.record_dispatch(true);
        stats.record_dispatch(false);
        stats.record_preemption();
        stats.record_idle();
        assert_eq!(stats.dispatches, 2);
        assert_eq!(stats.context_switches, 1);
        assert_eq!(stats.preemptions, 1);
        assert_eq!(stats.idle_ticks, 1);
        assert_eq!(stats.completions, 0);
    }

    #[test]
    fn test_summary_none_without_completions() {
        let tasks = vec![Task::new(TaskId(0), TaskSpec::new(0, 10, 0), (), 0)];
        assert_eq!(RunSummary::from_tasks(&tasks), None);
    }

    #[test]
    fn test_summary_figures() {
        // wait = (50 - 0) - 20 = 30 ; (40 - 10) - 30 = 0
        let tasks = vec![finished(0, 0, 20, 0, 50), finished(1, 10, 30, 20, 40)];
        let summary = RunSummary::from_tasks(&tasks).unwrap();

        assert_eq!(summary.tasks, 2);
        assert_eq!(summary.min_wait_ms, 0);
        assert_eq!(summary.max_wait_ms, 30);
        assert_eq!(summary.avg_wait_ms, 15.0);
        assert_eq!(summary.avg_turnaround_ms, 40.0);
        assert_eq!(summary.avg_response_ms, 5.0);
        assert_eq!(summary.makespan_ms, 50);
        assert_eq!(summary.throughput_per_sec, 40.0);
        assert_eq!(summary.cpu_utilization, 100.0);
    }

    #[test]
    fn test_outcome_requires_start_and_finish() {
        let pending = Task::new(TaskId(0), TaskSpec::new(0, 10, 0), (), 0);
        assert_eq!(TaskOutcome::of_task(&pending), None);

        let outcome = TaskOutcome::of_task(&finished(1, 10, 30, 20, 40)).unwrap();
        assert_eq!(outcome.response_ms(), 10);
        assert_eq!(outcome.turnaround_ms(), 30);
        assert_eq!(outcome.wait_ms(), 0);
    }
}
