//! Trace - dispatch/preempt/complete timeline
//!
//! Recorded by the execution loop, consumed by reporters (Gantt chart).
//! Consecutive idle ticks collapse into one `Idle` span.

use crate::scheduler::task::TaskId;

/// One scheduling event; times are ms since scheduler start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Task resumed with a slice
    Dispatched {
        at_ms: u64,
        task: TaskId,
        slice_ms: u64,
        vruntime_ns: u64,
        aging_boost: u32,
    },
    /// Task suspended at the end of its slice
    Preempted {
        at_ms: u64,
        task: TaskId,
        executed_ms: u64,
    },
    /// Task finished (budget exhausted or process exited)
    Completed {
        at_ms: u64,
        task: TaskId,
        executed_ms: u64,
    },
    /// Nothing eligible between `from_ms` and `to_ms`
    Idle { from_ms: u64, to_ms: u64 },
}

/// Contiguous run of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttEntry {
    pub task: TaskId,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Record an idle tick, extending the previous idle span if any
    pub fn idle(&mut self, from_ms: u64, to_ms: u64) {
        if let Some(TraceEvent::Idle { to_ms: end, .. }) = self.events.last_mut() {
            *end = to_ms;
            return;
        }
        self.events.push(TraceEvent::Idle { from_ms, to_ms });
    }

    /// Build the Gantt chart, merging back-to-back runs of the same task
    pub fn gantt(&self) -> Vec<GanttEntry> {
        let mut chart: Vec<GanttEntry> = Vec::new();
        let mut open: Option<(TaskId, u64)> = None;

        for event in &self.events {
            match *event {
                TraceEvent::Dispatched { at_ms, task, .. } => open = Some((task, at_ms)),
                TraceEvent::Preempted { at_ms, task, .. }
                | TraceEvent::Completed { at_ms, task, .. } => {
                    let Some((running, start_ms)) = open.take() else {
                        continue;
                    };
                    if running != task {
                        continue;
                    }
                    match chart.last_mut() {
                        Some(last) if last.task == task && last.end_ms == start_ms => {
                            last.end_ms = at_ms;
                        }
                        _ => chart.push(GanttEntry {
                            task,
                            start_ms,
                            end_ms: at_ms,
                        }),
                    }
                }
                TraceEvent::Idle { .. } => {}
            }
        }
        chart
    }
}
