//! Reference workload: (arrival, burst, nice) =
//! (0,60,0) (10,20,-5) (15,80,5) (20,30,0) (30,15,-10) (35,50,0)

use super::{sim_scheduler, REFERENCE_WORKLOAD};
use crate::scheduler::{GanttEntry, SchedConfig, TaskId, TaskState, TraceEvent};
use crate::time::SimClock;

fn dispatches(trace: &[TraceEvent]) -> Vec<(u64, usize)> {
    trace
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Dispatched { at_ms, task, .. } => Some((*at_ms, task.0)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_only_first_task_eligible_at_start() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    assert_eq!(sched.select(), Some(0));
}

#[test]
fn test_reference_dispatch_order() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    sched.run();

    let order: Vec<usize> = dispatches(sched.trace()).iter().map(|d| d.1).collect();
    assert_eq!(
        order,
        vec![0, 1, 2, 3, 4, 5, 4, 4, 1, 1, 1, 0, 3, 0, 0, 0, 0, 2, 3, 2, 5, 5, 5, 5]
    );
    assert_eq!(sched.elapsed_ms(), 265);
}

#[test]
fn test_heavy_task_ahead_of_light_task() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    sched.run();

    let p4_done = sched.task(4).and_then(|t| t.finish_time_ms()).unwrap();
    assert_eq!(p4_done, 80);

    // P4 is eligible from t=30 until it completes: P2 never runs in between
    for (at_ms, task) in dispatches(sched.trace()) {
        if task == 2 {
            assert!(at_ms < 30 || at_ms >= p4_done, "P2 dispatched at {}", at_ms);
        }
    }
}

#[test]
fn test_reference_accounting() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    let stats = sched.run();

    assert_eq!(stats.dispatches, 24);
    assert_eq!(stats.completions, 6);
    assert_eq!(stats.preemptions, 18);
    assert_eq!(stats.context_switches, 15);
    assert_eq!(stats.idle_ticks, 0);
    assert_eq!(stats.signal_failures, 0);

    let p4 = sched.task(4).unwrap();
    assert_eq!(p4.response_time_ms(), Some(25));
    assert_eq!(p4.turnaround_ms(), Some(50));
    assert_eq!(p4.wait_time_ms(), Some(35));

    let p0 = sched.task(0).unwrap();
    assert_eq!(p0.vruntime_ns(), 60_000_000);
    assert_eq!(p0.finish_time_ms(), Some(155));

    // P2 overshoots its 80 ms burst by one 30 ms slice
    let p2 = sched.task(2).unwrap();
    assert_eq!(p2.slices(), 3);
    assert_eq!(p2.burst_remaining_ms(), 0);

    // Long waiters were aged, up to the cap
    assert_eq!(sched.task(5).unwrap().aging_boost(), 10);

    assert!(sched
        .tasks()
        .iter()
        .all(|t| t.state() == TaskState::Completed));
    assert_eq!(sched.current(), None);
}

#[test]
fn test_reference_gantt() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    sched.run();

    let gantt = sched.gantt();
    assert_eq!(
        gantt[..6],
        [
            GanttEntry { task: TaskId(0), start_ms: 0, end_ms: 10 },
            GanttEntry { task: TaskId(1), start_ms: 10, end_ms: 15 },
            GanttEntry { task: TaskId(2), start_ms: 15, end_ms: 45 },
            GanttEntry { task: TaskId(3), start_ms: 45, end_ms: 55 },
            GanttEntry { task: TaskId(4), start_ms: 55, end_ms: 60 },
            GanttEntry { task: TaskId(5), start_ms: 60, end_ms: 70 },
        ]
    );
    // Back-to-back P4 slices merge
    assert_eq!(
        gantt[6],
        GanttEntry { task: TaskId(4), start_ms: 70, end_ms: 80 }
    );
    assert_eq!(gantt.last().map(|g| g.end_ms), Some(265));
}

#[test]
fn test_reference_reap_all() {
    let clock = SimClock::new();
    let mut sched = sim_scheduler(&clock, &REFERENCE_WORKLOAD, SchedConfig::default());
    sched.run();

    let statuses = sched.reap_all();
    assert_eq!(statuses.len(), 6);
    assert!(statuses
        .iter()
        .all(|(_, status)| matches!(status, Ok(s) if s.success())));
}
