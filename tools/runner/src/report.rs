//! Text reports
//!
//! Rendered from the scheduler's read-only accessors after the run.

use std::io::{self, Write};

use hcfs_scheduler::{GanttEntry, ProcessHandle, RunSummary, SchedulerStats, Task};

const RULE: &str = "+--------+--------+-----------+-----------+--------+--------+";

fn pid<P: ProcessHandle>(task: &Task<P>) -> String {
    task.handle()
        .pid()
        .map_or_else(|| "-".to_string(), |pid| pid.to_string())
}

fn opt(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Workload as registered
pub fn process_table<P: ProcessHandle>(out: &mut impl Write, tasks: &[Task<P>]) -> io::Result<()> {
    writeln!(out, "\nInitial process table")?;
    writeln!(out, "{}", RULE)?;
    writeln!(
        out,
        "| {:<6} | {:>6} | {:>9} | {:>9} | {:>6} | {:>6} |",
        "Task", "PID", "Arrival", "Burst", "Nice", "Weight"
    )?;
    writeln!(out, "{}", RULE)?;
    for task in tasks {
        writeln!(
            out,
            "| {:<6} | {:>6} | {:>7}ms | {:>7}ms | {:>6} | {:>6} |",
            task.id().to_string(),
            pid(task),
            task.arrival_ms(),
            task.burst_total_ms(),
            task.nice(),
            task.weight()
        )?;
    }
    writeln!(out, "{}", RULE)
}

/// Per-task response, vruntime and interactivity
pub fn trace_table<P>(out: &mut impl Write, tasks: &[Task<P>]) -> io::Result<()> {
    writeln!(out, "\nScheduling trace")?;
    writeln!(
        out,
        "{:<6} {:>10} {:>14} {:>8} {:>8} {:>7}",
        "Task", "Response", "vruntime(ns)", "Interact", "EstBurst", "Slices"
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:<6} {:>8}ms {:>14} {:>8} {:>6}ms {:>7}",
            task.id().to_string(),
            opt(task.response_time_ms()),
            task.vruntime_ns(),
            task.interactivity_score(),
            task.estimated_burst_ms(),
            task.slices()
        )?;
    }
    Ok(())
}

/// Per-task outcome plus aggregate metrics
pub fn final_statistics<P>(
    out: &mut impl Write,
    tasks: &[Task<P>],
    stats: &SchedulerStats,
) -> io::Result<()> {
    writeln!(out, "\nFinal statistics")?;
    writeln!(
        out,
        "{:<6} {:>8} {:>11} {:>14} {:>6} {:>8}",
        "Task", "Wait", "Turnaround", "vruntime(ns)", "Aging", "Exit"
    )?;
    for task in tasks {
        writeln!(
            out,
            "{:<6} {:>6}ms {:>9}ms {:>14} {:>6} {:>8}",
            task.id().to_string(),
            opt(task.wait_time_ms()),
            opt(task.turnaround_ms()),
            task.vruntime_ns(),
            task.aging_boost(),
            opt(task.exit_status())
        )?;
    }

    if let Some(summary) = RunSummary::from_tasks(tasks) {
        writeln!(out, "\nAggregate metrics")?;
        writeln!(out, "  Average wait time       : {:>9.2} ms", summary.avg_wait_ms)?;
        writeln!(out, "  Average turnaround time : {:>9.2} ms", summary.avg_turnaround_ms)?;
        writeln!(out, "  Average response time   : {:>9.2} ms", summary.avg_response_ms)?;
        writeln!(out, "  Min wait time           : {:>9} ms", summary.min_wait_ms)?;
        writeln!(out, "  Max wait time           : {:>9} ms", summary.max_wait_ms)?;
        writeln!(out, "  Makespan                : {:>9} ms", summary.makespan_ms)?;
        writeln!(out, "  Throughput              : {:>9.2} tasks/s", summary.throughput_per_sec)?;
        writeln!(out, "  CPU utilisation         : {:>9.1} %", summary.cpu_utilization)?;
        writeln!(out, "  Completed processes     : {:>9}", summary.tasks)?;
    }

    writeln!(
        out,
        "  Dispatches {} | context switches {} | preemptions {} | idle ticks {} | signal failures {}",
        stats.dispatches,
        stats.context_switches,
        stats.preemptions,
        stats.idle_ticks,
        stats.signal_failures
    )
}

/// One-line timeline: `|P0 0-10|P1 10-15|...`
pub fn gantt(out: &mut impl Write, chart: &[GanttEntry]) -> io::Result<()> {
    writeln!(out, "\nTimeline")?;
    for entry in chart {
        write!(out, "|{} {}-{}", entry.task, entry.start_ms, entry.end_ms)?;
    }
    writeln!(out, "|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcfs_scheduler::{SchedConfig, Scheduler, SimClock, SimProcess, TaskSpec};

    fn finished_run() -> Scheduler<SimProcess, SimClock> {
        let clock = SimClock::new();
        let workload = vec![
            (TaskSpec::new(0, 20, 0), SimProcess::new(clock.clone(), 20).with_pid(101)),
            (TaskSpec::new(5, 10, -5), SimProcess::new(clock.clone(), 10).with_pid(102)),
        ];
        let mut sched = Scheduler::new(SchedConfig::default(), clock, workload).unwrap();
        sched.run();
        sched
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_process_table_lists_pids() {
        let sched = finished_run();
        let text = render(|out| process_table(out, sched.tasks()));
        assert!(text.contains("101"));
        assert!(text.contains("3121"));
    }

    #[test]
    fn test_final_statistics_has_aggregates() {
        let sched = finished_run();
        let text = render(|out| final_statistics(out, sched.tasks(), sched.stats()));
        assert!(text.contains("Aggregate metrics"));
        assert!(text.contains("Completed processes"));
        assert!(text.contains("exit 0"));
    }

    #[test]
    fn test_gantt_line() {
        let sched = finished_run();
        let text = render(|out| gantt(out, &sched.gantt()));
        assert!(text.trim_end().ends_with('|'));
        assert!(text.contains("|P0 0-10"));
    }
}
