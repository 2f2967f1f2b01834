//! Policy comparison
//!
//! Runs HCFS (simulated processes, virtual time) and every baseline policy
//! on the same workload and tabulates their aggregate metrics.

use std::io::{self, Write};

use anyhow::Result;
use hcfs_scheduler::{BaselinePolicy, RunSummary, SchedConfig, TaskSpec};

use crate::workload::{random_workload, RandomShape};

const HCFS: &str = "HCFS";
const RULE_WIDTH: usize = 78;

/// One policy's figures
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub policy: String,
    pub summary: RunSummary,
}

/// Every policy's figures for one random workload size
#[derive(Debug, Clone, PartialEq)]
pub struct LoadLevel {
    pub tasks: usize,
    pub rows: Vec<Row>,
}

/// HCFS first, then the baselines; round robin shares the base quantum
pub fn compare(specs: &[TaskSpec], config: &SchedConfig) -> Result<Vec<Row>> {
    let mut sched = crate::simulated(config.clone(), specs)?;
    sched.run();

    let mut rows = Vec::with_capacity(6);
    if let Some(summary) = RunSummary::from_tasks(sched.tasks()) {
        rows.push(Row {
            policy: HCFS.to_string(),
            summary,
        });
    }

    for policy in BaselinePolicy::all(config.base_quantum_ms) {
        if let Some(summary) = policy.simulate(specs).summary() {
            rows.push(Row {
                policy: policy.to_string(),
                summary,
            });
        }
    }
    Ok(rows)
}

/// Compare every policy on a fresh random workload per level
///
/// Level `n` uses seed `seed + n`. The task limit does not apply here.
pub fn load_analysis(levels: &[usize], seed: u64, config: &SchedConfig) -> Result<Vec<LoadLevel>> {
    let config = SchedConfig {
        max_tasks: None,
        ..config.clone()
    };

    levels
        .iter()
        .filter(|&&tasks| tasks > 0)
        .map(|&tasks| {
            log::info!("[COMPARE] load level: {} tasks", tasks);
            let specs = random_workload(
                tasks,
                &RandomShape::for_load(tasks),
                seed.wrapping_add(tasks as u64),
            );
            Ok(LoadLevel {
                tasks,
                rows: compare(&specs, &config)?,
            })
        })
        .collect()
}

/// First row with the smallest `metric`
fn best_by(rows: &[Row], metric: impl Fn(&RunSummary) -> f64) -> Option<&Row> {
    rows.iter()
        .min_by(|a, b| metric(&a.summary).total_cmp(&metric(&b.summary)))
}

pub fn comparison_table(out: &mut impl Write, rows: &[Row]) -> io::Result<()> {
    writeln!(out, "\nPolicy comparison")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(
        out,
        "{:<14} {:>10} {:>10} {:>10} {:>10} {:>16}",
        "Policy", "Avg wait", "Avg TAT", "Avg resp", "CPU util", "Throughput/s"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for row in rows {
        let s = &row.summary;
        writeln!(
            out,
            "{:<14} {:>10.2} {:>10.2} {:>10.2} {:>9.1}% {:>16.2}",
            row.policy,
            s.avg_wait_ms,
            s.avg_turnaround_ms,
            s.avg_response_ms,
            s.cpu_utilization,
            s.throughput_per_sec
        )?;
    }
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    let best = [
        ("waiting time", best_by(rows, |s| s.avg_wait_ms)),
        ("turnaround time", best_by(rows, |s| s.avg_turnaround_ms)),
        ("response time", best_by(rows, |s| s.avg_response_ms)),
        ("CPU utilisation", best_by(rows, |s| -s.cpu_utilization)),
    ];
    for (label, row) in best {
        if let Some(row) = row {
            writeln!(out, "Best {:<16}: {}", label, row.policy)?;
        }
    }
    Ok(())
}

/// Per-policy averages, one column per load level
pub fn load_table(out: &mut impl Write, levels: &[LoadLevel]) -> io::Result<()> {
    let Some(first) = levels.first() else {
        return Ok(());
    };

    let metrics: [(&str, fn(&RunSummary) -> f64); 3] = [
        ("Average wait (ms)", |s| s.avg_wait_ms),
        ("Average turnaround (ms)", |s| s.avg_turnaround_ms),
        ("Average response (ms)", |s| s.avg_response_ms),
    ];

    for (title, metric) in metrics {
        writeln!(out, "\n{}", title)?;
        write!(out, "{:<14}", "Policy")?;
        for level in levels {
            write!(out, " {:>9}", format!("n={}", level.tasks))?;
        }
        writeln!(out)?;

        for (i, row) in first.rows.iter().enumerate() {
            write!(out, "{:<14}", row.policy)?;
            for level in levels {
                match level.rows.get(i) {
                    Some(row) => write!(out, " {:>9.2}", metric(&row.summary))?,
                    None => write!(out, " {:>9}", "-")?,
                }
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::DEMO_WORKLOAD;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compare_covers_every_policy() {
        let rows = compare(&DEMO_WORKLOAD, &SchedConfig::default()).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.policy.as_str()).collect();
        assert_eq!(names, ["HCFS", "FCFS", "SJF", "SRTF", "Priority", "RR (q=10ms)"]);

        for row in &rows {
            assert_eq!(row.summary.tasks, DEMO_WORKLOAD.len(), "{}", row.policy);
        }
        // Work-conserving baselines finish the 255 ms of work back to back;
        // HCFS sleeps out whole slices after early exits
        assert!(rows[1..].iter().all(|r| r.summary.makespan_ms == 255));
        assert_eq!(rows[0].summary.makespan_ms, 265);
        assert!(rows[0].summary.cpu_utilization < 100.0);
    }

    #[test]
    fn test_compare_rejects_bad_workload() {
        let err = compare(&[], &SchedConfig::default()).unwrap_err();
        assert!(err.to_string().contains("empty"), "{}", err);
    }

    #[test]
    fn test_comparison_table_names_best() {
        let rows = compare(&DEMO_WORKLOAD, &SchedConfig::default()).unwrap();
        let text = render(|out| comparison_table(out, &rows));
        assert!(text.contains("Policy comparison"));
        assert!(text.contains("RR (q=10ms)"));
        // SRTF minimises average waiting time
        assert!(text.contains("Best waiting time    : SRTF"));
    }

    #[test]
    fn test_load_analysis_ignores_task_limit() {
        let config = SchedConfig {
            max_tasks: Some(2),
            ..SchedConfig::default()
        };
        let levels = load_analysis(&[0, 3, 12], 42, &config).unwrap();
        assert_eq!(levels.iter().map(|l| l.tasks).collect::<Vec<_>>(), [3, 12]);
        for level in &levels {
            assert_eq!(level.rows.len(), 6);
            assert!(level.rows.iter().all(|r| r.summary.tasks == level.tasks));
        }

        let text = render(|out| load_table(out, &levels));
        assert!(text.contains("n=12"));
        assert!(text.contains("Average turnaround (ms)"));
    }
}
