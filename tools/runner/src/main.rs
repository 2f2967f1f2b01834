//! hcfs-run - drive a CPU-bound workload with the HCFS scheduler
//!
//! Forks one worker per task, keeps them stopped, then lets the scheduler
//! hand out slices with SIGCONT/SIGSTOP. `--simulate` runs the same
//! workload on virtual time instead. `--compare` and `--load-levels` put
//! HCFS next to the FCFS, SJF, SRTF, Priority and RR baselines, on virtual
//! time as well.
//!
//! Exit codes: 0 success, 2 invalid arguments or configuration, 1 runtime
//! failure.

mod compare;
mod report;
mod worker;
mod workload;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hcfs_scheduler::{
    BurstEstimator, Clock, MonotonicClock, ProcessHandle, SchedConfig, Scheduler, SchedulerError,
    SchedulerResult, SimClock, SimProcess, TaskSpec,
};

use workload::{RandomShape, WorkloadError, DEMO_WORKLOAD};

#[derive(Debug, Parser)]
#[command(
    name = "hcfs-run",
    version,
    about = "User-space CFS scheduler with aging, burst and interactivity heuristics"
)]
struct Opts {
    /// Add a task as ARRIVAL:BURST:NICE (ms, ms, -20..19). Repeatable.
    #[arg(short = 't', long = "task", value_parser = workload::parse_task)]
    tasks: Vec<TaskSpec>,

    /// Read tasks from a file, one "arrival burst nice" triple per line.
    #[arg(short = 'w', long, conflicts_with = "tasks")]
    workload: Option<PathBuf>,

    /// Generate N random tasks (arrival 0-50ms, burst 1-30ms, nice -10..10).
    #[arg(short = 'r', long, value_name = "N", conflicts_with_all = ["tasks", "workload"])]
    random: Option<usize>,

    /// Seed for --random and --load-levels.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Compare HCFS with FCFS, SJF, SRTF, Priority and RR (virtual time).
    #[arg(short = 'c', long, action = clap::ArgAction::SetTrue)]
    compare: bool,

    /// Compare every policy on random workloads of these sizes.
    #[arg(long, value_name = "N,N,...", value_delimiter = ',')]
    load_levels: Vec<usize>,

    /// Run on simulated processes and virtual time (no fork).
    #[arg(short = 's', long, action = clap::ArgAction::SetTrue)]
    simulate: bool,

    /// Base time quantum in milliseconds.
    #[arg(short = 'q', long, default_value = "10")]
    quantum: u64,

    /// Minimum time slice in milliseconds.
    #[arg(long, default_value = "5")]
    min_granularity: u64,

    /// Maximum number of tasks. 0 means unbounded.
    #[arg(long, default_value = "10")]
    max_tasks: usize,

    /// Re-estimate bursts with an EMA after every slice.
    ///
    /// The value is the weight of the newest sample, out of 256.
    #[arg(long)]
    ema_alpha: Option<u32>,

    /// Log filter (env_logger syntax), overrides RUST_LOG.
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Skip the per-task tables.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,
}

impl Opts {
    fn config(&self) -> SchedConfig {
        SchedConfig {
            base_quantum_ms: self.quantum,
            min_granularity_ms: self.min_granularity,
            max_tasks: (self.max_tasks > 0).then_some(self.max_tasks),
            burst_estimator: match self.ema_alpha {
                Some(alpha_per_256) => BurstEstimator::Ema { alpha_per_256 },
                None => BurstEstimator::OneShot,
            },
            ..SchedConfig::default()
        }
    }

    fn specs(&self) -> Result<Vec<TaskSpec>> {
        if let Some(path) = &self.workload {
            return Ok(workload::load_workload(path)?);
        }
        if let Some(count) = self.random {
            return Ok(workload::random_workload(count, &RandomShape::default(), self.seed));
        }
        if !self.tasks.is_empty() {
            return Ok(self.tasks.clone());
        }
        Ok(DEMO_WORKLOAD.to_vec())
    }
}

fn init_logger(opts: &Opts) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filters) = &opts.log_level {
        builder.parse_filters(filters);
    }
    builder.format_timestamp(None).init();
}

/// Run to completion, reap, print reports
fn drive<P: ProcessHandle, C: Clock>(mut sched: Scheduler<P, C>, quiet: bool) -> Result<()> {
    let mut out = io::stdout().lock();

    if !quiet {
        report::process_table(&mut out, sched.tasks())?;
        out.flush()?;
    }

    let stats = sched.run();

    let mut failed = 0;
    for (id, status) in sched.reap_all() {
        match status {
            Ok(status) if !status.success() => {
                log::warn!("[PROC] {} ended with {}", id, status);
                failed += 1;
            }
            Ok(_) => {}
            Err(err) => {
                log::error!("[PROC] {} could not be reaped: {}", id, err);
                failed += 1;
            }
        }
    }

    if !quiet {
        report::trace_table(&mut out, sched.tasks())?;
    }
    report::final_statistics(&mut out, sched.tasks(), &stats)?;
    report::gantt(&mut out, &sched.gantt())?;

    anyhow::ensure!(failed == 0, "{} worker(s) did not exit cleanly", failed);
    Ok(())
}

/// HCFS over simulated processes on a fresh virtual clock
fn simulated(
    config: SchedConfig,
    specs: &[TaskSpec],
) -> SchedulerResult<Scheduler<SimProcess, SimClock>> {
    let clock = SimClock::new();
    let workload = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let process = SimProcess::new(clock.clone(), spec.burst_ms).with_pid(i as i32 + 1);
            (*spec, process)
        })
        .collect();
    Scheduler::new(config, clock, workload)
}

fn run(opts: &Opts) -> Result<()> {
    let config = opts.config();

    if !opts.load_levels.is_empty() {
        let levels = compare::load_analysis(&opts.load_levels, opts.seed, &config)?;
        compare::load_table(&mut io::stdout().lock(), &levels)?;
        return Ok(());
    }

    let specs = opts.specs()?;

    if opts.compare {
        let rows = compare::compare(&specs, &config)?;
        compare::comparison_table(&mut io::stdout().lock(), &rows)?;
        return Ok(());
    }

    if opts.simulate {
        let sched = simulated(config, &specs)?;
        return drive(sched, opts.quiet);
    }

    // Reject bad input before forking anything
    config.validate()?;

    let workers = worker::spawn_all(&specs, config.signal_settle)
        .context("cannot start workers")?;
    let pids: Vec<_> = workers.iter().map(|w| w.raw_pid()).collect();
    let workload = specs.into_iter().zip(workers).collect();

    let sched = match Scheduler::new(config, MonotonicClock::new(), workload) {
        Ok(sched) => sched,
        Err(err) => {
            worker::kill_all(pids);
            return Err(err.into());
        }
    };
    drive(sched, opts.quiet)
}

/// Bad input rather than a failed run?
fn is_usage_error(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<WorkloadError>().is_some() {
        return true;
    }
    err.downcast_ref::<SchedulerError>()
        .is_some_and(|err| !err.is_recoverable())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    init_logger(&opts);

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            if is_usage_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
