//! Scheduler - the execution loop
//!
//! One iteration (`step`):
//! 1. Ask the selector for a task; idle one tick if none is eligible
//! 2. Suspend whichever other task still holds the CPU
//! 3. Resume the chosen task, compute its slice
//! 4. Sleep for the slice (the only blocking point)
//! 5. Charge the *measured* elapsed time to the task
//! 6. Advance its vruntime
//! 7. Complete it (exited or budget spent) or suspend it. A task whose
//!    budget ran out before its process exited is stopped as well
//!
//! The loop owns every task and its process handle. Process-control
//! failures are logged and counted, never propagated: the next completion
//! poll finds out whether the process is gone.

use std::time::Duration;

use super::accounting::VruntimeAccountant;
use super::error::{SchedulerError, SchedulerResult};
use super::policy::SchedConfig;
use super::selector::Selector;
use super::statistics::SchedulerStats;
use super::trace::{GanttEntry, Trace, TraceEvent};
use crate::process::{pid_label, ExitStatus, ProcessHandle};
use crate::scheduler::prediction::HeuristicEngine;
use crate::scheduler::task::{Task, TaskId, TaskSpec, TaskState};
use crate::time::{Clock, Timestamp};

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing eligible, one tick slept
    Idle,
    /// A task ran for `executed_ms`
    Ran {
        task: TaskId,
        executed_ms: u64,
        completed: bool,
    },
    /// Every task is completed
    Finished,
}

/// User-space fair scheduler driving a fixed set of processes
pub struct Scheduler<P, C> {
    config: SchedConfig,
    clock: C,
    tasks: Vec<Task<P>>,

    /// Task currently holding Running, if any
    current: Option<usize>,
    /// Last dispatched task, for context-switch accounting
    last_dispatched: Option<usize>,

    accountant: VruntimeAccountant,
    selector: Selector,
    engine: HeuristicEngine,

    start: Timestamp,
    completed_count: usize,

    stats: SchedulerStats,
    trace: Trace,
}

impl<P: ProcessHandle, C: Clock> Scheduler<P, C> {
    /// Register the workload; every configuration error surfaces here
    ///
    /// Task ids follow workload order, which is also the tie-break order.
    /// The scheduler's start time is read from `clock` now.
    pub fn new(config: SchedConfig, clock: C, workload: Vec<(TaskSpec, P)>) -> SchedulerResult<Self> {
        config.validate()?;

        if workload.is_empty() {
            return Err(SchedulerError::EmptyWorkload);
        }
        if let Some(max) = config.max_tasks {
            if workload.len() > max {
                return Err(SchedulerError::CapacityExceeded {
                    requested: workload.len(),
                    max,
                });
            }
        }
        if let Some(task) = workload.iter().position(|(spec, _)| spec.burst_ms == 0) {
            return Err(SchedulerError::InvalidBurst { task, burst_ms: 0 });
        }

        let accountant = VruntimeAccountant::new();
        let tasks: Vec<Task<P>> = workload
            .into_iter()
            .enumerate()
            .map(|(i, (spec, handle))| {
                Task::new(TaskId(i), spec, handle, accountant.min_vruntime_ns())
            })
            .collect();

        log::info!(
            "[SCHED] Initialized: {} tasks, quantum={}ms, min_granularity={}ms, estimator={:?}",
            tasks.len(),
            config.base_quantum_ms,
            config.min_granularity_ms,
            config.burst_estimator
        );

        let start = clock.now();
        Ok(Self {
            selector: Selector::new(&config),
            engine: HeuristicEngine::new(&config),
            config,
            clock,
            tasks,
            current: None,
            last_dispatched: None,
            accountant,
            start,
            completed_count: 0,
            stats: SchedulerStats::new(),
            trace: Trace::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Task records in workload order
    pub fn tasks(&self) -> &[Task<P>] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&Task<P>> {
        self.tasks.get(index)
    }

    /// Index of the task holding Running
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn min_vruntime_ns(&self) -> u64 {
        self.accountant.min_vruntime_ns()
    }

    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    pub fn is_finished(&self) -> bool {
        self.completed_count == self.tasks.len()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn trace(&self) -> &[TraceEvent] {
        self.trace.events()
    }

    pub fn gantt(&self) -> Vec<GanttEntry> {
        self.trace.gantt()
    }

    /// Milliseconds since the scheduler was created
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now().ms_since(self.start)
    }

    // ═══════════════════════════════════════════════════════════════
    // Execution loop
    // ═══════════════════════════════════════════════════════════════

    /// Run until every task is completed
    pub fn run(&mut self) -> SchedulerStats {
        log::info!("[SCHED] Starting execution loop");
        while self.step() != Step::Finished {}
        log::info!(
            "[SCHED] All {} tasks completed at T={}ms ({} dispatches, {} idle ticks)",
            self.tasks.len(),
            self.elapsed_ms(),
            self.stats.dispatches,
            self.stats.idle_ticks
        );
        self.stats
    }

    /// Pick the next task without dispatching it (runs the heuristics)
    pub fn select(&mut self) -> Option<usize> {
        let elapsed_ms = self.elapsed_ms();
        self.stats.record_selection();
        self.selector
            .select(&mut self.tasks, elapsed_ms, &self.engine)
            .map(|selection| selection.index)
    }

    /// One loop iteration
    pub fn step(&mut self) -> Step {
        if self.is_finished() {
            return Step::Finished;
        }

        let Some(index) = self.select() else {
            self.idle();
            return Step::Idle;
        };

        if let Some(running) = self.current {
            if running != index {
                self.suspend_task(running);
            }
        }

        let slice_ms = self.dispatch(index);

        let before = self.clock.now();
        self.clock.sleep(Duration::from_millis(slice_ms));
        let executed_ms = self.clock.now().ms_since(before);

        let completed = self.account(index, executed_ms);
        Step::Ran {
            task: TaskId(index),
            executed_ms,
            completed,
        }
    }

    /// Suspend a task and mark it Stopped
    ///
    /// Idempotent: a Stopped task gets the signal again and stays Stopped.
    /// Ready and Completed tasks are left alone.
    pub fn suspend_task(&mut self, index: usize) {
        let Some(task) = self.tasks.get_mut(index) else {
            return;
        };
        if !matches!(task.state(), TaskState::Running | TaskState::Stopped) {
            return;
        }

        if let Err(err) = task.handle_mut().suspend() {
            log::warn!("[PROC] suspend {} failed: {}", task.id(), err);
            self.stats.record_signal_failure();
        }
        task.set_state(TaskState::Stopped);

        if self.current == Some(index) {
            self.current = None;
        }
    }

    /// Collect every process after the loop
    ///
    /// Each live handle is resumed first so a stopped child does not block the
    /// wait forever. Statuses already observed by the loop are reused.
    pub fn reap_all(&mut self) -> Vec<(TaskId, SchedulerResult<ExitStatus>)> {
        let mut statuses = Vec::with_capacity(self.tasks.len());

        for task in &mut self.tasks {
            if task.exit_status().is_none() {
                if let Err(err) = task.handle_mut().resume() {
                    log::debug!("[PROC] resume {} before reap: {}", task.id(), err);
                }
            }

            let result = task.handle_mut().reap_blocking();
            match &result {
                Ok(status) => task.record_exit(*status),
                Err(err) => log::warn!("[PROC] reap {} failed: {}", task.id(), err),
            }
            statuses.push((task.id(), result));
        }
        statuses
    }

    fn idle(&mut self) {
        let from_ms = self.elapsed_ms();
        self.clock.sleep(self.config.tick);
        let to_ms = self.elapsed_ms();

        log::debug!("[SCHED] T={}ms idle", from_ms);
        self.stats.record_idle();
        self.trace.idle(from_ms, to_ms);
    }

    /// Resume `index`, mark it Running; returns its slice
    fn dispatch(&mut self, index: usize) -> u64 {
        let elapsed_ms = self.elapsed_ms();
        let slice_ms = self.config.time_slice_ms(self.tasks[index].weight());
        let task = &mut self.tasks[index];

        crate::sched_assert!(
            task.has_arrived(elapsed_ms),
            "task dispatched before its arrival"
        );

        task.mark_dispatched(elapsed_ms, slice_ms);
        if let Err(err) = task.handle_mut().resume() {
            log::warn!("[PROC] resume {} failed: {}", task.id(), err);
            self.stats.record_signal_failure();
        }
        task.set_state(TaskState::Running);

        log::info!(
            "[SCHED] T={}ms Scheduled {} (pid {}) vruntime={} remaining={}ms aging={} slice={}ms",
            elapsed_ms,
            task.id(),
            pid_label(task.handle()),
            task.vruntime_ns(),
            task.burst_remaining_ms(),
            task.aging_boost(),
            slice_ms
        );

        self.trace.push(TraceEvent::Dispatched {
            at_ms: elapsed_ms,
            task: task.id(),
            slice_ms,
            vruntime_ns: task.vruntime_ns(),
            aging_boost: task.aging_boost(),
        });
        self.stats
            .record_dispatch(self.last_dispatched != Some(index));
        self.current = Some(index);
        self.last_dispatched = Some(index);

        slice_ms
    }

    /// Charge a finished slice; returns true if the task completed
    fn account(&mut self, index: usize, executed_ms: u64) -> bool {
        let task = &mut self.tasks[index];

        task.consume(executed_ms);
        self.engine.observe_slice(task, executed_ms);
        self.accountant.advance(task, executed_ms);

        let exited = match task.handle_mut().try_reap() {
            Ok(status) => status,
            Err(err) => {
                log::warn!("[PROC] poll {} failed: {}", task.id(), err);
                self.stats.record_signal_failure();
                None
            }
        };

        let at_ms = self.elapsed_ms();
        let task = &mut self.tasks[index];
        let id = task.id();

        if exited.is_some() || task.burst_remaining_ms() == 0 {
            // Budget spent but the process lives on: keep it off the CPU
            if exited.is_none() {
                if let Err(err) = task.handle_mut().suspend() {
                    log::warn!("[PROC] suspend {} failed: {}", id, err);
                    self.stats.record_signal_failure();
                }
            }
            task.mark_completed(at_ms, exited);
            self.completed_count += 1;
            self.current = None;
            self.stats.record_completion();
            self.trace.push(TraceEvent::Completed {
                at_ms,
                task: id,
                executed_ms,
            });

            log::info!(
                "[SCHED] T={}ms Completed {} turnaround={}ms wait={}ms vruntime={}{}",
                at_ms,
                id,
                task.turnaround_ms().unwrap_or(0),
                task.wait_time_ms().unwrap_or(0),
                task.vruntime_ns(),
                match exited {
                    Some(status) => format!(" ({})", status),
                    None => String::new(),
                }
            );
            true
        } else {
            self.suspend_task(index);
            self.stats.record_preemption();
            self.trace.push(TraceEvent::Preempted {
                at_ms,
                task: id,
                executed_ms,
            });
            false
        }
    }
}
