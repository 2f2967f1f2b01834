//! Baseline policies - classic schedulers for comparison runs
//!
//! Pure discrete-event simulations over a [`TaskSpec`] list: no processes,
//! no clock, every task consumes exactly its nominal burst. Their
//! [`RunSummary`] is comparable with the one of an HCFS run on the same
//! workload.
//!
//! Ties always go to the earlier arrival, then to the lower task id.
//! `Priority` orders by nice value (lower runs first).

use std::collections::VecDeque;
use std::fmt;

use super::core::{GanttEntry, RunSummary, TaskOutcome};
use super::task::{TaskId, TaskSpec};

/// Comparison policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselinePolicy {
    /// First come, first served
    Fcfs,
    /// Shortest job first, non-preemptive
    Sjf,
    /// Shortest remaining time first, preempts on arrival
    Srtf,
    /// Lowest nice first, non-preemptive
    Priority,
    /// Round robin with a fixed quantum
    RoundRobin { quantum_ms: u64 },
}

impl BaselinePolicy {
    /// Every policy, round robin using `quantum_ms`
    pub fn all(quantum_ms: u64) -> [Self; 5] {
        [
            Self::Fcfs,
            Self::Sjf,
            Self::Srtf,
            Self::Priority,
            Self::RoundRobin { quantum_ms },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::Sjf => "SJF",
            Self::Srtf => "SRTF",
            Self::Priority => "Priority",
            Self::RoundRobin { .. } => "RR",
        }
    }

    /// Run the whole workload under this policy
    pub fn simulate(&self, specs: &[TaskSpec]) -> BaselineRun {
        let mut sim = Simulation::new(specs);
        match *self {
            Self::Fcfs => sim.run_to_completion(|job| (job.spec.arrival_ms, 0u64)),
            Self::Sjf => sim.run_to_completion(|job| (job.remaining_ms, job.spec.arrival_ms)),
            Self::Priority => {
                sim.run_to_completion(|job| (i64::from(job.spec.nice), job.spec.arrival_ms))
            }
            Self::Srtf => sim.shortest_remaining(),
            // A zero quantum would never make progress
            Self::RoundRobin { quantum_ms } => sim.round_robin(quantum_ms.max(1)),
        }

        log::debug!(
            "[BASELINE] {} finished {} tasks in {} segments",
            self.name(),
            sim.outcomes.len(),
            sim.gantt.len()
        );
        sim.finish(*self)
    }
}

impl fmt::Display for BaselinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin { quantum_ms } => write!(f, "RR (q={}ms)", quantum_ms),
            other => f.write_str(other.name()),
        }
    }
}

/// Outcome of one baseline simulation
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRun {
    pub policy: BaselinePolicy,
    /// Completed tasks in workload order
    pub outcomes: Vec<TaskOutcome>,
    pub gantt: Vec<GanttEntry>,
}

impl BaselineRun {
    pub fn summary(&self) -> Option<RunSummary> {
        RunSummary::from_outcomes(&self.outcomes)
    }

    pub fn outcome(&self, task: TaskId) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task == task)
    }
}

#[derive(Debug, Clone)]
struct Job {
    id: TaskId,
    spec: TaskSpec,
    remaining_ms: u64,
    start_ms: Option<u64>,
}

struct Simulation {
    now_ms: u64,
    jobs: Vec<Job>,
    outcomes: Vec<TaskOutcome>,
    gantt: Vec<GanttEntry>,
}

impl Simulation {
    fn new(specs: &[TaskSpec]) -> Self {
        let jobs = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Job {
                id: TaskId(i),
                spec: *spec,
                remaining_ms: spec.burst_ms,
                start_ms: None,
            })
            .collect();

        Self {
            now_ms: 0,
            jobs,
            outcomes: Vec::with_capacity(specs.len()),
            gantt: Vec::new(),
        }
    }

    fn pending(&self) -> bool {
        self.jobs.iter().any(|j| j.remaining_ms > 0)
    }

    /// Earliest arrival among unfinished jobs later than now
    fn next_arrival(&self) -> Option<u64> {
        self.jobs
            .iter()
            .filter(|j| j.remaining_ms > 0 && j.spec.arrival_ms > self.now_ms)
            .map(|j| j.spec.arrival_ms)
            .min()
    }

    /// Arrived unfinished job with the smallest key, ties to lower id
    fn pick<K: Ord>(&self, key: impl Fn(&Job) -> K) -> Option<usize> {
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.remaining_ms > 0 && j.spec.arrival_ms <= self.now_ms)
            .min_by_key(|&(i, job)| (key(job), i))
            .map(|(i, _)| i)
    }

    /// Run job `index` for `ms` (or until done) from now
    fn execute(&mut self, index: usize, ms: u64) {
        let now_ms = self.now_ms;
        let job = &mut self.jobs[index];
        let ran = ms.min(job.remaining_ms);

        job.start_ms.get_or_insert(now_ms);
        job.remaining_ms -= ran;
        self.now_ms += ran;

        match self.gantt.last_mut() {
            Some(last) if last.task == job.id && last.end_ms == now_ms => {
                last.end_ms = self.now_ms;
            }
            _ => self.gantt.push(GanttEntry {
                task: job.id,
                start_ms: now_ms,
                end_ms: self.now_ms,
            }),
        }

        if job.remaining_ms == 0 {
            self.outcomes.push(TaskOutcome {
                task: job.id,
                arrival_ms: job.spec.arrival_ms,
                burst_ms: job.spec.burst_ms,
                start_ms: job.start_ms.unwrap_or(now_ms),
                finish_ms: self.now_ms,
            });
        }
    }

    /// Jump to the next arrival; false when nothing is left to arrive
    fn skip_idle(&mut self) -> bool {
        match self.next_arrival() {
            Some(at) => {
                self.now_ms = at;
                true
            }
            None => false,
        }
    }

    fn run_to_completion<K: Ord>(&mut self, key: impl Fn(&Job) -> K) {
        while self.pending() {
            match self.pick(&key) {
                Some(index) => self.execute(index, u64::MAX),
                None if self.skip_idle() => {}
                None => break,
            }
        }
    }

    fn shortest_remaining(&mut self) {
        while self.pending() {
            let Some(index) = self.pick(|j| (j.remaining_ms, j.spec.arrival_ms)) else {
                if self.skip_idle() {
                    continue;
                }
                break;
            };
            let until_arrival = self
                .next_arrival()
                .map_or(u64::MAX, |at| at - self.now_ms);
            self.execute(index, until_arrival);
        }
    }

    fn round_robin(&mut self, quantum_ms: u64) {
        let mut by_arrival: Vec<usize> = (0..self.jobs.len()).collect();
        by_arrival.sort_by_key(|&i| (self.jobs[i].spec.arrival_ms, i));
        let mut incoming = by_arrival.into_iter().peekable();
        let mut queue = VecDeque::new();

        loop {
            while let Some(&i) = incoming.peek() {
                if self.jobs[i].spec.arrival_ms > self.now_ms {
                    break;
                }
                queue.push_back(i);
                incoming.next();
            }

            let Some(index) = queue.pop_front() else {
                match incoming.peek() {
                    Some(&i) => {
                        self.now_ms = self.jobs[i].spec.arrival_ms;
                        continue;
                    }
                    None => break,
                }
            };

            self.execute(index, quantum_ms);

            // Arrivals during the slice queue up before the preempted job
            while let Some(&i) = incoming.peek() {
                if self.jobs[i].spec.arrival_ms > self.now_ms {
                    break;
                }
                queue.push_back(i);
                incoming.next();
            }
            if self.jobs[index].remaining_ms > 0 {
                queue.push_back(index);
            }
        }
    }

    fn finish(mut self, policy: BaselinePolicy) -> BaselineRun {
        self.outcomes.sort_by_key(|o| o.task);
        BaselineRun {
            policy,
            outcomes: self.outcomes,
            gantt: self.gantt,
        }
    }
}
