//! Selector - CFS + heuristic pick
//!
//! ```text
//! score = vruntime
//!       - aging_boost * aging_unit              (100ms per level)
//!       - (estimated_burst < 50ms ? 50ms : 0)   interactive bonus
//!       + (remaining > 100ms ? 10ms : 0)        long-task penalty
//! ```
//!
//! Lowest score wins; on ties the first task in workload order wins.
//! "Nothing eligible" is a normal outcome (idle CPU or pending arrivals).

use super::policy::SchedConfig;
use crate::scheduler::prediction::HeuristicEngine;
use crate::scheduler::task::Task;

/// Outcome of a selection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index in the task list
    pub index: usize,
    /// Winning score (ns)
    pub score: i64,
    /// Candidates that passed the state/arrival filters
    pub candidates: usize,
}

/// Composite-score selector
#[derive(Debug, Clone)]
pub struct Selector {
    aging_unit_ns: i64,
    interactive_bonus_ns: i64,
    long_task_penalty_ns: i64,
    interactive_threshold_ms: u64,
    long_task_threshold_ms: u64,
}

impl Selector {
    pub fn new(config: &SchedConfig) -> Self {
        Self {
            aging_unit_ns: config.aging_unit_ns,
            interactive_bonus_ns: config.interactive_bonus_ns,
            long_task_penalty_ns: config.long_task_penalty_ns,
            interactive_threshold_ms: config.interactive_threshold_ms,
            long_task_threshold_ms: config.long_task_threshold_ms,
        }
    }

    /// Score of a task from its current fields (lower = runs sooner)
    pub fn score<P>(&self, task: &Task<P>) -> i64 {
        let mut score = i64::try_from(task.vruntime_ns()).unwrap_or(i64::MAX);

        score = score.saturating_sub(i64::from(task.aging_boost()) * self.aging_unit_ns);

        if task.estimated_burst_ms() < self.interactive_threshold_ms {
            score = score.saturating_sub(self.interactive_bonus_ns);
        }

        if task.burst_remaining_ms() > self.long_task_threshold_ms {
            score = score.saturating_add(self.long_task_penalty_ns);
        }

        score
    }

    /// Evaluate every eligible task at `elapsed_ms` and pick the best one
    pub fn select<P>(
        &self,
        tasks: &mut [Task<P>],
        elapsed_ms: u64,
        engine: &HeuristicEngine,
    ) -> Option<Selection> {
        let mut best: Option<Selection> = None;
        let mut candidates = 0;

        for (index, task) in tasks.iter_mut().enumerate() {
            if !task.state().is_schedulable() || !task.has_arrived(elapsed_ms) {
                continue;
            }
            candidates += 1;

            engine.evaluate(task, elapsed_ms);
            let score = self.score(task);

            log::debug!(
                "[SELECT] T={} {} score={} vruntime={} aging={} est_burst={}",
                elapsed_ms,
                task.id(),
                score,
                task.vruntime_ns(),
                task.aging_boost(),
                task.estimated_burst_ms()
            );

            if best.map_or(true, |b| score < b.score) {
                best = Some(Selection {
                    index,
                    score,
                    candidates: 0,
                });
            }
        }

        best.map(|b| Selection { candidates, ..b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::task::{TaskId, TaskSpec, TaskState};

    fn tasks(specs: &[TaskSpec]) -> Vec<Task<()>> {
        specs
            .iter()
            .enumerate()
            .map(|(i, s)| Task::new(TaskId(i), *s, (), 0))
            .collect()
    }

    fn parts() -> (Selector, HeuristicEngine) {
        let config = SchedConfig::default();
        (Selector::new(&config), HeuristicEngine::new(&config))
    }

    #[test]
    fn test_nothing_eligible() {
        let (selector, engine) = parts();
        let mut list = tasks(&[TaskSpec::new(10, 20, 0)]);
        assert_eq!(selector.select(&mut list, 5, &engine), None);
        // Not-yet-arrived tasks are not evaluated either
        assert_eq!(list[0].estimated_burst_ms(), 0);
    }

    #[test]
    fn test_skips_running_and_completed() {
        let (selector, engine) = parts();
        let mut list = tasks(&[
            TaskSpec::new(0, 20, 0),
            TaskSpec::new(0, 20, 0),
            TaskSpec::new(0, 20, 0),
        ]);
        list[0].set_state(TaskState::Running);
        list[1].set_state(TaskState::Running);
        list[1].mark_completed(5, None);

        let pick = selector.select(&mut list, 5, &engine).unwrap();
        assert_eq!(pick.index, 2);
        assert_eq!(pick.candidates, 1);
    }

    #[test]
    fn test_tie_goes_to_first() {
        let (selector, engine) = parts();
        let mut list = tasks(&[
            TaskSpec::new(0, 40, 0),
            TaskSpec::new(0, 40, 0),
            TaskSpec::new(0, 40, 0),
        ]);
        let pick = selector.select(&mut list, 0, &engine).unwrap();
        assert_eq!(pick.index, 0);
        assert_eq!(pick.candidates, 3);
    }

    #[test]
    fn test_score_components() {
        let (selector, engine) = parts();
        let mut list = tasks(&[TaskSpec::new(0, 400, 0), TaskSpec::new(0, 60, 0)]);
        engine.evaluate(&mut list[0], 0);
        engine.evaluate(&mut list[1], 0);

        // 400 ms: estimate 100 (no bonus), remaining > 100 (penalty)
        assert_eq!(selector.score(&list[0]), 10_000_000);
        // 60 ms: estimate 15 (bonus), no penalty
        assert_eq!(selector.score(&list[1]), -50_000_000);

        // 130 ms wait → aging 3
        engine.evaluate(&mut list[0], 130);
        assert_eq!(selector.score(&list[0]), 10_000_000 - 300_000_000);
    }

    #[test]
    fn test_score_saturates_on_huge_vruntime() {
        let (selector, engine) = parts();
        let mut list = tasks(&[TaskSpec::new(0, 400, 0), TaskSpec::new(0, 60, 0)]);
        for task in &mut list {
            engine.evaluate(task, 0);
            task.add_vruntime(u64::MAX);
        }
        assert_eq!(selector.score(&list[0]), i64::MAX);
        assert_eq!(selector.score(&list[1]), i64::MAX - 50_000_000);
    }

    #[test]
    fn test_lower_vruntime_wins() {
        let (selector, engine) = parts();
        let mut list = tasks(&[TaskSpec::new(0, 60, 0), TaskSpec::new(0, 60, 0)]);
        list[0].add_vruntime(5_000_000);
        let pick = selector.select(&mut list, 0, &engine).unwrap();
        assert_eq!(pick.index, 1);
    }
}
