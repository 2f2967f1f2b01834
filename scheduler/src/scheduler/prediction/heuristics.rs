//! Heuristic engine - aging, burst estimation, interactivity
//!
//! Invoked once per candidate per selection decision. Three independent
//! updates, each depending only on the previous value of its own field:
//!
//! 1. **Aging**: accumulate wait since the last decision (Ready/Stopped only,
//!    positive deltas only); boost = `(wait - threshold) / step`, capped.
//!    Recomputed from scratch every call, never incremented.
//! 2. **Burst estimate**: seeded once to `remaining / 4`, floored at the base
//!    quantum. Revised after each slice only in EMA mode.
//! 3. **Interactivity**: `remaining * 100 / total`, +bonus when the estimate
//!    is below the interactive threshold. Reported, never read by the
//!    selector.

use super::ema::EmaPredictor;
use crate::scheduler::core::policy::{BurstEstimator, SchedConfig};
use crate::scheduler::task::Task;

/// Deterministic heuristic layer
#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    aging_threshold_ms: u64,
    aging_step_ms: u64,
    aging_cap: u32,
    base_quantum_ms: u64,
    interactive_threshold_ms: u64,
    interactivity_bonus: u32,
    ema: Option<EmaPredictor>,
}

impl HeuristicEngine {
    pub fn new(config: &SchedConfig) -> Self {
        let ema = match config.burst_estimator {
            BurstEstimator::OneShot => None,
            BurstEstimator::Ema { alpha_per_256 } => Some(EmaPredictor::new(alpha_per_256)),
        };

        Self {
            aging_threshold_ms: config.aging_threshold_ms,
            aging_step_ms: config.aging_step_ms,
            aging_cap: config.aging_cap,
            base_quantum_ms: config.base_quantum_ms,
            interactive_threshold_ms: config.interactive_threshold_ms,
            interactivity_bonus: config.interactivity_bonus,
            ema,
        }
    }

    /// Refresh every heuristic field of `task` at `now_ms`
    pub fn evaluate<P>(&self, task: &mut Task<P>, now_ms: u64) {
        let schedulable = task.state().is_schedulable();
        let remaining = task.burst_remaining_ms();
        let total = task.burst_total_ms();
        let h = &mut task.heuristics;

        if schedulable && now_ms > h.last_decision_ms {
            h.total_wait_ms += now_ms - h.last_decision_ms;
        }
        h.aging_boost = self.aging_boost_for(h.total_wait_ms);

        if h.estimated_burst_ms == 0 {
            h.estimated_burst_ms = self.seed_estimate(remaining);
        }

        if total > 0 {
            h.interactivity_score = (u128::from(remaining) * 100 / u128::from(total)) as u32;
            if self.is_interactive(h.estimated_burst_ms) {
                h.interactivity_score += self.interactivity_bonus;
            }
        }

        h.last_decision_ms = now_ms;
    }

    /// Feed a measured slice into the estimate (EMA mode only)
    pub fn observe_slice<P>(&self, task: &mut Task<P>, executed_ms: u64) {
        if let Some(ema) = self.ema {
            let h = &mut task.heuristics;
            h.estimated_burst_ms = ema
                .update(h.estimated_burst_ms, executed_ms)
                .max(self.base_quantum_ms);
        }
    }

    /// Aging level for an accumulated wait
    pub fn aging_boost_for(&self, total_wait_ms: u64) -> u32 {
        if total_wait_ms > self.aging_threshold_ms {
            let level = (total_wait_ms - self.aging_threshold_ms) / self.aging_step_ms;
            level.min(self.aging_cap as u64) as u32
        } else {
            0
        }
    }

    /// Initial burst estimate from the remaining work
    pub fn seed_estimate(&self, remaining_ms: u64) -> u64 {
        (remaining_ms / 4).max(self.base_quantum_ms)
    }

    /// Is an estimated burst short enough to count as interactive?
    pub fn is_interactive(&self, estimated_burst_ms: u64) -> bool {
        estimated_burst_ms < self.interactive_threshold_ms
    }
}
