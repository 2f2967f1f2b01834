//! Scheduling Policy - weights, time slices and tunables
//!
//! - Nice → weight: the standard 40-entry CFS curve (nice 0 = 1024, each nice
//!   step is ~1.25x CPU share)
//! - Time slice: base quantum scaled by `1024 / weight`, floored at the
//!   minimum granularity
//! - `SchedConfig`: every tunable of the selector, heuristics and loop

use std::time::Duration;

use super::error::{SchedulerError, SchedulerResult};

/// Lowest (most favoured) nice value
pub const NICE_MIN: i32 = -20;

/// Highest (least favoured) nice value
pub const NICE_MAX: i32 = 19;

/// Weight of a nice-0 task
pub const NICE_0_WEIGHT: u32 = 1024;

/// Nice -20..=19 → CFS weight
pub const NICE_TO_WEIGHT: [u32; 40] = [
    /* -20 */ 88761, 71755, 56483, 46273, 36291,
    /* -15 */ 29154, 23254, 18705, 14949, 11916,
    /* -10 */ 9548, 7620, 6100, 4904, 3906,
    /*  -5 */ 3121, 2501, 1991, 1586, 1277,
    /*   0 */ 1024, 820, 655, 526, 423,
    /*   5 */ 335, 272, 215, 172, 137,
    /*  10 */ 110, 87, 70, 56, 45,
    /*  15 */ 36, 29, 23, 18, 15,
];

/// Clamp a nice value into [-20, 19]
pub fn clamp_nice(nice: i32) -> i32 {
    nice.clamp(NICE_MIN, NICE_MAX)
}

/// Scheduling weight for a nice value (out-of-range input is clamped)
pub fn weight_for(nice: i32) -> u32 {
    NICE_TO_WEIGHT[(clamp_nice(nice) - NICE_MIN) as usize]
}

/// How the burst estimate evolves after it is seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstEstimator {
    /// Seeded once from the remaining work, never revised
    OneShot,
    /// Seeded like `OneShot`, then blended with every measured slice.
    /// `alpha_per_256` is the weight of the new sample (64 = 0.25).
    Ema { alpha_per_256: u32 },
}

impl Default for BurstEstimator {
    fn default() -> Self {
        Self::OneShot
    }
}

/// Scheduler tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedConfig {
    /// Base time quantum for a nice-0 task (ms)
    pub base_quantum_ms: u64,
    /// Smallest slice ever handed out (ms)
    pub min_granularity_ms: u64,
    /// Idle poll interval when nothing is eligible
    pub tick: Duration,
    /// Task capacity (`None` = unbounded)
    pub max_tasks: Option<usize>,

    /// Wait beyond which aging kicks in (ms)
    pub aging_threshold_ms: u64,
    /// Extra wait per aging level (ms)
    pub aging_step_ms: u64,
    /// Highest aging level
    pub aging_cap: u32,
    /// Estimated bursts below this are "interactive" (ms)
    pub interactive_threshold_ms: u64,
    /// Interactivity score bonus for interactive tasks
    pub interactivity_bonus: u32,
    /// Remaining work above this is penalised (ms)
    pub long_task_threshold_ms: u64,

    /// Score credit per aging level (ns)
    pub aging_unit_ns: i64,
    /// Score credit for interactive tasks (ns)
    pub interactive_bonus_ns: i64,
    /// Score penalty for long tasks (ns)
    pub long_task_penalty_ns: i64,

    /// Pause after each delivered signal so it lands before we move on
    pub signal_settle: Duration,
    /// Burst estimation mode
    pub burst_estimator: BurstEstimator,
}

impl SchedConfig {
    /// Validate parameters
    pub fn validate(&self) -> SchedulerResult<()> {
        let reason = if self.base_quantum_ms == 0 {
            Some("base quantum must be > 0 ms")
        } else if self.min_granularity_ms == 0 {
            Some("minimum granularity must be > 0 ms")
        } else if self.tick.is_zero() {
            Some("idle tick must be > 0")
        } else if self.max_tasks == Some(0) {
            Some("task capacity must be > 0")
        } else if self.aging_step_ms == 0 {
            Some("aging step must be > 0 ms")
        } else if let BurstEstimator::Ema { alpha_per_256 } = self.burst_estimator {
            (alpha_per_256 == 0 || alpha_per_256 > 256).then_some("EMA alpha must be 1..=256")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SchedulerError::InvalidConfig { reason }),
            None => Ok(()),
        }
    }

    /// Time slice for a task of the given weight (ms)
    pub fn time_slice_ms(&self, weight: u32) -> u64 {
        crate::sched_assert!(weight > 0, "weight must be positive");
        let slice = (self.base_quantum_ms * NICE_0_WEIGHT as u64) / weight as u64;
        slice.max(self.min_granularity_ms)
    }
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            base_quantum_ms: 10,
            min_granularity_ms: 5,
            tick: Duration::from_millis(1),
            max_tasks: Some(10),

            aging_threshold_ms: 100,
            aging_step_ms: 10,
            aging_cap: 10,
            interactive_threshold_ms: 50,
            interactivity_bonus: 20,
            long_task_threshold_ms: 100,

            aging_unit_ns: 100_000_000,
            interactive_bonus_ns: 50_000_000,
            long_task_penalty_ns: 10_000_000,

            signal_settle: Duration::from_micros(100),
            burst_estimator: BurstEstimator::OneShot,
        }
    }
}
