//! Virtual-runtime accountant
//!
//! `vruntime += executed_ns * NICE_0_WEIGHT / weight` (truncating). Heavier
//! tasks age slower in virtual time, so they get picked more often.
//!
//! Also tracks the system-wide `min_vruntime` floor used to seed tasks that
//! join later. Zero is the "never updated" sentinel: the first advance sets
//! it unconditionally.

use super::policy::NICE_0_WEIGHT;
use crate::scheduler::task::Task;

const NS_PER_MS: u64 = 1_000_000;

/// Owns `min_vruntime` and is the only writer of task vruntimes
#[derive(Debug, Clone, Default)]
pub struct VruntimeAccountant {
    min_vruntime_ns: u64,
}

impl VruntimeAccountant {
    pub const fn new() -> Self {
        Self { min_vruntime_ns: 0 }
    }

    /// Current floor
    pub fn min_vruntime_ns(&self) -> u64 {
        self.min_vruntime_ns
    }

    /// Virtual-time delta for `executed_ms` at `weight`
    pub fn delta_ns(executed_ms: u64, weight: u32) -> u64 {
        crate::sched_assert!(weight > 0, "weight must be positive");
        let executed_ns = executed_ms.saturating_mul(NS_PER_MS);
        // u128 keeps the multiply exact for absurdly long slices
        ((executed_ns as u128 * NICE_0_WEIGHT as u128) / weight as u128) as u64
    }

    /// Charge `executed_ms` of CPU to `task`; returns the delta applied
    pub fn advance<P>(&mut self, task: &mut Task<P>, executed_ms: u64) -> u64 {
        let before = task.vruntime_ns();
        let delta = Self::delta_ns(executed_ms, task.weight());
        task.add_vruntime(delta);

        crate::sched_assert!(task.vruntime_ns() >= before, "vruntime decreased");

        if task.vruntime_ns() < self.min_vruntime_ns || self.min_vruntime_ns == 0 {
            self.min_vruntime_ns = task.vruntime_ns();
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::core::policy::{weight_for, NICE_MAX, NICE_MIN};
    use crate::scheduler::task::{TaskId, TaskSpec};
    use proptest::prelude::*;

    fn task(nice: i32) -> Task<()> {
        Task::new(TaskId(0), TaskSpec::new(0, 100, nice), (), 0)
    }

    #[test]
    fn test_delta_nice_zero_is_wall_time() {
        assert_eq!(VruntimeAccountant::delta_ns(10, 1024), 10_000_000);
    }

    #[test]
    fn test_delta_truncates() {
        // 10ms * 1024 / 335 = 30_567_164.17...
        assert_eq!(VruntimeAccountant::delta_ns(10, 335), 30_567_164);
    }

    #[test]
    fn test_advance_updates_task_and_floor() {
        let mut acct = VruntimeAccountant::new();
        let mut heavy = task(-10);
        let mut light = task(5);

        acct.advance(&mut light, 10);
        assert_eq!(acct.min_vruntime_ns(), light.vruntime_ns());

        acct.advance(&mut heavy, 10);
        assert_eq!(heavy.vruntime_ns(), 1_072_475);
        assert_eq!(acct.min_vruntime_ns(), heavy.vruntime_ns());

        // Larger vruntime does not raise the floor
        acct.advance(&mut light, 10);
        assert_eq!(acct.min_vruntime_ns(), heavy.vruntime_ns());
    }

    #[test]
    fn test_zero_executed_keeps_vruntime() {
        let mut acct = VruntimeAccountant::new();
        let mut t = task(0);
        assert_eq!(acct.advance(&mut t, 0), 0);
        assert_eq!(t.vruntime_ns(), 0);
    }

    #[test]
    #[should_panic(expected = "weight must be positive")]
    fn test_zero_weight_asserts() {
        VruntimeAccountant::delta_ns(10, 0);
    }

    proptest! {
        #[test]
        fn prop_heavier_weight_smaller_delta(
            nice in NICE_MIN..NICE_MAX,
            executed in 1u64..10_000,
        ) {
            // nice < nice + 1  ⇒  weight(nice) > weight(nice + 1)
            let heavy = VruntimeAccountant::delta_ns(executed, weight_for(nice));
            let light = VruntimeAccountant::delta_ns(executed, weight_for(nice + 1));
            prop_assert!(heavy < light);
        }

        #[test]
        fn prop_vruntime_non_decreasing(
            nice in NICE_MIN..=NICE_MAX,
            slices in proptest::collection::vec(0u64..500, 1..50),
        ) {
            let mut acct = VruntimeAccountant::new();
            let mut t = task(nice);
            let mut last = t.vruntime_ns();
            for executed in slices {
                acct.advance(&mut t, executed);
                prop_assert!(t.vruntime_ns() >= last);
                last = t.vruntime_ns();
            }
        }
    }
}
