//! Clock - monotonic and simulated time sources
//!
//! Provides the `Clock` seam used by the execution loop:
//! - `MonotonicClock`: `std::time::Instant` based, for real processes
//! - `SimClock`: deterministic virtual time, for tests and `--simulate` runs

use core::ops::{Add, Sub};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Point in time, in nanoseconds since the clock's origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Clock origin
    pub const ZERO: Self = Self(0);

    /// Get timestamp from nanoseconds
    pub const fn from_ns(ns: u64) -> Self {
        Self(ns)
    }

    /// Get timestamp from milliseconds
    pub const fn from_ms(ms: u64) -> Self {
        Self(ms * 1_000_000)
    }

    /// Get timestamp as nanoseconds
    pub const fn as_ns(&self) -> u64 {
        self.0
    }

    /// Get timestamp as milliseconds (truncated)
    pub const fn as_ms(&self) -> u64 {
        self.0 / 1_000_000
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// If `earlier` is after `self` (clock running backwards).
    pub fn ms_since(&self, earlier: Timestamp) -> u64 {
        crate::sched_assert!(
            earlier <= *self,
            "clock went backwards (negative elapsed time)"
        );
        self.as_ms() - earlier.as_ms()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.as_nanos() as u64))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Duration::from_nanos(self.0.saturating_sub(rhs.0))
    }
}

/// Time source consumed by the scheduler
pub trait Clock {
    /// Current time; never decreases
    fn now(&self) -> Timestamp;

    /// Block the caller for `duration`
    fn sleep(&self, duration: Duration);
}

/// Real monotonic clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_nanos() as u64)
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct SimClockInner {
    now_ns: Cell<u64>,
    jitter_ns: Cell<u64>,
    sleeps: Cell<u64>,
}

/// Deterministic simulated clock
///
/// Cloning yields another handle on the same virtual time, so simulated
/// processes and the scheduler observe one timeline. Single-threaded by
/// construction (`Rc`), which matches the single-threaded execution loop.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    inner: Rc<SimClockInner>,
}

impl SimClock {
    /// New clock at time zero, no jitter
    pub fn new() -> Self {
        Self::default()
    }

    /// New clock whose every `sleep` overshoots by `jitter`
    pub fn with_jitter(jitter: Duration) -> Self {
        let clock = Self::new();
        clock.inner.jitter_ns.set(jitter.as_nanos() as u64);
        clock
    }

    /// Move virtual time forward
    pub fn advance(&self, duration: Duration) {
        let now = self.inner.now_ns.get();
        self.inner
            .now_ns
            .set(now.saturating_add(duration.as_nanos() as u64));
    }

    /// Move virtual time forward to `at` (no-op if already past it)
    pub fn advance_to(&self, at: Timestamp) {
        if at.0 > self.inner.now_ns.get() {
            self.inner.now_ns.set(at.0);
        }
    }

    /// Number of `sleep` calls observed
    pub fn sleep_count(&self) -> u64 {
        self.inner.sleeps.get()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.inner.now_ns.get())
    }

    fn sleep(&self, duration: Duration) {
        self.inner.sleeps.set(self.inner.sleeps.get() + 1);
        self.advance(duration + Duration::from_nanos(self.inner.jitter_ns.get()));
    }
}
