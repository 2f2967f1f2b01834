//! Simulated process
//!
//! Consumes virtual CPU time from a shared [`SimClock`] while resumed and
//! exits with status 0 once its work is done. Starts suspended, like a
//! freshly forked child that has been stopped.
//!
//! Signal failures can be injected to exercise the loop's error path.

use std::time::Duration;

use nix::errno::Errno;

use super::{ExitStatus, ProcessHandle};
use crate::scheduler::{SchedulerError, SchedulerResult};
use crate::time::{Clock, SimClock, Timestamp};

const NS_PER_MS: u64 = 1_000_000;

/// Deterministic stand-in for a child process
#[derive(Debug, Clone)]
pub struct SimProcess {
    clock: SimClock,
    pid: Option<i32>,
    work_ns: u64,
    consumed_ns: u64,
    resumed_at: Option<Timestamp>,
    reaped: bool,
    suspends: u32,
    resumes: u32,
    failures_pending: u32,
}

impl SimProcess {
    /// Process needing `work_ms` of CPU, stopped
    pub fn new(clock: SimClock, work_ms: u64) -> Self {
        Self {
            clock,
            pid: None,
            work_ns: work_ms.saturating_mul(NS_PER_MS),
            consumed_ns: 0,
            resumed_at: None,
            reaped: false,
            suspends: 0,
            resumes: 0,
            failures_pending: 0,
        }
    }

    /// Report a fake pid in logs
    pub fn with_pid(mut self, pid: i32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Make the next `count` suspend/resume calls fail with `ESRCH`
    pub fn fail_next_signals(&mut self, count: u32) {
        self.failures_pending = count;
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    /// CPU consumed so far (ms, truncated)
    pub fn consumed_ms(&mut self) -> u64 {
        self.sync();
        self.consumed_ns / NS_PER_MS
    }

    pub fn suspend_count(&self) -> u32 {
        self.suspends
    }

    pub fn resume_count(&self) -> u32 {
        self.resumes
    }

    fn finished(&self) -> bool {
        self.consumed_ns >= self.work_ns
    }

    /// Charge CPU time elapsed since the last resume
    fn sync(&mut self) {
        if let Some(since) = self.resumed_at {
            let now = self.clock.now();
            let ran = now.as_ns().saturating_sub(since.as_ns());
            self.consumed_ns = (self.consumed_ns + ran).min(self.work_ns);
            self.resumed_at = Some(now);
        }
    }

    fn check_signal(&mut self, signal: &'static str) -> SchedulerResult<()> {
        let pid = self.pid.unwrap_or(0);
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
        } else if !self.reaped {
            return Ok(());
        }
        Err(SchedulerError::Signal {
            pid,
            signal,
            errno: Errno::ESRCH as i32,
        })
    }
}

impl ProcessHandle for SimProcess {
    fn pid(&self) -> Option<i32> {
        self.pid
    }

    fn suspend(&mut self) -> SchedulerResult<()> {
        self.check_signal("SIGSTOP")?;
        self.sync();
        self.resumed_at = None;
        self.suspends += 1;
        Ok(())
    }

    fn resume(&mut self) -> SchedulerResult<()> {
        self.check_signal("SIGCONT")?;
        self.sync();
        if self.resumed_at.is_none() {
            self.resumed_at = Some(self.clock.now());
        }
        self.resumes += 1;
        Ok(())
    }

    fn try_reap(&mut self) -> SchedulerResult<Option<ExitStatus>> {
        self.sync();
        if self.finished() {
            self.reaped = true;
            self.resumed_at = None;
            return Ok(Some(ExitStatus::Exited(0)));
        }
        Ok(None)
    }

    fn reap_blocking(&mut self) -> SchedulerResult<ExitStatus> {
        self.sync();
        if !self.finished() {
            let Some(since) = self.resumed_at else {
                // A stopped child never exits on its own
                return Err(SchedulerError::Reap {
                    pid: self.pid.unwrap_or(0),
                    errno: Errno::EDEADLK as i32,
                });
            };
            let left = self.work_ns - self.consumed_ns;
            self.clock.advance_to(since + Duration::from_nanos(left));
            self.sync();
        }
        self.reaped = true;
        self.resumed_at = None;
        Ok(ExitStatus::Exited(0))
    }
}
