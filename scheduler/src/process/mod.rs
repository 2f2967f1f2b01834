//! Process control - the capability the execution loop drives
//!
//! The loop never touches OS processes directly: every task owns a
//! [`ProcessHandle`] and the loop only suspends, resumes and polls it.
//!
//! Implementations:
//! - [`SignalProcess`]: real child process, `SIGSTOP`/`SIGCONT` + `waitpid`
//! - [`SimProcess`]: simulated CPU consumer on a [`SimClock`](crate::SimClock)

pub mod signal;
pub mod sim;

pub use signal::SignalProcess;
pub use sim::SimProcess;

use core::fmt;

use crate::scheduler::SchedulerResult;

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal (signal number)
    Signaled(i32),
}

impl ExitStatus {
    /// Exit code, if the process exited normally
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(_) => None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit {}", code),
            Self::Signaled(sig) => write!(f, "signal {}", sig),
        }
    }
}

/// Suspend/resume/poll capability over one external process
///
/// `suspend` and `resume` are best-effort and idempotent: delivering the
/// same signal twice is harmless. Failures are reported, never retried.
pub trait ProcessHandle {
    /// OS pid, for logging (`None` for simulated processes)
    fn pid(&self) -> Option<i32>;

    /// Stop the process (SIGSTOP)
    fn suspend(&mut self) -> SchedulerResult<()>;

    /// Continue the process (SIGCONT)
    fn resume(&mut self) -> SchedulerResult<()>;

    /// Non-blocking exit check
    fn try_reap(&mut self) -> SchedulerResult<Option<ExitStatus>>;

    /// Wait for the process to exit (shutdown only)
    fn reap_blocking(&mut self) -> SchedulerResult<ExitStatus>;
}

impl<P: ProcessHandle + ?Sized> ProcessHandle for Box<P> {
    fn pid(&self) -> Option<i32> {
        (**self).pid()
    }

    fn suspend(&mut self) -> SchedulerResult<()> {
        (**self).suspend()
    }

    fn resume(&mut self) -> SchedulerResult<()> {
        (**self).resume()
    }

    fn try_reap(&mut self) -> SchedulerResult<Option<ExitStatus>> {
        (**self).try_reap()
    }

    fn reap_blocking(&mut self) -> SchedulerResult<ExitStatus> {
        (**self).reap_blocking()
    }
}

/// Pid column for log lines
pub(crate) fn pid_label<P: ProcessHandle + ?Sized>(handle: &P) -> String {
    match handle.pid() {
        Some(pid) => pid.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status() {
        assert!(ExitStatus::Exited(0).success());
        assert!(!ExitStatus::Exited(1).success());
        assert!(!ExitStatus::Signaled(9).success());
        assert_eq!(ExitStatus::Exited(3).code(), Some(3));
        assert_eq!(ExitStatus::Signaled(9).code(), None);
        assert_eq!(ExitStatus::Signaled(9).to_string(), "signal 9");
    }
}
