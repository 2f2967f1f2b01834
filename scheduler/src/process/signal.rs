//! Signal-driven child process
//!
//! `SIGSTOP`/`SIGCONT` through `kill(2)`, exit detection through
//! `waitpid(2)`. Once an exit status has been collected it is cached and
//! no further signal is sent: the pid may already belong to someone else.

use std::thread;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use super::{ExitStatus, ProcessHandle};
use crate::scheduler::{SchedulerError, SchedulerResult};

/// Child process controlled with POSIX signals
#[derive(Debug)]
pub struct SignalProcess {
    pid: Pid,
    settle: Duration,
    status: Option<ExitStatus>,
}

impl SignalProcess {
    /// Take control of child `pid`; `settle` is slept after every signal
    pub fn new(pid: Pid, settle: Duration) -> Self {
        Self {
            pid,
            settle,
            status: None,
        }
    }

    pub fn raw_pid(&self) -> Pid {
        self.pid
    }

    fn send(&mut self, signal: Signal) -> SchedulerResult<()> {
        let signal_err = |errno: Errno| SchedulerError::Signal {
            pid: self.pid.as_raw(),
            signal: signal.as_str(),
            errno: errno as i32,
        };

        if self.status.is_some() {
            return Err(signal_err(Errno::ESRCH));
        }

        kill(self.pid, signal).map_err(signal_err)?;
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        Ok(())
    }

    fn decode(status: WaitStatus) -> Option<ExitStatus> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus::Exited(code)),
            WaitStatus::Signaled(_, sig, _) => Some(ExitStatus::Signaled(sig as i32)),
            _ => None,
        }
    }

    fn reap_err(&self, errno: Errno) -> SchedulerError {
        SchedulerError::Reap {
            pid: self.pid.as_raw(),
            errno: errno as i32,
        }
    }
}

impl ProcessHandle for SignalProcess {
    fn pid(&self) -> Option<i32> {
        Some(self.pid.as_raw())
    }

    fn suspend(&mut self) -> SchedulerResult<()> {
        self.send(Signal::SIGSTOP)
    }

    fn resume(&mut self) -> SchedulerResult<()> {
        self.send(Signal::SIGCONT)
    }

    fn try_reap(&mut self) -> SchedulerResult<Option<ExitStatus>> {
        if self.status.is_some() {
            return Ok(self.status);
        }

        let status = waitpid(self.pid, Some(WaitPidFlag::WNOHANG))
            .map_err(|errno| self.reap_err(errno))?;
        self.status = Self::decode(status);

        if let Some(status) = self.status {
            log::debug!("[PROC] pid {} exited ({})", self.pid, status);
        }
        Ok(self.status)
    }

    fn reap_blocking(&mut self) -> SchedulerResult<ExitStatus> {
        loop {
            if let Some(status) = self.status {
                return Ok(status);
            }

            match waitpid(self.pid, None) {
                Ok(status) => self.status = Self::decode(status),
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(self.reap_err(errno)),
            }
        }
    }
}
