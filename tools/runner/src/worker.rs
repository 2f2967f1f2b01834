//! CPU-bound workers
//!
//! Each task is a forked child that spins until it has consumed its burst
//! of *CPU* time, then exits 0. The parent stops it right after the fork;
//! from then on only the scheduler's SIGCONT lets it run.

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use hcfs_scheduler::{SignalProcess, TaskSpec};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::waitpid;
use nix::time::{clock_gettime, ClockId};
use nix::unistd::{fork, ForkResult, Pid};

/// Pause before stopping a fresh child
const START_SETTLE: Duration = Duration::from_millis(1);

fn cpu_time() -> nix::Result<Duration> {
    let ts = clock_gettime(ClockId::CLOCK_PROCESS_CPUTIME_ID)?;
    Ok(Duration::new(ts.tv_sec() as u64, ts.tv_nsec() as u32))
}

/// Child body: spin until `burst` of CPU time is used; returns the exit code
fn burn_cpu(burst: Duration) -> i32 {
    let mut counter = 0u64;
    loop {
        match cpu_time() {
            Ok(used) if used >= burst => return 0,
            Ok(_) => {}
            Err(_) => return 1,
        }
        for i in 0..10_000u64 {
            counter = black_box(counter.wrapping_add(i));
        }
    }
}

/// Fork one stopped worker
pub fn spawn(id: usize, spec: &TaskSpec, settle: Duration) -> Result<SignalProcess> {
    // SAFETY: the runner is single-threaded here and the child only spins
    // and calls `_exit`.
    match unsafe { fork() }.with_context(|| format!("fork of P{} failed", id))? {
        ForkResult::Child => {
            let code = burn_cpu(Duration::from_millis(spec.burst_ms));
            // SAFETY: skips atexit handlers and stdio flushing inherited
            // from the parent.
            unsafe { nix::libc::_exit(code) }
        }
        ForkResult::Parent { child } => {
            thread::sleep(START_SETTLE);
            kill(child, Signal::SIGSTOP)
                .with_context(|| format!("cannot stop P{} (pid {})", id, child))?;
            log::debug!("[PROC] P{} forked as pid {}, stopped", id, child);
            Ok(SignalProcess::new(child, settle))
        }
    }
}

/// Fork every worker; on failure, already forked ones are killed
pub fn spawn_all(specs: &[TaskSpec], settle: Duration) -> Result<Vec<SignalProcess>> {
    let mut workers = Vec::with_capacity(specs.len());
    for (id, spec) in specs.iter().enumerate() {
        match spawn(id, spec, settle) {
            Ok(worker) => workers.push(worker),
            Err(err) => {
                kill_all(workers.iter().map(|w| w.raw_pid()));
                return Err(err);
            }
        }
    }
    Ok(workers)
}

/// SIGKILL and reap workers that will never be scheduled
pub fn kill_all(pids: impl IntoIterator<Item = Pid>) {
    for pid in pids {
        if let Err(err) = kill(pid, Signal::SIGKILL) {
            log::warn!("[PROC] SIGKILL {} failed: {}", pid, err);
            continue;
        }
        if let Err(err) = waitpid(pid, None) {
            log::warn!("[PROC] waitpid {} failed: {}", pid, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcfs_scheduler::{ExitStatus, ProcessHandle};

    #[test]
    fn test_cpu_time_advances() {
        let before = cpu_time().unwrap();
        assert_eq!(burn_cpu(before + Duration::from_millis(2)), 0);
        assert!(cpu_time().unwrap() >= before + Duration::from_millis(2));
    }

    #[test]
    fn test_worker_exits_after_its_burst() {
        let mut worker = spawn(0, &TaskSpec::new(0, 5, 0), Duration::ZERO).unwrap();
        assert_eq!(worker.try_reap().unwrap(), None);

        worker.resume().unwrap();
        assert_eq!(worker.reap_blocking().unwrap(), ExitStatus::Exited(0));
    }
}
