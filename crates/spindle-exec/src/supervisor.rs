//! Wall-clock deadline enforcement for a running child.

use std::io;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Callback invoked with the child's OS pid when its deadline expires, just
/// before the forced kill. A returned error is logged and discarded.
pub type TimeoutHandler = Box<dyn FnOnce(u32) -> anyhow::Result<()>>;

/// Outcome of a supervised wait.
pub(crate) enum WaitOutcome {
    /// The child exited on its own within the deadline.
    Exited(ExitStatus),
    /// The deadline elapsed; the child has been sent a kill.
    Expired,
}

/// Bounded wait on one child. External commands must not be allowed to hang
/// their caller indefinitely.
pub(crate) struct TimeoutSupervisor {
    timeout: Duration,
    handler: Option<TimeoutHandler>,
}

impl TimeoutSupervisor {
    pub fn new(timeout: Duration, handler: Option<TimeoutHandler>) -> Self {
        Self { timeout, handler }
    }

    /// Block until the child exits or the deadline passes.
    ///
    /// On expiry the handler (if any) runs first, then the child is killed.
    /// Reaping the killed child is the caller's job; the kill guarantees the
    /// follow-up wait returns promptly.
    pub fn supervise(mut self, child: &mut Child) -> io::Result<WaitOutcome> {
        if let Some(status) = child.wait_timeout(self.timeout)? {
            return Ok(WaitOutcome::Exited(status));
        }

        let pid = child.id();
        log::warn!(
            "process {} still running after {:?}, killing it",
            pid,
            self.timeout
        );
        if let Some(handler) = self.handler.take() {
            if let Err(err) = handler(pid) {
                log::warn!("timeout handler for process {} failed: {:#}", pid, err);
            }
        }
        let _ = child.kill();
        Ok(WaitOutcome::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    #[cfg(unix)]
    fn prompt_exit_within_deadline() {
        let mut child = Command::new("true").spawn().unwrap();
        let supervisor = TimeoutSupervisor::new(Duration::from_secs(5), None);

        match supervisor.supervise(&mut child).unwrap() {
            WaitOutcome::Exited(status) => assert!(status.success()),
            WaitOutcome::Expired => panic!("true should not time out"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn expiry_kills_and_invokes_handler() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let seen_pid = Arc::new(AtomicU32::new(0));
        let recorded = Arc::clone(&seen_pid);
        let handler: TimeoutHandler = Box::new(move |pid| {
            recorded.store(pid, Ordering::SeqCst);
            Ok(())
        });

        let started = Instant::now();
        let supervisor = TimeoutSupervisor::new(Duration::from_millis(100), Some(handler));
        let outcome = supervisor.supervise(&mut child).unwrap();

        assert!(matches!(outcome, WaitOutcome::Expired));
        assert_eq!(seen_pid.load(Ordering::SeqCst), child.id());
        // The kill has been delivered, so reaping must not block.
        child.wait().unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    #[cfg(unix)]
    fn failing_handler_does_not_stop_the_kill() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let handler: TimeoutHandler = Box::new(|_| anyhow::bail!("handler exploded"));

        let supervisor = TimeoutSupervisor::new(Duration::from_millis(100), Some(handler));
        let outcome = supervisor.supervise(&mut child).unwrap();

        assert!(matches!(outcome, WaitOutcome::Expired));
        child.wait().unwrap();
    }
}
