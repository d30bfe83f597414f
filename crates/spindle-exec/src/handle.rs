//! Exclusive handle for one launched OS process.

use spindle_error::{SpindleError, SpindleResult};
use std::process::{Child, ExitStatus};

/// One launched process and its stream endpoints.
///
/// A handle is consumed by exactly one `execute`/`wait_for_exit`; a second
/// attempt fails with [`SpindleError::HandleConsumed`]. `destroy` is legal in
/// any state and idempotent, and dropping an undestroyed handle destroys it,
/// so no child is ever left running or unreaped.
#[derive(Debug)]
pub struct LaunchedProcess {
    pub(crate) child: Child,
    program: String,
    status: Option<ExitStatus>,
    waited: bool,
}

impl LaunchedProcess {
    pub(crate) fn new(child: Child, program: String) -> Self {
        Self {
            child,
            program,
            status: None,
            waited: false,
        }
    }

    /// OS pid of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Program token the child was launched from.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Claim the handle's single wait. Fails on the second claim.
    pub(crate) fn begin_wait(&mut self) -> SpindleResult<()> {
        if self.waited {
            return Err(SpindleError::HandleConsumed);
        }
        self.waited = true;
        Ok(())
    }

    pub(crate) fn record_exit(&mut self, status: ExitStatus) {
        self.status = Some(status);
    }

    /// Kill the child if it is still running and reap it. Safe to call any
    /// number of times, in any state.
    pub fn destroy(&mut self) {
        if self.status.is_some() {
            return;
        }
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => {
                log::debug!(
                    "{} (pid {}) reaped with {}",
                    self.program,
                    self.child.id(),
                    status
                );
                self.status = Some(status);
            }
            Err(err) => {
                log::warn!(
                    "failed to reap {} (pid {}): {}",
                    self.program,
                    self.child.id(),
                    err
                );
            }
        }
    }

    /// Exit code once the child has been reaped, `None` while it runs.
    ///
    /// A signal death on Unix maps to the shell convention `128 + signal`.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.map(exit_code_of)
    }
}

impl Drop for LaunchedProcess {
    fn drop(&mut self) {
        self.destroy();
    }
}

pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[cfg(unix)]
    fn spawn_sleep() -> LaunchedProcess {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        LaunchedProcess::new(child, "sleep".to_string())
    }

    #[test]
    #[cfg(unix)]
    fn destroy_twice_is_a_noop() {
        let mut handle = spawn_sleep();
        handle.destroy();
        let code = handle.exit_code();
        assert!(code.is_some());
        assert_ne!(code, Some(0));

        handle.destroy();
        assert_eq!(handle.exit_code(), code);
    }

    #[test]
    #[cfg(unix)]
    fn wait_latch_rejects_second_claim() {
        let mut handle = spawn_sleep();
        handle.begin_wait().unwrap();
        assert!(matches!(
            handle.begin_wait(),
            Err(SpindleError::HandleConsumed)
        ));
        handle.destroy();
    }

    #[test]
    #[cfg(unix)]
    fn exit_code_reports_the_real_status() {
        let child = Command::new("sh").args(["-c", "exit 7"]).spawn().unwrap();
        let mut handle = LaunchedProcess::new(child, "sh".to_string());
        assert_eq!(handle.exit_code(), None);

        let status = handle.child.wait().unwrap();
        handle.record_exit(status);
        assert_eq!(handle.exit_code(), Some(7));
    }

    #[test]
    #[cfg(unix)]
    fn signal_death_maps_past_128() {
        let mut handle = spawn_sleep();
        handle.destroy();
        // SIGKILL is 9 everywhere we run tests.
        assert_eq!(handle.exit_code(), Some(137));
    }
}
