//! Structured outcome of one execution.

/// What one `execute` call produced.
///
/// Captured text is present only for streams that were neither forwarded live
/// nor file-redirected at launch, and is complete relative to `exit_code`:
/// the engine joins every output relay before reading its buffer, so text can
/// never be truncated by a race with process exit.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    pub exit_code: i32,
    pub timed_out: bool,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Degraded result for an externally aborted run: exit code 1, nothing
    /// captured.
    pub(crate) fn aborted() -> Self {
        Self {
            exit_code: 1,
            timed_out: false,
            stdout: None,
            stderr: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_tracks_exit_code() {
        let ok = ExecResult {
            exit_code: 0,
            ..ExecResult::default()
        };
        let bad = ExecResult {
            exit_code: 2,
            ..ExecResult::default()
        };
        assert!(ok.success());
        assert!(!bad.success());
    }

    #[test]
    fn aborted_runs_report_exit_one_and_no_capture() {
        let res = ExecResult::aborted();
        assert_eq!(res.exit_code, 1);
        assert!(!res.timed_out);
        assert!(res.stdout.is_none());
        assert!(res.stderr.is_none());
    }
}
