//! Per-execution output handling options.

/// How `execute` routes the child's output.
///
/// `print_*` forwards that stream live through the console instead of
/// capturing it. `expect_*` marks the stream's output as anticipated, which
/// only suppresses highlighting in the post-failure flush; captured text is
/// never altered. `silent` suppresses the post-failure flush entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    pub print_stdout: bool,
    pub print_stderr: bool,
    pub expect_stdout: bool,
    pub expect_stderr: bool,
    pub silent: bool,
}

impl ExecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward both streams live; nothing is captured.
    pub fn forward_all() -> Self {
        Self {
            print_stdout: true,
            print_stderr: true,
            ..Self::default()
        }
    }

    /// Capture both streams and never flush them, even on failure.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_captures_everything() {
        let opts = ExecOptions::new();
        assert!(!opts.print_stdout);
        assert!(!opts.print_stderr);
        assert!(!opts.silent);
    }

    #[test]
    fn presets_set_expected_flags() {
        assert!(ExecOptions::forward_all().print_stdout);
        assert!(ExecOptions::forward_all().print_stderr);
        assert!(ExecOptions::silent().silent);
        assert!(!ExecOptions::silent().print_stdout);
    }
}
