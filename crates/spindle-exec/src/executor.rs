//! The execution coordinator.
//!
//! `ProcessExecutor` ties the other modules together: launch, relays,
//! deadline supervision, destruction, result assembly. The ordering rules
//! live here and nowhere else:
//!
//! 1. relays start before anything blocks on process exit,
//! 2. output relays are joined before their buffers are read,
//! 3. the handle is destroyed on every path out.

use crate::console::{highlighted, Console};
use crate::handle::{exit_code_of, LaunchedProcess};
use crate::launcher;
use crate::options::ExecOptions;
use crate::params::ProcessParams;
use crate::relay::{ConsoleStream, RelaySink, StreamRelay};
use crate::result::ExecResult;
use crate::supervisor::{TimeoutHandler, TimeoutSupervisor, WaitOutcome};
use spindle_error::SpindleResult;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Blocking engine for running external processes.
///
/// Construction takes the console the engine forwards and flushes through.
/// Handles produced by [`launch`](Self::launch) are independent; executions
/// of different handles share no state and run fully in parallel.
pub struct ProcessExecutor {
    console: Arc<dyn Console>,
    stdin_source: Mutex<Option<Box<dyn Read + Send>>>,
}

impl ProcessExecutor {
    pub fn new(console: Arc<dyn Console>) -> Self {
        Self {
            console,
            stdin_source: Mutex::new(None),
        }
    }

    /// Configure a live stdin source, consumed by the first execution that
    /// runs without a literal stdin payload.
    #[must_use]
    pub fn with_stdin_source(self, source: Box<dyn Read + Send>) -> Self {
        *self.stdin_source.lock().unwrap() = Some(source);
        self
    }

    /// Spawn the process described by `params` without waiting on it.
    pub fn launch(&self, params: &ProcessParams) -> SpindleResult<LaunchedProcess> {
        launcher::launch(params)
    }

    /// Run a launched process to completion.
    ///
    /// Blocks until the child exits, the `timeout` expires (the child is then
    /// killed and the result carries `timed_out`), or the child is destroyed
    /// externally. Stream routing follows `options`; a literal `stdin`
    /// payload is written and the pipe closed before waiting. Only handle
    /// misuse surfaces as `Err`: runtime stream failures degrade the result
    /// instead of losing the exit code.
    pub fn execute(
        &self,
        handle: &mut LaunchedProcess,
        options: ExecOptions,
        stdin: Option<&str>,
        timeout: Option<Duration>,
        timeout_handler: Option<TimeoutHandler>,
    ) -> SpindleResult<ExecResult> {
        handle.begin_wait()?;

        // Relays take the pipe ends and must be running before anything
        // blocks on exit; a full pipe buffer wedges child and waiter alike.
        // A stream redirected to a file at launch has no pipe and no relay.
        let stdout_pipe = handle.child.stdout.take();
        let stderr_pipe = handle.child.stderr.take();
        let capturing_stdout = stdout_pipe.is_some() && !options.print_stdout;
        let capturing_stderr = stderr_pipe.is_some() && !options.print_stderr;

        let stdout_relay = stdout_pipe.map(|out| {
            StreamRelay::drain(out, self.sink(options.print_stdout, ConsoleStream::Stdout))
        });
        let stderr_relay = stderr_pipe.map(|err| {
            StreamRelay::drain(err, self.sink(options.print_stderr, ConsoleStream::Stderr))
        });
        self.dispatch_stdin(handle, stdin);

        let mut timed_out = false;
        if let Some(timeout) = timeout {
            let supervisor = TimeoutSupervisor::new(timeout, timeout_handler);
            match supervisor.supervise(&mut handle.child) {
                Ok(WaitOutcome::Exited(status)) => handle.record_exit(status),
                Ok(WaitOutcome::Expired) => timed_out = true,
                Err(err) => {
                    log::warn!("bounded wait on pid {} failed: {}", handle.id(), err);
                }
            }
        } else {
            match handle.child.wait() {
                Ok(status) => handle.record_exit(status),
                Err(err) => {
                    log::warn!("wait on pid {} failed: {}", handle.id(), err);
                }
            }
        }

        // Join the output relays before reading any buffer: this is what
        // makes captured text complete relative to the exit code. The stdin
        // feed, if any, stays detached and never gates the return.
        let stdout_joined = stdout_relay.map(StreamRelay::join).transpose();
        let stderr_joined = stderr_relay.map(StreamRelay::join).transpose();

        let (stdout_bytes, stderr_bytes) = match (stdout_joined, stderr_joined) {
            (Ok(out), Ok(err)) => (out.unwrap_or_default(), err.unwrap_or_default()),
            _ => {
                log::warn!(
                    "output relay for {} (pid {}) panicked; reporting an aborted run",
                    handle.program(),
                    handle.id()
                );
                handle.destroy();
                return Ok(ExecResult::aborted());
            }
        };

        // Idempotent: a no-op after a natural exit, kill + reap otherwise.
        handle.destroy();
        let exit_code = handle.exit_code().unwrap_or(1);

        let stdout = capturing_stdout.then(|| String::from_utf8_lossy(&stdout_bytes).into_owned());
        let stderr = capturing_stderr.then(|| String::from_utf8_lossy(&stderr_bytes).into_owned());

        if exit_code != 0 && !options.silent {
            self.flush_captured(handle, &options, stdout.as_deref(), stderr.as_deref());
        }

        Ok(ExecResult {
            exit_code,
            timed_out,
            stdout,
            stderr,
        })
    }

    /// [`execute`](Self::execute) with default options, no stdin payload and
    /// no timeout.
    pub fn execute_with_defaults(&self, handle: &mut LaunchedProcess) -> SpindleResult<ExecResult> {
        self.execute(handle, ExecOptions::default(), None, None, None)
    }

    /// One-shot launch + execute with defaults.
    pub fn launch_and_execute(&self, params: &ProcessParams) -> SpindleResult<ExecResult> {
        self.launch_and_execute_with(params, ExecOptions::default(), None, None, None)
    }

    /// One-shot launch + execute with the full argument set.
    pub fn launch_and_execute_with(
        &self,
        params: &ProcessParams,
        options: ExecOptions,
        stdin: Option<&str>,
        timeout: Option<Duration>,
        timeout_handler: Option<TimeoutHandler>,
    ) -> SpindleResult<ExecResult> {
        let mut handle = self.launch(params)?;
        self.execute(&mut handle, options, stdin, timeout, timeout_handler)
    }

    /// Kill (if still running) and reap. Safe on any handle in any state.
    pub fn destroy(&self, handle: &mut LaunchedProcess) {
        handle.destroy();
    }

    /// Wait for exit without draining output, returning the exit code.
    ///
    /// Claims the handle's single wait like `execute` does. Only safe for
    /// processes whose output is file-redirected or small enough to fit the
    /// pipe buffers; anything chattier will wedge here.
    pub fn wait_for_exit(&self, handle: &mut LaunchedProcess) -> SpindleResult<i32> {
        handle.begin_wait()?;
        // Close stdin so children that read to EOF cannot hang.
        drop(handle.child.stdin.take());
        let status = handle.child.wait()?;
        handle.record_exit(status);
        Ok(exit_code_of(status))
    }

    fn sink(&self, forward: bool, stream: ConsoleStream) -> RelaySink {
        if forward {
            RelaySink::Forward(Arc::clone(&self.console), stream)
        } else {
            RelaySink::Capture
        }
    }

    /// Route the child's stdin: literal payload first, then the configured
    /// source, otherwise close it immediately so EOF-reading children cannot
    /// hang. Write failures mean the child stopped reading; its exit code
    /// tells the real story, so they are absorbed.
    ///
    /// The feed worker is detached, never joined: a live source can sit in
    /// `read` long after the child exits, and joining it would wedge
    /// [`execute`](Self::execute). The worker ends on its own at the next
    /// broken-pipe write.
    fn dispatch_stdin(&self, handle: &mut LaunchedProcess, payload: Option<&str>) {
        let pipe = match handle.child.stdin.take() {
            Some(pipe) => pipe,
            None => {
                if payload.is_some() {
                    log::debug!(
                        "stdin payload ignored: {} has no stdin pipe",
                        handle.program()
                    );
                }
                return;
            }
        };

        if let Some(payload) = payload {
            let mut pipe = pipe;
            if let Err(err) = pipe.write_all(payload.as_bytes()) {
                log::debug!("stdin write to {} ended early: {}", handle.program(), err);
            }
            return;
        }

        if let Some(source) = self.stdin_source.lock().unwrap().take() {
            StreamRelay::feed(pipe, source).detach();
        }
    }

    fn flush_captured(
        &self,
        handle: &LaunchedProcess,
        options: &ExecOptions,
        stdout: Option<&str>,
        stderr: Option<&str>,
    ) {
        log::debug!(
            "{} (pid {}) failed; flushing captured output",
            handle.program(),
            handle.id()
        );
        if let Some(text) = stdout.filter(|t| !t.is_empty()) {
            self.console
                .write_stdout(&self.presentable(text, options.expect_stdout));
        }
        if let Some(text) = stderr.filter(|t| !t.is_empty()) {
            self.console
                .write_stderr(&self.presentable(text, options.expect_stderr));
        }
    }

    fn presentable(&self, text: &str, expected: bool) -> String {
        if self.console.ansi_enabled() && !expected {
            highlighted(text)
        } else {
            text.to_string()
        }
    }
}
