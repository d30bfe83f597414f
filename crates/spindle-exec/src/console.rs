//! Console destination for forwarded and flushed process output.
//!
//! The engine never prints on its own authority; everything user-visible goes
//! through this trait so callers can reroute or record it.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// Write destination for live-forwarded output and the post-failure flush.
///
/// Writes are best-effort: a console that cannot accept text drops it rather
/// than failing the run.
pub trait Console: Send + Sync {
    fn write_stdout(&self, text: &str);
    fn write_stderr(&self, text: &str);

    /// Whether ANSI escape sequences (highlighting) may be emitted.
    fn ansi_enabled(&self) -> bool;
}

/// Wrap `text` in the highlight sequence used for surprising output.
pub(crate) fn highlighted(text: &str) -> String {
    format!("\x1b[1;31m{}\x1b[0m", text)
}

/// Console backed by the real stdout/stderr of the calling process.
pub struct StdioConsole {
    ansi: bool,
}

impl StdioConsole {
    pub fn new() -> Self {
        Self {
            ansi: io::stdout().is_terminal(),
        }
    }

    /// Console that never emits ANSI sequences, regardless of terminal.
    pub fn plain() -> Self {
        Self { ansi: false }
    }
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdioConsole {
    fn write_stdout(&self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn write_stderr(&self, text: &str) {
        let mut err = io::stderr().lock();
        let _ = err.write_all(text.as_bytes());
        let _ = err.flush();
    }

    fn ansi_enabled(&self) -> bool {
        self.ansi
    }
}

/// Recording console that keeps every write without printing anything.
///
/// Designed for tests and CI where asserting on forwarded output matters more
/// than seeing it.
#[derive(Debug, Clone, Default)]
pub struct FakeConsole {
    state: Arc<Mutex<FakeConsoleState>>,
    ansi: bool,
}

#[derive(Debug, Default)]
struct FakeConsoleState {
    stdout_writes: Vec<String>,
    stderr_writes: Vec<String>,
}

impl FakeConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording console that reports ANSI support.
    pub fn with_ansi() -> Self {
        Self {
            state: Arc::default(),
            ansi: true,
        }
    }

    /// Every `write_stdout` call, in order.
    pub fn stdout_writes(&self) -> Vec<String> {
        self.state.lock().unwrap().stdout_writes.clone()
    }

    /// Every `write_stderr` call, in order.
    pub fn stderr_writes(&self) -> Vec<String> {
        self.state.lock().unwrap().stderr_writes.clone()
    }

    /// All stdout writes concatenated.
    pub fn stdout_text(&self) -> String {
        self.stdout_writes().concat()
    }

    /// All stderr writes concatenated.
    pub fn stderr_text(&self) -> String {
        self.stderr_writes().concat()
    }
}

impl Console for FakeConsole {
    fn write_stdout(&self, text: &str) {
        self.state
            .lock()
            .unwrap()
            .stdout_writes
            .push(text.to_string());
    }

    fn write_stderr(&self, text: &str) {
        self.state
            .lock()
            .unwrap()
            .stderr_writes
            .push(text.to_string());
    }

    fn ansi_enabled(&self) -> bool {
        self.ansi
    }
}

/// Convenience for handing one recording console to an executor while keeping
/// an assertion handle.
pub fn fake_console_pair() -> (Arc<FakeConsole>, FakeConsole) {
    let console = FakeConsole::new();
    (Arc::new(console.clone()), console)
}
