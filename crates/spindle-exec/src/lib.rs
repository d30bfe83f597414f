//! Blocking process-execution engine.
//!
//! Launches an external OS process, concurrently drains its output streams
//! (forwarding live or capturing, chosen per stream), optionally feeds its
//! stdin, enforces an optional wall-clock deadline with a forced kill, and
//! reports a structured [`ExecResult`].
//!
//! Two ordering rules hold on every path: each piped stream has a dedicated
//! relay thread running before anything blocks on process exit (no pipe
//! buffer deadlocks), and output relays are joined before their buffers are
//! read (captured output is complete relative to the reported exit code).

pub mod console;
pub mod executor;
pub mod handle;
pub mod options;
pub mod params;
pub mod result;
pub mod winarg;

mod launcher;
mod relay;
mod supervisor;

pub use console::{fake_console_pair, Console, FakeConsole, StdioConsole};
pub use executor::ProcessExecutor;
pub use handle::LaunchedProcess;
pub use options::ExecOptions;
pub use params::ProcessParams;
pub use result::ExecResult;
pub use supervisor::TimeoutHandler;
pub use winarg::escape_create_process_arg;

pub use spindle_error::{SpindleError, SpindleResult};
