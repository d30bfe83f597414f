//! Stream relay workers.
//!
//! Each relay owns one end of a child pipe outright, so nothing else can read
//! or write that stream while the relay runs. Mid-stream I/O failures end the
//! relay quietly and keep whatever was already transferred; the coordinator
//! reports the child's real exit code either way.

use crate::console::Console;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Which console stream a forwarding relay writes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Sink for a draining relay.
pub(crate) enum RelaySink {
    /// Write lines through the console as they arrive.
    Forward(Arc<dyn Console>, ConsoleStream),
    /// Accumulate raw bytes for retrieval after exit.
    Capture,
}

/// One concurrent worker moving bytes between a process stream and a
/// sink/source until EOF.
pub(crate) struct StreamRelay {
    worker: JoinHandle<Vec<u8>>,
}

impl StreamRelay {
    /// Drain `stream` into `sink` on a dedicated thread.
    ///
    /// Relays must be running before anyone blocks on process exit: pipe
    /// buffers are bounded, and an undrained stream wedges both the child and
    /// the waiter once the child outgrows the buffer.
    pub fn drain<R>(stream: R, sink: RelaySink) -> Self
    where
        R: Read + Send + 'static,
    {
        let worker = thread::spawn(move || match sink {
            RelaySink::Capture => capture_bytes(stream),
            RelaySink::Forward(console, which) => {
                forward_lines(stream, &*console, which);
                Vec::new()
            }
        });
        Self { worker }
    }

    /// Feed `source` into the child's stdin, then drop the write end so the
    /// child sees EOF.
    pub fn feed<W, R>(stdin: W, source: R) -> Self
    where
        W: Write + Send + 'static,
        R: Read + Send + 'static,
    {
        let worker = thread::spawn(move || {
            let mut stdin = stdin;
            let mut source = source;
            // Broken pipe just means the child stopped reading first.
            if let Err(err) = io::copy(&mut source, &mut stdin) {
                log::debug!("stdin relay ended early: {}", err);
            }
            Vec::new()
        });
        Self { worker }
    }

    /// Wait for the worker and hand back its captured bytes. `Err` means the
    /// worker panicked.
    pub fn join(self) -> thread::Result<Vec<u8>> {
        self.worker.join()
    }

    /// Let the worker run unsupervised. Stdin feeds are detached rather than
    /// joined: a live source can block in `read` with no bound, while the
    /// write side fails fast once the child is gone.
    pub fn detach(self) {
        drop(self.worker);
    }
}

fn capture_bytes<R: Read>(mut stream: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                // Keep whatever arrived before the failure.
                log::debug!("capture relay ended early: {}", err);
                break;
            }
        }
    }
    buf
}

fn forward_lines<R: Read>(stream: R, console: &dyn Console, which: ConsoleStream) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => {
                let text = format!("{}\n", line);
                match which {
                    ConsoleStream::Stdout => console.write_stdout(&text),
                    ConsoleStream::Stderr => console.write_stderr(&text),
                }
            }
            Err(err) => {
                log::debug!("forward relay ended early: {}", err);
                break;
            }
        }
    }
}
