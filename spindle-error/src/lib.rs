use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type SpindleResult<T> = std::result::Result<T, SpindleError>;

#[derive(Error, Debug)]
pub enum SpindleError {
    #[error("Empty command: at least one argv token is required")]
    EmptyCommand,

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Cannot redirect {stream} to {path:?}: {source}")]
    Redirect {
        stream: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Process handle already waited on; launch a new process for another run")]
    HandleConsumed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
