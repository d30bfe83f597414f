//! Turning [`ProcessParams`] into a spawned child.

use crate::handle::LaunchedProcess;
use crate::params::ProcessParams;
use spindle_error::{SpindleError, SpindleResult};
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

/// Spawn the process described by `params`.
///
/// Un-redirected streams get pipes; redirected streams get the opened file
/// and no pipe, so nothing downstream will try to relay them. Launch failures
/// are the only hard errors in the execution path.
pub(crate) fn launch(params: &ProcessParams) -> SpindleResult<LaunchedProcess> {
    let (program, args) = params
        .command
        .split_first()
        .ok_or(SpindleError::EmptyCommand)?;

    let mut cmd = Command::new(program);
    apply_args(&mut cmd, args);
    if let Some(dir) = &params.directory {
        cmd.current_dir(dir);
    }
    if let Some(env) = &params.environment {
        // Replacement semantics: the child sees exactly this mapping.
        cmd.env_clear();
        cmd.envs(env);
    }

    cmd.stdin(match &params.redirect_stdin {
        Some(path) => read_stdio("stdin", path)?,
        None => Stdio::piped(),
    });
    cmd.stdout(match &params.redirect_stdout {
        Some(path) => write_stdio("stdout", path)?,
        None => Stdio::piped(),
    });
    cmd.stderr(match &params.redirect_stderr {
        Some(path) => write_stdio("stderr", path)?,
        None => Stdio::piped(),
    });

    let child = cmd.spawn().map_err(|err| map_spawn_err(program, err))?;
    log::debug!("launched {} as pid {}", program, child.id());
    Ok(LaunchedProcess::new(child, program.clone()))
}

#[cfg(not(windows))]
fn apply_args(cmd: &mut Command, args: &[String]) {
    cmd.args(args);
}

/// CreateProcess re-parses a single command line, so every argument goes
/// through [`crate::winarg::escape_create_process_arg`] and is passed raw.
#[cfg(windows)]
fn apply_args(cmd: &mut Command, args: &[String]) {
    use std::os::windows::process::CommandExt;
    for arg in args {
        cmd.raw_arg(crate::winarg::escape_create_process_arg(arg));
    }
}

fn read_stdio(stream: &'static str, path: &Path) -> SpindleResult<Stdio> {
    let file = File::open(path).map_err(|source| SpindleError::Redirect {
        stream,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Stdio::from(file))
}

fn write_stdio(stream: &'static str, path: &Path) -> SpindleResult<Stdio> {
    let file = File::create(path).map_err(|source| SpindleError::Redirect {
        stream,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Stdio::from(file))
}

fn map_spawn_err(program: &str, err: std::io::Error) -> SpindleError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return SpindleError::CommandNotFound(program.to_string());
    }
    SpindleError::Spawn {
        program: program.to_string(),
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let params = ProcessParams::default();
        assert!(matches!(
            launch(&params),
            Err(SpindleError::EmptyCommand)
        ));
    }

    #[test]
    fn unknown_program_maps_to_command_not_found() {
        let params = ProcessParams::new("definitely-not-a-real-program-5309");
        match launch(&params) {
            Err(SpindleError::CommandNotFound(program)) => {
                assert_eq!(program, "definitely-not-a-real-program-5309");
            }
            other => panic!("expected CommandNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_stdin_redirect_maps_to_redirect_error() {
        let params =
            ProcessParams::new("true").redirect_stdin("/definitely/missing/input-5309.txt");
        match launch(&params) {
            Err(SpindleError::Redirect { stream, .. }) => assert_eq!(stream, "stdin"),
            other => panic!("expected Redirect, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    #[cfg(unix)]
    fn launched_child_exposes_its_pid() {
        let params = ProcessParams::new("sleep").arg("30");
        let mut handle = launch(&params).unwrap();
        assert!(handle.id() > 0);
        assert_eq!(handle.program(), "sleep");
        handle.destroy();
    }
}
