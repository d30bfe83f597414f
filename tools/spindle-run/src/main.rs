use anyhow::{anyhow, Context, Result};
use clap::Parser;
use spindle_exec::{ExecOptions, ExecResult, ProcessExecutor, ProcessParams, StdioConsole};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "spindle-run")]
#[command(about = "Run a command under the spindle execution engine")]
struct Cli {
    /// Working directory for the child process
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// KEY=VALUE pair forming the child's entire environment (replacement,
    /// not overlay); may be repeated
    #[arg(long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Kill the child after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Forward the child's stdout live instead of capturing it
    #[arg(long)]
    print_stdout: bool,

    /// Forward the child's stderr live instead of capturing it
    #[arg(long)]
    print_stderr: bool,

    /// Never flush captured output, even when the child fails
    #[arg(long)]
    silent: bool,

    /// Never emit ANSI escape sequences, even on a terminal
    #[arg(long)]
    no_color: bool,

    /// Literal text written to the child's stdin before waiting
    #[arg(long, value_name = "TEXT")]
    stdin: Option<String>,

    /// Redirect the child's stdin from this file
    #[arg(long, value_name = "PATH")]
    stdin_from: Option<PathBuf>,

    /// Redirect the child's stdout to this file
    #[arg(long, value_name = "PATH")]
    stdout_to: Option<PathBuf>,

    /// Redirect the child's stderr to this file
    #[arg(long, value_name = "PATH")]
    stderr_to: Option<PathBuf>,

    /// Command and arguments to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(255)),
        Err(err) => {
            eprintln!("spindle-run: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let params = build_params(&cli)?;
    let options = ExecOptions {
        print_stdout: cli.print_stdout,
        print_stderr: cli.print_stderr,
        silent: cli.silent,
        ..ExecOptions::default()
    };
    let timeout = cli.timeout_ms.map(Duration::from_millis);

    let console = if cli.no_color {
        StdioConsole::plain()
    } else {
        StdioConsole::new()
    };
    let executor = ProcessExecutor::new(Arc::new(console));
    let result = executor
        .launch_and_execute_with(&params, options, cli.stdin.as_deref(), timeout, None)
        .context("execution failed")?;

    report(&result);
    Ok(result.exit_code)
}

fn build_params(cli: &Cli) -> Result<ProcessParams> {
    let mut params = ProcessParams {
        command: cli.command.clone(),
        ..ProcessParams::default()
    };

    if let Some(cwd) = &cli.cwd {
        params = params.current_dir(cwd);
    }
    if !cli.env.is_empty() {
        let mut env = HashMap::new();
        for pair in &cli.env {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("--env takes KEY=VALUE, got {:?}", pair))?;
            env.insert(key.to_string(), value.to_string());
        }
        params = params.environment(env);
    }
    if let Some(path) = &cli.stdin_from {
        params = params.redirect_stdin(path);
    }
    if let Some(path) = &cli.stdout_to {
        params = params.redirect_stdout(path);
    }
    if let Some(path) = &cli.stderr_to {
        params = params.redirect_stderr(path);
    }
    Ok(params)
}

/// Print what the engine captured. On failure the engine itself flushes
/// captured output through the console, so only the success path prints
/// here; forwarded or redirected streams have nothing captured to print.
fn report(result: &ExecResult) {
    if result.timed_out {
        eprintln!("spindle-run: command timed out");
    }
    if result.success() {
        if let Some(text) = &result.stdout {
            print!("{}", text);
        }
        if let Some(text) = &result.stderr {
            eprint!("{}", text);
        }
    }
}
