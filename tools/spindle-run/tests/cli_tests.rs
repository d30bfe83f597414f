#![cfg(unix)]

use std::process::Command;
use tempfile::TempDir;

fn spindle_run() -> Command {
    Command::new(env!("CARGO_BIN_EXE_spindle-run"))
}

#[test]
fn prints_captured_stdout_and_exits_zero() {
    let output = spindle_run()
        .args(["echo", "cli-hello"])
        .output()
        .expect("failed to run spindle-run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "cli-hello\n");
}

#[test]
fn propagates_the_child_exit_code() {
    let output = spindle_run()
        .args(["sh", "-c", "exit 5"])
        .output()
        .expect("failed to run spindle-run");

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn timeout_flag_kills_long_commands() {
    let output = spindle_run()
        .args(["--timeout-ms", "200", "sleep", "30"])
        .output()
        .expect("failed to run spindle-run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("timed out"));
}

#[test]
fn stdin_flag_reaches_the_child() {
    let output = spindle_run()
        .args(["--stdin", "ping", "cat"])
        .output()
        .expect("failed to run spindle-run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ping");
}

#[test]
fn env_flag_replaces_the_environment() {
    let output = spindle_run()
        .args(["--env", "SPINDLE_CLI=on", "/bin/sh", "-c", "echo \"$SPINDLE_CLI:$HOME\""])
        .output()
        .expect("failed to run spindle-run");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "on:\n");
}

#[test]
fn stdout_redirect_writes_the_file_instead() {
    let dir = TempDir::new().expect("temp dir");
    let target = dir.path().join("redirected.txt");

    let output = spindle_run()
        .arg("--stdout-to")
        .arg(&target)
        .args(["echo", "to-file"])
        .output()
        .expect("failed to run spindle-run");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(&target).expect("read redirect target"),
        "to-file\n"
    );
}

#[test]
fn no_color_flag_flushes_failures_without_ansi() {
    let output = spindle_run()
        .args(["--no-color", "sh", "-c", "echo plain-fail 1>&2; exit 3"])
        .output()
        .expect("failed to run spindle-run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("plain-fail"));
    assert!(!stderr.contains('\u{1b}'));
}

#[test]
fn launch_failure_exits_one_with_a_message() {
    let output = spindle_run()
        .args(["no-such-program-5309"])
        .output()
        .expect("failed to run spindle-run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Command not found"));
}
