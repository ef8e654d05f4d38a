//! Integration tests for the execprobe CLI: the argument surface, the
//! exit-status contract, and shared-memory cleanup.
//!
//! Probe outcomes are platform policy, so most assertions accept both the
//! success path (payload returned 55, exit 0) and the denied path (fault or
//! OS refusal, exit 1). Anything else — clap's exit 2, a raw signal death —
//! is a defect in the tool, not the platform.

use std::process::{Command, Output};
use std::thread;
use std::time::Duration;

const MODES: [&str; 13] = [
    "data",
    "bss",
    "stack",
    "stack-exec",
    "malloc-rw",
    "malloc-rw-x",
    "mmap-rw",
    "mmap-rwx",
    "mmap-rw-x",
    "shm-open-rwx",
    "shmget-rw",
    "shmget-rwx",
    "shmget-rw-x",
];

fn run_probe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_execprobe"))
        .args(args)
        .output()
        .expect("failed to spawn execprobe")
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let output = run_probe(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn unrecognized_mode_lists_the_vocabulary_and_fails() {
    let output = run_probe(&["stac"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized mode 'stac'"), "stderr: {stderr}");
    assert!(stderr.contains("stack-exec"), "stderr: {stderr}");
}

#[test]
fn help_and_version_exit_zero() {
    let help = run_probe(&["--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("MODES"));

    let version = run_probe(&["--version"]);
    assert_eq!(version.status.code(), Some(0));
}

#[test]
fn every_mode_honours_the_exit_contract() {
    for mode in MODES {
        let output = run_probe(&[mode]);
        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                assert!(
                    stdout.contains("executed successfully (55)"),
                    "mode {mode}: {stdout}"
                );
            }
            Some(1) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                assert!(!stderr.is_empty(), "mode {mode} failed without a report");
            }
            other => panic!("mode {mode} exited with {other:?}"),
        }
    }
}

#[test]
fn executable_mappings_actually_execute() {
    // Any mainstream kernel grants an executable anonymous mapping; treat
    // these as hard successes so a broken payload cannot hide behind the
    // policy-dependent contract above.
    for mode in ["mmap-rwx", "mmap-rw-x"] {
        let output = run_probe(&[mode]);
        assert_eq!(output.status.code(), Some(0), "mode {mode}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("(55)"), "mode {mode}: {stdout}");
    }
}

#[test]
fn json_output_is_a_single_record() {
    let output = run_probe(&["--json", "mmap-rwx"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.trim();
    assert_eq!(line.lines().count(), 1, "stdout: {stdout}");
    assert!(line.contains("\"mode\":\"mmap-rwx\""), "stdout: {stdout}");
    assert!(line.contains("\"returned\":55"), "stdout: {stdout}");
}

fn shm_residue() -> Vec<String> {
    std::fs::read_dir("/dev/shm")
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with("execprobe"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn shared_memory_modes_are_idempotent_and_leave_no_residue() {
    for mode in ["shm-open-rwx", "shmget-rw", "shmget-rwx", "shmget-rw-x"] {
        let first = run_probe(&[mode]);
        let second = run_probe(&[mode]);

        for output in [&first, &second] {
            assert!(
                matches!(output.status.code(), Some(0 | 1)),
                "mode {mode} exited with {:?}",
                output.status.code()
            );
        }
        assert_eq!(
            first.status.code(),
            second.status.code(),
            "mode {mode} changed behavior between runs"
        );
    }

    // Probes from concurrently running tests hold a name for the instant
    // between shm_open and shm_unlink; give them a moment before declaring
    // residue.
    let mut residue = shm_residue();
    if !residue.is_empty() {
        thread::sleep(Duration::from_millis(200));
        residue = shm_residue();
    }
    assert!(residue.is_empty(), "residual /dev/shm entries: {residue:?}");
}
