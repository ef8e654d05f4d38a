//! Integration coverage for the probes that acquire the execute bit.
//!
//! The denied probes die with the process by design, so they are exercised
//! through the CLI's child-process tests instead. The probes here request
//! execute permission through mmap, mprotect, or SHM_EXEC, which any
//! mainstream kernel grants, and must therefore hand back the payload's
//! return value in-process.

use std::str::FromStr;

use execprobe::{payload, Error, Probe};

fn run(mode: &str) -> u64 {
    Probe::from_str(mode).unwrap().run().unwrap()
}

#[test]
fn upfront_executable_regions_execute() {
    for mode in ["mmap-rwx", "shmget-rwx"] {
        assert_eq!(run(mode), payload::RETURN_VALUE, "mode {mode}");
    }
}

#[test]
fn posix_shared_memory_executes_unless_the_mount_forbids_it() {
    // Many containers mount /dev/shm noexec; the probe then fails cleanly
    // at the mmap, naming the call. Anywhere else it must execute.
    match Probe::from_str("shm-open-rwx").unwrap().run() {
        Ok(returned) => assert_eq!(returned, payload::RETURN_VALUE),
        Err(Error::Os { call, source }) => {
            assert_eq!(call, "mmap");
            assert_eq!(source.raw_os_error(), Some(libc::EPERM));
        }
        Err(other) => panic!("unexpected failure: {other}"),
    }
}

#[test]
fn reprotected_regions_execute() {
    for mode in ["stack-exec", "malloc-rw-x", "mmap-rw-x", "shmget-rw-x"] {
        assert_eq!(run(mode), payload::RETURN_VALUE, "mode {mode}");
    }
}
