//! Fault trapping for probes the platform denies.
//!
//! A probe jumping into non-executable memory does not get an error code
//! back; the CPU raises a fault and the kernel delivers a signal — SIGSEGV
//! on NX-enforcing hardware, SIGBUS on some shared-memory setups, SIGILL
//! where stale bytes get decoded instead. The handler installed here turns
//! any of those into the same kind of report the rest of the tool produces
//! for failing OS calls, then exits with status 1.
//!
//! Everything in the handler path is async-signal-safe: the report is
//! composed in a fixed stack buffer and pushed out with `write(2)`, and the
//! process leaves through `_exit(2)`.

use std::ffi::{c_int, c_void};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::{Error, Result};

/// Install the fault handler for SIGSEGV, SIGBUS, and SIGILL.
///
/// Call once at start-up, before running a probe. The handler reports the
/// signal and the faulting address on stderr and terminates the process
/// with exit status 1.
///
/// # Errors
/// Returns [`Error::Os`] if `sigaction` rejects a registration.
pub fn install_fault_handlers() -> Result<()> {
    let action = SigAction::new(
        SigHandler::SigAction(on_fault),
        SaFlags::SA_SIGINFO,
        SigSet::empty(),
    );

    for signal in [Signal::SIGSEGV, Signal::SIGBUS, Signal::SIGILL] {
        // SAFETY: `on_fault` restricts itself to async-signal-safe calls.
        unsafe { signal::sigaction(signal, &action) }
            .map_err(|errno| Error::os("sigaction", errno))?;
    }
    Ok(())
}

extern "C" fn on_fault(signo: c_int, info: *mut libc::siginfo_t, _context: *mut c_void) {
    let name: &[u8] = match signo {
        libc::SIGSEGV => b"SIGSEGV",
        libc::SIGBUS => b"SIGBUS",
        libc::SIGILL => b"SIGILL",
        _ => b"signal",
    };
    // SAFETY: the kernel hands SA_SIGINFO handlers a valid siginfo pointer;
    // si_addr is meaningful for all three trapped signals.
    let addr = if info.is_null() {
        0
    } else {
        unsafe { (*info).si_addr() as usize }
    };

    let mut report = Report::new();
    report.push(name);
    report.push(b" received at address 0x");
    report.push_hex(addr);
    report.push(b".\n");
    report.write_to_stderr();

    // SAFETY: _exit is async-signal-safe and does not return.
    unsafe { libc::_exit(1) }
}

/// Fixed-size buffer for composing the fault report without allocating.
struct Report {
    bytes: [u8; 64],
    len: usize,
}

impl Report {
    fn new() -> Report {
        Report {
            bytes: [0; 64],
            len: 0,
        }
    }

    fn push(&mut self, piece: &[u8]) {
        for &byte in piece {
            if self.len < self.bytes.len() {
                self.bytes[self.len] = byte;
                self.len += 1;
            }
        }
    }

    fn push_hex(&mut self, value: usize) {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        if value == 0 {
            self.push(b"0");
            return;
        }

        let mut scratch = [0u8; 2 * std::mem::size_of::<usize>()];
        let mut index = scratch.len();
        let mut rest = value;
        while rest != 0 {
            index -= 1;
            scratch[index] = DIGITS[rest & 0xf];
            rest >>= 4;
        }
        self.push(&scratch[index..]);
    }

    fn write_to_stderr(&self) {
        // Best-effort; there is nothing left to do about a failing write.
        let _ = unsafe {
            libc::write(
                libc::STDERR_FILENO,
                self.bytes.as_ptr().cast(),
                self.len,
            )
        };
    }
}
