//! The machine-code payload that every probe attempts to execute.
//!
//! The payload is the body of a trivial `extern "C" fn() -> u64` that returns
//! the constant 55, hand-assembled for the target architecture. Probes copy
//! these bytes into the region under test and jump to them; whether the jump
//! survives is the whole experiment.

/// Machine code for a function returning [`RETURN_VALUE`] (x86-64).
///
/// ```text
/// 55                  push   rbp
/// 48 89 e5            mov    rbp, rsp
/// b8 37 00 00 00      mov    eax, 0x37
/// c9                  leave
/// c3                  ret
/// ```
#[cfg(target_arch = "x86_64")]
pub const PAYLOAD: [u8; 11] = [
    0x55, // push rbp
    0x48, 0x89, 0xe5, // mov rbp, rsp
    0xb8, 0x37, 0x00, 0x00, 0x00, // mov eax, 0x37
    0xc9, // leave
    0xc3, // ret
];

/// Machine code for a function returning [`RETURN_VALUE`] (aarch64).
///
/// ```text
/// e0 06 80 52         mov    w0, #55
/// c0 03 5f d6         ret
/// ```
#[cfg(target_arch = "aarch64")]
pub const PAYLOAD: [u8; 8] = [
    0xe0, 0x06, 0x80, 0x52, // mov w0, #55
    0xc0, 0x03, 0x5f, 0xd6, // ret
];

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("execprobe only carries a payload for x86-64 and aarch64");

/// The value the payload returns when it executes successfully.
pub const RETURN_VALUE: u64 = 55;

/// Jump to the payload copied at `entry` and return its result.
///
/// # Safety
///
/// `entry` must point to a complete copy of [`PAYLOAD`] in memory that is
/// mapped executable for this process. Calling it through a non-executable
/// region is precisely what the probes do on purpose; the process then takes
/// a fault that only the handler installed by [`crate::signal`] turns into an
/// orderly exit.
pub unsafe fn invoke(entry: *const u8) -> u64 {
    let thunk: unsafe extern "C" fn() -> u64 = std::mem::transmute(entry);
    thunk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{AnonymousMapping, Protection};

    #[test]
    fn payload_fits_in_one_page() {
        assert!(PAYLOAD.len() < 4096);
    }

    #[test]
    fn invoking_from_an_executable_mapping_returns_55() {
        let mut mapping = AnonymousMapping::new(PAYLOAD.len(), Protection::READ | Protection::WRITE)
            .unwrap();
        mapping.copy_from_slice(&PAYLOAD);
        mapping
            .protect(Protection::READ | Protection::EXECUTE)
            .unwrap();

        let returned = unsafe { invoke(mapping.as_ptr()) };
        assert_eq!(returned, RETURN_VALUE);
    }
}
