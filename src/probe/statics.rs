//! Probes over the program's static storage.

use std::ptr;

use log::debug;

use crate::payload::{self, PAYLOAD};
use crate::Result;

// Initialized and mutable, so it is linked into the data segment; an
// immutable static would land in .rodata and probe the wrong policy.
static mut DATA_CODE: [u8; PAYLOAD.len()] = PAYLOAD;

// Zero-initialized and mutable, so it is linked into the bss segment and
// filled in at run time.
static mut BSS_CODE: [u8; PAYLOAD.len()] = [0; PAYLOAD.len()];

/// Execute the payload where the linker put it: the initialized data
/// segment.
pub(super) fn from_data_segment() -> Result<u64> {
    // SAFETY: DATA_CODE holds a complete payload from link time and nothing
    // ever writes to it; the process is single-threaded.
    let returned = unsafe {
        let entry = ptr::addr_of!(DATA_CODE).cast::<u8>();
        debug!("data segment payload at {entry:p}");
        payload::invoke(entry)
    };
    Ok(returned)
}

/// Copy the payload into zero-initialized static storage and execute it
/// there.
pub(super) fn from_bss_segment() -> Result<u64> {
    // SAFETY: the copy is exactly payload-sized and happens before the jump;
    // the process is single-threaded.
    let returned = unsafe {
        let entry = ptr::addr_of_mut!(BSS_CODE).cast::<u8>();
        ptr::copy_nonoverlapping(PAYLOAD.as_ptr(), entry, PAYLOAD.len());
        debug!("bss segment payload at {entry:p}");
        payload::invoke(entry)
    };
    Ok(returned)
}
