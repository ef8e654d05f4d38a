//! Probes over the call stack.

use log::debug;

use crate::payload::{self, PAYLOAD};
use crate::region::{PageSpan, Protection};
use crate::Result;

/// Execute the payload from a local array, stack pages left as the kernel
/// mapped them.
pub(super) fn from_stack() -> Result<u64> {
    let mut code = [0u8; PAYLOAD.len()];
    code.copy_from_slice(&PAYLOAD);
    debug!("stack payload at {:p}", code.as_ptr());

    // SAFETY: `code` stays live across the call.
    Ok(unsafe { payload::invoke(code.as_ptr()) })
}

/// Re-protect the stack pages under a local array to rwx, then execute it.
pub(super) fn from_stack_reprotected() -> Result<u64> {
    let mut code = [0u8; PAYLOAD.len()];
    code.copy_from_slice(&PAYLOAD);

    let span = PageSpan::covering(code.as_ptr(), code.len())?;
    debug!(
        "stack payload at {:p}, widening {} bytes from {:p} to rwx",
        code.as_ptr(),
        span.len(),
        span.start()
    );
    // SAFETY: the span covers live stack pages of this thread, and rwx only
    // widens what they allow.
    unsafe { span.protect(Protection::RWX)? };

    // SAFETY: `code` stays live across the call.
    Ok(unsafe { payload::invoke(code.as_ptr()) })
}
