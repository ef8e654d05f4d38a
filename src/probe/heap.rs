//! Probes over heap allocations.

use log::debug;

use crate::payload::{self, PAYLOAD};
use crate::region::{page_size, HeapBuffer, PageSpan, Protection};
use crate::Result;

/// Execute the payload from a plain heap allocation.
pub(super) fn from_heap() -> Result<u64> {
    let mut buffer = HeapBuffer::new(PAYLOAD.len(), 16)?;
    buffer.as_mut_slice()[..PAYLOAD.len()].copy_from_slice(&PAYLOAD);
    debug!("heap payload at {:p}", buffer.as_ptr());

    // SAFETY: `buffer` stays live across the call.
    Ok(unsafe { payload::invoke(buffer.as_ptr()) })
}

/// Allocate four page-aligned heap pages, make one interior page
/// executable, and execute the payload from it.
pub(super) fn from_heap_reprotected() -> Result<u64> {
    let page = page_size()?;
    let mut buffer = HeapBuffer::new(4 * page, page)?;

    // Third page of four: the protection change stays clear of whatever the
    // allocator keeps around the block.
    let offset = 2 * page;
    let span = PageSpan::covering(unsafe { buffer.as_ptr().add(offset) }, PAYLOAD.len())?;
    // SAFETY: the span is one interior page of the live buffer, and rwx only
    // widens what heap pages allow.
    unsafe { span.protect(Protection::RWX)? };

    buffer.as_mut_slice()[offset..offset + PAYLOAD.len()].copy_from_slice(&PAYLOAD);
    let entry = unsafe { buffer.as_ptr().add(offset) };
    debug!("heap payload at {entry:p} (buffer {:p})", buffer.as_ptr());

    // SAFETY: `buffer` stays live across the call.
    Ok(unsafe { payload::invoke(entry) })
}
