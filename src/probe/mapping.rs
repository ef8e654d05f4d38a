//! Probes over anonymous memory mappings.

use crate::payload::{self, PAYLOAD};
use crate::region::{AnonymousMapping, Protection};
use crate::Result;

/// Execute the payload from a mapping created read-write.
pub(super) fn from_mapping_rw() -> Result<u64> {
    let mut mapping = AnonymousMapping::new(PAYLOAD.len(), Protection::RW)?;
    mapping.copy_from_slice(&PAYLOAD);

    // SAFETY: `mapping` stays live across the call.
    Ok(unsafe { payload::invoke(mapping.as_ptr()) })
}

/// Execute the payload from a mapping created read-write-execute up front.
pub(super) fn from_mapping_rwx() -> Result<u64> {
    let mut mapping = AnonymousMapping::new(PAYLOAD.len(), Protection::RWX)?;
    mapping.copy_from_slice(&PAYLOAD);

    // SAFETY: `mapping` stays live across the call.
    Ok(unsafe { payload::invoke(mapping.as_ptr()) })
}

/// Create the mapping read-write, then re-protect it to rwx and execute.
pub(super) fn from_mapping_reprotected() -> Result<u64> {
    let mut mapping = AnonymousMapping::new(PAYLOAD.len(), Protection::RW)?;
    mapping.copy_from_slice(&PAYLOAD);
    mapping.protect(Protection::RWX)?;

    // SAFETY: `mapping` stays live across the call.
    Ok(unsafe { payload::invoke(mapping.as_ptr()) })
}
