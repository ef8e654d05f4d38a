//! Probes over shared memory, POSIX and System V.

use crate::payload::{self, PAYLOAD};
use crate::region::{Protection, SharedObject, SysvSegment};
use crate::Result;

/// Name for the transient POSIX object, unique per process so simultaneous
/// runs cannot collide. The object is unlinked before the probe executes
/// anything, so the name never outlives the run either way.
fn shm_name() -> String {
    format!("/execprobe-{}", std::process::id())
}

/// Map a POSIX shared memory object with execute permission and run the
/// payload from it.
pub(super) fn from_posix_shm() -> Result<u64> {
    let mut object = SharedObject::create(&shm_name(), PAYLOAD.len(), Protection::RWX)?;
    object.copy_from_slice(&PAYLOAD);

    // SAFETY: `object` stays live across the call.
    Ok(unsafe { payload::invoke(object.as_ptr()) })
}

/// Attach a System V segment read-write and run the payload from it.
pub(super) fn from_sysv_rw() -> Result<u64> {
    let mut segment = SysvSegment::create(PAYLOAD.len(), Protection::RW)?;
    segment.copy_from_slice(&PAYLOAD);

    // SAFETY: `segment` stays live across the call.
    Ok(unsafe { payload::invoke(segment.as_ptr()) })
}

/// Attach a System V segment executable (`SHM_EXEC`) and run the payload
/// from it.
pub(super) fn from_sysv_exec() -> Result<u64> {
    let mut segment = SysvSegment::create(PAYLOAD.len(), Protection::RWX)?;
    segment.copy_from_slice(&PAYLOAD);

    // SAFETY: `segment` stays live across the call.
    Ok(unsafe { payload::invoke(segment.as_ptr()) })
}

/// Attach a System V segment read-write, re-protect the attached pages to
/// rwx, and run the payload from it.
pub(super) fn from_sysv_reprotected() -> Result<u64> {
    let mut segment = SysvSegment::create(PAYLOAD.len(), Protection::RW)?;
    segment.copy_from_slice(&PAYLOAD);
    segment.protect(Protection::RWX)?;

    // SAFETY: `segment` stays live across the call.
    Ok(unsafe { payload::invoke(segment.as_ptr()) })
}
