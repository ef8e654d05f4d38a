use std::ffi::c_void;
use std::ptr::NonNull;

use log::debug;
use nix::sys::mman;

use super::Protection;
use crate::{Error, Result};

/// A System V shared memory segment attached to the process.
///
/// The segment is created with `IPC_PRIVATE` — no key, no rendezvous with
/// other processes — and marked for removal (`IPC_RMID`) right after the
/// attach succeeds. The id disappears from the system immediately and the
/// kernel reaps the memory when the last attach goes away, so a probe that
/// faults mid-execution cannot leak a segment.
///
/// System V attaches carry read-write protection; the one kernel-side knob
/// is `SHM_EXEC`, which [`SysvSegment::create`] applies when the requested
/// [`Protection`] has the execute bit. Finer transitions go through
/// [`SysvSegment::protect`], which is plain `mprotect` on the attached pages
/// (`shmat` returns them page-aligned).
pub struct SysvSegment {
    id: libc::c_int,
    ptr: NonNull<c_void>,
    len: usize,
}

impl SysvSegment {
    /// Create a private segment of `len` bytes, attach it, and mark it for
    /// removal.
    ///
    /// With `Protection::EXECUTE`, the attach uses `SHM_EXEC`; the segment is
    /// then created with owner execute permission (mode 0700), which the
    /// kernel requires for an executable attach.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRegion`] for a zero length and [`Error::Os`]
    /// naming whichever of `shmget`, `shmat`, or `shmctl` failed.
    pub fn create(len: usize, prot: Protection) -> Result<SysvSegment> {
        if len == 0 {
            return Err(Error::EmptyRegion);
        }
        let executable = prot.executable();
        let mode = if executable { 0o700 } else { 0o600 };

        let id = unsafe { libc::shmget(libc::IPC_PRIVATE, len, libc::IPC_CREAT | mode) };
        if id == -1 {
            return Err(Error::last_os("shmget"));
        }

        let flags = if executable { libc::SHM_EXEC } else { 0 };
        let ptr = unsafe { libc::shmat(id, std::ptr::null(), flags) };
        if ptr as isize == -1 {
            let error = Error::last_os("shmat");
            unsafe { libc::shmctl(id, libc::IPC_RMID, std::ptr::null_mut()) };
            return Err(error);
        }

        // Retire the id now; the memory lives only as long as the attach.
        if unsafe { libc::shmctl(id, libc::IPC_RMID, std::ptr::null_mut()) } == -1 {
            let error = Error::last_os("shmctl");
            unsafe { libc::shmdt(ptr) };
            return Err(error);
        }

        debug!("sysv segment {id} attached at {ptr:p} ({prot})");
        Ok(SysvSegment {
            id,
            // shmat never returns null on success.
            ptr: NonNull::new(ptr).ok_or(Error::last_os("shmat"))?,
            len,
        })
    }

    /// Change the protection of the attached pages in place.
    ///
    /// # Errors
    /// Returns [`Error::Os`] when the kernel rejects the change.
    pub fn protect(&mut self, prot: Protection) -> Result<()> {
        debug!("re-protecting segment {} at {:p} to {prot}", self.id, self.ptr.as_ptr());
        unsafe { mman::mprotect(self.ptr, self.len, prot.into()) }
            .map_err(|errno| Error::os("mprotect", errno))
    }

    /// Copy `bytes` to the start of the segment.
    ///
    /// # Panics
    /// Panics if `bytes` does not fit in the segment.
    pub fn copy_from_slice(&mut self, bytes: &[u8]) {
        assert!(bytes.len() <= self.len);
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().cast(), bytes.len());
        }
    }

    /// Start of the attached segment.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr().cast()
    }

    /// Length of the segment in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the segment is empty. It never is; `create` rejects that.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The segment id, already marked for removal.
    #[must_use]
    pub fn id(&self) -> libc::c_int {
        self.id
    }
}

impl Drop for SysvSegment {
    fn drop(&mut self) {
        // Last detach; the RMID from `create` lets the kernel reap the
        // segment here.
        if unsafe { libc::shmdt(self.ptr.as_ptr()) } == -1 {
            debug!("shmdt failed during drop: {}", std::io::Error::last_os_error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bytes_through_the_segment() {
        let mut segment = SysvSegment::create(64, Protection::RW).unwrap();
        segment.copy_from_slice(&[9, 8, 7]);

        let copied = unsafe { std::slice::from_raw_parts(segment.as_ptr(), 3) };
        assert_eq!(copied, &[9, 8, 7]);
    }

    #[test]
    fn the_segment_is_destroyed_after_drop() {
        let segment = SysvSegment::create(32, Protection::RW).unwrap();
        let id = segment.id();
        let ptr = segment.as_ptr();
        drop(segment);

        // The drop was the last detach, so the RMID from create has taken
        // effect: the id no longer names a segment and the pages are gone.
        let attach = unsafe { libc::shmat(id, std::ptr::null(), 0) };
        assert_eq!(attach as isize, -1);
        let detached = unsafe { libc::shmdt(ptr.cast()) };
        assert_eq!(detached, -1);
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(matches!(
            SysvSegment::create(0, Protection::RW),
            Err(Error::EmptyRegion)
        ));
    }
}
