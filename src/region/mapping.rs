use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::ptr::NonNull;

use log::debug;
use nix::sys::mman::{self, MapFlags};

use super::Protection;
use crate::{Error, Result};

/// A private anonymous mapping obtained from `mmap`, unmapped on drop.
///
/// This is the region type for the pure-mmap probes: the mapping can be
/// created with any [`Protection`] combination up front, or created
/// read-write and re-protected in place afterwards.
pub struct AnonymousMapping {
    ptr: NonNull<c_void>,
    len: usize,
}

impl AnonymousMapping {
    /// Map `len` bytes of fresh anonymous memory with protection `prot`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRegion`] for a zero length and [`Error::Os`]
    /// when the kernel refuses the mapping (for instance a W^X policy
    /// rejecting `rwx` outright).
    pub fn new(len: usize, prot: Protection) -> Result<AnonymousMapping> {
        let length = NonZeroUsize::new(len).ok_or(Error::EmptyRegion)?;
        let ptr = unsafe { mman::mmap_anonymous(None, length, prot.into(), MapFlags::MAP_PRIVATE) }
            .map_err(|errno| Error::os("mmap", errno))?;

        debug!("mapped {len} anonymous bytes at {:p} ({prot})", ptr.as_ptr());
        Ok(AnonymousMapping { ptr, len })
    }

    /// Change the protection of the whole mapping in place.
    ///
    /// # Errors
    /// Returns [`Error::Os`] when the kernel rejects the change.
    pub fn protect(&mut self, prot: Protection) -> Result<()> {
        debug!("re-protecting mapping at {:p} to {prot}", self.ptr.as_ptr());
        unsafe { mman::mprotect(self.ptr, self.len, prot.into()) }
            .map_err(|errno| Error::os("mprotect", errno))
    }

    /// Copy `bytes` to the start of the mapping.
    ///
    /// The mapping must currently be writable; probes that drop the write
    /// bit do so after copying.
    ///
    /// # Panics
    /// Panics if `bytes` does not fit in the mapping.
    pub fn copy_from_slice(&mut self, bytes: &[u8]) {
        assert!(bytes.len() <= self.len);
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().cast(), bytes.len());
        }
    }

    /// Start of the mapping.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr().cast()
    }

    /// Length of the mapping in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the mapping is empty. It never is; `new` rejects that.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for AnonymousMapping {
    fn drop(&mut self) {
        // Nothing actionable on failure; the mapping dies with the process
        // anyway.
        if let Err(errno) = unsafe { mman::munmap(self.ptr, self.len) } {
            debug!("munmap failed during drop: {errno}");
        }
    }
}
