use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::ptr::NonNull;

use log::debug;
use nix::fcntl::OFlag;
use nix::sys::mman::{self, MapFlags};
use nix::sys::stat::Mode;
use nix::unistd;

use super::Protection;
use crate::{Error, Result};

/// A POSIX shared memory object mapped into the process.
///
/// Created with `shm_open`, sized with `ftruncate`, and mapped `MAP_SHARED`
/// over the object's descriptor. The name is unlinked as soon as the object
/// exists — before it is even sized — so the object lives on only through
/// the descriptor and the mapping, and a probe that dies mid-execution
/// leaves nothing behind under `/dev/shm`.
pub struct SharedObject {
    ptr: NonNull<c_void>,
    len: usize,
}

impl SharedObject {
    /// Create, unlink, size, and map a shared memory object of `len` bytes.
    ///
    /// `name` must carry the leading slash the POSIX namespace expects.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRegion`] for a zero length and [`Error::Os`]
    /// naming whichever of `shm_open`, `shm_unlink`, `ftruncate`, or `mmap`
    /// failed. A common real-world failure is `mmap` with `EPERM` on systems
    /// that mount `/dev/shm` noexec.
    pub fn create(name: &str, len: usize, prot: Protection) -> Result<SharedObject> {
        let length = NonZeroUsize::new(len).ok_or(Error::EmptyRegion)?;

        let fd = mman::shm_open(
            name,
            OFlag::O_RDWR | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::from_bits_truncate(0o600),
        )
        .map_err(|errno| Error::os("shm_open", errno))?;

        // Retire the name immediately: every later failure path (and the
        // probe's own fault path) then has nothing left to clean up.
        mman::shm_unlink(name).map_err(|errno| Error::os("shm_unlink", errno))?;

        unistd::ftruncate(&fd, len as libc::off_t).map_err(|errno| Error::os("ftruncate", errno))?;

        let ptr = unsafe { mman::mmap(None, length, prot.into(), MapFlags::MAP_SHARED, &fd, 0) }
            .map_err(|errno| Error::os("mmap", errno))?;

        debug!("shared object {name} mapped at {:p} ({prot})", ptr.as_ptr());
        Ok(SharedObject { ptr, len })
    }

    /// Copy `bytes` to the start of the object.
    ///
    /// # Panics
    /// Panics if `bytes` does not fit in the object.
    pub fn copy_from_slice(&mut self, bytes: &[u8]) {
        assert!(bytes.len() <= self.len);
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().cast(), bytes.len());
        }
    }

    /// Start of the mapped object.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr().cast()
    }

    /// Length of the mapped object in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the object is empty. It never is; `create` rejects that.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for SharedObject {
    fn drop(&mut self) {
        if let Err(errno) = unsafe { mman::munmap(self.ptr, self.len) } {
            debug!("munmap failed during drop: {errno}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_name(tag: &str) -> String {
        format!("/execprobe-test-{tag}-{}", std::process::id())
    }

    #[test]
    fn no_name_survives_creation() {
        let name = test_name("residue");
        let object = SharedObject::create(&name, 128, Protection::RW).unwrap();

        // Unlinked before `create` even returned.
        assert!(!Path::new("/dev/shm").join(&name[1..]).exists());
        drop(object);
        assert!(!Path::new("/dev/shm").join(&name[1..]).exists());
    }

    #[test]
    fn round_trips_bytes_through_the_object() {
        let name = test_name("bytes");
        let mut object = SharedObject::create(&name, 64, Protection::RW).unwrap();
        object.copy_from_slice(&[1, 2, 3, 4, 5]);

        let copied = unsafe { std::slice::from_raw_parts(object.as_ptr(), 5) };
        assert_eq!(copied, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn creating_the_same_name_twice_is_fine() {
        let name = test_name("twice");
        let first = SharedObject::create(&name, 32, Protection::RW).unwrap();
        drop(first);
        let second = SharedObject::create(&name, 32, Protection::RW).unwrap();
        assert_eq!(second.len(), 32);
    }

    #[test]
    fn rejects_empty_objects() {
        let name = test_name("empty");
        assert!(matches!(
            SharedObject::create(&name, 0, Protection::RW),
            Err(Error::EmptyRegion)
        ));
    }
}
