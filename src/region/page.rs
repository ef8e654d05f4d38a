use std::ffi::c_void;
use std::ptr::NonNull;

use nix::sys::mman;

use super::Protection;
use crate::{Error, Result};

/// The system page size in bytes.
///
/// # Errors
/// Returns [`Error::PageSize`] if `sysconf` refuses to answer, which no
/// supported platform actually does.
pub fn page_size() -> Result<usize> {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        return Err(Error::PageSize);
    }
    Ok(size as usize)
}

/// The span of whole pages covering an arbitrary address range.
///
/// `mprotect` operates on page boundaries; a probe that wants to flip the
/// execute bit on a stack array or an interior heap page has to widen the
/// request to the pages the bytes actually occupy. The start address is the
/// containing page of the first byte; the length runs to the last byte of the
/// range (the kernel rounds the tail up itself).
#[derive(Debug, Clone, Copy)]
pub struct PageSpan {
    start: NonNull<c_void>,
    len: usize,
}

impl PageSpan {
    /// Compute the page span covering `len` bytes at `addr`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRegion`] for a null address or zero length, and
    /// [`Error::PageSize`] if the page size cannot be determined.
    pub fn covering(addr: *const u8, len: usize) -> Result<PageSpan> {
        if len == 0 {
            return Err(Error::EmptyRegion);
        }
        let page = page_size()?;
        let start = addr as usize & !(page - 1);
        let end = addr as usize + len;
        let start = NonNull::new(start as *mut c_void).ok_or(Error::EmptyRegion)?;
        Ok(PageSpan {
            start,
            len: end - start.as_ptr() as usize,
        })
    }

    /// First byte of the span (page-aligned).
    #[must_use]
    pub fn start(&self) -> *mut u8 {
        self.start.as_ptr().cast()
    }

    /// Number of bytes from the span start to the end of the covered range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span is empty. It never is; `covering` rejects that.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the protection of every page in the span.
    ///
    /// # Errors
    /// Returns [`Error::Os`] when the kernel rejects the change.
    ///
    /// # Safety
    /// The span must lie inside memory this process has mapped, and no live
    /// reference may rely on a protection the new `prot` revokes.
    pub unsafe fn protect(&self, prot: Protection) -> Result<()> {
        mman::mprotect(self.start, self.len, prot.into())
            .map_err(|errno| Error::os("mprotect", errno))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_a_reasonable_power_of_two() {
        let page = page_size().unwrap();
        assert!(page >= 4096);
        assert!(page.is_power_of_two());
    }

    #[test]
    fn covering_floors_the_start_to_a_page_boundary() {
        let page = page_size().unwrap();
        let addr = (page * 7 + 100) as *const u8;
        let span = PageSpan::covering(addr, 11).unwrap();

        assert_eq!(span.start() as usize, page * 7);
        assert_eq!(span.len(), 111);
    }

    #[test]
    fn covering_spans_a_page_boundary_when_the_range_does() {
        let page = page_size().unwrap();
        let addr = (page * 3 - 4) as *const u8;
        let span = PageSpan::covering(addr, 11).unwrap();

        assert_eq!(span.start() as usize, page * 2);
        assert_eq!(span.len(), page + 7);
    }

    #[test]
    fn covering_rejects_empty_ranges() {
        assert!(matches!(
            PageSpan::covering(4096 as *const u8, 0),
            Err(Error::EmptyRegion)
        ));
    }
}
