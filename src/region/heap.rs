use std::alloc::{self, Layout};
use std::ptr::NonNull;

use log::debug;

use crate::{Error, Result};

/// A zeroed buffer from the global allocator with an explicit alignment,
/// freed on drop.
///
/// The plain-heap probe uses a malloc-like allocation; the re-protected heap
/// probe asks for page alignment so `mprotect` can target an interior page of
/// the buffer without touching allocator metadata on neighbouring pages.
pub struct HeapBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl HeapBuffer {
    /// Allocate `size` zeroed bytes aligned to `align`.
    ///
    /// # Errors
    /// Returns [`Error::EmptyRegion`] for a zero size, [`Error::Layout`] for
    /// an alignment that is not a power of two or a size that overflows when
    /// rounded to it, and [`Error::Allocation`] when the allocator fails.
    pub fn new(size: usize, align: usize) -> Result<HeapBuffer> {
        if size == 0 {
            return Err(Error::EmptyRegion);
        }
        let layout = Layout::from_size_align(size, align).map_err(|_| Error::Layout { size, align })?;
        let ptr = NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
            .ok_or(Error::Allocation { size, align })?;

        debug!("allocated {size} heap bytes at {:p} (align {align})", ptr.as_ptr());
        Ok(HeapBuffer { ptr, layout })
    }

    /// The buffer contents, writable.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// Start of the buffer.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Length of the buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Whether the buffer is empty. It never is; `new` rejects that.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }
}

impl Drop for HeapBuffer {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::page_size;

    #[test]
    fn honours_the_requested_alignment() {
        let page = page_size().unwrap();
        let buffer = HeapBuffer::new(4 * page, page).unwrap();
        assert_eq!(buffer.as_ptr() as usize % page, 0);
        assert_eq!(buffer.len(), 4 * page);
    }

    #[test]
    fn starts_zeroed_and_accepts_writes() {
        let mut buffer = HeapBuffer::new(32, 16).unwrap();
        assert!(buffer.as_mut_slice().iter().all(|&b| b == 0));

        buffer.as_mut_slice()[..2].copy_from_slice(&[0x90, 0xc3]);
        assert_eq!(&buffer.as_mut_slice()[..2], &[0x90, 0xc3]);
    }

    #[test]
    fn rejects_degenerate_layouts() {
        assert!(matches!(HeapBuffer::new(0, 16), Err(Error::EmptyRegion)));
        assert!(matches!(
            HeapBuffer::new(16, 3),
            Err(Error::Layout { size: 16, align: 3 })
        ));
    }
}
