use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failing OS primitive maps to [`Error::Os`], carrying the name of the call that failed
/// and the errno it produced, so callers can report failures the way the platform tools do
/// (`mmap failed: Operation not permitted`). The remaining variants cover the few failure modes
/// that happen before any OS call is made.
#[derive(Error, Debug)]
pub enum Error {
    /// An OS primitive failed.
    ///
    /// # Fields
    ///
    /// * `call` - Name of the failing primitive (`mmap`, `mprotect`, `shmget`, ...)
    /// * `source` - The error constructed from the call's errno
    #[error("{call} failed: {source}")]
    Os {
        /// Name of the failing primitive
        call: &'static str,
        /// The error constructed from the call's errno
        source: std::io::Error,
    },

    /// The global allocator could not satisfy a probe's heap request.
    #[error("heap allocation of {size} bytes (aligned to {align}) failed")]
    Allocation {
        /// Requested allocation size in bytes
        size: usize,
        /// Requested alignment in bytes
        align: usize,
    },

    /// A probe requested a region with an invalid size/alignment combination.
    ///
    /// This is a programming error rather than a platform condition: the size
    /// overflows when rounded up to the alignment, or the alignment is not a
    /// power of two.
    #[error("invalid region layout: {size} bytes aligned to {align}")]
    Layout {
        /// Requested size in bytes
        size: usize,
        /// Requested alignment in bytes
        align: usize,
    },

    /// A probe requested an empty memory region.
    #[error("cannot probe an empty memory region")]
    EmptyRegion,

    /// The system page size could not be determined.
    #[error("could not determine the system page size")]
    PageSize,
}

impl Error {
    /// Build an [`Error::Os`] from a `nix` errno.
    pub(crate) fn os(call: &'static str, errno: nix::errno::Errno) -> Self {
        Error::Os {
            call,
            source: std::io::Error::from_raw_os_error(errno as i32),
        }
    }

    /// Build an [`Error::Os`] from the calling thread's current errno.
    ///
    /// Used after raw `libc` calls that report failure through a sentinel
    /// return value.
    pub(crate) fn last_os(call: &'static str) -> Self {
        Error::Os {
            call,
            source: std::io::Error::last_os_error(),
        }
    }
}

/// Convenience `Result` type for this crate's [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;
