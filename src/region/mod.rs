//! Memory-region primitives the probes allocate from.
//!
//! Each type in this module owns exactly one OS resource — an anonymous
//! mapping, a heap allocation, a POSIX shared memory object, or a System V
//! segment — and releases it on drop. The probes combine these with
//! [`Protection`] requests and the page-granular [`PageSpan`] helper to build
//! every allocate/write/re-protect/execute sequence the tool supports.
//!
//! The shared-memory types are written so that no named resource can outlive
//! a probe: names and segment ids are retired as soon as the memory is
//! mapped, before any payload runs, so even a probe that dies on a fault
//! leaves the system clean.

mod heap;
mod mapping;
mod page;
mod posix_shm;
mod protection;
mod sysv_shm;

pub use heap::HeapBuffer;
pub use mapping::AnonymousMapping;
pub use page::{page_size, PageSpan};
pub use posix_shm::SharedObject;
pub use protection::Protection;
pub use sysv_shm::SysvSegment;
