//! The probe catalogue: one routine per allocation strategy.
//!
//! Every probe follows the same short sequence — obtain a region with a
//! specific OS primitive, copy the [`crate::payload`] bytes into it, adjust
//! page protections if the mode calls for it, and jump to the copy. The
//! probes share nothing with each other; a process run executes exactly one
//! of them and exits.
//!
//! A probe returning `Ok` means the payload ran and handed back its return
//! value. A probe jumping into memory the platform refuses to execute never
//! returns at all: the process takes a fault that the handler from
//! [`crate::signal`] converts into a report and exit status 1. OS call
//! failures surface as [`crate::Error`] values for the caller to report.

mod heap;
mod mapping;
mod shared;
mod stack;
mod statics;

use strum::{Display, EnumString, VariantNames};

use crate::Result;

/// The fixed vocabulary of probe modes, selected by name on the command
/// line.
///
/// The string form of each variant is its kebab-case mode name (`stack-exec`,
/// `malloc-rw-x`, ...); [`Probe::VARIANTS`](strum::VariantNames::VARIANTS)
/// lists the whole vocabulary for usage output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum Probe {
    /// Initialized static storage, placed in the data segment by the linker.
    Data,
    /// Zero-initialized static storage, placed in the bss segment.
    Bss,
    /// A local array on the call stack, pages left as the kernel mapped them.
    Stack,
    /// A local array whose covering stack pages are re-protected to rwx.
    StackExec,
    /// A plain heap allocation.
    MallocRw,
    /// A page-aligned heap allocation with one interior page made executable.
    MallocRwX,
    /// An anonymous mapping created read-write.
    MmapRw,
    /// An anonymous mapping created read-write-execute up front.
    MmapRwx,
    /// An anonymous mapping created read-write, then re-protected to rwx.
    MmapRwX,
    /// A POSIX shared memory object mapped with execute permission.
    ShmOpenRwx,
    /// A System V segment attached read-write.
    ShmgetRw,
    /// A System V segment attached executable via `SHM_EXEC`.
    ShmgetRwx,
    /// A System V segment attached read-write, then re-protected to rwx.
    ShmgetRwX,
}

impl Probe {
    /// Human label for the region this probe executes from.
    #[must_use]
    pub fn region(self) -> &'static str {
        match self {
            Probe::Data => "data segment",
            Probe::Bss => "bss segment",
            Probe::Stack => "stack",
            Probe::StackExec => "stack (rwx pages)",
            Probe::MallocRw => "malloc memory (rw)",
            Probe::MallocRwX => "malloc memory (rw+x)",
            Probe::MmapRw => "mmap memory (rw)",
            Probe::MmapRwx => "mmap memory (rwx)",
            Probe::MmapRwX => "mmap memory (rw+x)",
            Probe::ShmOpenRwx => "shm_open memory (rwx)",
            Probe::ShmgetRw => "shmget memory (rw)",
            Probe::ShmgetRwx => "shmget memory (rwx)",
            Probe::ShmgetRwX => "shmget memory (rw+x)",
        }
    }

    /// Obtain the region, place the payload, adjust protections as the mode
    /// dictates, and execute.
    ///
    /// Returns the payload's return value — if the platform lets the jump
    /// through at all; see the module docs for what happens when it does
    /// not.
    ///
    /// # Errors
    /// Returns [`crate::Error`] when any OS primitive on the way to the jump
    /// fails.
    pub fn run(self) -> Result<u64> {
        match self {
            Probe::Data => statics::from_data_segment(),
            Probe::Bss => statics::from_bss_segment(),
            Probe::Stack => stack::from_stack(),
            Probe::StackExec => stack::from_stack_reprotected(),
            Probe::MallocRw => heap::from_heap(),
            Probe::MallocRwX => heap::from_heap_reprotected(),
            Probe::MmapRw => mapping::from_mapping_rw(),
            Probe::MmapRwx => mapping::from_mapping_rwx(),
            Probe::MmapRwX => mapping::from_mapping_reprotected(),
            Probe::ShmOpenRwx => shared::from_posix_shm(),
            Probe::ShmgetRw => shared::from_sysv_rw(),
            Probe::ShmgetRwx => shared::from_sysv_exec(),
            Probe::ShmgetRwX => shared::from_sysv_reprotected(),
        }
    }
}
