use std::fmt;

use bitflags::bitflags;
use nix::sys::mman::ProtFlags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Protection bits requested for a probe region.
    ///
    /// Converted to [`ProtFlags`] at the mmap/mprotect boundary and rendered
    /// as `rwx`-style strings in logs and labels.
    pub struct Protection: u8 {
        /// The region may be read.
        const READ = 0b001;
        /// The region may be written.
        const WRITE = 0b010;
        /// The region may be executed.
        const EXECUTE = 0b100;
    }
}

impl Protection {
    /// Read + write, what freshly obtained memory normally carries.
    pub const RW: Protection = Protection::READ.union(Protection::WRITE);

    /// Read + write + execute.
    pub const RWX: Protection = Protection::RW.union(Protection::EXECUTE);

    /// Whether the execute bit is set.
    #[must_use]
    pub fn executable(self) -> bool {
        self.contains(Protection::EXECUTE)
    }
}

impl From<Protection> for ProtFlags {
    fn from(prot: Protection) -> ProtFlags {
        let mut flags = ProtFlags::PROT_NONE;
        if prot.contains(Protection::READ) {
            flags |= ProtFlags::PROT_READ;
        }
        if prot.contains(Protection::WRITE) {
            flags |= ProtFlags::PROT_WRITE;
        }
        if prot.contains(Protection::EXECUTE) {
            flags |= ProtFlags::PROT_EXEC;
        }
        flags
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.contains(Protection::READ) { 'r' } else { '-' };
        let w = if self.contains(Protection::WRITE) { 'w' } else { '-' };
        let x = if self.contains(Protection::EXECUTE) { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}
