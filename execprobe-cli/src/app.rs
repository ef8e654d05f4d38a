use clap::Parser;

/// execprobe - demonstrate which memory regions the OS executes code from
#[derive(Debug, Parser)]
#[command(
    name = "execprobe",
    version,
    about,
    long_about = None,
    after_help = "MODES:\n    \
        data           initialized static storage (.data)\n    \
        bss            zero-initialized static storage (.bss)\n    \
        stack          local array, pages as mapped\n    \
        stack-exec     local array, covering pages re-protected to rwx\n    \
        malloc-rw      plain heap allocation\n    \
        malloc-rw-x    page-aligned heap allocation, interior page made rwx\n    \
        mmap-rw        anonymous mapping, read-write\n    \
        mmap-rwx       anonymous mapping, read-write-execute up front\n    \
        mmap-rw-x      anonymous mapping, read-write then re-protected to rwx\n    \
        shm-open-rwx   POSIX shared memory, mapped with execute\n    \
        shmget-rw      System V segment, plain attach\n    \
        shmget-rwx     System V segment, attached with SHM_EXEC\n    \
        shmget-rw-x    System V segment, attached then re-protected to rwx"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Probe mode to run; see MODES below.
    #[arg(value_name = "MODE")]
    pub mode: String,
}

/// Options that apply to every mode.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit the probe result as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}
