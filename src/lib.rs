// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// Executing data as machine code is the subject of this crate, so unsafe is
// structural rather than incidental:
// - 'payload.rs' transmutes region addresses into function pointers
// - the 'region' types own raw mmap/shmat/alloc pointers
// - 'signal.rs' reports faults through raw write(2)/_exit(2)

//! # execprobe
//!
//! [![Crates.io](https://img.shields.io/crates/v/execprobe.svg)](https://crates.io/crates/execprobe)
//! [![Documentation](https://docs.rs/execprobe/badge.svg)](https://docs.rs/execprobe)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/execprobe/blob/main/LICENSE-APACHE)
//!
//! A diagnostic utility that demonstrates, for each of the classic memory
//! region types — static data, bss, stack, heap, anonymous mappings, and
//! shared memory (POSIX and System V) — whether the operating system will
//! execute machine code placed there, and which page-protection adjustments
//! make it succeed.
//!
//! The tool exists to make NX/DEP and W^X policy observable: every probe
//! copies the same few bytes of hand-assembled machine code into a region
//! obtained through a different OS primitive and jumps to them. On modern
//! hardware the data, bss, stack, and plain heap variants die with a fault,
//! and the variants that request or acquire the execute bit succeed — but
//! the point is to measure, not to assume.
//!
//! ## Features
//!
//! - **🗺️ Thirteen probe modes** - every combination of region and protection
//!   path the classic experiment covers, from `data` to `shmget-rw-x`
//! - **🧹 No residue** - shared-memory names and segment ids are retired
//!   before any payload runs, so even a faulting probe leaves the system
//!   clean
//! - **🚦 Orderly faults** - SIGSEGV/SIGBUS/SIGILL are trapped by an
//!   async-signal-safe handler that reports the faulting address and exits
//!   with status 1
//! - **🔍 Inspectable** - debug logging of every region address and
//!   protection transition through the `log` facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::str::FromStr;
//!
//! use execprobe::{payload, Probe};
//!
//! execprobe::signal::install_fault_handlers()?;
//!
//! let probe = Probe::from_str("mmap-rw-x")?;
//! let returned = probe.run()?;
//! assert_eq!(returned, payload::RETURN_VALUE);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A probe either returns the payload's value, fails with an [`Error`]
//! naming the OS call that refused, or — when the platform denies execution
//! outright — never returns because the fault handler terminates the
//! process. Callers that want to survive a denied probe must run it in a
//! child process; the bundled CLI is exactly such a wrapper around one probe
//! per invocation.
//!
//! ## Architecture
//!
//! - [`payload`] - the machine-code bytes under test and their invocation
//! - [`region`] - RAII owners for each allocation primitive, plus page and
//!   protection plumbing
//! - [`probe`] - the thirteen probe routines and the [`Probe`] mode
//!   vocabulary
//! - [`signal`] - the fault handler
//! - [`Error`] and [`Result`] - error handling for everything above
//!
//! Probes share no state; a process run executes one probe and exits.

#[cfg(not(target_os = "linux"))]
compile_error!("execprobe probes Linux memory policy and only builds on Linux");

mod error;
pub mod payload;
pub mod probe;
pub mod region;
pub mod signal;

pub use crate::error::{Error, Result};
pub use crate::probe::Probe;
