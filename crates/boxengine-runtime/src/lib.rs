//! Container launch for the BoxEngine runtime.
//!
//! The launch runs in two processes. The parent ([`launcher`]) re-executes
//! its own binary inside fresh namespaces, configures networking for it
//! through an external helper, and waits. The re-executed child
//! ([`child`]) applies cgroup limits, isolates the filesystem, waits for
//! the network and then replaces itself with the target command.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod child;
pub mod helper;
pub mod launcher;
pub mod netgate;
pub mod preflight;
#[cfg(target_os = "linux")]
pub mod process;
