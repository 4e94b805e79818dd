//! # boxengine-core
//!
//! Low-level Linux isolation primitives for the BoxEngine runtime.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: the clone flag set for user, UTS, IPC, PID, mount and
//!   network isolation, plus user-namespace ID mapping.
//! - **Cgroups**: `pids`, `memory` and `cpu` controller limits.
//! - **Filesystem**: `chroot` and the `/proc` and `/sys` mounts.
//!
//! Nothing here unwinds on failure. A group directory, mount or namespace
//! created before an error stays in place.

pub mod cgroup;
pub mod filesystem;
pub mod namespace;
