//! Pseudo-filesystem mounts inside the container root.

use nix::mount::{MntFlags, MsFlags};

use boxengine_common::error::{BoxError, Result};

/// Flags applied to every container mount.
pub const DEFAULT_MOUNT_FLAGS: MsFlags = MsFlags::MS_NOEXEC
    .union(MsFlags::MS_NOSUID)
    .union(MsFlags::MS_NODEV);

/// A filesystem to mount inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountEntry {
    /// Mount source (the pseudo-filesystem name).
    pub source: &'static str,
    /// Absolute target inside the container root.
    pub target: &'static str,
    /// Filesystem type.
    pub fstype: &'static str,
    /// Mount flags.
    pub flags: MsFlags,
}

/// `/proc` and `/sys`, in mount order.
#[must_use]
pub const fn essential_mounts() -> [MountEntry; 2] {
    [
        MountEntry {
            source: "proc",
            target: "/proc",
            fstype: "proc",
            flags: DEFAULT_MOUNT_FLAGS,
        },
        MountEntry {
            source: "sysfs",
            target: "/sys",
            fstype: "sysfs",
            flags: DEFAULT_MOUNT_FLAGS,
        },
    ]
}

/// Mounts a single entry.
///
/// # Errors
///
/// Returns an error if the `mount(2)` syscall fails.
pub fn mount_entry(entry: &MountEntry) -> Result<()> {
    nix::mount::mount(
        Some(entry.source),
        entry.target,
        Some(entry.fstype),
        entry.flags,
        None::<&str>,
    )
    .map_err(|e| BoxError::Syscall {
        operation: "mount",
        message: format!("{} on {}: {e}", entry.fstype, entry.target),
    })?;
    tracing::debug!(mountpoint = entry.target, fstype = entry.fstype, "mounted");
    Ok(())
}

/// Mounts `/proc` and `/sys` relative to the current root.
///
/// # Errors
///
/// Returns an error if any mount syscall fails.
pub fn mount_essential_filesystems() -> Result<()> {
    for entry in &essential_mounts() {
        mount_entry(entry)?;
    }
    Ok(())
}

/// Unmounts `/sys` then `/proc`, logging rather than returning failures.
///
/// Only reached when replacing the process image failed after the mounts
/// were established.
pub fn unmount_essential_filesystems() {
    for entry in essential_mounts().iter().rev() {
        match nix::mount::umount2(entry.target, MntFlags::empty()) {
            Ok(()) => tracing::debug!(mountpoint = entry.target, "unmounted"),
            Err(e) => tracing::warn!(mountpoint = entry.target, error = %e, "unmount failed"),
        }
    }
}
