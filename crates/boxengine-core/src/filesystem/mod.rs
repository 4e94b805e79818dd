//! Filesystem isolation for the container.
//!
//! Switches the process root with `chroot(2)` and mounts `/proc` and
//! `/sys` inside the new root. The root switch always happens first so the
//! pseudo-filesystems land in the container's view rather than the host's.

pub mod chroot;
#[cfg(target_os = "linux")]
pub mod mount;

use std::path::Path;

use boxengine_common::error::Result;

/// Enters `rootfs` and mounts the essential pseudo-filesystems.
///
/// Irreversible for the calling process: once the root has changed, host
/// paths can no longer be resolved.
///
/// # Errors
///
/// Returns the first failing `chroot`, `chdir` or `mount`.
#[cfg(target_os = "linux")]
pub fn isolate(rootfs: &Path) -> Result<()> {
    chroot::enter_root(rootfs)?;
    mount::mount_essential_filesystems()?;
    tracing::info!(rootfs = %rootfs.display(), "filesystem isolated");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — filesystem isolation requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn isolate(_rootfs: &Path) -> Result<()> {
    Err(boxengine_common::error::BoxError::Config {
        message: "Linux required for native container operations".into(),
    })
}
