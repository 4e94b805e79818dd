//! Root filesystem switching via `chroot(2)`.

use std::path::Path;

use boxengine_common::error::{BoxError, Result};

/// Changes the process root to `new_root` and moves to `/` inside it.
///
/// # Errors
///
/// Returns an error if `chroot(2)` or `chdir(2)` fails.
#[cfg(target_os = "linux")]
pub fn enter_root(new_root: &Path) -> Result<()> {
    nix::unistd::chroot(new_root).map_err(|e| BoxError::Syscall {
        operation: "chroot",
        message: format!("{}: {e}", new_root.display()),
    })?;
    nix::unistd::chdir("/").map_err(|e| BoxError::Syscall {
        operation: "chdir",
        message: e.to_string(),
    })?;
    tracing::debug!(new_root = %new_root.display(), "changed root");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — changing root requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn enter_root(_new_root: &Path) -> Result<()> {
    Err(BoxError::Config {
        message: "Linux required for native container operations".into(),
    })
}
