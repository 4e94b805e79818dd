//! Checks that gate every privileged operation.
//!
//! Run by the parent before any namespace, cgroup or mount exists, so a
//! misconfigured launch leaves no trace on the host.

use std::path::{Path, PathBuf};

use boxengine_common::config::LaunchConfig;
use boxengine_common::error::{BoxError, Result};

/// Paths confirmed to exist, ready for the launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedPaths {
    /// Network helper binary.
    pub network_helper: PathBuf,
    /// Absolute root filesystem directory.
    pub rootfs: PathBuf,
}

/// Verifies the network helper, then the root filesystem.
///
/// # Errors
///
/// Returns [`BoxError::MissingNetworkHelper`] or [`BoxError::MissingRootfs`]
/// with remediation text, or an I/O error if the rootfs cannot be resolved.
pub fn check(config: &LaunchConfig) -> Result<CheckedPaths> {
    let network_helper = resolve_network_helper(&config.network_helper)?;
    let rootfs = resolve_rootfs(&config.rootfs)?;
    tracing::debug!(
        helper = %network_helper.display(),
        rootfs = %rootfs.display(),
        "pre-flight checks passed"
    );
    Ok(CheckedPaths {
        network_helper,
        rootfs,
    })
}

/// Locates the network helper.
///
/// A bare name such as `netsetgo` is searched for on `PATH`; anything
/// containing a separator is taken as a path.
///
/// # Errors
///
/// Returns [`BoxError::MissingNetworkHelper`] if nothing is found.
pub fn resolve_network_helper(path: &Path) -> Result<PathBuf> {
    let missing = || BoxError::MissingNetworkHelper {
        path: path.to_path_buf(),
    };
    if path.components().count() == 1 && !path.has_root() {
        return which::which(path).map_err(|_| missing());
    }
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(missing())
    }
}

/// Confirms the root filesystem exists and makes it absolute.
///
/// # Errors
///
/// Returns [`BoxError::MissingRootfs`] if the directory does not exist.
pub fn resolve_rootfs(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(BoxError::MissingRootfs {
            path: path.to_path_buf(),
        });
    }
    std::fs::canonicalize(path).map_err(|e| BoxError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Refuses to continue unless running with an effective UID of 0.
///
/// # Errors
///
/// Returns [`BoxError::Config`] for unprivileged callers.
pub fn ensure_root() -> Result<()> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(BoxError::Config {
            message: "This program must be run as root! (sudo)".into(),
        })
    }
}
