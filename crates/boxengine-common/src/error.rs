//! Unified error types for the BoxEngine workspace.
//!
//! Every setup step returns [`Result`]. The first failure short-circuits the
//! remaining steps and unwinds to the CLI, which reports it and exits.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BoxError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The network-configuration helper binary does not exist.
    #[error(
        "\nUnable to find the netsetgo binary at \"{}\".\n\
         netsetgo is an external binary used to configure networking.\n\
         You must download netsetgo, chown it to the root user and apply the setuid bit.\n\
         This can be done as follows:\n  \
         wget \"https://github.com/teddyking/netsetgo/releases/download/0.0.1/netsetgo\"\n  \
         sudo mv netsetgo /usr/local/bin/\n  \
         sudo chown root:root /usr/local/bin/netsetgo\n  \
         sudo chmod 4755 /usr/local/bin/netsetgo\n",
        .path.display()
    )]
    MissingNetworkHelper {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The root filesystem directory does not exist.
    #[error(
        "\n\"{p}\" does not exist.\n\
         Please create this directory and unpack a suitable root filesystem inside it.\n\
         An example rootfs, BusyBox, can be downloaded and unpacked as follows:\n  \
         wget \"https://raw.githubusercontent.com/teddyking/ns-process/4.0/assets/busybox.tar\"\n  \
         mkdir -p {p}\n  \
         tar -C {p} -xf busybox.tar\n\
         Or export from a docker container:\n  \
         docker run -it centos:7 /bin/bash\n  \
         docker export $container_id --output=rootfs.tar\n  \
         mkdir -p {p}\n  \
         tar -C {p} -xf rootfs.tar\n",
        p = .path.display()
    )]
    MissingRootfs {
        /// Path that was checked.
        path: PathBuf,
    },

    /// A privileged system call failed.
    #[error("{operation} failed: {message}")]
    Syscall {
        /// Name of the failed operation.
        operation: &'static str,
        /// Underlying system error text.
        message: String,
    },

    /// No non-loopback interface appeared in time.
    #[error("timeout after {waited:?} waiting for network")]
    NetworkTimeout {
        /// How long the gate waited.
        waited: Duration,
    },

    /// The network-configuration helper exited unsuccessfully.
    #[error("network helper failed: {status}")]
    HelperFailed {
        /// Exit status reported by the helper.
        status: String,
    },

    /// The container process exited unsuccessfully.
    #[error("container process failed: {status}")]
    ChildFailed {
        /// Exit status reported by the child.
        status: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl BoxError {
    /// Returns `true` for pre-flight configuration errors that carry
    /// human remediation text.
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::MissingNetworkHelper { .. } | Self::MissingRootfs { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BoxError>;
