//! Invocation of the external network-configuration helper.
//!
//! The helper (netsetgo) creates a bridge and veth pair on the host and
//! moves one end into the container's network namespace. Only its command
//! line and exit status matter here.

use std::path::PathBuf;
use std::process::Command;

use boxengine_common::config::NetworkConfig;
use boxengine_common::error::{BoxError, Result};

/// A configured network helper.
#[derive(Debug, Clone)]
pub struct NetworkHelper {
    path: PathBuf,
    network: NetworkConfig,
}

impl NetworkHelper {
    /// Creates a helper invocation for the given binary and settings.
    #[must_use]
    pub const fn new(path: PathBuf, network: NetworkConfig) -> Self {
        Self { path, network }
    }

    /// Command-line arguments for configuring the namespace of `pid`.
    #[must_use]
    pub fn args(&self, pid: u32) -> Vec<String> {
        vec![
            "-pid".into(),
            pid.to_string(),
            "-containerAddress".into(),
            self.network.veth_addr.clone(),
            "-vethNamePrefix".into(),
            self.network.veth_name.clone(),
            "-bridgeAddress".into(),
            self.network.bridge_addr.clone(),
            "-bridgeName".into(),
            self.network.bridge_name.clone(),
        ]
    }

    /// Runs the helper against `pid` and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the helper cannot be started or exits non-zero.
    pub fn configure(&self, pid: u32) -> Result<()> {
        tracing::info!(helper = %self.path.display(), pid, "configuring container network");
        let status = Command::new(&self.path)
            .args(self.args(pid))
            .status()
            .map_err(|e| BoxError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        if !status.success() {
            return Err(BoxError::HelperFailed {
                status: status.to_string(),
            });
        }
        tracing::debug!(pid, "network helper finished");
        Ok(())
    }
}
