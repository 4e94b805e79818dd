//! `boxengine run` — launch a command in a new container.

use std::path::PathBuf;

use clap::Args;
use boxengine_common::config::{LaunchConfig, LogFormat, NetworkConfig};
use boxengine_common::constants::{
    DEFAULT_BRIDGE_ADDR, DEFAULT_BRIDGE_NAME, DEFAULT_NETWORK_HELPER, DEFAULT_ROOTFS,
    DEFAULT_VETH_ADDR, DEFAULT_VETH_NAME,
};
use boxengine_runtime::launcher::{LaunchRequest, Launcher};
use boxengine_runtime::preflight;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// NIC name for veth.
    #[arg(long, alias = "vethName", env = "BOXENGINE_VETH_NAME", default_value = DEFAULT_VETH_NAME)]
    pub veth_name: String,

    /// IP address (CIDR) for veth.
    #[arg(long, alias = "vethAddr", env = "BOXENGINE_VETH_ADDR", default_value = DEFAULT_VETH_ADDR)]
    pub veth_addr: String,

    /// NIC name for bridge.
    #[arg(long, alias = "bridgeName", env = "BOXENGINE_BRIDGE_NAME", default_value = DEFAULT_BRIDGE_NAME)]
    pub bridge_name: String,

    /// IP address (CIDR) for bridge.
    #[arg(long, alias = "bridgeAddr", env = "BOXENGINE_BRIDGE_ADDR", default_value = DEFAULT_BRIDGE_ADDR)]
    pub bridge_addr: String,

    /// Path to the netsetgo binary.
    #[arg(long, alias = "netsetgoPath", env = "BOXENGINE_NETSETGO_PATH", default_value = DEFAULT_NETWORK_HELPER)]
    pub netsetgo_path: PathBuf,

    /// Path to the root filesystem.
    #[arg(long, alias = "rootfsPath", env = "BOXENGINE_ROOTFS_PATH", default_value = DEFAULT_ROOTFS)]
    pub rootfs_path: PathBuf,

    /// Command to run, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Builds the launch configuration from the parsed flags.
    #[must_use]
    pub fn to_config(&self, log_format: LogFormat) -> LaunchConfig {
        LaunchConfig {
            network: NetworkConfig {
                veth_name: self.veth_name.clone(),
                veth_addr: self.veth_addr.clone(),
                bridge_name: self.bridge_name.clone(),
                bridge_addr: self.bridge_addr.clone(),
            },
            network_helper: self.netsetgo_path.clone(),
            rootfs: self.rootfs_path.clone(),
            log_format,
            ..LaunchConfig::default()
        }
    }
}

/// Executes the `run` command.
///
/// Pre-flight failures print their remediation text and exit with
/// status 1 before any privileged work starts.
///
/// # Errors
///
/// Returns an error if the caller is not root or the launch fails.
pub fn execute(args: RunArgs, log_format: LogFormat) -> anyhow::Result<()> {
    preflight::ensure_root()?;

    let config = args.to_config(log_format);
    tracing::debug!(?config, "launch configuration");
    let request = LaunchRequest::new(args.command, config)?;

    match Launcher::new().launch(&request) {
        Err(e) if e.is_preflight() => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
        result => Ok(result?),
    }
}
