//! Configuration model for a single container launch.
//!
//! [`LaunchConfig`] is built once from the command line and passed
//! explicitly to the parent stage. The parent hands the [`ChildConfig`]
//! subset to the re-executed child as JSON, so neither stage reads
//! process-wide state.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Arguments forwarded to the network-configuration helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Name (prefix) of the virtual ethernet interface.
    pub veth_name: String,
    /// Container-side address in CIDR notation.
    pub veth_addr: String,
    /// Name of the host bridge.
    pub bridge_name: String,
    /// Bridge address in CIDR notation.
    pub bridge_addr: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            veth_name: constants::DEFAULT_VETH_NAME.into(),
            veth_addr: constants::DEFAULT_VETH_ADDR.into(),
            bridge_name: constants::DEFAULT_BRIDGE_NAME.into(),
            bridge_addr: constants::DEFAULT_BRIDGE_ADDR.into(),
        }
    }
}

/// Resource ceilings written to the cgroup controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CgroupLimits {
    /// `pids.max`.
    pub pids_max: u64,
    /// `memory.limit_in_bytes`.
    pub memory_limit_bytes: u64,
    /// `memory.swappiness`.
    pub memory_swappiness: u8,
    /// `cpu.cfs_period_us`.
    pub cpu_period_us: u64,
    /// `cpu.cfs_quota_us`.
    pub cpu_quota_us: u64,
}

impl Default for CgroupLimits {
    fn default() -> Self {
        Self {
            pids_max: constants::DEFAULT_PIDS_MAX,
            memory_limit_bytes: constants::DEFAULT_MEMORY_LIMIT_BYTES,
            memory_swappiness: constants::DEFAULT_MEMORY_SWAPPINESS,
            cpu_period_us: constants::DEFAULT_CPU_PERIOD_US,
            cpu_quota_us: constants::DEFAULT_CPU_QUOTA_US,
        }
    }
}

/// Where the cgroup hierarchy lives and what the container's group is named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CgroupConfig {
    /// Mount point holding one directory per controller.
    pub root: PathBuf,
    /// Directory name created under each controller.
    pub name: String,
    /// Limits applied to the group.
    pub limits: CgroupLimits,
}

impl Default for CgroupConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(constants::CGROUP_ROOT),
            name: constants::CGROUP_NAME.into(),
            limits: CgroupLimits::default(),
        }
    }
}

/// Polling policy for the network readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkWait {
    /// Give up once this much time has elapsed.
    pub timeout: Duration,
    /// Sleep between interface checks.
    pub interval: Duration,
}

impl Default for NetworkWait {
    fn default() -> Self {
        Self {
            timeout: constants::NETWORK_WAIT_TIMEOUT,
            interval: constants::NETWORK_POLL_INTERVAL,
        }
    }
}

/// Everything the child stage needs, passed across the re-exec boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildConfig {
    /// Root filesystem to chroot into.
    pub rootfs: PathBuf,
    /// Hostname set in the new UTS namespace.
    pub hostname: String,
    /// Cgroup placement and limits.
    pub cgroup: CgroupConfig,
    /// Network readiness polling policy.
    pub network_wait: NetworkWait,
}

impl ChildConfig {
    /// Serializes the configuration for the child's command line.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a configuration received on the child's command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid encoded configuration.
    pub fn from_json(input: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Format of diagnostic log lines on standard error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Value accepted by the CLI's `--log-format` option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Root configuration for one `run` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Values passed to the network helper.
    pub network: NetworkConfig,
    /// Path to the network-configuration helper binary.
    pub network_helper: PathBuf,
    /// Root filesystem directory.
    pub rootfs: PathBuf,
    /// Hostname set inside the container.
    pub hostname: String,
    /// Cgroup placement and limits.
    pub cgroup: CgroupConfig,
    /// Network readiness polling policy.
    pub network_wait: NetworkWait,
    /// Log format, kept identical in both stages.
    pub log_format: LogFormat,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            network_helper: PathBuf::from(constants::DEFAULT_NETWORK_HELPER),
            rootfs: PathBuf::from(constants::DEFAULT_ROOTFS),
            hostname: constants::CONTAINER_HOSTNAME.into(),
            cgroup: CgroupConfig::default(),
            network_wait: NetworkWait::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl LaunchConfig {
    /// Extracts the subset of settings the child stage consumes.
    #[must_use]
    pub fn child_config(&self) -> ChildConfig {
        ChildConfig {
            rootfs: self.rootfs.clone(),
            hostname: self.hostname.clone(),
            cgroup: self.cgroup.clone(),
            network_wait: self.network_wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_fixed_ceilings() {
        let limits = CgroupLimits::default();
        assert_eq!(limits.pids_max, 10);
        assert_eq!(limits.memory_limit_bytes, 5 * 1024 * 1024);
        assert_eq!(limits.memory_swappiness, 0);
        assert_eq!(limits.cpu_period_us, 100_000);
        assert_eq!(limits.cpu_quota_us, 50_000);
    }

    #[test]
    fn child_config_carries_rootfs_and_limits() {
        let launch = LaunchConfig {
            rootfs: PathBuf::from("/srv/box"),
            ..LaunchConfig::default()
        };
        let child = launch.child_config();
        assert_eq!(child.rootfs, PathBuf::from("/srv/box"));
        assert_eq!(child.hostname, "BoxEngine");
        assert_eq!(child.cgroup.limits, CgroupLimits::default());
    }

    #[test]
    fn child_config_survives_command_line_handoff() {
        let child = LaunchConfig::default().child_config();
        let json = child.to_json().expect("encode");
        assert!(!json.contains('\n'));
        let decoded = ChildConfig::from_json(&json).expect("decode");
        assert_eq!(decoded, child);
    }

    #[test]
    fn log_format_names_match_cli_values() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
        assert_eq!(LogFormat::Text.as_str(), "text");
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn malformed_child_config_is_rejected() {
        let err = ChildConfig::from_json("{not json").expect_err("should fail");
        assert!(matches!(err, crate::error::BoxError::Serialization { .. }));
    }
}
