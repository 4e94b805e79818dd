//! System-wide constants and default values.

use std::time::Duration;

/// Binary name for the CLI.
pub const BIN_NAME: &str = "boxengine";

/// Hostname set inside the container's UTS namespace.
pub const CONTAINER_HOSTNAME: &str = "BoxEngine";

/// Name of the per-controller cgroup directory created for containers.
pub const CGROUP_NAME: &str = "BoxEngine";

/// Mount point of the cgroup v1 controller hierarchies.
pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Subcommand used when the launcher re-executes itself.
pub const CHILD_SUBCOMMAND: &str = "child";

/// Path through which a process can re-execute its own binary.
pub const SELF_EXE: &str = "/proc/self/exe";

/// Default virtual interface name prefix handed to the network helper.
pub const DEFAULT_VETH_NAME: &str = "veth0";

/// Default container-side address (CIDR).
pub const DEFAULT_VETH_ADDR: &str = "192.168.0.10/24";

/// Default bridge interface name.
pub const DEFAULT_BRIDGE_NAME: &str = "br0";

/// Default bridge address (CIDR).
pub const DEFAULT_BRIDGE_ADDR: &str = "192.168.0.1/24";

/// Default location of the network-configuration helper.
pub const DEFAULT_NETWORK_HELPER: &str = "/usr/local/bin/netsetgo";

/// Default root filesystem directory.
pub const DEFAULT_ROOTFS: &str = "./rootfs";

/// Maximum number of processes allowed in the container.
pub const DEFAULT_PIDS_MAX: u64 = 10;

/// Hard memory ceiling for the container (5 MiB).
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 5 * 1024 * 1024;

/// Swappiness for the container's memory cgroup.
pub const DEFAULT_MEMORY_SWAPPINESS: u8 = 0;

/// CFS accounting period in microseconds (100 ms).
pub const DEFAULT_CPU_PERIOD_US: u64 = 100_000;

/// CFS quota in microseconds per period (50 ms).
pub const DEFAULT_CPU_QUOTA_US: u64 = 50_000;

/// How long the child waits for a non-loopback interface.
pub const NETWORK_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

/// Interval between interface checks.
pub const NETWORK_POLL_INTERVAL: Duration = Duration::from_secs(1);
