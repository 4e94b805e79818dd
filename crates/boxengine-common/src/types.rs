//! Domain primitive types used across the BoxEngine workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One line of a user namespace `uid_map` or `gid_map`.
///
/// Declares that `size` consecutive IDs starting at `container_id` inside
/// the namespace correspond to IDs starting at `host_id` outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdMapping {
    /// First ID inside the user namespace.
    pub container_id: u32,
    /// First ID on the host.
    pub host_id: u32,
    /// Number of consecutive IDs mapped.
    pub size: u32,
}

impl IdMapping {
    /// Maps container root (0) onto a single host ID.
    #[must_use]
    pub const fn root_to(host_id: u32) -> Self {
        Self {
            container_id: 0,
            host_id,
            size: 1,
        }
    }
}

impl fmt::Display for IdMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.container_id, self.host_id, self.size)
    }
}

/// UID and GID mappings for a new user namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMappings {
    /// Mapping written to `uid_map`.
    pub uid: IdMapping,
    /// Mapping written to `gid_map`.
    pub gid: IdMapping,
}

impl IdMappings {
    /// Maps container root onto the given host user and group.
    #[must_use]
    pub const fn single_user(host_uid: u32, host_gid: u32) -> Self {
        Self {
            uid: IdMapping::root_to(host_uid),
            gid: IdMapping::root_to(host_gid),
        }
    }
}
