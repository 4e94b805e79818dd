//! Linux namespace management for container isolation.
//!
//! All namespaces are requested at process-creation time through a single
//! `clone(2)` flag set. Nothing here calls `unshare(2)`: a PID namespace
//! entered that way only applies to later children, not to the caller.

pub mod user;
pub mod uts;

/// Which namespaces the container process is created in.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSet {
    /// Isolate user and group IDs.
    pub user: bool,
    /// Isolate hostname and domain name.
    pub uts: bool,
    /// Isolate System V IPC and POSIX message queues.
    pub ipc: bool,
    /// Isolate the process ID space.
    pub pid: bool,
    /// Isolate the mount table.
    pub mount: bool,
    /// Isolate the network stack.
    pub network: bool,
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self {
            user: true,
            uts: true,
            ipc: true,
            pid: true,
            mount: true,
            network: true,
        }
    }
}

#[cfg(target_os = "linux")]
impl NamespaceSet {
    /// Converts the set into `clone(2)` flags.
    #[must_use]
    pub fn clone_flags(&self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        [
            (self.user, CloneFlags::CLONE_NEWUSER),
            (self.uts, CloneFlags::CLONE_NEWUTS),
            (self.ipc, CloneFlags::CLONE_NEWIPC),
            (self.pid, CloneFlags::CLONE_NEWPID),
            (self.mount, CloneFlags::CLONE_NEWNS),
            (self.network, CloneFlags::CLONE_NEWNET),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(CloneFlags::empty(), |acc, (_, flag)| acc | flag)
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use nix::sched::CloneFlags;

    use super::*;

    #[test]
    fn default_set_requests_all_six_namespaces() {
        let flags = NamespaceSet::default().clone_flags();
        assert_eq!(
            flags,
            CloneFlags::CLONE_NEWUSER
                | CloneFlags::CLONE_NEWUTS
                | CloneFlags::CLONE_NEWIPC
                | CloneFlags::CLONE_NEWPID
                | CloneFlags::CLONE_NEWNS
                | CloneFlags::CLONE_NEWNET
        );
    }

    #[test]
    fn disabled_namespaces_are_left_out() {
        let set = NamespaceSet {
            network: false,
            user: false,
            ..NamespaceSet::default()
        };
        let flags = set.clone_flags();
        assert!(!flags.contains(CloneFlags::CLONE_NEWNET));
        assert!(!flags.contains(CloneFlags::CLONE_NEWUSER));
        assert!(flags.contains(CloneFlags::CLONE_NEWPID));
    }
}
