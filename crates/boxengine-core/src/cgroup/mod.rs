//! Cgroup v1 resource management.
//!
//! Each controller (`pids`, `memory`, `cpu`) is mounted in its own
//! hierarchy under `/sys/fs/cgroup`. The container gets a directory of the
//! same name under every controller. Limits are written before the process
//! joins the group so it is never admitted without them.

pub mod cpu;
pub mod memory;
pub mod pids;

use std::fmt;
use std::path::{Path, PathBuf};

use boxengine_common::config::CgroupConfig;
use boxengine_common::error::{BoxError, Result};

/// Cgroup controllers the container is constrained by, in setup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Controller {
    /// Process-count controller.
    Pids,
    /// Memory controller.
    Memory,
    /// CFS bandwidth controller.
    Cpu,
}

impl Controller {
    /// All controllers in the order they are configured.
    pub const ALL: [Self; 3] = [Self::Pids, Self::Memory, Self::Cpu];

    /// Directory name of the controller's hierarchy.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Pids => "pids",
            Self::Memory => "memory",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Handle to the container's group under one controller.
#[derive(Debug)]
pub struct CgroupManager {
    controller: Controller,
    path: PathBuf,
}

impl CgroupManager {
    /// Creates `<root>/<controller>/<name>`.
    ///
    /// An existing directory is reused. The controller hierarchy itself
    /// must already be mounted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(root: &Path, controller: Controller, name: &str) -> Result<Self> {
        let path = root.join(controller.dir_name()).join(name);
        match std::fs::create_dir(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "cgroup created"),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "reusing existing cgroup");
            }
            Err(e) => return Err(BoxError::Io { path, source: e }),
        }
        Ok(Self { controller, path })
    }

    /// Writes `value` to the control file `file` inside the group.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn write(&self, file: &str, value: &str) -> Result<()> {
        let target = self.path.join(file);
        std::fs::write(&target, value).map_err(|e| BoxError::Io {
            path: target,
            source: e,
        })?;
        tracing::debug!(controller = %self.controller, file, value, "cgroup file written");
        Ok(())
    }

    /// Lets the kernel release the group once it has no members.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `notify_on_release` fails.
    pub fn enable_release_notification(&self) -> Result<()> {
        self.write("notify_on_release", "1")
    }

    /// Adds a process to this group by writing its PID.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `cgroup.procs` fails.
    pub fn add_process(&self, pid: u32) -> Result<()> {
        self.write("cgroup.procs", &pid.to_string())?;
        tracing::debug!(controller = %self.controller, pid, "added process to cgroup");
        Ok(())
    }
}

/// Constrains `pid` under every controller.
///
/// For each controller in [`Controller::ALL`] order: create the group,
/// write its limits, enable release notification, then add the process.
///
/// # Errors
///
/// Returns the first failed directory creation or control-file write.
pub fn limit_process(config: &CgroupConfig, pid: u32) -> Result<Vec<CgroupManager>> {
    let mut groups = Vec::with_capacity(Controller::ALL.len());
    for controller in Controller::ALL {
        let group = CgroupManager::create(&config.root, controller, &config.name)?;
        match controller {
            Controller::Pids => pids::apply(&group, &config.limits)?,
            Controller::Memory => memory::apply(&group, &config.limits)?,
            Controller::Cpu => cpu::apply(&group, &config.limits)?,
        }
        group.enable_release_notification()?;
        group.add_process(pid)?;
        groups.push(group);
    }
    tracing::info!(pid, name = %config.name, "process constrained by cgroups");
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    use boxengine_common::config::CgroupLimits;

    fn fake_hierarchy() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for controller in Controller::ALL {
            std::fs::create_dir(dir.path().join(controller.dir_name())).expect("mkdir");
        }
        dir
    }

    fn config_for(root: &Path) -> CgroupConfig {
        CgroupConfig {
            root: root.to_path_buf(),
            name: "BoxEngine".into(),
            limits: CgroupLimits::default(),
        }
    }

    fn read(root: &Path, controller: &str, file: &str) -> String {
        std::fs::read_to_string(root.join(controller).join("BoxEngine").join(file))
            .expect("read control file")
    }

    #[test]
    fn limit_process_writes_fixed_values() {
        let dir = fake_hierarchy();
        let groups = limit_process(&config_for(dir.path()), 4242).expect("limit");
        assert_eq!(groups.len(), 3);

        let root = dir.path();
        assert_eq!(read(root, "pids", "pids.max"), "10");
        assert_eq!(read(root, "memory", "memory.limit_in_bytes"), "5M");
        assert_eq!(read(root, "memory", "memory.swappiness"), "0");
        assert_eq!(read(root, "cpu", "cpu.cfs_period_us"), "100000");
        assert_eq!(read(root, "cpu", "cpu.cfs_quota_us"), "50000");
    }

    #[test]
    fn limit_process_registers_pid_and_release_flag_everywhere() {
        let dir = fake_hierarchy();
        let _ = limit_process(&config_for(dir.path()), 4242).expect("limit");
        for controller in Controller::ALL {
            assert_eq!(read(dir.path(), controller.dir_name(), "cgroup.procs"), "4242");
            assert_eq!(read(dir.path(), controller.dir_name(), "notify_on_release"), "1");
        }
    }

    #[test]
    fn existing_group_directory_is_reused() {
        let dir = fake_hierarchy();
        let config = config_for(dir.path());
        let _ = limit_process(&config, 1).expect("first run");
        let _ = limit_process(&config, 2).expect("second run");
        assert_eq!(read(dir.path(), "pids", "cgroup.procs"), "2");
    }

    #[test]
    fn missing_controller_hierarchy_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = limit_process(&config_for(dir.path()), 1).expect_err("should fail");
        assert!(matches!(err, BoxError::Io { .. }));
    }

    #[test]
    fn failure_stops_before_later_controllers() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("pids")).expect("mkdir");
        std::fs::create_dir(dir.path().join("cpu")).expect("mkdir");
        let _ = limit_process(&config_for(dir.path()), 7).expect_err("memory is missing");
        assert_eq!(read(dir.path(), "pids", "cgroup.procs"), "7");
        assert!(!dir.path().join("cpu").join("BoxEngine").exists());
    }

    #[test]
    fn failed_limit_write_keeps_process_out_of_group() {
        let dir = fake_hierarchy();
        let group = dir.path().join("pids").join("BoxEngine");
        // A directory where pids.max should be makes the limit write fail.
        std::fs::create_dir_all(group.join("pids.max")).expect("mkdir");

        let err = limit_process(&config_for(dir.path()), 9).expect_err("limit write fails");
        assert!(matches!(err, BoxError::Io { ref path, .. } if *path == group.join("pids.max")));
        assert!(!group.join("notify_on_release").exists());
        assert!(!group.join("cgroup.procs").exists());
    }

    #[test]
    fn controller_order_is_pids_memory_cpu() {
        let names: Vec<_> = Controller::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["pids", "memory", "cpu"]);
    }
}
