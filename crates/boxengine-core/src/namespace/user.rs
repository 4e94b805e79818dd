//! User namespace isolation.
//!
//! Maps container root onto the invoking host user and group.

use std::path::PathBuf;

use boxengine_common::error::{BoxError, Result};
use boxengine_common::types::IdMappings;

/// Paths of the ID-mapping files for a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFiles {
    /// `/proc/<pid>/setgroups`.
    pub setgroups: PathBuf,
    /// `/proc/<pid>/uid_map`.
    pub uid_map: PathBuf,
    /// `/proc/<pid>/gid_map`.
    pub gid_map: PathBuf,
}

impl MapFiles {
    /// Files for `pid` under the given procfs mount; `0` means `self`.
    #[must_use]
    pub fn under(proc_root: &std::path::Path, pid: u32) -> Self {
        let dir = if pid == 0 {
            proc_root.join("self")
        } else {
            proc_root.join(pid.to_string())
        };
        Self {
            setgroups: dir.join("setgroups"),
            uid_map: dir.join("uid_map"),
            gid_map: dir.join("gid_map"),
        }
    }

    /// Files for `pid` under `/proc`.
    #[must_use]
    pub fn for_pid(pid: u32) -> Self {
        Self::under(std::path::Path::new("/proc"), pid)
    }
}

/// Writes the UID/GID mapping for a process in a fresh user namespace.
///
/// `setgroups` is denied before `gid_map` is written, as the kernel
/// requires for mappings written without `CAP_SETGID` in the parent
/// namespace. Each map file can only be written once per namespace.
///
/// # Errors
///
/// Returns an error if writing any of the three files fails.
pub fn write_id_mappings(files: &MapFiles, mappings: &IdMappings) -> Result<()> {
    write_file(&files.uid_map, &format!("{}\n", mappings.uid))?;

    if files.setgroups.exists() {
        write_file(&files.setgroups, "deny")?;
    }
    write_file(&files.gid_map, &format!("{}\n", mappings.gid))?;

    tracing::debug!(uid = %mappings.uid, gid = %mappings.gid, "wrote UID/GID map");
    Ok(())
}

fn write_file(path: &std::path::Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| BoxError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_proc(pid: u32) -> (tempfile::TempDir, MapFiles) {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join(pid.to_string())).expect("mkdir");
        let files = MapFiles::under(dir.path(), pid);
        (dir, files)
    }

    #[test]
    fn map_files_resolve_self_for_pid_zero() {
        let files = MapFiles::for_pid(0);
        assert_eq!(files.uid_map, PathBuf::from("/proc/self/uid_map"));
        let files = MapFiles::for_pid(31);
        assert_eq!(files.gid_map, PathBuf::from("/proc/31/gid_map"));
    }

    #[test]
    fn mappings_are_written_one_line_each() {
        let (_dir, files) = fake_proc(77);
        std::fs::write(&files.setgroups, "allow").expect("seed setgroups");

        write_id_mappings(&files, &IdMappings::single_user(1000, 100)).expect("write");

        assert_eq!(std::fs::read_to_string(&files.uid_map).expect("uid"), "0 1000 1\n");
        assert_eq!(std::fs::read_to_string(&files.gid_map).expect("gid"), "0 100 1\n");
        assert_eq!(std::fs::read_to_string(&files.setgroups).expect("sg"), "deny");
    }

    #[test]
    fn setgroups_is_skipped_when_kernel_lacks_it() {
        let (_dir, files) = fake_proc(78);
        write_id_mappings(&files, &IdMappings::single_user(0, 0)).expect("write");
        assert!(!files.setgroups.exists());
    }

    #[test]
    fn missing_process_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = MapFiles::under(dir.path(), 99);
        let err = write_id_mappings(&files, &IdMappings::single_user(0, 0)).expect_err("fail");
        assert!(matches!(err, BoxError::Io { .. }));
    }
}
