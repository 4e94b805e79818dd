//! Parent stage of a container launch.
//!
//! Validates the request, re-executes this binary as `child` inside new
//! namespaces, hands the new process to the network helper, then waits for
//! it. Any failure aborts the launch; nothing already created is undone.

use boxengine_common::config::{ChildConfig, LaunchConfig, LogFormat};
use boxengine_common::constants::CHILD_SUBCOMMAND;
use boxengine_common::error::{BoxError, Result};
use boxengine_common::types::IdMappings;
use boxengine_core::namespace::NamespaceSet;

use crate::helper::NetworkHelper;
use crate::preflight;

/// A command to run in a container, with its launch settings.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    command: Vec<String>,
    config: LaunchConfig,
}

impl LaunchRequest {
    /// Creates a request for `command` (program followed by its arguments).
    ///
    /// # Errors
    ///
    /// Returns an error if `command` is empty.
    pub fn new(command: Vec<String>, config: LaunchConfig) -> Result<Self> {
        if command.is_empty() {
            return Err(BoxError::Config {
                message: "no command given to run".into(),
            });
        }
        Ok(Self { command, config })
    }

    /// The program and its arguments.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The launch settings.
    #[must_use]
    pub const fn config(&self) -> &LaunchConfig {
        &self.config
    }
}

/// Builds the re-exec argument vector for the child stage.
///
/// The layout is
/// `--log-format <fmt> child --config <json> -- <command> [args...]`, so the
/// child logs the same way as the parent.
///
/// # Errors
///
/// Returns an error if the configuration cannot be encoded.
pub fn child_args(
    config: &ChildConfig,
    log_format: LogFormat,
    command: &[String],
) -> Result<Vec<String>> {
    let mut args = vec![
        "--log-format".to_string(),
        log_format.as_str().into(),
        CHILD_SUBCOMMAND.into(),
        "--config".into(),
        config.to_json()?,
        "--".into(),
    ];
    args.extend(command.iter().cloned());
    Ok(args)
}

/// Runs the parent stage.
#[derive(Debug, Clone)]
pub struct Launcher {
    namespaces: NamespaceSet,
    mappings: IdMappings,
}

impl Launcher {
    /// Creates a launcher requesting every namespace, mapping container
    /// root onto the invoking user and group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespaces: NamespaceSet::default(),
            mappings: IdMappings::single_user(
                nix::unistd::getuid().as_raw(),
                nix::unistd::getgid().as_raw(),
            ),
        }
    }

    /// Namespaces the container is created in.
    #[must_use]
    pub const fn namespaces(&self) -> &NamespaceSet {
        &self.namespaces
    }

    /// ID mappings written for the container.
    #[must_use]
    pub const fn mappings(&self) -> &IdMappings {
        &self.mappings
    }

    /// Launches the request and waits for the container to exit.
    ///
    /// Pre-flight checks run before anything privileged. The network
    /// helper is only invoked once the container process exists.
    ///
    /// # Errors
    ///
    /// Returns the first failing step: pre-flight, process creation, the
    /// network helper, or a non-zero container exit.
    #[cfg(target_os = "linux")]
    pub fn launch(&self, request: &LaunchRequest) -> Result<()> {
        let config = request.config();
        let checked = preflight::check(config)?;

        #[allow(clippy::print_stderr)]
        {
            eprintln!(
                "Running {} as PID {}",
                request.command()[0],
                std::process::id()
            );
        }

        let child = ChildConfig {
            rootfs: checked.rootfs,
            ..config.child_config()
        };
        let args = child_args(&child, config.log_format, request.command())?;
        let pid = crate::process::spawn_reexec(&self.namespaces, &self.mappings, &args)?;
        let raw_pid = pid.as_raw().unsigned_abs();

        NetworkHelper::new(checked.network_helper, config.network.clone()).configure(raw_pid)?;

        let exit = crate::process::wait_for_exit(pid)?;
        tracing::info!(pid = raw_pid, %exit, "container exited");
        if exit.success() {
            Ok(())
        } else {
            Err(BoxError::ChildFailed {
                status: exit.to_string(),
            })
        }
    }

    /// Stub for non-Linux platforms.
    ///
    /// # Errors
    ///
    /// Pre-flight errors as on Linux, otherwise always an error.
    #[cfg(not(target_os = "linux"))]
    pub fn launch(&self, request: &LaunchRequest) -> Result<()> {
        let _ = preflight::check(request.config())?;
        Err(BoxError::Config {
            message: "Linux required for native container operations".into(),
        })
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Vec<String> {
        vec!["/bin/echo".into(), "hello".into()]
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = LaunchRequest::new(Vec::new(), LaunchConfig::default()).unwrap_err();
        assert!(matches!(err, BoxError::Config { .. }));
    }

    #[test]
    fn child_args_put_command_after_separator() {
        let config = LaunchConfig::default().child_config();
        let args = child_args(&config, LogFormat::Text, &echo()).unwrap();
        assert_eq!(args[2], "child");
        assert_eq!(args[3], "--config");
        assert_eq!(ChildConfig::from_json(&args[4]).unwrap(), config);
        assert_eq!(&args[5..], ["--", "/bin/echo", "hello"]);
    }

    #[test]
    fn child_args_forward_log_format_before_subcommand() {
        let config = LaunchConfig::default().child_config();
        let args = child_args(&config, LogFormat::Json, &echo()).unwrap();
        assert_eq!(&args[..3], ["--log-format", "json", "child"]);

        let args = child_args(&config, LogFormat::Text, &echo()).unwrap();
        assert_eq!(&args[..2], ["--log-format", "text"]);
    }

    #[test]
    fn command_flags_survive_re_exec_layout() {
        let command = vec!["/bin/ls".to_string(), "--config".into(), "-la".into()];
        let args = child_args(
            &LaunchConfig::default().child_config(),
            LogFormat::Text,
            &command,
        )
        .unwrap();
        assert_eq!(&args[6..], command.as_slice());
    }

    #[test]
    fn launcher_maps_root_to_invoking_user() {
        let launcher = Launcher::new();
        assert_eq!(launcher.mappings().uid.container_id, 0);
        assert_eq!(launcher.mappings().uid.host_id, nix::unistd::getuid().as_raw());
        assert_eq!(launcher.mappings().gid.host_id, nix::unistd::getgid().as_raw());
        assert_eq!(launcher.mappings().uid.size, 1);
        assert_eq!(*launcher.namespaces(), NamespaceSet::default());
    }

    #[test]
    fn missing_rootfs_stops_launch_before_any_process_exists() {
        let dir = tempfile::tempdir().unwrap();
        let helper = dir.path().join("netsetgo");
        std::fs::write(&helper, b"").unwrap();
        let cgroup_root = dir.path().join("cgroup");

        let config = LaunchConfig {
            network_helper: helper,
            rootfs: dir.path().join("missing-rootfs"),
            cgroup: boxengine_common::config::CgroupConfig {
                root: cgroup_root.clone(),
                ..Default::default()
            },
            ..LaunchConfig::default()
        };
        let request = LaunchRequest::new(echo(), config).unwrap();

        let err = Launcher::new().launch(&request).unwrap_err();
        assert!(
            matches!(err, BoxError::MissingRootfs { ref path } if *path == dir.path().join("missing-rootfs"))
        );
        assert!(!cgroup_root.exists());
    }
}
