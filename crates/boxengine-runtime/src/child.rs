//! Child stage of a container launch.
//!
//! Runs inside the namespaces created by the parent, in a fixed order:
//! cgroup limits first so the process is bounded from the start, then the
//! hostname and filesystem, then the network gate, and finally `execv`
//! into the target command with the inherited environment.

use std::convert::Infallible;
use std::ffi::CString;
use std::fmt;

use boxengine_common::config::ChildConfig;
use boxengine_common::error::{BoxError, Result};

#[cfg(target_os = "linux")]
use crate::netgate::{self, InterfaceProbe, SystemInterfaces};

/// Progress of the child stage.
///
/// `Replaced` has no successor: once reached, this code no longer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStage {
    /// Applying limits and isolation.
    Setup,
    /// Limits, filesystem and network are in place.
    Isolated,
    /// The process image is being replaced by the target command.
    Replaced,
}

impl fmt::Display for ChildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Isolated => write!(f, "isolated"),
            Self::Replaced => write!(f, "replaced"),
        }
    }
}

/// Sets up the container and replaces this process with `command`.
///
/// Only returns on failure.
///
/// # Errors
///
/// Returns the first failing step. If `execv` itself fails, `/proc` and
/// `/sys` are unmounted best-effort before the error is returned.
#[cfg(target_os = "linux")]
pub fn enter(config: &ChildConfig, command: &[String]) -> Result<Infallible> {
    enter_with_probe(config, command, &SystemInterfaces)
}

/// Like [`enter`], with a caller-supplied interface probe.
///
/// # Errors
///
/// See [`enter`].
#[cfg(target_os = "linux")]
pub fn enter_with_probe(
    config: &ChildConfig,
    command: &[String],
    probe: &dyn InterfaceProbe,
) -> Result<Infallible> {
    let argv = exec_argv(command)?;
    let pid = std::process::id();

    #[allow(clippy::print_stderr)]
    {
        eprintln!("Running {} as PID {pid}", command[0]);
    }
    tracing::info!(stage = %ChildStage::Setup, pid, "child stage started");

    let _groups = boxengine_core::cgroup::limit_process(&config.cgroup, pid)?;
    boxengine_core::namespace::uts::set_hostname(&config.hostname)?;
    boxengine_core::filesystem::isolate(&config.rootfs)?;
    let _ = netgate::wait_for_network(probe, config.network_wait)?;
    tracing::info!(stage = %ChildStage::Isolated, "container isolated");

    tracing::info!(stage = %ChildStage::Replaced, program = %command[0], "executing");
    let Err(e) = nix::unistd::execv(&argv[0], &argv);

    boxengine_core::filesystem::mount::unmount_essential_filesystems();
    Err(BoxError::Syscall {
        operation: "execve",
        message: format!("{}: {e}", command[0]),
    })
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — the child stage requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn enter(_config: &ChildConfig, _command: &[String]) -> Result<Infallible> {
    Err(BoxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

/// Converts the target command into `execv` arguments.
///
/// The program is executed by path as given; `PATH` is not searched.
///
/// # Errors
///
/// Returns an error if `command` is empty or contains a NUL byte.
pub fn exec_argv(command: &[String]) -> Result<Vec<CString>> {
    if command.is_empty() {
        return Err(BoxError::Config {
            message: "no command given to the child stage".into(),
        });
    }
    command
        .iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|_| BoxError::Config {
                message: format!("argument contains a NUL byte: {arg:?}"),
            })
        })
        .collect()
}
