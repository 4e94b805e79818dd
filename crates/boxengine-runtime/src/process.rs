//! Self re-execution inside new namespaces.
//!
//! The container process is created with `clone(2)` so every namespace,
//! the PID namespace included, exists from its first instruction. The
//! clone blocks on a pipe until the parent has written its UID/GID maps,
//! then executes `/proc/self/exe` with the child-stage arguments.

use std::ffi::CString;
use std::fmt;
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

use boxengine_common::constants::{BIN_NAME, SELF_EXE};
use boxengine_common::error::{BoxError, Result};
use boxengine_common::types::IdMappings;
use boxengine_core::namespace::NamespaceSet;
use boxengine_core::namespace::user::{MapFiles, write_id_mappings};

const STACK_SIZE: usize = 1024 * 1024;

/// Exit code of a clone that could not execute the binary.
const EXEC_FAILED: isize = 127;

/// How a container process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited normally with the given code.
    Code(i32),
    /// Killed by a signal.
    Signal(Signal),
}

impl ChildExit {
    /// Returns `true` for a zero exit code.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Code(0))
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit status: {code}"),
            Self::Signal(signal) => write!(f, "killed by {signal}"),
        }
    }
}

/// Starts `/proc/self/exe <args>` in the given namespaces without waiting.
///
/// Standard input, output and error are inherited.
///
/// # Errors
///
/// Returns an error if an argument contains a NUL byte, or if the pipe,
/// `clone(2)` or ID mapping fails. A clone whose mapping failed is killed
/// and reaped before returning.
pub fn spawn_reexec(
    namespaces: &NamespaceSet,
    mappings: &IdMappings,
    args: &[String],
) -> Result<Pid> {
    let exe = to_cstring(SELF_EXE)?;
    let argv = std::iter::once(BIN_NAME)
        .chain(args.iter().map(String::as_str))
        .map(to_cstring)
        .collect::<Result<Vec<_>>>()?;

    // Built up front: the clone must not allocate before exec.
    let argv_ptrs: Vec<*const libc::c_char> = argv
        .iter()
        .map(|arg| arg.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect();

    let (ready_rx, ready_tx) = nix::unistd::pipe().map_err(syscall("pipe"))?;
    let (rx, tx) = (ready_rx.as_raw_fd(), ready_tx.as_raw_fd());

    let mut stack = vec![0_u8; STACK_SIZE];
    let child_main = Box::new(|| -> isize {
        let mut byte = 0_u8;
        // SAFETY: rx and tx are this process's copies of the pipe opened
        // above; exe and argv_ptrs outlive the call and argv_ptrs is
        // NULL-terminated.
        unsafe {
            let _ = libc::close(tx);
            // Returns 0 once the parent closes its write end.
            if libc::read(rx, (&raw mut byte).cast(), 1) < 0 {
                return EXEC_FAILED;
            }
            let _ = libc::close(rx);
            let _ = libc::execv(exe.as_ptr(), argv_ptrs.as_ptr());
        }
        EXEC_FAILED
    });

    // SAFETY: the clone gets its own copy of the address space (no
    // CLONE_VM) and only runs the callback above, which execs or exits.
    let pid = unsafe {
        nix::sched::clone(
            child_main,
            &mut stack,
            namespaces.clone_flags(),
            Some(libc::SIGCHLD),
        )
    }
    .map_err(syscall("clone"))?;
    drop(ready_rx);

    let raw_pid = pid.as_raw().unsigned_abs();
    if namespaces.user {
        if let Err(e) = write_id_mappings(&MapFiles::for_pid(raw_pid), mappings) {
            abandon(pid);
            return Err(e);
        }
    }
    drop(ready_tx);

    tracing::info!(pid = raw_pid, flags = ?namespaces.clone_flags(), "container process created");
    Ok(pid)
}

/// Blocks until `pid` terminates.
///
/// # Errors
///
/// Returns an error if `waitpid(2)` fails.
pub fn wait_for_exit(pid: Pid) -> Result<ChildExit> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ChildExit::Code(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(ChildExit::Signal(signal)),
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => return Err(syscall("waitpid")(e)),
        }
    }
}

/// Kills and reaps a clone that never got its ID mapping.
fn abandon(pid: Pid) {
    if let Err(e) = kill(pid, Signal::SIGKILL) {
        tracing::warn!(pid = %pid, error = %e, "failed to kill container process");
        return;
    }
    if let Err(e) = waitpid(pid, None) {
        tracing::warn!(pid = %pid, error = %e, "failed to reap container process");
    }
}

fn to_cstring(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| BoxError::Config {
        message: format!("argument contains a NUL byte: {value:?}"),
    })
}

fn syscall(operation: &'static str) -> impl Fn(Errno) -> BoxError {
    move |e| BoxError::Syscall {
        operation,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        assert!(ChildExit::Code(0).success());
        assert!(!ChildExit::Code(3).success());
        assert!(!ChildExit::Signal(Signal::SIGKILL).success());
    }

    #[test]
    fn exit_descriptions_are_readable() {
        assert_eq!(ChildExit::Code(2).to_string(), "exit status: 2");
        assert_eq!(ChildExit::Signal(Signal::SIGTERM).to_string(), "killed by SIGTERM");
    }

    #[test]
    fn nul_bytes_in_arguments_are_rejected() {
        let err = to_cstring("/bin/ec\0ho").unwrap_err();
        assert!(matches!(err, BoxError::Config { .. }));
    }

    #[test]
    fn clone_without_namespaces_runs_and_is_reaped() {
        // With no namespaces and no mapping this re-executes the test
        // binary itself; an unknown filter makes it exit 0 after listing
        // nothing.
        let set = NamespaceSet {
            user: false,
            uts: false,
            ipc: false,
            pid: false,
            mount: false,
            network: false,
        };
        let args = vec!["--list".to_string(), "--exact".into(), "no-such-test".into()];
        let pid = spawn_reexec(&set, &IdMappings::single_user(0, 0), &args).unwrap();
        assert_eq!(wait_for_exit(pid).unwrap(), ChildExit::Code(0));
    }
}
