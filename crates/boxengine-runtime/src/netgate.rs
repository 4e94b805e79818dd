//! Network readiness gate.
//!
//! The external helper moves a veth endpoint into the container's network
//! namespace asynchronously. The child polls until the namespace holds more
//! than the loopback device, or gives up after a fixed timeout.
//!
//! Only the number of interfaces is checked. Two down interfaces with no
//! addresses still pass.

use std::thread;
use std::time::Instant;

use boxengine_common::config::NetworkWait;
use boxengine_common::error::{BoxError, Result};

/// Source of the current interface count.
pub trait InterfaceProbe {
    /// Returns how many network interfaces are visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the interfaces cannot be listed.
    fn interface_count(&self) -> Result<usize>;
}

/// Probe backed by `if_nameindex(3)` in the caller's network namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

#[cfg(target_os = "linux")]
impl InterfaceProbe for SystemInterfaces {
    fn interface_count(&self) -> Result<usize> {
        let interfaces = nix::net::if_::if_nameindex().map_err(|e| BoxError::Syscall {
            operation: "if_nameindex",
            message: e.to_string(),
        })?;
        Ok(interfaces.iter().count())
    }
}

/// Blocks until more than one interface exists or `wait.timeout` passes.
///
/// Checks immediately, then once per `wait.interval`. Returns the count
/// that satisfied the gate.
///
/// # Errors
///
/// Returns [`BoxError::NetworkTimeout`] on timeout, or the probe's error.
pub fn wait_for_network(probe: &dyn InterfaceProbe, wait: NetworkWait) -> Result<usize> {
    let started = Instant::now();
    loop {
        let count = probe.interface_count()?;
        if count > 1 {
            tracing::info!(interfaces = count, "network ready");
            return Ok(count);
        }

        if started.elapsed() > wait.timeout {
            return Err(BoxError::NetworkTimeout {
                waited: wait.timeout,
            });
        }

        tracing::debug!(interfaces = count, "waiting for network");
        thread::sleep(wait.interval);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;

    /// Reports loopback only until `ready_after` checks have happened.
    struct Scripted {
        checks: Cell<usize>,
        ready_after: Option<usize>,
    }

    impl Scripted {
        fn ready_after(n: usize) -> Self {
            Self {
                checks: Cell::new(0),
                ready_after: Some(n),
            }
        }

        fn never() -> Self {
            Self {
                checks: Cell::new(0),
                ready_after: None,
            }
        }
    }

    impl InterfaceProbe for Scripted {
        fn interface_count(&self) -> Result<usize> {
            let seen = self.checks.get();
            self.checks.set(seen + 1);
            match self.ready_after {
                Some(n) if seen >= n => Ok(2),
                _ => Ok(1),
            }
        }
    }

    struct Broken;

    impl InterfaceProbe for Broken {
        fn interface_count(&self) -> Result<usize> {
            Err(BoxError::Syscall {
                operation: "if_nameindex",
                message: "EIO".into(),
            })
        }
    }

    fn fast(timeout_ms: u64) -> NetworkWait {
        NetworkWait {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn ready_namespace_passes_without_sleeping() {
        let probe = Scripted::ready_after(0);
        assert_eq!(wait_for_network(&probe, fast(1_000)).unwrap(), 2);
        assert_eq!(probe.checks.get(), 1);
    }

    #[test]
    fn late_interface_is_seen_on_next_poll() {
        let probe = Scripted::ready_after(3);
        assert_eq!(wait_for_network(&probe, fast(1_000)).unwrap(), 2);
        assert_eq!(probe.checks.get(), 4);
    }

    #[test]
    fn loopback_only_times_out() {
        let probe = Scripted::never();
        let started = Instant::now();
        let err = wait_for_network(&probe, fast(50)).unwrap_err();
        assert!(matches!(err, BoxError::NetworkTimeout { .. }));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn probe_failure_aborts_immediately() {
        let err = wait_for_network(&Broken, fast(1_000)).unwrap_err();
        assert!(matches!(err, BoxError::Syscall { .. }));
    }

    #[test]
    fn default_policy_is_three_seconds_at_one_second_steps() {
        let wait = NetworkWait::default();
        assert_eq!(wait.timeout, Duration::from_secs(3));
        assert_eq!(wait.interval, Duration::from_secs(1));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn system_probe_sees_at_least_loopback() {
        assert!(SystemInterfaces.interface_count().unwrap() >= 1);
    }
}
