//! CPU resource control via the `cpu` controller.
//!
//! Manages CFS bandwidth through `cpu.cfs_period_us` and
//! `cpu.cfs_quota_us`.

use boxengine_common::config::CgroupLimits;
use boxengine_common::error::Result;

use super::CgroupManager;

/// Sets the CFS accounting period and the quota allowed per period.
///
/// The period is written first; the kernel validates the quota against it.
///
/// # Errors
///
/// Returns an error if writing either control file fails.
pub fn apply(group: &CgroupManager, limits: &CgroupLimits) -> Result<()> {
    group.write("cpu.cfs_period_us", &limits.cpu_period_us.to_string())?;
    group.write("cpu.cfs_quota_us", &limits.cpu_quota_us.to_string())?;
    tracing::debug!(
        quota_us = limits.cpu_quota_us,
        period_us = limits.cpu_period_us,
        "CPU bandwidth set"
    );
    Ok(())
}
