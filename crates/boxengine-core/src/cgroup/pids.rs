//! Process-count control via the `pids` controller.

use boxengine_common::config::CgroupLimits;
use boxengine_common::error::Result;

use super::CgroupManager;

/// Caps the number of tasks in the group.
///
/// # Errors
///
/// Returns an error if writing to `pids.max` fails.
pub fn apply(group: &CgroupManager, limits: &CgroupLimits) -> Result<()> {
    group.write("pids.max", &limits.pids_max.to_string())
}
