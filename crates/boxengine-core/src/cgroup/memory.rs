//! Memory resource control via the `memory` controller.
//!
//! Manages `memory.limit_in_bytes` and `memory.swappiness`.

use boxengine_common::config::CgroupLimits;
use boxengine_common::error::Result;

use super::CgroupManager;

/// Sets the hard memory ceiling and disables swapping for the group.
///
/// # Errors
///
/// Returns an error if writing either control file fails.
pub fn apply(group: &CgroupManager, limits: &CgroupLimits) -> Result<()> {
    group.write(
        "memory.limit_in_bytes",
        &format_limit(limits.memory_limit_bytes),
    )?;
    group.write("memory.swappiness", &limits.memory_swappiness.to_string())
}

/// Renders a byte count with the largest suffix the kernel accepts that
/// divides it exactly (e.g. `5M` for 5 MiB).
#[must_use]
pub fn format_limit(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    match bytes {
        0 => "0".into(),
        b if b % GIB == 0 => format!("{}G", b / GIB),
        b if b % MIB == 0 => format!("{}M", b / MIB),
        b if b % KIB == 0 => format!("{}K", b / KIB),
        b => b.to_string(),
    }
}
