//! Mount configuration and space accounting types.
//!
//! [`MountConfig`] is built once at startup and stays immutable for the
//! process lifetime. [`SpaceReport`] is a point-in-time snapshot; callers
//! re-query after every mutation instead of caching one.

/// Configuration for mounting a flash volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MountConfig {
    /// Directory inside the volume under which the demo operates.
    /// Created on mount if absent. Must start with `/` and must not end
    /// with one.
    pub base_path: &'static str,
    /// Partition label the storage region must advertise. `None` accepts
    /// any region.
    pub partition_label: Option<&'static str>,
    /// Upper bound on concurrently open files. Must be at least 1; the
    /// backend keeps every file closure-scoped, so this is otherwise
    /// advisory.
    pub max_open_files: usize,
    /// Format the volume and retry once when the initial mount fails.
    pub format_on_mount_failure: bool,
}

impl MountConfig {
    /// Default mount configuration used by the demo.
    pub const fn new() -> Self {
        Self {
            base_path: "/soak",
            partition_label: None,
            max_open_files: 5,
            format_on_mount_failure: true,
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Total and used capacity of a mounted volume, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpaceReport {
    /// Total capacity of the volume.
    pub total: u64,
    /// Bytes currently accounted as used.
    pub used: u64,
}

impl SpaceReport {
    /// Create a report from raw byte counts.
    pub const fn new(total: u64, used: u64) -> Self {
        Self { total, used }
    }

    /// Remaining free space.
    ///
    /// Saturating: a report with `used > total` signals filesystem
    /// corruption (the caller routes that to a consistency check) and
    /// reads as zero free bytes here.
    pub const fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_demo_values() {
        let config = MountConfig::new();
        assert_eq!(config.base_path, "/soak");
        assert_eq!(config.partition_label, None);
        assert_eq!(config.max_open_files, 5);
        assert!(config.format_on_mount_failure);
    }

    #[test]
    fn free_space_is_total_minus_used() {
        let report = SpaceReport::new(4096, 1000);
        assert_eq!(report.free(), 3096);
    }

    #[test]
    fn free_space_saturates_on_corrupt_report() {
        let report = SpaceReport::new(4096, 5000);
        assert_eq!(report.free(), 0);
    }
}
