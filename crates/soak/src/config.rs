//! Demo configuration.
//!
//! Everything the driver needs is passed in through [`SoakConfig`];
//! there is no global state. Defaults: at most five open files, any
//! partition label, format on first mount, and a 1000-byte low-space
//! threshold.

use platform::MountConfig;

/// The fixed line appended on every loop iteration.
pub const LOG_LINE: &[u8] = b"flash-soak fill line: appends must land while free space remains\n";

/// Configuration for one soak run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoakConfig {
    /// How the volume is mounted.
    pub mount: MountConfig,
    /// Log file name, relative to the mount's base path.
    pub file_name: &'static str,
    /// The append loop stops once free space is at or below this many
    /// bytes.
    pub low_space_threshold: u64,
}

impl SoakConfig {
    /// The demo defaults.
    pub const fn new() -> Self {
        Self {
            mount: MountConfig::new(),
            file_name: "soak.log",
            low_space_threshold: 1000,
        }
    }
}

impl Default for SoakConfig {
    fn default() -> Self {
        Self::new()
    }
}
