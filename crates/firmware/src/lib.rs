//! flash-soak firmware
//!
//! Demo application that exercises a flash volume until free space runs
//! low: mount (formatting on first use), query space, repair if the
//! report is inconsistent, open or create a log file, append fixed log
//! lines while space remains, unmount.
//!
//! # Architecture
//!
//! ```text
//! Application Layer (main.rs, examples/soak_demo.rs)
//!         ↓
//! Driver Logic (soak crate)
//!         ↓
//! Storage Seam (platform crate)
//!         ↓
//! Flash Filesystem (littlefs2) over a RAM-backed region
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32H7 target (Embassy, defmt)
//! - `std` - Enable the standard library (host demo and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Host Demo
//!
//! ```bash
//! cargo run -p firmware --example soak_demo --features std
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]

use soak::SoakConfig;

/// Firmware version (synchronized with Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capacity of the RAM-backed demo flash region. Must be a multiple of
/// the 256-byte block size.
pub const SOAK_FLASH_BYTES: usize = 16 * 1024;

/// The soak configuration this device runs with. There is no runtime
/// configuration surface; everything is fixed at build time.
pub const fn demo_config() -> SoakConfig {
    SoakConfig::new()
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn demo_config_matches_the_documented_defaults() {
        let config = demo_config();
        assert_eq!(config.file_name, "soak.log");
        assert_eq!(config.low_space_threshold, 1000);
        assert_eq!(config.mount.base_path, "/soak");
        assert!(config.mount.format_on_mount_failure);
    }

    #[test]
    fn flash_region_is_block_aligned() {
        assert_eq!(SOAK_FLASH_BYTES % 256, 0);
    }
}
