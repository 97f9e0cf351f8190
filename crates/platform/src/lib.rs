//! Storage abstraction layer for the flash-soak demo
//!
//! This crate provides the seam between the demo driver and the flash
//! filesystem backend, enabling development and testing without physical
//! hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Driver Logic (soak crate)
//!         ↓
//! Storage Seam (this crate - Volume trait)
//!         ↓
//! Flash Filesystem (littlefs2) + storage region
//! ```
//!
//! # Contents
//!
//! - [`Volume`] - mounted-volume operations (space accounting, repair,
//!   create/append, unmount)
//! - [`FlashVolume`] - [`Volume`] backed by littlefs2
//! - [`FlashPartition`] - a littlefs storage region with a partition label
//! - [`RamFlash`] - RAM-backed storage region (demo backing store and
//!   test fixture)
//! - [`MountConfig`] / [`SpaceReport`] - configuration and space accounting
//!   data types
//! - [`mocks`] - scripted [`Volume`] implementation for tests (std only)
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing and host demos)
//! - `defmt`: Enable defmt::Format derives on all platform types
//! - `c-stubs`: littlefs libc shims for bare-metal linking

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod ram_flash;
pub mod volume;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the main types at the crate root
pub use config::{MountConfig, SpaceReport};
pub use error::{MountError, VolumeError};
pub use ram_flash::RamFlash;
pub use volume::{FlashPartition, FlashVolume, Volume};
