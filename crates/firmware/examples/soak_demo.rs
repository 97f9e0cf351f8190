//! Host soak demo over a RAM-backed littlefs volume.
//!
//! Runs the exact sequence the firmware runs on-device, with tracing
//! instead of defmt. Run with:
//!
//! ```bash
//! cargo run -p firmware --example soak_demo --features std
//! ```

use std::process::ExitCode;

use platform::{FlashVolume, RamFlash};
use soak::SoakEvent;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let mut storage: RamFlash<{ firmware::SOAK_FLASH_BYTES }> = RamFlash::new();
    let config = firmware::demo_config();

    tracing::info!(
        base = config.mount.base_path,
        file = config.file_name,
        "initializing volume"
    );

    let result = soak::run(
        &config,
        |mount| FlashVolume::mount(*mount, &mut storage),
        log_event,
    );

    match result {
        Ok(report) => {
            tracing::info!(
                lines = report.lines_appended,
                free = report.final_space.free(),
                created = report.created,
                "soak complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("soak failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn log_event(event: SoakEvent) {
    match event {
        SoakEvent::Mounted => tracing::info!("volume mounted"),
        SoakEvent::Space(report) => {
            tracing::info!(total = report.total, used = report.used, "partition size");
        }
        SoakEvent::ConsistencyRestored => tracing::info!("consistency check successful"),
        SoakEvent::Reformatted { ok } => tracing::warn!(ok, "volume reformatted"),
        SoakEvent::FileCreated => tracing::info!("new log file created"),
        SoakEvent::FileReused => tracing::info!("using existing log file"),
        SoakEvent::Appended { bytes } => tracing::debug!(bytes, "appended log line"),
        SoakEvent::Unmounted => tracing::info!("volume unmounted"),
    }
}
