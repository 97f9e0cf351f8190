//! flash-soak firmware - hardware entry point
//!
//! Hardware-only entry point for STM32H743ZI. Runs the soak sequence once
//! over a RAM-backed littlefs volume, narrates every step over defmt/RTT,
//! then idles with a heartbeat.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use platform::{FlashVolume, RamFlash};
use soak::SoakEvent;
use static_cell::StaticCell;

use defmt_rtt as _;
// Panic handler
use panic_probe as _;

/// The demo storage region lives for the whole process; littlefs borrows
/// it for the duration of the run.
static SOAK_FLASH: StaticCell<RamFlash<{ firmware::SOAK_FLASH_BYTES }>> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    defmt::info!("flash-soak firmware v{=str}", firmware::VERSION);

    let _p = embassy_stm32::init(Default::default());

    let storage = SOAK_FLASH.init(RamFlash::new());
    let config = firmware::demo_config();

    defmt::info!(
        "initializing volume: base={=str} max_files={=usize} format_on_failure={=bool}",
        config.mount.base_path,
        config.mount.max_open_files,
        config.mount.format_on_mount_failure
    );

    let result = soak::run(
        &config,
        |mount| FlashVolume::mount(*mount, storage),
        log_event,
    );

    match result {
        Ok(report) => defmt::info!(
            "soak complete: {=u32} lines appended, {=u64} bytes free",
            report.lines_appended,
            report.final_space.free()
        ),
        Err(err) => defmt::error!("soak failed: {}", err),
    }

    // Keep the image alive so RTT output stays readable on the probe.
    let mut tick = 0u32;
    loop {
        Timer::after(Duration::from_secs(1)).await;
        tick = tick.wrapping_add(1);
        defmt::debug!("heartbeat tick={=u32}", tick);
    }
}

fn log_event(event: SoakEvent) {
    match event {
        SoakEvent::Mounted => defmt::info!("volume mounted"),
        SoakEvent::Space(report) => defmt::info!(
            "partition size: total={=u64} used={=u64}",
            report.total,
            report.used
        ),
        SoakEvent::ConsistencyRestored => defmt::info!("consistency check successful"),
        SoakEvent::Reformatted { ok } => defmt::warn!("volume reformatted, ok={=bool}", ok),
        SoakEvent::FileCreated => defmt::info!("new log file created"),
        SoakEvent::FileReused => defmt::info!("using existing log file"),
        SoakEvent::Appended { bytes } => defmt::debug!("appended {=usize} bytes", bytes),
        SoakEvent::Unmounted => defmt::info!("volume unmounted"),
    }
}
