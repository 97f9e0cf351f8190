//! End-to-end soak runs over a littlefs volume backed by RAM flash.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use platform::{FlashVolume, RamFlash, Volume};
use soak::{run, SoakConfig, SoakEvent};

/// littlefs needs a few spare blocks for copy-on-write updates near the
/// end of the volume, so these runs stop earlier than the 1000-byte demo
/// default.
fn test_config() -> SoakConfig {
    SoakConfig {
        low_space_threshold: 2048,
        ..SoakConfig::new()
    }
}

#[test]
fn fill_ram_volume_until_space_runs_low() {
    let mut storage: RamFlash<16384> = RamFlash::new();
    let config = test_config();

    let mut events = Vec::new();
    let report = run(
        &config,
        |mount| FlashVolume::mount(*mount, &mut storage),
        |event| events.push(event),
    )
    .unwrap();

    assert!(report.created);
    assert!(report.lines_appended > 0);
    assert!(report.final_space.free() <= config.low_space_threshold);

    let appended = events
        .iter()
        .filter(|e| matches!(e, SoakEvent::Appended { .. }))
        .count();
    assert_eq!(appended as u32, report.lines_appended);
    assert_eq!(events.first(), Some(&SoakEvent::Mounted));
    assert_eq!(events.last(), Some(&SoakEvent::Unmounted));

    // the appended data must survive a remount
    let mut volume = FlashVolume::mount(config.mount, &mut storage).unwrap();
    assert!(volume.exists(config.file_name).unwrap());
    let space = volume.space().unwrap();
    assert!(space.free() <= config.low_space_threshold);
}

#[test]
fn second_run_reuses_the_file_and_appends_nothing() {
    let mut storage: RamFlash<16384> = RamFlash::new();
    let config = test_config();

    let first = run(
        &config,
        |mount| FlashVolume::mount(*mount, &mut storage),
        |_| {},
    )
    .unwrap();
    assert!(first.created);
    assert!(first.lines_appended > 0);

    let mut events = Vec::new();
    let second = run(
        &config,
        |mount| FlashVolume::mount(*mount, &mut storage),
        |event| events.push(event),
    )
    .unwrap();

    assert!(!second.created);
    assert_eq!(second.lines_appended, 0);
    assert!(events.contains(&SoakEvent::FileReused));
}
