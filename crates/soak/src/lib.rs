//! Flash-volume soak demo driver — mount, repair, fill with log lines, unmount
//!
//! Pure, allocation-free driver logic over the `platform::Volume` seam.
//! It does not touch hardware or perform logging; binaries supply the
//! backend through a mount closure and narrate progress from the emitted
//! [`SoakEvent`]s. This separation makes the whole sequence trivially
//! testable on the host.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod driver;

pub use config::{SoakConfig, LOG_LINE};
pub use driver::{run, SoakError, SoakEvent, SoakReport};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use platform::mocks::{MockOp, MockVolume};
    use platform::{MountError, SpaceReport, VolumeError};

    use crate::config::{SoakConfig, LOG_LINE};
    use crate::driver::{run, SoakError, SoakEvent};

    fn config() -> SoakConfig {
        SoakConfig::new()
    }

    #[test]
    fn fills_until_free_space_reaches_threshold() {
        let mut volume = MockVolume::new(4096);
        let mut events = Vec::new();
        let report = run(&config(), |_| Ok(&mut volume), |e| events.push(e)).unwrap();

        let line = LOG_LINE.len() as u64;
        let expected = (4096u64 - 1000).div_ceil(line);
        assert_eq!(u64::from(report.lines_appended), expected);
        assert!(report.created);
        assert!(report.final_space.free() <= 1000);

        assert_eq!(volume.file_size("soak.log"), Some(expected * line));
        assert!(volume.unmounted());

        assert_eq!(events.first(), Some(&SoakEvent::Mounted));
        assert_eq!(events.last(), Some(&SoakEvent::Unmounted));
        let appended = events
            .iter()
            .filter(|e| matches!(e, SoakEvent::Appended { .. }))
            .count();
        assert_eq!(appended as u64, expected);
    }

    #[test]
    fn reuses_an_existing_file() {
        let mut volume = MockVolume::new(4096).with_file("soak.log", 0);
        let mut events = Vec::new();
        let report = run(&config(), |_| Ok(&mut volume), |e| events.push(e)).unwrap();

        assert!(!report.created);
        assert!(events.contains(&SoakEvent::FileReused));
        assert_eq!(volume.count(MockOp::Create), 0);
    }

    #[test]
    fn corrupt_space_report_triggers_one_check_before_any_file_op() {
        let mut volume = MockVolume::new(4096);
        volume.push_space_report(SpaceReport::new(4096, 5000));
        let mut events = Vec::new();
        let report = run(&config(), |_| Ok(&mut volume), |e| events.push(e)).unwrap();

        // the corrupt report reads as zero free space, so no appends happen
        assert_eq!(report.lines_appended, 0);
        assert!(events.contains(&SoakEvent::ConsistencyRestored));
        assert_eq!(
            volume.ops(),
            &[
                MockOp::Space,
                MockOp::Check,
                MockOp::Exists,
                MockOp::Create,
                MockOp::Unmount,
            ]
        );
    }

    #[test]
    fn failed_repair_is_fatal_but_still_unmounts() {
        let mut volume = MockVolume::new(4096);
        volume.push_space_report(SpaceReport::new(4096, 5000));
        volume.fail_next_check(VolumeError::Corrupt);
        let err = run(&config(), |_| Ok(&mut volume), |_| {}).unwrap_err();

        assert_eq!(err, SoakError::Check(VolumeError::Corrupt));
        assert_eq!(
            volume.ops(),
            &[MockOp::Space, MockOp::Check, MockOp::Unmount]
        );
        assert!(volume.unmounted());
    }

    #[test]
    fn mount_failure_is_fatal_and_touches_nothing() {
        let mut events = Vec::new();
        let err = run::<&mut MockVolume, _, _>(
            &config(),
            |_| Err(MountError::PartitionNotFound),
            |e| events.push(e),
        )
        .unwrap_err();

        assert_eq!(err, SoakError::Mount(MountError::PartitionNotFound));
        assert!(events.is_empty());
    }

    #[test]
    fn space_query_failure_formats_once_then_aborts() {
        let mut volume = MockVolume::new(4096);
        volume.fail_next_space(VolumeError::Io);
        let mut events = Vec::new();
        let err = run(&config(), |_| Ok(&mut volume), |e| events.push(e)).unwrap_err();

        assert_eq!(err, SoakError::SpaceQuery(VolumeError::Io));
        assert_eq!(volume.count(MockOp::Format), 1);
        assert!(volume.unmounted());
        assert!(events.contains(&SoakEvent::Reformatted { ok: true }));
    }

    #[test]
    fn append_failure_is_fatal_not_a_busy_loop() {
        let mut volume = MockVolume::new(4096);
        volume.fail_next_append(VolumeError::NotFound);
        let err = run(&config(), |_| Ok(&mut volume), |_| {}).unwrap_err();

        assert_eq!(err, SoakError::Append(VolumeError::NotFound));
        assert_eq!(volume.count(MockOp::Append), 1);
        assert!(volume.unmounted());
    }

    #[test]
    fn no_appends_when_free_space_is_already_low() {
        let mut volume = MockVolume::new(4096).with_used(3200);
        let mut events = Vec::new();
        let report = run(&config(), |_| Ok(&mut volume), |e| events.push(e)).unwrap();

        assert_eq!(report.lines_appended, 0);
        assert!(report.created);
        assert_eq!(
            events,
            vec![
                SoakEvent::Mounted,
                SoakEvent::Space(SpaceReport::new(4096, 3200)),
                SoakEvent::FileCreated,
                SoakEvent::Unmounted,
            ]
        );
    }

    #[test]
    fn threshold_comparison_is_strict() {
        // free space exactly at the threshold: the loop must not run
        let mut volume = MockVolume::new(2000).with_used(1000);
        let report = run(&config(), |_| Ok(&mut volume), |_| {}).unwrap();
        assert_eq!(report.lines_appended, 0);
    }

    #[test]
    fn create_failure_is_fatal() {
        let mut volume = MockVolume::new(4096);
        volume.fail_next_create(VolumeError::Full);
        let err = run(&config(), |_| Ok(&mut volume), |_| {}).unwrap_err();

        assert_eq!(err, SoakError::Create(VolumeError::Full));
        assert!(volume.unmounted());
        assert_eq!(volume.count(MockOp::Append), 0);
    }
}
