//! Mock implementations for testing
//!
//! This module provides a scripted [`Volume`](crate::Volume) for driver
//! tests: fixed capacity, derived usage, injectable failures, and an
//! operation log for asserting call ordering.

#![cfg(any(test, feature = "std"))]

use crate::config::SpaceReport;
use crate::error::VolumeError;
use crate::volume::Volume;

/// One recorded [`Volume`](crate::Volume) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    /// `space()` was called.
    Space,
    /// `check()` was called.
    Check,
    /// `format()` was called.
    Format,
    /// `exists()` was called.
    Exists,
    /// `create()` was called.
    Create,
    /// `append()` was called.
    Append,
    /// `unmount()` was called.
    Unmount,
}

/// Scripted in-memory volume.
///
/// Space reports derive from the fixed total and the bytes appended so
/// far, unless overrides were queued with
/// [`push_space_report`](MockVolume::push_space_report) (consumed first,
/// in order — used to simulate corrupt `used > total` reports). Failures
/// injected with the `fail_next_*` methods fire once on the next matching
/// call.
pub struct MockVolume {
    total: u64,
    base_used: u64,
    files: heapless::Vec<(heapless::String<32>, u64), 8>,
    space_overrides: heapless::Deque<SpaceReport, 4>,
    fail_space: Option<VolumeError>,
    fail_check: Option<VolumeError>,
    fail_create: Option<VolumeError>,
    fail_append: Option<VolumeError>,
    ops: heapless::Vec<MockOp, 256>,
    unmounted: bool,
}

impl MockVolume {
    /// Create an empty volume with `total` bytes of capacity.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            base_used: 0,
            files: heapless::Vec::new(),
            space_overrides: heapless::Deque::new(),
            fail_space: None,
            fail_check: None,
            fail_create: None,
            fail_append: None,
            ops: heapless::Vec::new(),
            unmounted: false,
        }
    }

    /// Account `bytes` as used before any file content.
    pub fn with_used(mut self, bytes: u64) -> Self {
        self.base_used = bytes;
        self
    }

    /// Pre-populate `name` with `size` bytes of content.
    pub fn with_file(mut self, name: &str, size: u64) -> Self {
        if let Ok(name) = Self::file_name(name) {
            let _ = self.files.push((name, size));
        }
        self
    }

    fn file_name(name: &str) -> Result<heapless::String<32>, VolumeError> {
        let mut owned = heapless::String::new();
        owned
            .push_str(name)
            .map_err(|_| VolumeError::NameTooLong)?;
        Ok(owned)
    }

    /// Queue a space report returned ahead of the derived one.
    pub fn push_space_report(&mut self, report: SpaceReport) {
        let _ = self.space_overrides.push_back(report);
    }

    /// Fail the next `space()` call with `err`.
    pub fn fail_next_space(&mut self, err: VolumeError) {
        self.fail_space = Some(err);
    }

    /// Fail the next `check()` call with `err`.
    pub fn fail_next_check(&mut self, err: VolumeError) {
        self.fail_check = Some(err);
    }

    /// Fail the next `create()` call with `err`.
    pub fn fail_next_create(&mut self, err: VolumeError) {
        self.fail_create = Some(err);
    }

    /// Fail the next `append()` call with `err`.
    pub fn fail_next_append(&mut self, err: VolumeError) {
        self.fail_append = Some(err);
    }

    /// Every call recorded so far, in order.
    pub fn ops(&self) -> &[MockOp] {
        &self.ops
    }

    /// How many times `op` was called.
    pub fn count(&self, op: MockOp) -> usize {
        self.ops.iter().filter(|&&o| o == op).count()
    }

    /// Whether `unmount()` was called.
    pub fn unmounted(&self) -> bool {
        self.unmounted
    }

    /// Content size of `name`, if it exists.
    pub fn file_size(&self, name: &str) -> Option<u64> {
        self.files
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, size)| *size)
    }

    fn used(&self) -> u64 {
        self.files
            .iter()
            .fold(self.base_used, |acc, (_, size)| acc.saturating_add(*size))
    }

    fn record(&mut self, op: MockOp) {
        let _ = self.ops.push(op);
    }
}

impl Volume for MockVolume {
    fn space(&mut self) -> Result<SpaceReport, VolumeError> {
        self.record(MockOp::Space);
        if let Some(err) = self.fail_space.take() {
            return Err(err);
        }
        if let Some(report) = self.space_overrides.pop_front() {
            return Ok(report);
        }
        Ok(SpaceReport::new(self.total, self.used()))
    }

    fn check(&mut self) -> Result<(), VolumeError> {
        self.record(MockOp::Check);
        if let Some(err) = self.fail_check.take() {
            return Err(err);
        }
        // a successful repair discards the corrupt reports
        self.space_overrides.clear();
        Ok(())
    }

    fn format(&mut self) -> Result<(), VolumeError> {
        self.record(MockOp::Format);
        self.files.clear();
        self.base_used = 0;
        Ok(())
    }

    fn exists(&mut self, name: &str) -> Result<bool, VolumeError> {
        self.record(MockOp::Exists);
        Ok(self.files.iter().any(|(n, _)| n.as_str() == name))
    }

    fn create(&mut self, name: &str) -> Result<(), VolumeError> {
        self.record(MockOp::Create);
        if let Some(err) = self.fail_create.take() {
            return Err(err);
        }
        let name = Self::file_name(name)?;
        self.files
            .push((name, 0))
            .map_err(|_| VolumeError::NoMemory)?;
        Ok(())
    }

    fn append(&mut self, name: &str, data: &[u8]) -> Result<usize, VolumeError> {
        self.record(MockOp::Append);
        if let Some(err) = self.fail_append.take() {
            return Err(err);
        }
        let entry = self
            .files
            .iter_mut()
            .find(|(n, _)| n.as_str() == name)
            .ok_or(VolumeError::NotFound)?;
        entry.1 = entry.1.saturating_add(data.len() as u64);
        Ok(data.len())
    }

    fn unmount(&mut self) -> Result<(), VolumeError> {
        self.record(MockOp::Unmount);
        self.unmounted = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn derived_space_tracks_appends() {
        let mut volume = MockVolume::new(4096);
        volume.create("a.log").unwrap();
        volume.append("a.log", &[0u8; 100]).unwrap();
        let space = volume.space().unwrap();
        assert_eq!(space.total, 4096);
        assert_eq!(space.used, 100);
    }

    #[test]
    fn overrides_are_consumed_in_order() {
        let mut volume = MockVolume::new(4096);
        volume.push_space_report(SpaceReport::new(4096, 5000));
        assert_eq!(volume.space().unwrap(), SpaceReport::new(4096, 5000));
        assert_eq!(volume.space().unwrap(), SpaceReport::new(4096, 0));
    }

    #[test]
    fn injected_failures_fire_once() {
        let mut volume = MockVolume::new(4096);
        volume.fail_next_space(VolumeError::Io);
        assert_eq!(volume.space().unwrap_err(), VolumeError::Io);
        assert!(volume.space().is_ok());
    }

    #[test]
    fn op_log_records_ordering() {
        let mut volume = MockVolume::new(4096);
        volume.space().unwrap();
        volume.create("a.log").unwrap();
        volume.unmount().unwrap();
        assert_eq!(
            volume.ops(),
            &[MockOp::Space, MockOp::Create, MockOp::Unmount]
        );
        assert!(volume.unmounted());
    }
}
