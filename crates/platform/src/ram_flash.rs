//! RAM-backed littlefs storage region.
//!
//! `RamFlash` mimics a small NOR flash: erased bytes read 0xFF, reads and
//! writes happen at flash-like granularity, and erases work on whole
//! blocks. It backs the demo volume and the host-side tests; a real board
//! substitutes its flash driver behind the same `littlefs2` storage trait.

use littlefs2::consts::{U8, U256};
use littlefs2::driver::Storage;
use littlefs2::io::{Error, Result};

use crate::volume::FlashPartition;

/// Value a fully erased flash byte reads back as.
const ERASED: u8 = 0xFF;

/// Partition label used when none is given.
pub const DEFAULT_LABEL: &str = "storage";

/// A `BYTES`-sized RAM region exposed as littlefs storage.
///
/// `BYTES` must be a multiple of the 256-byte block size.
pub struct RamFlash<const BYTES: usize> {
    buf: [u8; BYTES],
    label: &'static str,
}

impl<const BYTES: usize> RamFlash<BYTES> {
    /// Create an erased region with the default partition label.
    pub fn new() -> Self {
        Self::with_label(DEFAULT_LABEL)
    }

    /// Create an erased region advertising `label`.
    pub fn with_label(label: &'static str) -> Self {
        Self {
            buf: [ERASED; BYTES],
            label,
        }
    }
}

impl<const BYTES: usize> Default for RamFlash<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> Storage for RamFlash<BYTES> {
    const READ_SIZE: usize = 16;
    const WRITE_SIZE: usize = 256;
    const BLOCK_SIZE: usize = 256;
    const BLOCK_COUNT: usize = BYTES / 256;
    const BLOCK_CYCLES: isize = -1;

    type CACHE_SIZE = U256;
    type LOOKAHEAD_SIZE = U8;

    fn read(&mut self, off: usize, buf: &mut [u8]) -> Result<usize> {
        let end = off.checked_add(buf.len()).ok_or(Error::IO)?;
        let src = self.buf.get(off..end).ok_or(Error::IO)?;
        buf.copy_from_slice(src);
        Ok(buf.len())
    }

    fn write(&mut self, off: usize, data: &[u8]) -> Result<usize> {
        let end = off.checked_add(data.len()).ok_or(Error::IO)?;
        let dst = self.buf.get_mut(off..end).ok_or(Error::IO)?;
        dst.copy_from_slice(data);
        Ok(data.len())
    }

    fn erase(&mut self, off: usize, len: usize) -> Result<usize> {
        let end = off.checked_add(len).ok_or(Error::IO)?;
        let dst = self.buf.get_mut(off..end).ok_or(Error::IO)?;
        dst.fill(ERASED);
        Ok(len)
    }
}

impl<const BYTES: usize> FlashPartition for RamFlash<BYTES> {
    fn label(&self) -> &str {
        self.label
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fresh_region_reads_erased() {
        let mut flash: RamFlash<4096> = RamFlash::new();
        let mut buf = [0u8; 32];
        flash.read(256, &mut buf).unwrap();
        assert_eq!(buf, [ERASED; 32]);
    }

    #[test]
    fn write_then_read_roundtrips() {
        let mut flash: RamFlash<4096> = RamFlash::new();
        let data = [0xA5u8; 256];
        flash.write(512, &data).unwrap();
        let mut buf = [0u8; 256];
        flash.read(512, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn erase_restores_erased_state() {
        let mut flash: RamFlash<4096> = RamFlash::new();
        flash.write(0, &[0u8; 256]).unwrap();
        flash.erase(0, 256).unwrap();
        let mut buf = [0u8; 256];
        flash.read(0, &mut buf).unwrap();
        assert_eq!(buf, [ERASED; 256]);
    }

    #[test]
    fn out_of_bounds_access_is_an_io_error() {
        let mut flash: RamFlash<1024> = RamFlash::new();
        let mut buf = [0u8; 64];
        assert!(flash.read(1024, &mut buf).is_err());
        assert!(flash.write(1000, &[0u8; 64]).is_err());
    }

    #[test]
    fn label_defaults_to_storage() {
        let flash: RamFlash<1024> = RamFlash::new();
        assert_eq!(flash.label(), DEFAULT_LABEL);
        let named: RamFlash<1024> = RamFlash::with_label("logs");
        assert_eq!(named.label(), "logs");
    }
}
