//! The storage seam: mounted-volume operations over a flash filesystem.
//!
//! [`Volume`] is the trait the demo driver runs against; [`FlashVolume`]
//! implements it on top of littlefs2. Mounting classifies failures and
//! honors the format-on-mount-failure flag; afterwards every operation is
//! whole (create, append) so no file handle ever escapes the backend —
//! littlefs requires files to be closed before their state goes out of
//! scope, and the closure-scoped API guarantees exactly that.
//!
//! `FlashVolume` owns the filesystem allocation and borrows the storage
//! region for its lifetime. Each operation mounts a short-lived
//! `Filesystem` view over those; littlefs keeps no host state between
//! operations, so this is equivalent to holding the mount open while also
//! leaving a sound `&mut` path to the raw storage for `format`.

use littlefs2::consts::PATH_MAX;
use littlefs2::driver::Storage;
use littlefs2::fs::{Allocation, DirEntry, Filesystem};
use littlefs2::io::{Error as FsError, Read as _, Seek as _, SeekFrom, Write as _};
use littlefs2::path::{Path, PathBuf};

use crate::config::{MountConfig, SpaceReport};
use crate::error::{MountError, VolumeError};

/// Deepest directory nesting the consistency walk will follow.
const MAX_WALK_DEPTH: usize = 8;

/// A littlefs storage region that advertises a partition label.
///
/// Mounting matches the label in [`MountConfig`] against this; a mismatch
/// is reported as [`MountError::PartitionNotFound`] without touching the
/// region.
pub trait FlashPartition: Storage {
    /// Label of the partition backing this region.
    fn label(&self) -> &str;
}

/// Operations on a mounted volume.
///
/// Implementations report failures through the closed [`VolumeError`]
/// enumeration. File arguments are names relative to the configured base
/// path.
pub trait Volume {
    /// Query total and used capacity.
    fn space(&mut self) -> Result<SpaceReport, VolumeError>;

    /// Run a consistency/repair pass over the whole volume.
    fn check(&mut self) -> Result<(), VolumeError>;

    /// Re-create an empty filesystem on the volume.
    fn format(&mut self) -> Result<(), VolumeError>;

    /// Whether `name` exists, probed via a metadata query.
    fn exists(&mut self, name: &str) -> Result<bool, VolumeError>;

    /// Create `name` as an empty file (open for write, close immediately).
    fn create(&mut self, name: &str) -> Result<(), VolumeError>;

    /// Append `data` to `name`: open for update, seek to the end, write,
    /// close. Returns the number of bytes appended.
    fn append(&mut self, name: &str, data: &[u8]) -> Result<usize, VolumeError>;

    /// Release the volume. The value is expected to be dropped afterwards.
    fn unmount(&mut self) -> Result<(), VolumeError>;
}

impl<V: Volume> Volume for &mut V {
    fn space(&mut self) -> Result<SpaceReport, VolumeError> {
        (**self).space()
    }

    fn check(&mut self) -> Result<(), VolumeError> {
        (**self).check()
    }

    fn format(&mut self) -> Result<(), VolumeError> {
        (**self).format()
    }

    fn exists(&mut self, name: &str) -> Result<bool, VolumeError> {
        (**self).exists(name)
    }

    fn create(&mut self, name: &str) -> Result<(), VolumeError> {
        (**self).create(name)
    }

    fn append(&mut self, name: &str, data: &[u8]) -> Result<usize, VolumeError> {
        (**self).append(name, data)
    }

    fn unmount(&mut self) -> Result<(), VolumeError> {
        (**self).unmount()
    }
}

/// One level of the consistency walk: a directory and the index of the
/// next entry to visit inside it.
struct DirCursor {
    path: PathBuf,
    idx: usize,
}

/// A littlefs2-backed [`Volume`] over a labeled storage region.
pub struct FlashVolume<'s, S: FlashPartition> {
    storage: &'s mut S,
    alloc: Allocation<S>,
    config: MountConfig,
}

impl<'s, S: FlashPartition> FlashVolume<'s, S> {
    /// Mount `storage` according to `config`.
    ///
    /// Classification on failure:
    /// - label mismatch → [`MountError::PartitionNotFound`]
    /// - rejected configuration → [`MountError::InvalidConfig`]
    /// - unmountable and formatting disabled (or the post-format retry
    ///   failed) → [`MountError::MountFailed`]
    /// - formatting itself failed → [`MountError::FormatFailed`]
    pub fn mount(config: MountConfig, storage: &'s mut S) -> Result<Self, MountError> {
        if config.max_open_files == 0 {
            return Err(MountError::InvalidConfig);
        }
        if let Some(wanted) = config.partition_label {
            if wanted != storage.label() {
                return Err(MountError::PartitionNotFound);
            }
        }

        let mut alloc = Filesystem::allocate();
        if let Err(err) = Filesystem::mount(&mut alloc, &mut *storage).map(|_| ()) {
            if !config.format_on_mount_failure {
                return Err(MountError::MountFailed(err.into()));
            }
            Filesystem::format(&mut *storage)
                .map_err(|e| MountError::FormatFailed(e.into()))?;
            Filesystem::mount(&mut alloc, &mut *storage)
                .map(|_| ())
                .map_err(|e| MountError::MountFailed(e.into()))?;
        }

        let mut volume = Self {
            storage,
            alloc,
            config,
        };
        volume
            .ensure_base_dir()
            .map_err(MountError::MountFailed)?;
        Ok(volume)
    }

    /// The configuration this volume was mounted with.
    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    fn with_fs<R>(
        &mut self,
        f: impl FnOnce(&Filesystem<'_, S>) -> Result<R, FsError>,
    ) -> Result<R, VolumeError> {
        let fs = Filesystem::mount(&mut self.alloc, &mut *self.storage)?;
        f(&fs).map_err(VolumeError::from)
    }

    fn ensure_base_dir(&mut self) -> Result<(), VolumeError> {
        let base = PathBuf::from(self.config.base_path);
        self.with_fs(|fs| fs.create_dir_all(&base))
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, VolumeError> {
        use core::fmt::Write as _;

        let mut full: heapless::String<PATH_MAX> = heapless::String::new();
        write!(&mut full, "{}/{}", self.config.base_path, name)
            .map_err(|_| VolumeError::NameTooLong)?;
        Ok(PathBuf::from(full.as_str()))
    }

    /// Entry number `off` of `dir`, not counting the `.` and `..` entries
    /// littlefs lists first. Each call re-lists the directory so no
    /// directory handle stays open across other filesystem operations.
    fn next_entry(&mut self, dir: &Path, off: usize) -> Result<Option<DirEntry>, VolumeError> {
        let target = off.saturating_add(2);
        self.with_fs(|fs| {
            fs.read_dir_and_then(dir, |entries| {
                for (idx, entry) in entries.enumerate() {
                    let entry = entry?;
                    if idx == target {
                        return Ok(Some(entry));
                    }
                }
                Ok(None)
            })
        })
    }

    /// Read `path` through to EOF, forcing littlefs to validate every
    /// metadata and data block backing it.
    fn read_to_end(&mut self, path: &Path) -> Result<(), VolumeError> {
        self.with_fs(|fs| {
            fs.open_file_and_then(path, |file| {
                let mut buf = [0u8; 64];
                loop {
                    let read = file.read(&mut buf)?;
                    if read == 0 {
                        return Ok(());
                    }
                }
            })
        })
    }
}

impl<S: FlashPartition> Volume for FlashVolume<'_, S> {
    fn space(&mut self) -> Result<SpaceReport, VolumeError> {
        self.with_fs(|fs| {
            let total = fs.total_space();
            let available = fs.available_space()?;
            Ok(SpaceReport::new(
                total as u64,
                total.saturating_sub(available) as u64,
            ))
        })
    }

    fn check(&mut self) -> Result<(), VolumeError> {
        let mut stack: heapless::Vec<DirCursor, MAX_WALK_DEPTH> = heapless::Vec::new();
        stack
            .push(DirCursor {
                path: PathBuf::from("/"),
                idx: 0,
            })
            .map_err(|_| VolumeError::NoMemory)?;

        while let Some(mut current) = stack.pop() {
            let Some(entry) = self.next_entry(&current.path, current.idx)? else {
                // directory exhausted; its subtree is done
                continue;
            };
            current.idx = current.idx.saturating_add(1);

            let entry_path = PathBuf::from(entry.path());
            let is_dir = entry.file_type().is_dir();
            stack.push(current).map_err(|_| VolumeError::NoMemory)?;

            if is_dir {
                stack
                    .push(DirCursor {
                        path: entry_path,
                        idx: 0,
                    })
                    .map_err(|_| VolumeError::NoMemory)?;
            } else {
                self.read_to_end(&entry_path)?;
            }
        }
        Ok(())
    }

    fn format(&mut self) -> Result<(), VolumeError> {
        Filesystem::format(&mut *self.storage).map_err(VolumeError::from)?;
        self.ensure_base_dir()
    }

    fn exists(&mut self, name: &str) -> Result<bool, VolumeError> {
        let path = self.entry_path(name)?;
        self.with_fs(|fs| match fs.metadata(&path) {
            Ok(_) => Ok(true),
            Err(err) if err == FsError::NO_SUCH_ENTRY => Ok(false),
            Err(err) => Err(err),
        })
    }

    fn create(&mut self, name: &str) -> Result<(), VolumeError> {
        let path = self.entry_path(name)?;
        self.with_fs(|fs| fs.create_file_and_then(&path, |_file| Ok(())))
    }

    fn append(&mut self, name: &str, data: &[u8]) -> Result<usize, VolumeError> {
        let path = self.entry_path(name)?;
        self.with_fs(|fs| {
            fs.open_file_with_options_and_then(
                |options| options.read(true).write(true),
                &path,
                |file| {
                    file.seek(SeekFrom::End(0))?;
                    let written = file.write(data)?;
                    if written != data.len() {
                        return Err(FsError::IO);
                    }
                    Ok(written)
                },
            )
        })
    }

    fn unmount(&mut self) -> Result<(), VolumeError> {
        // littlefs keeps no open handles between the closure-scoped
        // operations above; releasing the volume is dropping it, which
        // ends the storage borrow.
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::ram_flash::RamFlash;

    const LINE: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn demo_config() -> MountConfig {
        MountConfig::new()
    }

    #[test]
    fn fresh_storage_mounts_when_formatting_enabled() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        let space = volume.space().unwrap();
        assert_eq!(space.total, 8192);
        assert!(space.used <= space.total);
        // fresh filesystem: only superblock + base dir metadata in use
        assert!(space.used < 2048);
    }

    #[test]
    fn fresh_storage_fails_when_formatting_disabled() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let config = MountConfig {
            format_on_mount_failure: false,
            ..demo_config()
        };
        let err = FlashVolume::mount(config, &mut storage).unwrap_err();
        assert!(matches!(err, MountError::MountFailed(_)));
    }

    #[test]
    fn label_mismatch_is_partition_not_found() {
        let mut storage: RamFlash<8192> = RamFlash::with_label("data");
        let config = MountConfig {
            partition_label: Some("storage"),
            ..demo_config()
        };
        let err = FlashVolume::mount(config, &mut storage).unwrap_err();
        assert_eq!(err, MountError::PartitionNotFound);
    }

    #[test]
    fn matching_label_mounts() {
        let mut storage: RamFlash<8192> = RamFlash::with_label("data");
        let config = MountConfig {
            partition_label: Some("data"),
            ..demo_config()
        };
        assert!(FlashVolume::mount(config, &mut storage).is_ok());
    }

    #[test]
    fn zero_max_open_files_is_rejected() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let config = MountConfig {
            max_open_files: 0,
            ..demo_config()
        };
        let err = FlashVolume::mount(config, &mut storage).unwrap_err();
        assert_eq!(err, MountError::InvalidConfig);
    }

    #[test]
    fn create_makes_file_exist() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        assert!(!volume.exists("soak.log").unwrap());
        volume.create("soak.log").unwrap();
        assert!(volume.exists("soak.log").unwrap());
    }

    #[test]
    fn append_to_missing_file_is_not_found() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        let err = volume.append("missing.log", LINE).unwrap_err();
        assert_eq!(err, VolumeError::NotFound);
    }

    #[test]
    fn appends_shrink_free_space_by_roughly_the_payload() {
        let mut storage: RamFlash<16384> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        volume.create("soak.log").unwrap();
        let before = volume.space().unwrap();

        let chunk = [0x42u8; 256];
        let mut written = 0u64;
        for _ in 0..16 {
            written += volume.append("soak.log", &chunk).unwrap() as u64;
        }
        assert_eq!(written, 4096);

        let after = volume.space().unwrap();
        let shrink = before.free() - after.free();
        // payload plus block-granular filesystem overhead
        assert!(shrink >= written, "free space shrank by only {shrink}");
        assert!(shrink <= written * 3, "free space shrank by {shrink}");
    }

    #[test]
    fn check_passes_on_a_populated_volume() {
        let mut storage: RamFlash<16384> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        volume.create("soak.log").unwrap();
        for _ in 0..8 {
            volume.append("soak.log", LINE).unwrap();
        }
        volume.check().unwrap();
    }

    #[test]
    fn check_passes_on_an_empty_volume() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        volume.check().unwrap();
    }

    #[test]
    fn format_wipes_files_and_keeps_the_volume_usable() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        volume.create("soak.log").unwrap();
        volume.format().unwrap();
        assert!(!volume.exists("soak.log").unwrap());
        volume.create("soak.log").unwrap();
        assert!(volume.exists("soak.log").unwrap());
    }

    #[test]
    fn data_survives_a_remount() {
        let mut storage: RamFlash<8192> = RamFlash::new();
        {
            let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
            volume.create("soak.log").unwrap();
            volume.append("soak.log", LINE).unwrap();
            volume.unmount().unwrap();
        }
        let mut volume = FlashVolume::mount(demo_config(), &mut storage).unwrap();
        assert!(volume.exists("soak.log").unwrap());
    }
}
