//! The demo driver: one linear pass over a flash volume.
//!
//! `run` sequences the volume operations — mount, space query,
//! consistency guard, open-or-create, append-until-low-space, unmount —
//! and reports progress through an observer callback. It deliberately has
//! **no** I/O of its own: logging is the caller's concern (defmt on
//! hardware, tracing on the host), and every failure is a typed
//! [`SoakError`] instead of log-and-continue.
//!
//! Failure policy: creation failures abort before anything touches the
//! file, a mid-loop open failure is a fatal error (never a retry or a
//! hang), and the volume is released on every exit path once the mount
//! succeeded.

use platform::{MountConfig, MountError, SpaceReport, Volume, VolumeError};

use crate::config::{SoakConfig, LOG_LINE};

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoakEvent {
    /// The volume mounted.
    Mounted,
    /// A fresh space report was taken.
    Space(SpaceReport),
    /// `used > total` was observed and the consistency check passed.
    ConsistencyRestored,
    /// A space query failed and the volume was reformatted best-effort.
    /// The run terminates right after this either way.
    Reformatted {
        /// Whether the format itself reported success.
        ok: bool,
    },
    /// The log file did not exist and was created.
    FileCreated,
    /// The log file already existed and is reused.
    FileReused,
    /// One log line was appended.
    Appended {
        /// Bytes written by this append.
        bytes: usize,
    },
    /// The volume was released.
    Unmounted,
}

/// Fatal outcome of a run, one variant per driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoakError {
    /// Mounting failed; carries the mount classification.
    Mount(MountError),
    /// A space query failed (after the best-effort reformat).
    SpaceQuery(VolumeError),
    /// `used > total` was observed and the repair pass failed.
    Check(VolumeError),
    /// The existence probe failed.
    Probe(VolumeError),
    /// Creating the log file failed.
    Create(VolumeError),
    /// An append failed mid-loop. This indicates a broken invariant
    /// (the file was just created or probed) and is never retried.
    Append(VolumeError),
    /// Releasing the volume failed.
    Unmount(VolumeError),
}

impl core::fmt::Display for SoakError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Mount(err) => write!(f, "mount failed: {err}"),
            Self::SpaceQuery(err) => write!(f, "space query failed: {err}"),
            Self::Check(err) => write!(f, "consistency check failed: {err}"),
            Self::Probe(err) => write!(f, "existence probe failed: {err}"),
            Self::Create(err) => write!(f, "file creation failed: {err}"),
            Self::Append(err) => write!(f, "append failed: {err}"),
            Self::Unmount(err) => write!(f, "unmount failed: {err}"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoakReport {
    /// Log lines appended before free space ran low.
    pub lines_appended: u32,
    /// Whether the log file had to be created.
    pub created: bool,
    /// The last space report taken.
    pub final_space: SpaceReport,
}

/// Query space; on failure, reformat best-effort, release the volume and
/// abort the run. The format outcome is reported but deliberately not
/// verified — the run terminates either way.
fn space_or_abort<V, F>(volume: &mut V, observe: &mut F) -> Result<SpaceReport, SoakError>
where
    V: Volume,
    F: FnMut(SoakEvent),
{
    match volume.space() {
        Ok(report) => Ok(report),
        Err(err) => {
            let ok = volume.format().is_ok();
            observe(SoakEvent::Reformatted { ok });
            let _ = volume.unmount();
            Err(SoakError::SpaceQuery(err))
        }
    }
}

/// Run the demo once.
///
/// `mount` turns the mount configuration into a [`Volume`]; passing a
/// closure keeps the driver generic over the backend (littlefs on flash,
/// a mock in tests). `observe` receives every [`SoakEvent`] in order.
pub fn run<V, M, F>(config: &SoakConfig, mount: M, mut observe: F) -> Result<SoakReport, SoakError>
where
    V: Volume,
    M: FnOnce(&MountConfig) -> Result<V, MountError>,
    F: FnMut(SoakEvent),
{
    let mut volume = mount(&config.mount).map_err(SoakError::Mount)?;
    observe(SoakEvent::Mounted);

    let mut space = space_or_abort(&mut volume, &mut observe)?;
    observe(SoakEvent::Space(space));

    if space.used > space.total {
        // used can never exceed total on a healthy volume; run the repair
        // pass exactly once, before any file operation.
        match volume.check() {
            Ok(()) => observe(SoakEvent::ConsistencyRestored),
            Err(err) => {
                let _ = volume.unmount();
                return Err(SoakError::Check(err));
            }
        }
    }

    let created = match volume.exists(config.file_name) {
        Ok(true) => {
            observe(SoakEvent::FileReused);
            false
        }
        Ok(false) => match volume.create(config.file_name) {
            Ok(()) => {
                observe(SoakEvent::FileCreated);
                true
            }
            Err(err) => {
                let _ = volume.unmount();
                return Err(SoakError::Create(err));
            }
        },
        Err(err) => {
            let _ = volume.unmount();
            return Err(SoakError::Probe(err));
        }
    };

    let mut lines_appended: u32 = 0;
    while space.free() > config.low_space_threshold {
        let bytes = match volume.append(config.file_name, LOG_LINE) {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = volume.unmount();
                return Err(SoakError::Append(err));
            }
        };
        lines_appended = lines_appended.saturating_add(1);
        observe(SoakEvent::Appended { bytes });

        space = space_or_abort(&mut volume, &mut observe)?;
        observe(SoakEvent::Space(space));
    }

    volume.unmount().map_err(SoakError::Unmount)?;
    observe(SoakEvent::Unmounted);

    Ok(SoakReport {
        lines_appended,
        created,
        final_space: space,
    })
}
