//! Closed error enumerations for volume operations.
//!
//! Backend failures are folded into [`VolumeError`]; mount failures get
//! their own classification in [`MountError`] so callers can match
//! exhaustively instead of comparing raw error codes one by one.

use thiserror_no_std::Error;

/// Failure of an operation on a (mounted) volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VolumeError {
    /// The backend storage reported an I/O failure.
    #[error("storage I/O failure")]
    Io,
    /// On-volume metadata is inconsistent or the volume is unformatted.
    #[error("filesystem metadata corrupt or unformatted")]
    Corrupt,
    /// The named entry does not exist.
    #[error("no such entry")]
    NotFound,
    /// The named entry already exists.
    #[error("entry already exists")]
    AlreadyExists,
    /// A path component is not the expected kind (file vs directory).
    #[error("path component mismatch")]
    BadPath,
    /// The volume has no space left.
    #[error("no space left on volume")]
    Full,
    /// The backend ran out of working memory.
    #[error("backend out of memory")]
    NoMemory,
    /// A name exceeds the backend path limit.
    #[error("name exceeds path limit")]
    NameTooLong,
    /// The backend rejected an argument.
    #[error("invalid argument")]
    Invalid,
    /// A backend failure with no direct classification.
    #[error("unclassified backend failure")]
    Other,
}

impl From<littlefs2::io::Error> for VolumeError {
    fn from(err: littlefs2::io::Error) -> Self {
        use littlefs2::io::Error as Fs;

        if err == Fs::NO_SUCH_ENTRY {
            Self::NotFound
        } else if err == Fs::ENTRY_ALREADY_EXISTED {
            Self::AlreadyExists
        } else if err == Fs::CORRUPTION {
            Self::Corrupt
        } else if err == Fs::IO {
            Self::Io
        } else if err == Fs::NO_SPACE {
            Self::Full
        } else if err == Fs::NO_MEMORY {
            Self::NoMemory
        } else if err == Fs::FILENAME_TOO_LONG {
            Self::NameTooLong
        } else if err == Fs::INVALID {
            Self::Invalid
        } else if err == Fs::PATH_NOT_DIR || err == Fs::PATH_IS_DIR || err == Fs::DIR_NOT_EMPTY {
            Self::BadPath
        } else {
            Self::Other
        }
    }
}

/// Why mounting a volume failed.
///
/// Mount failures terminate the demo; the classification exists so the
/// caller can report the cause precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountError {
    /// The volume is not mountable (and formatting was disabled, or the
    /// retry after formatting failed too).
    #[error("volume not mountable: {0}")]
    MountFailed(VolumeError),
    /// The storage region does not carry the requested partition label.
    #[error("no partition matches the requested label")]
    PartitionNotFound,
    /// Formatting the volume before the retry failed.
    #[error("formatting failed: {0}")]
    FormatFailed(VolumeError),
    /// The mount configuration was rejected.
    #[error("mount configuration rejected")]
    InvalidConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn littlefs_errors_map_to_closed_kinds() {
        use littlefs2::io::Error as Fs;

        assert_eq!(VolumeError::from(Fs::NO_SUCH_ENTRY), VolumeError::NotFound);
        assert_eq!(VolumeError::from(Fs::CORRUPTION), VolumeError::Corrupt);
        assert_eq!(VolumeError::from(Fs::NO_SPACE), VolumeError::Full);
        assert_eq!(VolumeError::from(Fs::PATH_IS_DIR), VolumeError::BadPath);
    }

    #[test]
    fn mount_error_displays_inner_kind() {
        let err = MountError::MountFailed(VolumeError::Corrupt);
        let text = format!("{err}");
        assert!(text.contains("not mountable"));
    }
}
