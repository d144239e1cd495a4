// crates/static-subid-core/src/core/fs.rs
// ============================================================================
// Module: File Metadata
// Description: Portable snapshot of the metadata the security gate inspects.
// Purpose: Decouple ownership/permission checks from `std::fs::Metadata`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`FileStat`] carries exactly the three facts the configuration gate needs:
//! the file type, the owning UID, and the permission bits. The OS binding
//! fills it from `fstat`/`stat`; the in-memory binding scripts it directly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::FileType;
use std::fs::Metadata;
use std::os::unix::fs::FileTypeExt;
use std::os::unix::fs::MetadataExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Permission bit granting write access to "other".
pub const MODE_OTHER_WRITE: u32 = 0o002;

// ============================================================================
// SECTION: Types
// ============================================================================

/// File type as reported by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link (only observable without following links).
    Symlink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Unix domain socket.
    Socket,
    /// Anything the platform reports that is not listed above.
    Unknown,
}

impl FileKind {
    /// Returns a human-readable name for diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Regular => "regular file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::CharDevice => "character device",
            Self::BlockDevice => "block device",
            Self::Fifo => "FIFO",
            Self::Socket => "socket",
            Self::Unknown => "unknown file type",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl From<FileType> for FileKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_file() {
            Self::Regular
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_char_device() {
            Self::CharDevice
        } else if file_type.is_block_device() {
            Self::BlockDevice
        } else if file_type.is_fifo() {
            Self::Fifo
        } else if file_type.is_socket() {
            Self::Socket
        } else {
            Self::Unknown
        }
    }
}

/// Type, owner, and permission bits of a filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Object type.
    pub kind: FileKind,
    /// Owning user ID.
    pub uid: u32,
    /// Permission bits (`st_mode & 0o7777`).
    pub mode: u32,
}

impl FileStat {
    /// Creates a snapshot from raw parts.
    #[must_use]
    pub const fn new(kind: FileKind, uid: u32, mode: u32) -> Self {
        Self {
            kind,
            uid,
            mode: mode & 0o7777,
        }
    }

    /// Root-owned regular file with the given permission bits.
    #[must_use]
    pub const fn root_file(mode: u32) -> Self {
        Self::new(FileKind::Regular, 0, mode)
    }

    /// Root-owned directory with the given permission bits.
    #[must_use]
    pub const fn root_dir(mode: u32) -> Self {
        Self::new(FileKind::Directory, 0, mode)
    }

    /// Returns true when "other" may write the object.
    #[must_use]
    pub const fn is_world_writable(&self) -> bool {
        self.mode & MODE_OTHER_WRITE != 0
    }
}

impl From<&Metadata> for FileStat {
    fn from(metadata: &Metadata) -> Self {
        Self::new(FileKind::from(metadata.file_type()), metadata.uid(), metadata.mode())
    }
}
