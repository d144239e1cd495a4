// crates/static-subid-core/src/runtime/os.rs
// ============================================================================
// Module: Host Operations
// Description: Production `SystemOps` binding over std and nix.
// Purpose: Real filesystem, passwd, environment, and process access.
// Dependencies: nix, std
// ============================================================================

//! ## Overview
//! [`OsSystemOps`] is a thin, stateless binding. Files are opened
//! non-blocking so that a FIFO planted at a configuration path cannot stall
//! the loader before its type is checked. Child processes are spawned from
//! an absolute path with a cleared environment and explicit stdio.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use nix::fcntl::OFlag;
use nix::unistd::Uid;
use nix::unistd::User;

use crate::core::FileStat;
use crate::interfaces::CommandSpec;
use crate::interfaces::ExitOutcome;
use crate::interfaces::LookupError;
use crate::interfaces::OpenedFile;
use crate::interfaces::StdioPolicy;
use crate::interfaces::SystemOps;
use crate::interfaces::UserRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// `SystemOps` backed by the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSystemOps;

impl OsSystemOps {
    /// Creates the host binding.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Open file handle paired with `fstat`.
struct OsOpenedFile {
    /// Underlying descriptor.
    file: File,
}

impl Read for OsOpenedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl OpenedFile for OsOpenedFile {
    fn stat(&self) -> io::Result<FileStat> {
        Ok(FileStat::from(&self.file.metadata()?))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a stream policy to a fresh `Stdio`.
fn stdio(policy: StdioPolicy) -> Stdio {
    match policy {
        StdioPolicy::Null => Stdio::null(),
        StdioPolicy::Inherit => Stdio::inherit(),
    }
}

/// Classifies a wait status.
fn exit_outcome(status: ExitStatus) -> ExitOutcome {
    if let Some(code) = status.code() {
        ExitOutcome::Exited(code)
    } else if let Some(signal) = status.signal() {
        ExitOutcome::Signaled(signal)
    } else {
        ExitOutcome::Unknown
    }
}

/// Converts a nix passwd entry.
fn user_record(user: User) -> UserRecord {
    UserRecord {
        name: user.name,
        uid: user.uid.as_raw(),
    }
}

// ============================================================================
// SECTION: SystemOps
// ============================================================================

impl SystemOps for OsSystemOps {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn OpenedFile>> {
        let file = OpenOptions::new().read(true).custom_flags(OFlag::O_NONBLOCK.bits()).open(path)?;
        Ok(Box::new(OsOpenedFile {
            file,
        }))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        Ok(FileStat::from(&fs::metadata(path)?))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        fs::read_dir(path)?.map(|entry| entry.map(|entry| entry.file_name())).collect()
    }

    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError> {
        User::from_uid(Uid::from_raw(uid))
            .map(|user| user.map(user_record))
            .map_err(|err| LookupError::Database(err.to_string()))
    }

    fn user_by_name(&self, name: &str) -> Result<Option<UserRecord>, LookupError> {
        User::from_name(name)
            .map(|user| user.map(user_record))
            .map_err(|err| LookupError::Database(err.to_string()))
    }

    fn env_var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn run(&self, command: &CommandSpec) -> io::Result<ExitOutcome> {
        let status = Command::new(&command.program)
            .arg0(&command.arg0)
            .args(&command.args)
            .env_clear()
            .envs(command.env.iter().map(|(key, value)| (*key, value)))
            .stdin(stdio(command.stdin))
            .stdout(stdio(command.stdout))
            .stderr(stdio(command.stderr))
            .status()?;
        Ok(exit_outcome(status))
    }
}
