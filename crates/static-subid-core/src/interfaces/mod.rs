// crates/static-subid-core/src/interfaces/mod.rs
// ============================================================================
// Module: static-subid Interfaces
// Description: Operating-system operations consumed by the loader and invoker.
// Purpose: Isolate file, identity-database, environment, and process access.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! [`SystemOps`] is the single seam between static-subid logic and the host.
//! The production binding lives in [`crate::runtime::OsSystemOps`]; tests use
//! [`crate::runtime::InMemorySystemOps`]. Implementations must not retry,
//! cache, or reinterpret results: every call reflects the host at that moment.
//!
//! Security posture: everything returned through this interface (file bytes,
//! metadata, passwd records, environment values) is untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::FileStat;

// ============================================================================
// SECTION: Identity Records
// ============================================================================

/// Subset of a passwd entry needed for assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Login name.
    pub name: String,
    /// Primary user ID.
    pub uid: u32,
}

/// Identity database lookup failures.
///
/// A missing user is not an error; lookups return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Underlying lookup call failed.
    #[error("user database lookup failed: {0}")]
    Database(String),
}

// ============================================================================
// SECTION: Process Execution
// ============================================================================

/// Disposition of one standard stream of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioPolicy {
    /// Connect the stream to `/dev/null`.
    Null,
    /// Share the parent's stream.
    Inherit,
}

/// Fully specified child process invocation.
///
/// # Invariants
/// - `program` is absolute; no search path is consulted.
/// - `env` is the complete child environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Absolute path of the executable.
    pub program: PathBuf,
    /// Value presented to the child as `argv[0]`.
    pub arg0: String,
    /// Arguments after `argv[0]`.
    pub args: Vec<String>,
    /// Complete environment passed to the child.
    pub env: Vec<(&'static str, OsString)>,
    /// Standard input disposition.
    pub stdin: StdioPolicy,
    /// Standard output disposition.
    pub stdout: StdioPolicy,
    /// Standard error disposition.
    pub stderr: StdioPolicy,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a status code.
    Exited(i32),
    /// Terminated by a signal.
    Signaled(i32),
    /// Neither an exit code nor a signal was reported.
    Unknown,
}

impl ExitOutcome {
    /// Returns true for a normal exit with status zero.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Readable handle whose metadata describes the object actually opened.
pub trait OpenedFile: Read {
    /// Returns metadata for the open handle (`fstat`).
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the metadata cannot be read.
    fn stat(&self) -> io::Result<FileStat>;
}

/// Host operations required by static-subid.
pub trait SystemOps: Send + Sync {
    /// Opens a file for reading, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by the host, including `NotFound`.
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn OpenedFile>>;

    /// Returns metadata for a path, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by the host, including `NotFound`.
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Lists entry names in a directory, excluding `.` and `..`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by the host.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;

    /// Looks up a user by primary UID.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup itself fails.
    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError>;

    /// Looks up a user by login name.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the lookup itself fails.
    fn user_by_name(&self, name: &str) -> Result<Option<UserRecord>, LookupError>;

    /// Reads one variable from the caller's environment.
    fn env_var(&self, key: &str) -> Option<OsString>;

    /// Spawns a child process and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the process cannot be spawned or awaited.
    fn run(&self, command: &CommandSpec) -> io::Result<ExitOutcome>;
}
