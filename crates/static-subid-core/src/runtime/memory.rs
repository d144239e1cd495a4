// crates/static-subid-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Host Operations
// Description: Scripted `SystemOps` substitute for unprivileged tests.
// Purpose: Exercise loader, resolver, and invoker without touching the host.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`InMemorySystemOps`] serves files, directories, passwd entries, and
//! environment variables from maps populated through builder methods.
//! Child processes are never spawned: each [`CommandSpec`] is recorded and
//! answered with a scripted [`ExitOutcome`]. Every opened path is recorded as
//! well, so tests can assert what the loader did and did not read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::core::FileStat;
use crate::interfaces::CommandSpec;
use crate::interfaces::ExitOutcome;
use crate::interfaces::LookupError;
use crate::interfaces::OpenedFile;
use crate::interfaces::SystemOps;
use crate::interfaces::UserRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scripted filesystem object.
#[derive(Debug, Clone)]
enum Entry {
    /// File (of any non-directory kind) with contents.
    File {
        /// Metadata reported by `stat` and `fstat`.
        stat: FileStat,
        /// Bytes returned by reads.
        contents: Vec<u8>,
    },
    /// Directory with entry names.
    Dir {
        /// Metadata reported by `stat`.
        stat: FileStat,
        /// Names returned by `read_dir`.
        names: Vec<OsString>,
    },
    /// Every access fails with this error kind.
    Fail(io::ErrorKind),
}

/// In-memory open handle.
struct MemoryOpenedFile {
    /// Metadata captured at open time.
    stat: FileStat,
    /// Remaining contents.
    cursor: Cursor<Vec<u8>>,
}

impl Read for MemoryOpenedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl OpenedFile for MemoryOpenedFile {
    fn stat(&self) -> io::Result<FileStat> {
        Ok(self.stat)
    }
}

/// Scripted `SystemOps` implementation.
#[derive(Default)]
pub struct InMemorySystemOps {
    /// Filesystem objects by absolute path.
    entries: BTreeMap<PathBuf, Entry>,
    /// Directory listing failures that leave `stat` intact.
    read_dir_errors: BTreeMap<PathBuf, io::ErrorKind>,
    /// Passwd entries.
    users: Vec<UserRecord>,
    /// When set, every identity lookup fails with this message.
    lookup_failure: Option<String>,
    /// Caller environment.
    env: BTreeMap<String, OsString>,
    /// Scripted exit outcomes per program path.
    exits: Mutex<BTreeMap<PathBuf, VecDeque<ExitOutcome>>>,
    /// Spawn failures per program path.
    spawn_errors: BTreeMap<PathBuf, io::ErrorKind>,
    /// Commands passed to `run`, in order.
    commands: Mutex<Vec<CommandSpec>>,
    /// Paths passed to `open_read`, in order.
    opened: Mutex<Vec<PathBuf>>,
}

impl InMemorySystemOps {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with explicit metadata.
    #[must_use]
    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        stat: FileStat,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        self.entries.insert(
            path.into(),
            Entry::File {
                stat,
                contents: contents.into(),
            },
        );
        self
    }

    /// Adds a root-owned `0644` regular file.
    #[must_use]
    pub fn with_root_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.with_file(path, FileStat::root_file(0o644), contents)
    }

    /// Adds a directory with explicit metadata and entry names.
    #[must_use]
    pub fn with_dir<I, N>(mut self, path: impl Into<PathBuf>, stat: FileStat, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<OsString>,
    {
        self.entries.insert(
            path.into(),
            Entry::Dir {
                stat,
                names: names.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Adds a root-owned `0755` directory.
    #[must_use]
    pub fn with_root_dir<I, N>(self, path: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<OsString>,
    {
        self.with_dir(path, FileStat::root_dir(0o755), names)
    }

    /// Makes every access to `path` fail with `kind`.
    #[must_use]
    pub fn with_error(mut self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.entries.insert(path.into(), Entry::Fail(kind));
        self
    }

    /// Makes listing `path` fail with `kind` while `stat` still succeeds.
    #[must_use]
    pub fn with_read_dir_error(mut self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.read_dir_errors.insert(path.into(), kind);
        self
    }

    /// Adds a passwd entry.
    #[must_use]
    pub fn with_user(mut self, name: impl Into<String>, uid: u32) -> Self {
        self.users.push(UserRecord {
            name: name.into(),
            uid,
        });
        self
    }

    /// Makes every identity lookup fail.
    #[must_use]
    pub fn with_lookup_failure(mut self, message: impl Into<String>) -> Self {
        self.lookup_failure = Some(message.into());
        self
    }

    /// Sets a caller environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Queues an exit outcome for `program`.
    ///
    /// Outcomes are consumed in order; the last one repeats. Programs with no
    /// scripted outcome exit with status zero.
    #[must_use]
    pub fn with_exit(self, program: impl Into<PathBuf>, outcome: ExitOutcome) -> Self {
        self.exits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(program.into())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Makes spawning `program` fail with `kind`.
    #[must_use]
    pub fn with_spawn_error(mut self, program: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
        self.spawn_errors.insert(program.into(), kind);
        self
    }

    /// Returns every command passed to `run`.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns every path passed to `open_read`.
    #[must_use]
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Looks up an entry, mapping absence to `NotFound`.
    fn entry(&self, path: &Path) -> io::Result<&Entry> {
        match self.entries.get(path) {
            Some(Entry::Fail(kind)) => Err(io::Error::from(*kind)),
            Some(entry) => Ok(entry),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    /// Fails when identity lookups are scripted to fail.
    fn lookup_guard(&self) -> Result<(), LookupError> {
        self.lookup_failure.as_ref().map_or(Ok(()), |message| Err(LookupError::Database(message.clone())))
    }
}

// ============================================================================
// SECTION: SystemOps
// ============================================================================

impl SystemOps for InMemorySystemOps {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn OpenedFile>> {
        self.opened.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_path_buf());
        let (stat, contents) = match self.entry(path)? {
            Entry::File {
                stat,
                contents,
            } => (*stat, contents.clone()),
            Entry::Dir {
                stat, ..
            } => (*stat, Vec::new()),
            Entry::Fail(kind) => return Err(io::Error::from(*kind)),
        };
        Ok(Box::new(MemoryOpenedFile {
            stat,
            cursor: Cursor::new(contents),
        }))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        match self.entry(path)? {
            Entry::File {
                stat, ..
            }
            | Entry::Dir {
                stat, ..
            } => Ok(*stat),
            Entry::Fail(kind) => Err(io::Error::from(*kind)),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        if let Some(kind) = self.read_dir_errors.get(path) {
            return Err(io::Error::from(*kind));
        }
        match self.entry(path)? {
            Entry::Dir {
                names, ..
            } => Ok(names.clone()),
            Entry::File {
                ..
            } => Err(io::Error::from(io::ErrorKind::NotADirectory)),
            Entry::Fail(kind) => Err(io::Error::from(*kind)),
        }
    }

    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError> {
        self.lookup_guard()?;
        Ok(self.users.iter().find(|user| user.uid == uid).cloned())
    }

    fn user_by_name(&self, name: &str) -> Result<Option<UserRecord>, LookupError> {
        self.lookup_guard()?;
        Ok(self.users.iter().find(|user| user.name == name).cloned())
    }

    fn env_var(&self, key: &str) -> Option<OsString> {
        self.env.get(key).cloned()
    }

    fn run(&self, command: &CommandSpec) -> io::Result<ExitOutcome> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner).push(command.clone());
        if let Some(kind) = self.spawn_errors.get(&command.program) {
            return Err(io::Error::from(*kind));
        }
        let mut exits = self.exits.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(queue) = exits.get_mut(&command.program) else {
            return Ok(ExitOutcome::Exited(0));
        };
        let outcome = if queue.len() > 1 { queue.pop_front() } else { queue.front().copied() };
        Ok(outcome.unwrap_or(ExitOutcome::Exited(0)))
    }
}
