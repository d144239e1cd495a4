// crates/static-subid-core/src/runtime/invoker.rs
// ============================================================================
// Module: Privileged Command Invoker
// Description: Existence checks and range assignment via system identity tools.
// Purpose: Delegate writes to `usermod` and queries to `getsubids` safely.
// Dependencies: thiserror, crate::{core, interfaces, diagnostics}
// ============================================================================

//! ## Overview
//! The invoker never edits `/etc/subuid` or `/etc/subgid` itself. It builds a
//! fully specified [`CommandSpec`] and hands it to [`SystemOps::run`]:
//!
//! - the program is an absolute path and `argv[0]` is its bare name,
//! - the environment contains only [`ENV_ALLOW_LIST`] variables that are set,
//! - stdin is always `/dev/null`.
//!
//! Security posture: usernames are validated again here and range ends are
//! recomputed independently of the allocator before any command is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::RangeError;
use crate::core::SubidKind;
use crate::core::SubidRange;
use crate::core::ValidationError;
use crate::core::validate_username;
use crate::diagnostics::Diagnostics;
use crate::interfaces::CommandSpec;
use crate::interfaces::ExitOutcome;
use crate::interfaces::StdioPolicy;
use crate::interfaces::SystemOps;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Caller environment variables forwarded to child processes.
pub const ENV_ALLOW_LIST: &[&str] = &["LANG", "LC_ALL", "LC_MESSAGES", "LC_CTYPE", "TZ"];
/// Default location of the subordinate ID query tool.
pub const DEFAULT_GETSUBIDS_PATH: &str = "/usr/bin/getsubids";
/// Default location of the account modification tool.
pub const DEFAULT_USERMOD_PATH: &str = "/usr/sbin/usermod";
/// `getsubids` exit status meaning "no ranges assigned".
const GETSUBIDS_ABSENT_STATUS: i32 = 1;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invoker failures.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] ValidationError),
    /// Range failed the independent end check.
    #[error("invalid range: {0}")]
    Range(#[from] RangeError),
    /// Environment table could not be allocated.
    #[error("environment allocation failed: {0}")]
    Environment(String),
    /// Child process could not be spawned or awaited.
    #[error("failed to execute {program}: {message}")]
    Spawn {
        /// Program path.
        program: String,
        /// Underlying error.
        message: String,
    },
    /// Child exited with a non-success status.
    #[error("{program} exited with status {code}")]
    ExitStatus {
        /// Program path.
        program: String,
        /// Exit status.
        code: i32,
    },
    /// Child was terminated by a signal.
    #[error("{program} terminated by signal {signal}")]
    Signaled {
        /// Program path.
        program: String,
        /// Signal number.
        signal: i32,
    },
    /// Child finished without an exit status or signal.
    #[error("{program} terminated abnormally")]
    Abnormal {
        /// Program path.
        program: String,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Absolute locations of the delegated tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPaths {
    /// `getsubids` path.
    pub getsubids: PathBuf,
    /// `usermod` path.
    pub usermod: PathBuf,
}

impl Default for CommandPaths {
    fn default() -> Self {
        Self {
            getsubids: PathBuf::from(DEFAULT_GETSUBIDS_PATH),
            usermod: PathBuf::from(DEFAULT_USERMOD_PATH),
        }
    }
}

/// Result of an existence query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubidPresence {
    /// The user already has at least one range in the domain.
    Present,
    /// The user has no range in the domain.
    Absent,
}

/// Result of an assignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// The assignment command ran successfully.
    Applied(SubidRange),
    /// Noop mode: the command that would have run.
    DryRun {
        /// Range that would be assigned.
        range: SubidRange,
        /// Rendered command line.
        command: String,
    },
}

/// Runs `getsubids` and `usermod` on behalf of the workflow.
pub struct SubidInvoker<'a> {
    /// Host operations.
    ops: &'a dyn SystemOps,
    /// Diagnostic handle.
    diagnostics: &'a Diagnostics,
    /// Tool locations.
    paths: CommandPaths,
}

impl<'a> SubidInvoker<'a> {
    /// Creates an invoker using the default tool paths.
    #[must_use]
    pub fn new(ops: &'a dyn SystemOps, diagnostics: &'a Diagnostics) -> Self {
        Self {
            ops,
            diagnostics,
            paths: CommandPaths::default(),
        }
    }

    /// Overrides the tool paths.
    #[must_use]
    pub fn with_paths(mut self, paths: CommandPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Returns the host operations the invoker runs commands through.
    #[must_use]
    pub const fn ops(&self) -> &'a dyn SystemOps {
        self.ops
    }

    /// Returns the diagnostic handle shared with callers.
    #[must_use]
    pub const fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    /// Asks `getsubids` whether `username` already has ranges in `kind`.
    ///
    /// Exit status 0 means present and 1 means absent; anything else is an
    /// error. Child output is discarded unless debug output is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] for an invalid username, a spawn failure, an
    /// unexpected exit status, or abnormal termination.
    pub fn check_exists(
        &self,
        username: &str,
        kind: SubidKind,
    ) -> Result<SubidPresence, InvokeError> {
        validate_username(username)?;
        let mut args = Vec::with_capacity(2);
        if let Some(flag) = kind.query_flag() {
            args.push(flag.to_string());
        }
        args.push(username.to_string());
        let output =
            if self.diagnostics.debug_enabled() { StdioPolicy::Inherit } else { StdioPolicy::Null };
        let command = self.command(&self.paths.getsubids, args, output)?;
        self.diagnostics.debug("subid_query", format!("checking {kind} for {username}: {command}"));
        match self.spawn(&command)? {
            ExitOutcome::Exited(0) => Ok(SubidPresence::Present),
            ExitOutcome::Exited(GETSUBIDS_ABSENT_STATUS) => Ok(SubidPresence::Absent),
            outcome => Err(outcome_error(&command, outcome)),
        }
    }

    /// Assigns `[start, start + count - 1]` in `kind` to `username`.
    ///
    /// In noop mode nothing is executed and the rendered command is returned.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] for an invalid username, a zero or overflowing
    /// range, a spawn failure, a non-zero exit, or abnormal termination.
    pub fn assign_range(
        &self,
        username: &str,
        kind: SubidKind,
        start: u32,
        count: u32,
        noop: bool,
    ) -> Result<AssignOutcome, InvokeError> {
        validate_username(username)?;
        let range = SubidRange::new(start, count)?;
        let args = vec![kind.assign_flag().to_string(), range.to_string(), username.to_string()];
        let command = self.command(&self.paths.usermod, args, StdioPolicy::Inherit)?;
        if noop {
            return Ok(AssignOutcome::DryRun {
                range,
                command: command.to_string(),
            });
        }
        self.diagnostics.debug("subid_assign", format!("executing: {command}"));
        match self.spawn(&command)? {
            ExitOutcome::Exited(0) => Ok(AssignOutcome::Applied(range)),
            outcome => Err(outcome_error(&command, outcome)),
        }
    }

    /// Builds a command with the shared environment and stdin policy.
    fn command(
        &self,
        program: &Path,
        args: Vec<String>,
        output: StdioPolicy,
    ) -> Result<CommandSpec, InvokeError> {
        let arg0 = program
            .file_name()
            .map_or_else(|| program.display().to_string(), |name| name.to_string_lossy().into_owned());
        Ok(CommandSpec {
            program: program.to_path_buf(),
            arg0,
            args,
            env: build_safe_environment(self.ops)?,
            stdin: StdioPolicy::Null,
            stdout: output,
            stderr: output,
        })
    }

    /// Runs a command, reporting spawn failures.
    fn spawn(&self, command: &CommandSpec) -> Result<ExitOutcome, InvokeError> {
        self.ops.run(command).map_err(|err| InvokeError::Spawn {
            program: command.program.display().to_string(),
            message: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Collects the allow-listed variables present in the caller environment.
///
/// # Errors
///
/// Returns [`InvokeError::Environment`] when the table cannot be allocated.
pub fn build_safe_environment(
    ops: &dyn SystemOps,
) -> Result<Vec<(&'static str, OsString)>, InvokeError> {
    let mut env = Vec::new();
    env.try_reserve_exact(ENV_ALLOW_LIST.len())
        .map_err(|err| InvokeError::Environment(err.to_string()))?;
    for key in ENV_ALLOW_LIST {
        if let Some(value) = ops.env_var(key) {
            env.push((*key, value));
        }
    }
    Ok(env)
}

/// Maps an unsuccessful outcome to an error.
fn outcome_error(command: &CommandSpec, outcome: ExitOutcome) -> InvokeError {
    let program = command.program.display().to_string();
    match outcome {
        ExitOutcome::Exited(code) => InvokeError::ExitStatus {
            program,
            code,
        },
        ExitOutcome::Signaled(signal) => InvokeError::Signaled {
            program,
            signal,
        },
        ExitOutcome::Unknown => InvokeError::Abnormal {
            program,
        },
    }
}
