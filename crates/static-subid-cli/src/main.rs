// crates/static-subid-cli/src/main.rs
// ============================================================================
// Module: static-subid CLI Entry Point
// Description: Argument parsing, output routing, and exit-code mapping.
// Purpose: Assign deterministic subordinate ID ranges to a system user.
// Dependencies: clap, static-subid-cli, static-subid-config, static-subid-core, thiserror
// ============================================================================

//! ## Overview
//! `static-subid` assigns each user a subordinate UID and GID block derived
//! from the primary UID, delegating the actual writes to `usermod`. All
//! user-facing strings are routed through the message catalog; diagnostic
//! events go to stderr through a [`StderrDiagnosticSink`].
//!
//! Security posture: the binary always loads configuration from the fixed
//! system locations and offers no path or environment override.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use static_subid_cli::t;
use static_subid_cli::workflow::AssignmentRequest;
use static_subid_cli::workflow::ModeOutcome;
use static_subid_cli::workflow::run_assignment;
use static_subid_config::ConfigSources;
use static_subid_config::RenderFormat;
use static_subid_config::SubidConfig;
use static_subid_core::Diagnostics;
use static_subid_core::LogFormat;
use static_subid_core::OsSystemOps;
use static_subid_core::StderrDiagnosticSink;
use static_subid_core::SubidInvoker;
use static_subid_core::SubidKind;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "static-subid",
    about = "Assign deterministic subordinate UID/GID ranges to a user",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Assign a subordinate UID range.
    #[arg(long)]
    subuid: bool,
    /// Assign a subordinate GID range.
    #[arg(long)]
    subgid: bool,
    /// Emit debug diagnostics to stderr.
    #[arg(short = 'd', long)]
    debug: bool,
    /// Print the commands that would run without executing them.
    #[arg(short = 'n', long)]
    noop: bool,
    /// Diagnostic line format on stderr.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,
    /// Print the merged configuration and exit.
    #[arg(long)]
    dump_config: bool,
    /// Output format for `--dump-config`.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = DumpFormatArg::Text)]
    format: DumpFormatArg,
    /// Username or decimal UID.
    #[arg(value_name = "USER")]
    user: Option<String>,
}

/// Diagnostic line formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    /// `static-subid: <level>: <message>`.
    Text,
    /// One JSON object per line.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Configuration dump formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DumpFormatArg {
    /// Aligned `KEY: value` lines.
    Text,
    /// Pretty JSON.
    Json,
    /// TOML table.
    Toml,
}

impl From<DumpFormatArg> for RenderFormat {
    fn from(value: DumpFormatArg) -> Self {
        match value {
            DumpFormatArg::Text => Self::Text,
            DumpFormatArg::Json => Self::Json,
            DumpFormatArg::Toml => Self::Toml,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalogued error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalogued message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches to the selected action.
fn run() -> CliResult<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return Ok(if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS });
        }
    };

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(stdout_error(&err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let sink = Arc::new(StderrDiagnosticSink::new(cli.log_format.into()));
    let diagnostics = Diagnostics::new(sink, cli.debug);
    let ops = OsSystemOps::new();

    if cli.dump_config {
        if cli.user.is_some() || cli.subuid || cli.subgid {
            return Err(CliError::new(t!("args.dump_conflict")));
        }
        return command_dump_config(&ops, cli.format.into(), &diagnostics);
    }

    let request = build_request(&cli)?;
    command_assign(&ops, &request, &diagnostics)
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Validates mode flags and the user argument.
fn build_request(cli: &Cli) -> CliResult<AssignmentRequest> {
    let kinds = selected_kinds(cli.subuid, cli.subgid)?;
    let Some(user) = cli.user.clone() else {
        return Err(CliError::new(t!("args.user_required")));
    };
    Ok(AssignmentRequest {
        user,
        kinds,
        noop: cli.noop,
    })
}

/// Returns the requested domains in processing order.
fn selected_kinds(subuid: bool, subgid: bool) -> CliResult<Vec<SubidKind>> {
    let kinds: Vec<SubidKind> = SubidKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            SubidKind::Uid => subuid,
            SubidKind::Gid => subgid,
        })
        .collect();
    if kinds.is_empty() {
        return Err(CliError::new(t!("args.mode_required")));
    }
    Ok(kinds)
}

/// Executes `--dump-config`.
fn command_dump_config(
    ops: &OsSystemOps,
    format: RenderFormat,
    diagnostics: &Diagnostics,
) -> CliResult<ExitCode> {
    let config = SubidConfig::load(ops, diagnostics)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let rendered = config
        .render(format)
        .map_err(|err| CliError::new(t!("config.render_failed", error = err)))?;
    write_stdout_line(rendered.trim_end()).map_err(|err| CliError::new(stdout_error(&err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes an assignment run.
fn command_assign(
    ops: &OsSystemOps,
    request: &AssignmentRequest,
    diagnostics: &Diagnostics,
) -> CliResult<ExitCode> {
    let invoker = SubidInvoker::new(ops, diagnostics);
    let report = run_assignment(&invoker, &ConfigSources::default(), request)
        .map_err(|err| CliError::new(t!("workflow.failed", error = err)))?;
    for line in noop_lines(&report.outcomes) {
        write_stdout_line(&line).map_err(|err| CliError::new(stdout_error(&err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders the stdout lines for noop outcomes.
fn noop_lines(outcomes: &[(SubidKind, ModeOutcome)]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|(_, outcome)| match outcome {
            ModeOutcome::DryRun {
                command, ..
            } => Some(t!("noop.would_execute", command = command)),
            ModeOutcome::AlreadyAssigned | ModeOutcome::Assigned(_) => None,
        })
        .collect()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats the catalogued message for a failed stdout write.
fn stdout_error(error: &std::io::Error) -> String {
    t!("output.stdout_failed", error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
