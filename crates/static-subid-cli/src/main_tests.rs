// crates/static-subid-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument handling in the CLI entry point.
// Purpose: Ensure mode selection, user checks, and noop output are stable.
// Dependencies: static-subid-cli main helpers
// ============================================================================

//! ## Overview
//! Validates argument parsing, request construction, and noop line rendering
//! without touching the host.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use static_subid_cli::workflow::ModeOutcome;
use static_subid_config::RenderFormat;
use static_subid_core::LogFormat;
use static_subid_core::SubidKind;
use static_subid_core::SubidRange;

use super::Cli;
use super::DumpFormatArg;
use super::LogFormatArg;
use super::build_request;
use super::noop_lines;
use super::selected_kinds;
use super::stdout_error;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn both_modes_are_processed_uid_first() {
    assert_eq!(selected_kinds(true, true).unwrap(), vec![SubidKind::Uid, SubidKind::Gid]);
    assert_eq!(selected_kinds(false, true).unwrap(), vec![SubidKind::Gid]);
}

#[test]
fn missing_mode_is_rejected() {
    let err = selected_kinds(false, false).unwrap_err();
    assert!(err.to_string().contains("--subuid or --subgid"));
}

#[test]
fn request_carries_flags_and_user() {
    let cli = Cli::try_parse_from(["static-subid", "--subgid", "--subuid", "-n", "alice"]).unwrap();
    let request = build_request(&cli).unwrap();
    assert_eq!(request.user, "alice");
    assert_eq!(request.kinds, vec![SubidKind::Uid, SubidKind::Gid]);
    assert!(request.noop);
}

#[test]
fn uid_argument_is_passed_through_verbatim() {
    let cli = Cli::try_parse_from(["static-subid", "--subuid", "1001"]).unwrap();
    assert_eq!(build_request(&cli).unwrap().user, "1001");
}

#[test]
fn missing_user_is_rejected() {
    let cli = Cli::try_parse_from(["static-subid", "--subuid"]).unwrap();
    let err = build_request(&cli).unwrap_err();
    assert!(err.to_string().contains("username or UID is required"));
}

#[test]
fn format_flags_map_to_library_types() {
    let cli = Cli::try_parse_from([
        "static-subid",
        "--dump-config",
        "--format",
        "toml",
        "--log-format",
        "json",
        "-d",
    ])
    .unwrap();
    assert!(cli.dump_config);
    assert!(cli.debug);
    assert_eq!(cli.format, DumpFormatArg::Toml);
    assert_eq!(RenderFormat::from(cli.format), RenderFormat::Toml);
    assert_eq!(cli.log_format, LogFormatArg::Json);
    assert_eq!(LogFormat::from(cli.log_format), LogFormat::Json);
}

#[test]
fn unknown_format_is_a_parse_error() {
    assert!(Cli::try_parse_from(["static-subid", "--dump-config", "--format", "yaml"]).is_err());
}

#[test]
fn only_dry_runs_produce_stdout_lines() {
    let range = SubidRange::new(100_000, 65_536).unwrap();
    let outcomes = vec![
        (SubidKind::Uid, ModeOutcome::AlreadyAssigned),
        (
            SubidKind::Gid,
            ModeOutcome::DryRun {
                range,
                command: "/usr/sbin/usermod --add-subgids 100000-165535 alice".to_string(),
            },
        ),
    ];
    assert_eq!(
        noop_lines(&outcomes),
        vec![
            "static-subid: noop: would execute: /usr/sbin/usermod --add-subgids 100000-165535 alice"
                .to_string()
        ]
    );
    assert!(noop_lines(&[(SubidKind::Uid, ModeOutcome::Assigned(range))]).is_empty());
}

#[test]
fn stdout_write_failure_names_the_stream() {
    let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    assert_eq!(stdout_error(&err), "static-subid: failed to write to stdout: pipe closed");
}
