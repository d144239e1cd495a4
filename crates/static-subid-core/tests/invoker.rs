// crates/static-subid-core/tests/invoker.rs
// ============================================================================
// Module: Invoker Tests
// Description: Command construction, environment filtering, and exit handling.
// Purpose: Ensure delegated tools run with a minimal, validated invocation.
// ============================================================================

//! Privileged invoker tests against the in-memory host.

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
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use common::GETSUBIDS;
use common::TestResult;
use common::USERMOD;
use common::capture;
use static_subid_core::AssignOutcome;
use static_subid_core::CommandPaths;
use static_subid_core::ExitOutcome;
use static_subid_core::InMemorySystemOps;
use static_subid_core::InvokeError;
use static_subid_core::RangeError;
use static_subid_core::StdioPolicy;
use static_subid_core::SubidInvoker;
use static_subid_core::SubidKind;
use static_subid_core::SubidPresence;
use static_subid_core::SubidRange;
use static_subid_core::build_safe_environment;

// ============================================================================
// SECTION: Environment
// ============================================================================

#[test]
fn environment_keeps_only_allow_listed_variables() {
    let ops = InMemorySystemOps::new()
        .with_env("LANG", "en_US.UTF-8")
        .with_env("TZ", "UTC")
        .with_env("LD_PRELOAD", "/tmp/evil.so")
        .with_env("PATH", "/tmp")
        .with_env("IFS", "x");
    let env = build_safe_environment(&ops).unwrap();
    assert_eq!(
        env,
        vec![("LANG", OsString::from("en_US.UTF-8")), ("TZ", OsString::from("UTC"))]
    );
}

#[test]
fn environment_is_empty_when_nothing_is_set() {
    let ops = InMemorySystemOps::new().with_env("HOME", "/root");
    assert!(build_safe_environment(&ops).unwrap().is_empty());
}

// ============================================================================
// SECTION: Existence Checks
// ============================================================================

#[test]
fn exists_maps_exit_zero_to_present() -> TestResult {
    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Exited(0));
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    let presence = invoker.check_exists("alice", SubidKind::Uid).map_err(|err| err.to_string())?;
    assert_eq!(presence, SubidPresence::Present);
    Ok(())
}

#[test]
fn exists_maps_exit_one_to_absent() -> TestResult {
    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Exited(1));
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    let presence = invoker.check_exists("alice", SubidKind::Gid).map_err(|err| err.to_string())?;
    assert_eq!(presence, SubidPresence::Absent);
    Ok(())
}

#[test]
fn exists_rejects_other_exit_codes_and_signals() {
    let (_, diagnostics) = capture(false);
    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Exited(2));
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.check_exists("alice", SubidKind::Uid),
        Err(InvokeError::ExitStatus { code: 2, .. })
    ));

    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Signaled(9));
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.check_exists("alice", SubidKind::Uid),
        Err(InvokeError::Signaled { signal: 9, .. })
    ));

    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Unknown);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.check_exists("alice", SubidKind::Uid),
        Err(InvokeError::Abnormal { .. })
    ));
}

#[test]
fn exists_builds_minimal_command() {
    let ops = InMemorySystemOps::new()
        .with_env("LC_ALL", "C")
        .with_env("LD_LIBRARY_PATH", "/tmp")
        .with_exit(GETSUBIDS, ExitOutcome::Exited(1));
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    invoker.check_exists("alice", SubidKind::Gid).unwrap();

    let commands = ops.commands();
    assert_eq!(commands.len(), 1);
    let command = &commands[0];
    assert_eq!(command.program, PathBuf::from(GETSUBIDS));
    assert_eq!(command.arg0, "getsubids");
    assert_eq!(command.args, vec!["-g".to_string(), "alice".to_string()]);
    assert_eq!(command.env, vec![("LC_ALL", OsString::from("C"))]);
    assert_eq!(command.stdin, StdioPolicy::Null);
    assert_eq!(command.stdout, StdioPolicy::Null);
    assert_eq!(command.stderr, StdioPolicy::Null);
}

#[test]
fn exists_inherits_output_in_debug_mode() {
    let ops = InMemorySystemOps::new().with_exit(GETSUBIDS, ExitOutcome::Exited(0));
    let (sink, diagnostics) = capture(true);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    invoker.check_exists("alice", SubidKind::Uid).unwrap();
    let command = &ops.commands()[0];
    assert_eq!(command.args, vec!["alice".to_string()]);
    assert_eq!(command.stdin, StdioPolicy::Null);
    assert_eq!(command.stdout, StdioPolicy::Inherit);
    assert!(sink.contains("subid_query"));
}

#[test]
fn exists_validates_username_before_running_anything() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.check_exists("-rf", SubidKind::Uid),
        Err(InvokeError::InvalidUsername(_))
    ));
    assert!(ops.commands().is_empty());
}

#[test]
fn spawn_failure_is_reported() {
    let ops = InMemorySystemOps::new().with_spawn_error(GETSUBIDS, io::ErrorKind::NotFound);
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(invoker.check_exists("alice", SubidKind::Uid), Err(InvokeError::Spawn { .. })));
}

// ============================================================================
// SECTION: Assignment
// ============================================================================

#[test]
fn assign_runs_usermod_with_range_argument() -> TestResult {
    let ops = InMemorySystemOps::new().with_env("TZ", "UTC");
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    let outcome = invoker
        .assign_range("alice", SubidKind::Uid, 100_000, 65_536, false)
        .map_err(|err| err.to_string())?;
    assert_eq!(outcome, AssignOutcome::Applied(SubidRange::new(100_000, 65_536).unwrap()));

    let command = &ops.commands()[0];
    assert_eq!(command.program, PathBuf::from(USERMOD));
    assert_eq!(command.arg0, "usermod");
    assert_eq!(
        command.args,
        vec!["--add-subuids".to_string(), "100000-165535".to_string(), "alice".to_string()]
    );
    assert_eq!(command.env, vec![("TZ", OsString::from("UTC"))]);
    assert_eq!(command.stdin, StdioPolicy::Null);
    assert_eq!(command.stdout, StdioPolicy::Inherit);
    assert_eq!(command.stderr, StdioPolicy::Inherit);
    Ok(())
}

#[test]
fn assign_uses_group_flag_for_gid_domain() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    invoker.assign_range("bob", SubidKind::Gid, 165_536, 65_536, false).unwrap();
    assert_eq!(ops.commands()[0].args[0], "--add-subgids");
    assert_eq!(ops.commands()[0].args[1], "165536-231071");
}

#[test]
fn assign_noop_renders_command_without_running() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    let outcome = invoker.assign_range("alice", SubidKind::Uid, 100_000, 65_536, true).unwrap();
    assert_eq!(
        outcome,
        AssignOutcome::DryRun {
            range: SubidRange::new(100_000, 65_536).unwrap(),
            command: "/usr/sbin/usermod --add-subuids 100000-165535 alice".to_string(),
        }
    );
    assert!(ops.commands().is_empty());
}

#[test]
fn assign_rechecks_range_end_independently() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.assign_range("alice", SubidKind::Uid, u32::MAX - 10, 100, false),
        Err(InvokeError::Range(RangeError::EndOverflow { .. }))
    ));
    assert!(matches!(
        invoker.assign_range("alice", SubidKind::Uid, 100_000, 0, true),
        Err(InvokeError::Range(RangeError::ZeroCount))
    ));
    assert!(ops.commands().is_empty());
}

#[test]
fn assign_reports_exit_status_and_signal() {
    let (_, diagnostics) = capture(false);
    let ops = InMemorySystemOps::new().with_exit(USERMOD, ExitOutcome::Exited(6));
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    let err = invoker.assign_range("alice", SubidKind::Uid, 100_000, 10, false).unwrap_err();
    assert_eq!(err.to_string(), "/usr/sbin/usermod exited with status 6");

    let ops = InMemorySystemOps::new().with_exit(USERMOD, ExitOutcome::Signaled(15));
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    assert!(matches!(
        invoker.assign_range("alice", SubidKind::Uid, 100_000, 10, false),
        Err(InvokeError::Signaled { signal: 15, .. })
    ));
}

#[test]
fn assign_rejects_hostile_username() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics);
    for name in ["alice;reboot", "../root", "", "Alice"] {
        assert!(
            matches!(
                invoker.assign_range(name, SubidKind::Uid, 100_000, 10, false),
                Err(InvokeError::InvalidUsername(_))
            ),
            "{name}"
        );
    }
    assert!(ops.commands().is_empty());
}

#[test]
fn custom_paths_set_program_and_arg0() {
    let ops = InMemorySystemOps::new();
    let (_, diagnostics) = capture(false);
    let invoker = SubidInvoker::new(&ops, &diagnostics).with_paths(CommandPaths {
        getsubids: PathBuf::from("/opt/shadow/bin/getsubids"),
        usermod: PathBuf::from("/opt/shadow/sbin/usermod"),
    });
    invoker.assign_range("alice", SubidKind::Uid, 1, 1, false).unwrap();
    let command = &ops.commands()[0];
    assert_eq!(command.program, PathBuf::from("/opt/shadow/sbin/usermod"));
    assert_eq!(command.arg0, "usermod");
}
