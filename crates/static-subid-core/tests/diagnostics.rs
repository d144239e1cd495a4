// crates/static-subid-core/tests/diagnostics.rs
// ============================================================================
// Module: Diagnostics Tests
// Description: Debug filtering and event serialization.
// Purpose: Ensure debug traces are gated and JSON events stay stable.
// ============================================================================

//! Diagnostics handle and sink tests.

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

use common::capture;
use serde_json::Value;
use static_subid_core::DiagnosticEvent;
use static_subid_core::DiagnosticLevel;
use static_subid_core::Diagnostics;

#[test]
fn debug_events_are_dropped_unless_enabled() {
    let (sink, diagnostics) = capture(false);
    diagnostics.debug("trace", "hidden");
    diagnostics.warn("config_ignored", "shown");
    diagnostics.error("command_failed", "shown too");
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].level, DiagnosticLevel::Warning);
    assert_eq!(events[1].level, DiagnosticLevel::Error);
    assert!(!sink.contains("trace"));
}

#[test]
fn debug_events_pass_when_enabled() {
    let (sink, diagnostics) = capture(true);
    assert!(diagnostics.debug_enabled());
    diagnostics.debug("trace", "visible");
    assert!(sink.contains("trace"));
    assert_eq!(sink.events()[0].message, "visible");
}

#[test]
fn disabled_handle_swallows_everything() {
    let diagnostics = Diagnostics::disabled();
    assert!(!diagnostics.debug_enabled());
    diagnostics.error("command_failed", "nobody listens");
}

#[test]
fn events_serialize_with_lowercase_level() {
    let event = DiagnosticEvent::new(DiagnosticLevel::Warning, "config_ignored", "bad owner");
    let value: Value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["level"], "warning");
    assert_eq!(value["event"], "config_ignored");
    assert_eq!(value["message"], "bad owner");
    assert!(value["timestamp_ms"].is_number());
}
