// crates/static-subid-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Helpers
// Description: Shared fixtures for static-subid core integration tests.
// Purpose: Build capturing diagnostics and scripted hosts consistently.
// ============================================================================

//! Shared helpers for static-subid core tests.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;

use static_subid_core::DEFAULT_GETSUBIDS_PATH;
use static_subid_core::DEFAULT_USERMOD_PATH;
use static_subid_core::Diagnostics;
use static_subid_core::MemoryDiagnosticSink;

/// Result type used by fallible tests.
pub type TestResult = Result<(), String>;

/// Path of the query tool as configured by default.
pub const GETSUBIDS: &str = DEFAULT_GETSUBIDS_PATH;
/// Path of the assignment tool as configured by default.
pub const USERMOD: &str = DEFAULT_USERMOD_PATH;

/// Returns a diagnostics handle that records into memory.
pub fn capture(debug: bool) -> (Arc<MemoryDiagnosticSink>, Diagnostics) {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let diagnostics = Diagnostics::new(sink.clone(), debug);
    (sink, diagnostics)
}
