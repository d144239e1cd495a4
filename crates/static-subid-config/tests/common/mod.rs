// crates/static-subid-config/tests/common/mod.rs
// ============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for configuration loader tests.
// Purpose: Build scripted hosts and capturing diagnostics consistently.
// ============================================================================

//! Shared helpers for static-subid config tests.

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;

use static_subid_config::ConfigError;
use static_subid_config::ConfigSources;
use static_subid_config::SubidConfig;
use static_subid_config::load_configuration;
use static_subid_core::Diagnostics;
use static_subid_core::InMemorySystemOps;
use static_subid_core::MemoryDiagnosticSink;

/// Shared login policy path used by fixtures.
pub const LOGIN_DEFS: &str = "/etc/login.defs";
/// Primary configuration path used by fixtures.
pub const MAIN_CONF: &str = "/etc/static-subid.conf";
/// Drop-in directory used by fixtures.
pub const DROPIN_DIR: &str = "/etc/static-subid.conf.d";

/// Returns a diagnostics handle that records into memory.
pub fn capture(debug: bool) -> (Arc<MemoryDiagnosticSink>, Diagnostics) {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let diagnostics = Diagnostics::new(sink.clone(), debug);
    (sink, diagnostics)
}

/// Loads from the standard locations on a scripted host.
pub fn load(
    host: &InMemorySystemOps,
) -> (Arc<MemoryDiagnosticSink>, Result<SubidConfig, ConfigError>) {
    let (sink, diagnostics) = capture(true);
    let result = load_configuration(host, &ConfigSources::default(), &diagnostics);
    (sink, result)
}

/// Returns the path of a drop-in fragment.
pub fn fragment(name: &str) -> String {
    format!("{DROPIN_DIR}/{name}")
}
