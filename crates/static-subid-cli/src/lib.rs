// crates/static-subid-cli/src/lib.rs
// ============================================================================
// Module: static-subid CLI Library
// Description: Message catalog and assignment workflow behind the binary.
// Purpose: Keep the binary thin and the workflow testable without a host.
// Dependencies: static-subid-core, static-subid-config
// ============================================================================

//! ## Overview
//! The `static-subid` binary parses arguments and maps results to exit codes;
//! everything else lives here so it can run against an in-memory host.
//! Security posture: the user argument is untrusted and is validated before
//! any lookup or command construction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
#[cfg(test)]
#[path = "tests/i18n.rs"]
mod i18n_tests;
pub mod workflow;
