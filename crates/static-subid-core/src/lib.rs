// crates/static-subid-core/src/lib.rs
// ============================================================================
// Module: static-subid Core Library
// Description: Public API surface for deterministic subordinate ID assignment.
// Purpose: Expose validators, range allocation, and the privileged invoker.
// Dependencies: crate::{core, interfaces, runtime, diagnostics}
// ============================================================================

//! ## Overview
//! `static-subid-core` computes deterministic subordinate UID/GID ranges from a
//! user's primary UID and delegates the actual assignment to the system's
//! already-trusted identity tools. Every OS interaction flows through the
//! [`SystemOps`] interface so the whole pipeline can be exercised against
//! [`InMemorySystemOps`] without elevated privileges.
//!
//! Security posture: configuration files, user arguments, and the process
//! environment are untrusted. Validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod diagnostics;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use diagnostics::DiagnosticEvent;
pub use diagnostics::DiagnosticLevel;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::Diagnostics;
pub use diagnostics::LogFormat;
pub use diagnostics::MemoryDiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::PROGRAM_NAME;
pub use diagnostics::StderrDiagnosticSink;
pub use interfaces::CommandSpec;
pub use interfaces::ExitOutcome;
pub use interfaces::LookupError;
pub use interfaces::OpenedFile;
pub use interfaces::StdioPolicy;
pub use interfaces::SystemOps;
pub use interfaces::UserRecord;
pub use runtime::AssignOutcome;
pub use runtime::CommandPaths;
pub use runtime::DEFAULT_GETSUBIDS_PATH;
pub use runtime::DEFAULT_USERMOD_PATH;
pub use runtime::ENV_ALLOW_LIST;
pub use runtime::IdentityError;
pub use runtime::InMemorySystemOps;
pub use runtime::InvokeError;
pub use runtime::OsSystemOps;
pub use runtime::ResolvedUser;
pub use runtime::SubidInvoker;
pub use runtime::SubidPresence;
pub use runtime::build_safe_environment;
pub use runtime::resolve_user;
