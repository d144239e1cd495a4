// crates/static-subid-core/src/runtime/mod.rs
// ============================================================================
// Module: static-subid Runtime
// Description: Host bindings, identity resolution, and the command invoker.
// Purpose: Everything that touches (or simulates) the operating system.
// Dependencies: crate::{core, interfaces, diagnostics}
// ============================================================================

//! ## Overview
//! Runtime components consume [`crate::interfaces::SystemOps`] and never
//! reach the host any other way.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identity;
pub mod invoker;
pub mod memory;
pub mod os;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identity::IdentityError;
pub use identity::ResolvedUser;
pub use identity::resolve_user;
pub use invoker::AssignOutcome;
pub use invoker::CommandPaths;
pub use invoker::DEFAULT_GETSUBIDS_PATH;
pub use invoker::DEFAULT_USERMOD_PATH;
pub use invoker::ENV_ALLOW_LIST;
pub use invoker::InvokeError;
pub use invoker::SubidInvoker;
pub use invoker::SubidPresence;
pub use invoker::build_safe_environment;
pub use memory::InMemorySystemOps;
pub use os::OsSystemOps;
