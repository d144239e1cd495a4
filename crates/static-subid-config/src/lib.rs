// crates/static-subid-config/src/lib.rs
// ============================================================================
// Module: static-subid Config Library
// Description: Configuration record, defaults, and the layered loader.
// Purpose: Single source of truth for static-subid configuration semantics.
// Dependencies: static-subid-core, serde, toml
// ============================================================================

//! ## Overview
//! `static-subid-config` defines the merged configuration record and loads it
//! from `login.defs`, the primary configuration file, and a drop-in directory.
//! Every file passes an ownership and permission gate before it is parsed.
//!
//! Security posture: configuration inputs are untrusted; insecure sources are
//! ignored and an insecure drop-in directory fails the load.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod loader;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use loader::*;
