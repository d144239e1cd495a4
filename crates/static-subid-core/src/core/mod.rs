// crates/static-subid-core/src/core/mod.rs
// ============================================================================
// Module: static-subid Core Types
// Description: Domain types, validators, and the range allocation engine.
// Purpose: Pure logic with no OS dependencies.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Everything in this module is pure: no file, process, or identity-database
//! access. Functions either succeed completely or return an error without
//! producing partial results.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod domain;
pub mod fs;
pub mod range;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use domain::AllocationMode;
pub use domain::SubidDomain;
pub use domain::SubidKind;
pub use domain::SubidRange;
pub use fs::FileKind;
pub use fs::FileStat;
pub use range::RangeError;
pub use range::allocate;
pub use validate::MAX_PATH_COMPONENT_LENGTH;
pub use validate::MAX_PATH_LENGTH;
pub use validate::MAX_USERNAME_LENGTH;
pub use validate::NumberError;
pub use validate::SecurityViolation;
pub use validate::ValidationError;
pub use validate::ensure_secure_dir;
pub use validate::ensure_secure_file;
pub use validate::parse_bool;
pub use validate::parse_u32_strict;
pub use validate::validate_path;
pub use validate::validate_uid_subid_overlap;
pub use validate::validate_username;
