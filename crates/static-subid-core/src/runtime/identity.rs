// crates/static-subid-core/src/runtime/identity.rs
// ============================================================================
// Module: Identity Resolution
// Description: Resolve a username-or-UID argument to a passwd entry.
// Purpose: Produce the canonical (name, uid) pair used by the workflow.
// Dependencies: thiserror, crate::{core, interfaces, diagnostics}
// ============================================================================

//! ## Overview
//! An argument that parses as a strict unsigned integer is treated as a UID;
//! anything else must pass username validation before the identity database
//! is consulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ValidationError;
use crate::core::parse_u32_strict;
use crate::core::validate_username;
use crate::diagnostics::Diagnostics;
use crate::interfaces::LookupError;
use crate::interfaces::SystemOps;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identity resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No passwd entry for the UID.
    #[error("no user with uid {0}")]
    UnknownUid(u32),
    /// No passwd entry for the name.
    #[error("user not found: {0}")]
    UnknownUser(String),
    /// Argument is neither a UID nor a valid username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] ValidationError),
    /// Identity database lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// Passwd entry carried an empty name.
    #[error("user with uid {0} has an empty name")]
    EmptyName(u32),
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Canonical identity for one assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    /// Login name passed to the delegated tools.
    pub name: String,
    /// Primary UID used for allocation.
    pub uid: u32,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves `argument` to a passwd entry.
///
/// # Errors
///
/// Returns [`IdentityError`] when the user does not exist, the name fails
/// validation, or the lookup fails.
pub fn resolve_user(
    ops: &dyn SystemOps,
    argument: &str,
    diagnostics: &Diagnostics,
) -> Result<ResolvedUser, IdentityError> {
    if let Ok(uid) = parse_u32_strict(argument) {
        let record = ops.user_by_uid(uid)?.ok_or(IdentityError::UnknownUid(uid))?;
        if record.name.is_empty() {
            return Err(IdentityError::EmptyName(uid));
        }
        diagnostics.debug("user_resolved", format!("uid {uid} resolved to {}", record.name));
        return Ok(ResolvedUser {
            name: record.name,
            uid,
        });
    }
    validate_username(argument)?;
    let record =
        ops.user_by_name(argument)?.ok_or_else(|| IdentityError::UnknownUser(argument.to_string()))?;
    diagnostics.debug("user_resolved", format!("{argument} resolved to uid {}", record.uid));
    Ok(ResolvedUser {
        name: argument.to_string(),
        uid: record.uid,
    })
}
