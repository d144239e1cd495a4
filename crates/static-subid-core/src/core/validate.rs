// crates/static-subid-core/src/core/validate.rs
// ============================================================================
// Module: Input Validators
// Description: Strict number parsing, path and username validation, ownership checks.
// Purpose: Fail-closed gatekeeping for every untrusted string and file.
// Dependencies: thiserror, crate::core::{domain, fs}
// ============================================================================

//! ## Overview
//! Validators in this module are pure functions over untrusted input. They
//! never consult the filesystem or the identity database; callers supply the
//! metadata snapshot to check. Every check rejects rather than repairs.
//!
//! Security posture: configuration values, usernames, and file metadata are
//! attacker-influenced and must be validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::os::unix::ffi::OsStrExt;
use std::path::Component;
use std::path::Path;

use thiserror::Error;

use crate::core::domain::SubidDomain;
use crate::core::domain::SubidKind;
use crate::core::fs::FileKind;
use crate::core::fs::FileStat;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum total path length in bytes (exclusive, mirrors `PATH_MAX`).
pub const MAX_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum username length in bytes (exclusive, mirrors `LOGIN_NAME_MAX`).
pub const MAX_USERNAME_LENGTH: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Strict unsigned integer parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    /// Input was empty.
    #[error("empty numeric value")]
    Empty,
    /// Input carried a sign character.
    #[error("signed numeric value not allowed: {0}")]
    Signed(String),
    /// Input started with whitespace.
    #[error("leading whitespace in numeric value: {0}")]
    LeadingWhitespace(String),
    /// Input contained a non-digit character.
    #[error("non-digit character in numeric value: {0}")]
    NotNumeric(String),
    /// Value exceeds `u32::MAX`.
    #[error("numeric value out of range: {0}")]
    OutOfRange(String),
}

/// Path, username, and identifier validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Path was empty.
    #[error("path must not be empty")]
    EmptyPath,
    /// Path exceeded the total length limit.
    #[error("path exceeds length limit ({length} >= {MAX_PATH_LENGTH})")]
    PathTooLong {
        /// Observed length in bytes.
        length: usize,
    },
    /// A path component exceeded the component length limit.
    #[error("path contains an overlong component")]
    PathComponentTooLong,
    /// Path was not absolute.
    #[error("path must be absolute: {0}")]
    RelativePath(String),
    /// Path contained a parent-directory traversal.
    #[error("path contains parent traversal: {0}")]
    PathTraversal(String),
    /// Username was empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeded the length limit.
    #[error("username exceeds length limit ({length} >= {MAX_USERNAME_LENGTH})")]
    UsernameTooLong {
        /// Observed length in bytes.
        length: usize,
    },
    /// Username contained a forbidden or out-of-charset character.
    #[error("invalid character {character:?} in username {username}")]
    UsernameCharacter {
        /// Offending username.
        username: String,
        /// Offending character.
        character: char,
    },
    /// Username ended with a hyphen.
    #[error("username must not end with '-': {0}")]
    UsernameTrailingHyphen(String),
    /// Primary UID falls inside a subordinate pool.
    #[error("uid {uid} overlaps {kind} range {min}-{max}")]
    UidOverlap {
        /// Primary UID.
        uid: u32,
        /// Domain whose pool contains the UID.
        kind: SubidKind,
        /// Pool minimum.
        min: u32,
        /// Pool maximum.
        max: u32,
    },
}

/// Ownership and permission gate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SecurityViolation {
    /// Expected a regular file.
    #[error("not a regular file ({0})")]
    NotRegular(FileKind),
    /// Expected a directory.
    #[error("not a directory ({0})")]
    NotDirectory(FileKind),
    /// Object was not owned by root.
    #[error("not owned by root (uid {0})")]
    NotRootOwned(u32),
    /// Object was writable by "other".
    #[error("world-writable (mode {0:o})")]
    WorldWritable(u32),
}

// ============================================================================
// SECTION: Numbers
// ============================================================================

/// Parses an unsigned 32-bit decimal value with no leniency.
///
/// Rejects empty input, sign characters, leading whitespace, any non-digit,
/// and values above `u32::MAX`. Leading zeros are accepted.
///
/// # Errors
///
/// Returns [`NumberError`] describing the first rule the input breaks.
pub fn parse_u32_strict(input: &str) -> Result<u32, NumberError> {
    let Some(first) = input.chars().next() else {
        return Err(NumberError::Empty);
    };
    if first == '-' || first == '+' {
        return Err(NumberError::Signed(input.to_string()));
    }
    if first.is_whitespace() {
        return Err(NumberError::LeadingWhitespace(input.to_string()));
    }
    let mut value: u32 = 0;
    for byte in input.bytes() {
        if !byte.is_ascii_digit() {
            return Err(NumberError::NotNumeric(input.to_string()));
        }
        value = value
            .checked_mul(10)
            .and_then(|scaled| scaled.checked_add(u32::from(byte - b'0')))
            .ok_or_else(|| NumberError::OutOfRange(input.to_string()))?;
    }
    Ok(value)
}

/// Interprets a configuration boolean, falling back to `default`.
///
/// Accepts `yes`/`true`/`1` and `no`/`false`/`0`, case-insensitively.
#[must_use]
pub fn parse_bool(input: &str, default: bool) -> bool {
    if input.eq_ignore_ascii_case("yes") || input.eq_ignore_ascii_case("true") || input == "1" {
        return true;
    }
    if input.eq_ignore_ascii_case("no") || input.eq_ignore_ascii_case("false") || input == "0" {
        return false;
    }
    default
}

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Validates that a path is absolute, bounded, and free of `..` traversal.
///
/// # Errors
///
/// Returns [`ValidationError`] when the path is empty, too long, relative,
/// or contains a parent-directory component.
pub fn validate_path(path: &Path) -> Result<(), ValidationError> {
    let bytes = path.as_os_str().as_bytes();
    if bytes.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if bytes.len() >= MAX_PATH_LENGTH {
        return Err(ValidationError::PathTooLong {
            length: bytes.len(),
        });
    }
    if bytes.first() != Some(&b'/') {
        return Err(ValidationError::RelativePath(path.display().to_string()));
    }
    if bytes.windows(4).any(|window| window == b"/../") || bytes.ends_with(b"/..") {
        return Err(ValidationError::PathTraversal(path.display().to_string()));
    }
    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(ValidationError::PathTraversal(path.display().to_string()));
            }
            Component::Normal(name) if name.len() > MAX_PATH_COMPONENT_LENGTH => {
                return Err(ValidationError::PathComponentTooLong);
            }
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Usernames
// ============================================================================

/// Validates a username against the conservative POSIX-like charset.
///
/// Rules: non-empty, shorter than [`MAX_USERNAME_LENGTH`], first character
/// in `[a-z_]`, remaining characters in `[a-z0-9._-]`, an optional trailing
/// `$`, and no trailing `-`.
///
/// # Errors
///
/// Returns [`ValidationError`] naming the violated rule.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if username.len() >= MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong {
            length: username.len(),
        });
    }
    let last_index = username.chars().count() - 1;
    for (index, character) in username.chars().enumerate() {
        let allowed = match (index, character) {
            (_, '/' | ';') => false,
            (0, c) => c.is_ascii_lowercase() || c == '_',
            (i, '$') => i == last_index,
            (_, c) => c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'),
        };
        if !allowed {
            return Err(ValidationError::UsernameCharacter {
                username: username.to_string(),
                character,
            });
        }
    }
    if username.ends_with('-') {
        return Err(ValidationError::UsernameTrailingHyphen(username.to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Rejects a primary UID that lies inside a subordinate pool.
///
/// # Errors
///
/// Returns [`ValidationError::UidOverlap`] when `min <= uid <= max`.
pub fn validate_uid_subid_overlap(
    uid: u32,
    kind: SubidKind,
    domain: &SubidDomain,
) -> Result<(), ValidationError> {
    if domain.contains(uid) {
        return Err(ValidationError::UidOverlap {
            uid,
            kind,
            min: domain.min,
            max: domain.max,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Ownership
// ============================================================================

/// Requires a root-owned regular file that "other" cannot write.
///
/// # Errors
///
/// Returns the first [`SecurityViolation`] found.
pub const fn ensure_secure_file(stat: &FileStat) -> Result<(), SecurityViolation> {
    if !matches!(stat.kind, FileKind::Regular) {
        return Err(SecurityViolation::NotRegular(stat.kind));
    }
    ensure_root_controlled(stat)
}

/// Requires a root-owned directory that "other" cannot write.
///
/// # Errors
///
/// Returns the first [`SecurityViolation`] found.
pub const fn ensure_secure_dir(stat: &FileStat) -> Result<(), SecurityViolation> {
    if !matches!(stat.kind, FileKind::Directory) {
        return Err(SecurityViolation::NotDirectory(stat.kind));
    }
    ensure_root_controlled(stat)
}

/// Shared owner and permission checks.
const fn ensure_root_controlled(stat: &FileStat) -> Result<(), SecurityViolation> {
    if stat.uid != 0 {
        return Err(SecurityViolation::NotRootOwned(stat.uid));
    }
    if stat.is_world_writable() {
        return Err(SecurityViolation::WorldWritable(stat.mode));
    }
    Ok(())
}
