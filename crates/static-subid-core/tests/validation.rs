// crates/static-subid-core/tests/validation.rs
// ============================================================================
// Module: Validator Tests
// Description: Strict parsing, path, username, overlap, and ownership checks.
// Purpose: Ensure every validator rejects hostile input and accepts clean input.
// ============================================================================

//! Validator unit tests for static-subid core.

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

use std::path::Path;

use proptest::prelude::*;
use static_subid_core::FileKind;
use static_subid_core::FileStat;
use static_subid_core::MAX_PATH_LENGTH;
use static_subid_core::MAX_USERNAME_LENGTH;
use static_subid_core::NumberError;
use static_subid_core::SecurityViolation;
use static_subid_core::SubidDomain;
use static_subid_core::SubidKind;
use static_subid_core::ValidationError;
use static_subid_core::ensure_secure_dir;
use static_subid_core::ensure_secure_file;
use static_subid_core::parse_bool;
use static_subid_core::parse_u32_strict;
use static_subid_core::validate_path;
use static_subid_core::validate_uid_subid_overlap;
use static_subid_core::validate_username;

// ============================================================================
// SECTION: Numbers
// ============================================================================

#[test]
fn strict_parse_accepts_plain_digits() {
    assert_eq!(parse_u32_strict("0"), Ok(0));
    assert_eq!(parse_u32_strict("65536"), Ok(65_536));
    assert_eq!(parse_u32_strict("4294967295"), Ok(u32::MAX));
}

#[test]
fn strict_parse_accepts_leading_zeros() {
    assert_eq!(parse_u32_strict("000"), Ok(0));
    assert_eq!(parse_u32_strict("0042"), Ok(42));
}

#[test]
fn strict_parse_rejects_empty_and_signs() {
    assert_eq!(parse_u32_strict(""), Err(NumberError::Empty));
    assert!(matches!(parse_u32_strict("-1"), Err(NumberError::Signed(_))));
    assert!(matches!(parse_u32_strict("+1"), Err(NumberError::Signed(_))));
    assert!(matches!(parse_u32_strict("-"), Err(NumberError::Signed(_))));
}

#[test]
fn strict_parse_rejects_whitespace_and_garbage() {
    assert!(matches!(parse_u32_strict(" 1"), Err(NumberError::LeadingWhitespace(_))));
    assert!(matches!(parse_u32_strict("\t1"), Err(NumberError::LeadingWhitespace(_))));
    assert!(matches!(parse_u32_strict("1 "), Err(NumberError::NotNumeric(_))));
    assert!(matches!(parse_u32_strict("12a"), Err(NumberError::NotNumeric(_))));
    assert!(matches!(parse_u32_strict("0x10"), Err(NumberError::NotNumeric(_))));
    assert!(matches!(parse_u32_strict("1e3"), Err(NumberError::NotNumeric(_))));
}

#[test]
fn strict_parse_rejects_values_above_u32() {
    assert!(matches!(parse_u32_strict("4294967296"), Err(NumberError::OutOfRange(_))));
    assert!(matches!(parse_u32_strict("99999999999999999999"), Err(NumberError::OutOfRange(_))));
}

proptest! {
    #[test]
    fn strict_parse_matches_display(value in any::<u32>()) {
        prop_assert_eq!(parse_u32_strict(&value.to_string()), Ok(value));
    }

    #[test]
    fn strict_parse_never_panics(input in ".{0,24}") {
        let _ = parse_u32_strict(&input);
    }
}

#[test]
fn bool_parse_is_case_insensitive() {
    assert!(parse_bool("YES", false));
    assert!(parse_bool("True", false));
    assert!(parse_bool("1", false));
    assert!(!parse_bool("no", true));
    assert!(!parse_bool("FALSE", true));
    assert!(!parse_bool("0", true));
}

#[test]
fn bool_parse_keeps_default_for_unknown_values() {
    assert!(parse_bool("maybe", true));
    assert!(!parse_bool("maybe", false));
    assert!(!parse_bool("", false));
    assert!(parse_bool("on", true));
}

// ============================================================================
// SECTION: Paths
// ============================================================================

#[test]
fn path_accepts_absolute_config_paths() {
    assert_eq!(validate_path(Path::new("/etc/login.defs")), Ok(()));
    assert_eq!(validate_path(Path::new("/etc/static-subid.conf.d/10-site.conf")), Ok(()));
    assert_eq!(validate_path(Path::new("/")), Ok(()));
}

#[test]
fn path_rejects_empty_and_relative() {
    assert_eq!(validate_path(Path::new("")), Err(ValidationError::EmptyPath));
    assert!(matches!(
        validate_path(Path::new("etc/login.defs")),
        Err(ValidationError::RelativePath(_))
    ));
}

#[test]
fn path_rejects_parent_traversal() {
    assert!(matches!(
        validate_path(Path::new("/etc/../shadow")),
        Err(ValidationError::PathTraversal(_))
    ));
    assert!(matches!(validate_path(Path::new("/etc/..")), Err(ValidationError::PathTraversal(_))));
}

#[test]
fn path_allows_dotted_names_that_are_not_traversal() {
    assert_eq!(validate_path(Path::new("/etc/..hidden")), Ok(()));
    assert_eq!(validate_path(Path::new("/etc/a..b")), Ok(()));
}

#[test]
fn path_rejects_overlong_input() {
    let long = format!("/{}", "a/".repeat(MAX_PATH_LENGTH / 2));
    assert!(matches!(validate_path(Path::new(&long)), Err(ValidationError::PathTooLong { .. })));
    let component = format!("/etc/{}", "a".repeat(300));
    assert_eq!(validate_path(Path::new(&component)), Err(ValidationError::PathComponentTooLong));
}

// ============================================================================
// SECTION: Usernames
// ============================================================================

#[test]
fn username_accepts_conventional_names() {
    for name in ["alice", "_svc", "build-bot", "user.name", "a1", "machine$", "x"] {
        assert_eq!(validate_username(name), Ok(()), "{name}");
    }
}

#[test]
fn username_rejects_bad_first_character() {
    for name in ["1alice", "-alice", ".alice", "Alice", "$"] {
        assert!(
            matches!(validate_username(name), Err(ValidationError::UsernameCharacter { .. })),
            "{name}"
        );
    }
}

#[test]
fn username_rejects_separators_and_uppercase() {
    for name in ["al/ice", "al;ice", "alIce", "al ice", "al$ice", "alice$$"] {
        assert!(
            matches!(validate_username(name), Err(ValidationError::UsernameCharacter { .. })),
            "{name}"
        );
    }
}

#[test]
fn username_rejects_trailing_hyphen() {
    assert!(matches!(validate_username("alice-"), Err(ValidationError::UsernameTrailingHyphen(_))));
}

#[test]
fn username_enforces_length_limit() {
    assert_eq!(validate_username(""), Err(ValidationError::EmptyUsername));
    let max_ok = "a".repeat(MAX_USERNAME_LENGTH - 1);
    assert_eq!(validate_username(&max_ok), Ok(()));
    let too_long = "a".repeat(MAX_USERNAME_LENGTH);
    assert!(matches!(validate_username(&too_long), Err(ValidationError::UsernameTooLong { .. })));
}

// ============================================================================
// SECTION: Overlap
// ============================================================================

#[test]
fn overlap_rejects_uid_inside_pool_bounds() {
    let pool = SubidDomain::new(100_000, 200_000, 65_536);
    for uid in [100_000, 150_000, 200_000] {
        assert!(matches!(
            validate_uid_subid_overlap(uid, SubidKind::Uid, &pool),
            Err(ValidationError::UidOverlap { .. })
        ));
    }
}

#[test]
fn overlap_accepts_uid_outside_pool() {
    let pool = SubidDomain::new(100_000, 200_000, 65_536);
    assert_eq!(validate_uid_subid_overlap(99_999, SubidKind::Gid, &pool), Ok(()));
    assert_eq!(validate_uid_subid_overlap(200_001, SubidKind::Gid, &pool), Ok(()));
}

// ============================================================================
// SECTION: Ownership
// ============================================================================

#[test]
fn secure_file_requires_root_owned_regular_file() {
    assert_eq!(ensure_secure_file(&FileStat::root_file(0o644)), Ok(()));
    assert_eq!(ensure_secure_file(&FileStat::root_file(0o600)), Ok(()));
    assert_eq!(
        ensure_secure_file(&FileStat::new(FileKind::Regular, 1000, 0o644)),
        Err(SecurityViolation::NotRootOwned(1000))
    );
    assert_eq!(
        ensure_secure_file(&FileStat::root_file(0o646)),
        Err(SecurityViolation::WorldWritable(0o646))
    );
}

#[test]
fn secure_file_rejects_special_files() {
    for kind in [FileKind::Directory, FileKind::Fifo, FileKind::CharDevice, FileKind::Socket] {
        assert_eq!(
            ensure_secure_file(&FileStat::new(kind, 0, 0o644)),
            Err(SecurityViolation::NotRegular(kind))
        );
    }
}

#[test]
fn secure_dir_checks_kind_owner_and_mode() {
    assert_eq!(ensure_secure_dir(&FileStat::root_dir(0o755)), Ok(()));
    assert_eq!(
        ensure_secure_dir(&FileStat::root_file(0o644)),
        Err(SecurityViolation::NotDirectory(FileKind::Regular))
    );
    assert_eq!(
        ensure_secure_dir(&FileStat::new(FileKind::Directory, 42, 0o755)),
        Err(SecurityViolation::NotRootOwned(42))
    );
    assert_eq!(
        ensure_secure_dir(&FileStat::root_dir(0o777)),
        Err(SecurityViolation::WorldWritable(0o777))
    );
}

#[test]
fn group_writable_is_accepted() {
    assert_eq!(ensure_secure_file(&FileStat::root_file(0o664)), Ok(()));
    assert_eq!(ensure_secure_dir(&FileStat::root_dir(0o775)), Ok(()));
}
