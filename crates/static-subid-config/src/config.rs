// crates/static-subid-config/src/config.rs
// ============================================================================
// Module: static-subid Configuration Record
// Description: Merged configuration, defaults, per-key application, rendering.
// Purpose: Single source of truth for the recognized keys and their semantics.
// Dependencies: static-subid-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! [`SubidConfig`] is fully populated from hardcoded defaults before any file
//! is read. Sources then apply individual `KEY VALUE` pairs in priority order;
//! a rejected pair leaves the previous value untouched.
//!
//! Security posture: values originate from files that passed the ownership
//! gate but are still parsed strictly; see [`crate::loader`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Serialize;
use static_subid_core::AllocationMode;
use static_subid_core::SubidDomain;
use static_subid_core::SubidKind;
use static_subid_core::parse_bool;
use static_subid_core::parse_u32_strict;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Upper bound accepted for `SUB_UID_COUNT` and `SUB_GID_COUNT`.
pub const MAX_RANGE_COUNT: u32 = 1 << 26;
/// Default lowest UID eligible for allocation.
pub const DEFAULT_UID_MIN: u32 = 1000;
/// Default highest UID eligible for allocation.
pub const DEFAULT_UID_MAX: u32 = 60_000;
/// Default lowest subordinate ID.
pub const DEFAULT_SUBID_MIN: u32 = 100_000;
/// Default highest subordinate ID.
pub const DEFAULT_SUBID_MAX: u32 = 600_100_000;
/// Default subordinate IDs per user.
pub const DEFAULT_SUBID_COUNT: u32 = 65_536;

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Recognized configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// `UID_MIN`.
    UidMin,
    /// `UID_MAX`.
    UidMax,
    /// `SUB_UID_MIN`.
    SubUidMin,
    /// `SUB_UID_MAX`.
    SubUidMax,
    /// `SUB_UID_COUNT`.
    SubUidCount,
    /// `SUB_GID_MIN`.
    SubGidMin,
    /// `SUB_GID_MAX`.
    SubGidMax,
    /// `SUB_GID_COUNT`.
    SubGidCount,
    /// `SKIP_IF_EXISTS`.
    SkipIfExists,
    /// `ALLOW_SUBID_WRAP`.
    AllowSubidWrap,
}

impl ConfigKey {
    /// Every key in rendering order.
    pub const ALL: [Self; 10] = [
        Self::UidMin,
        Self::UidMax,
        Self::SubUidMin,
        Self::SubUidMax,
        Self::SubUidCount,
        Self::SubGidMin,
        Self::SubGidMax,
        Self::SubGidCount,
        Self::SkipIfExists,
        Self::AllowSubidWrap,
    ];

    /// Returns the on-disk spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UidMin => "UID_MIN",
            Self::UidMax => "UID_MAX",
            Self::SubUidMin => "SUB_UID_MIN",
            Self::SubUidMax => "SUB_UID_MAX",
            Self::SubUidCount => "SUB_UID_COUNT",
            Self::SubGidMin => "SUB_GID_MIN",
            Self::SubGidMax => "SUB_GID_MAX",
            Self::SubGidCount => "SUB_GID_COUNT",
            Self::SkipIfExists => "SKIP_IF_EXISTS",
            Self::AllowSubidWrap => "ALLOW_SUBID_WRAP",
        }
    }

    /// Looks up a key by its exact on-disk spelling.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }

    /// Returns true for the two per-domain count keys.
    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(self, Self::SubUidCount | Self::SubGidCount)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and application errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure that aborts the load.
    #[error("config io error: {0}")]
    Io(String),
    /// Drop-in directory failed the security gate.
    #[error("insecure config directory {path}: {reason}")]
    InsecureDirectory {
        /// Directory path.
        path: String,
        /// Violated rule.
        reason: String,
    },
    /// Value could not be parsed for its key.
    #[error("invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        /// Configuration key.
        key: ConfigKey,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },
    /// Count exceeded [`MAX_RANGE_COUNT`].
    #[error("{key} {value} exceeds defined limit of {limit}")]
    CountLimit {
        /// Configuration key.
        key: ConfigKey,
        /// Parsed value.
        value: u32,
        /// Enforced limit.
        limit: u32,
    },
    /// UID outside `[UID_MIN, UID_MAX]`.
    #[error("uid {uid} outside allowed range {min}-{max}")]
    UidOutOfRange {
        /// Primary UID.
        uid: u32,
        /// `UID_MIN`.
        min: u32,
        /// `UID_MAX`.
        max: u32,
    },
    /// Rendering failed.
    #[error("config render error: {0}")]
    Render(String),
}

// ============================================================================
// SECTION: Configuration Record
// ============================================================================

/// Output format for [`SubidConfig::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    /// One `KEY: value` line per key.
    #[default]
    Text,
    /// Pretty JSON object.
    Json,
    /// TOML table.
    Toml,
}

/// Merged static-subid configuration.
///
/// # Invariants
/// - Every field holds a defined value (defaults are applied first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubidConfig {
    /// Lowest UID eligible for allocation.
    pub uid_min: u32,
    /// Highest UID eligible for allocation.
    pub uid_max: u32,
    /// Subordinate UID pool.
    pub subuid: SubidDomain,
    /// Subordinate GID pool.
    pub subgid: SubidDomain,
    /// Skip a domain when the user already has ranges there.
    pub skip_if_exists: bool,
    /// Reduce offsets modulo the pool size instead of failing.
    pub allow_subid_wrap: bool,
}

impl Default for SubidConfig {
    fn default() -> Self {
        Self {
            uid_min: DEFAULT_UID_MIN,
            uid_max: DEFAULT_UID_MAX,
            subuid: SubidDomain::new(DEFAULT_SUBID_MIN, DEFAULT_SUBID_MAX, DEFAULT_SUBID_COUNT),
            subgid: SubidDomain::new(DEFAULT_SUBID_MIN, DEFAULT_SUBID_MAX, DEFAULT_SUBID_COUNT),
            skip_if_exists: true,
            allow_subid_wrap: false,
        }
    }
}

impl SubidConfig {
    /// Returns the pool for a domain.
    #[must_use]
    pub const fn domain(&self, kind: SubidKind) -> &SubidDomain {
        match kind {
            SubidKind::Uid => &self.subuid,
            SubidKind::Gid => &self.subgid,
        }
    }

    /// Returns the allocation mode selected by `ALLOW_SUBID_WRAP`.
    #[must_use]
    pub const fn allocation_mode(&self) -> AllocationMode {
        AllocationMode::from_allow_wrap(self.allow_subid_wrap)
    }

    /// Applies one `KEY VALUE` pair.
    ///
    /// Returns `Ok(false)` for unrecognized keys, which are ignored so that
    /// shared files such as `login.defs` can carry unrelated settings.
    /// Booleans that are not recognized keep their previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed number and
    /// [`ConfigError::CountLimit`] for a count above [`MAX_RANGE_COUNT`]. The
    /// record is unchanged on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        let Some(key) = ConfigKey::parse(key) else {
            return Ok(false);
        };
        match key {
            ConfigKey::SkipIfExists => {
                self.skip_if_exists = parse_bool(value, self.skip_if_exists);
                return Ok(true);
            }
            ConfigKey::AllowSubidWrap => {
                self.allow_subid_wrap = parse_bool(value, self.allow_subid_wrap);
                return Ok(true);
            }
            _ => {}
        }
        let parsed = parse_u32_strict(value).map_err(|err| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: err.to_string(),
        })?;
        if key.is_count() && parsed > MAX_RANGE_COUNT {
            return Err(ConfigError::CountLimit {
                key,
                value: parsed,
                limit: MAX_RANGE_COUNT,
            });
        }
        match key {
            ConfigKey::UidMin => self.uid_min = parsed,
            ConfigKey::UidMax => self.uid_max = parsed,
            ConfigKey::SubUidMin => self.subuid.min = parsed,
            ConfigKey::SubUidMax => self.subuid.max = parsed,
            ConfigKey::SubUidCount => self.subuid.count = parsed,
            ConfigKey::SubGidMin => self.subgid.min = parsed,
            ConfigKey::SubGidMax => self.subgid.max = parsed,
            ConfigKey::SubGidCount => self.subgid.count = parsed,
            ConfigKey::SkipIfExists | ConfigKey::AllowSubidWrap => {}
        }
        Ok(true)
    }

    /// Rejects a UID outside `[UID_MIN, UID_MAX]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UidOutOfRange`].
    pub const fn validate_uid(&self, uid: u32) -> Result<(), ConfigError> {
        if uid < self.uid_min || uid > self.uid_max {
            return Err(ConfigError::UidOutOfRange {
                uid,
                min: self.uid_min,
                max: self.uid_max,
            });
        }
        Ok(())
    }

    /// Renders the record in the requested format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] when serialization fails.
    pub fn render(&self, format: RenderFormat) -> Result<String, ConfigError> {
        match format {
            RenderFormat::Text => Ok(self.render_text()),
            RenderFormat::Json => serde_json::to_string_pretty(&ConfigView::from(self))
                .map_err(|err| ConfigError::Render(err.to_string())),
            RenderFormat::Toml => toml::to_string(&ConfigView::from(self))
                .map_err(|err| ConfigError::Render(err.to_string())),
        }
    }

    /// Returns the rendered value of one key.
    #[must_use]
    pub fn value_of(&self, key: ConfigKey) -> String {
        let yes_no = |flag: bool| String::from(if flag { "yes" } else { "no" });
        match key {
            ConfigKey::UidMin => self.uid_min.to_string(),
            ConfigKey::UidMax => self.uid_max.to_string(),
            ConfigKey::SubUidMin => self.subuid.min.to_string(),
            ConfigKey::SubUidMax => self.subuid.max.to_string(),
            ConfigKey::SubUidCount => self.subuid.count.to_string(),
            ConfigKey::SubGidMin => self.subgid.min.to_string(),
            ConfigKey::SubGidMax => self.subgid.max.to_string(),
            ConfigKey::SubGidCount => self.subgid.count.to_string(),
            ConfigKey::SkipIfExists => yes_no(self.skip_if_exists),
            ConfigKey::AllowSubidWrap => yes_no(self.allow_subid_wrap),
        }
    }

    /// Aligned `KEY: value` listing.
    fn render_text(&self) -> String {
        let width = ConfigKey::ALL.iter().map(|key| key.as_str().len()).max().unwrap_or(0) + 1;
        let mut out = String::new();
        for key in ConfigKey::ALL {
            let label = format!("{key}:");
            let _ = writeln!(out, "{label:<width$} {}", self.value_of(key));
        }
        out
    }
}

// ============================================================================
// SECTION: Serialization View
// ============================================================================

/// Flat, key-named projection used for JSON and TOML output.
#[derive(Serialize)]
struct ConfigView {
    /// `UID_MIN`.
    #[serde(rename = "UID_MIN")]
    uid_min: u32,
    /// `UID_MAX`.
    #[serde(rename = "UID_MAX")]
    uid_max: u32,
    /// `SUB_UID_MIN`.
    #[serde(rename = "SUB_UID_MIN")]
    sub_uid_min: u32,
    /// `SUB_UID_MAX`.
    #[serde(rename = "SUB_UID_MAX")]
    sub_uid_max: u32,
    /// `SUB_UID_COUNT`.
    #[serde(rename = "SUB_UID_COUNT")]
    sub_uid_count: u32,
    /// `SUB_GID_MIN`.
    #[serde(rename = "SUB_GID_MIN")]
    sub_gid_min: u32,
    /// `SUB_GID_MAX`.
    #[serde(rename = "SUB_GID_MAX")]
    sub_gid_max: u32,
    /// `SUB_GID_COUNT`.
    #[serde(rename = "SUB_GID_COUNT")]
    sub_gid_count: u32,
    /// `SKIP_IF_EXISTS`.
    #[serde(rename = "SKIP_IF_EXISTS")]
    skip_if_exists: bool,
    /// `ALLOW_SUBID_WRAP`.
    #[serde(rename = "ALLOW_SUBID_WRAP")]
    allow_subid_wrap: bool,
}

impl From<&SubidConfig> for ConfigView {
    fn from(config: &SubidConfig) -> Self {
        Self {
            uid_min: config.uid_min,
            uid_max: config.uid_max,
            sub_uid_min: config.subuid.min,
            sub_uid_max: config.subuid.max,
            sub_uid_count: config.subuid.count,
            sub_gid_min: config.subgid.min,
            sub_gid_max: config.subgid.max,
            sub_gid_count: config.subgid.count,
            skip_if_exists: config.skip_if_exists,
            allow_subid_wrap: config.allow_subid_wrap,
        }
    }
}
