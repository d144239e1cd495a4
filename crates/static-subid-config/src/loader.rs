// crates/static-subid-config/src/loader.rs
// ============================================================================
// Module: static-subid Configuration Loader
// Description: Security-gated, layered loading of configuration sources.
// Purpose: Merge login.defs, the primary file, and drop-ins into one record.
// Dependencies: static-subid-core
// ============================================================================

//! ## Overview
//! Sources are applied in a fixed order, key by key, with the last write
//! winning:
//!
//! 1. hardcoded defaults,
//! 2. `/etc/login.defs`,
//! 3. `/etc/static-subid.conf`,
//! 4. `/etc/static-subid.conf.d/*.conf` in byte order.
//!
//! A missing source is skipped. A file that fails the ownership gate is
//! skipped with an error event. Only an insecure or unreadable drop-in
//! directory aborts the load.
//!
//! Security posture: each file is opened first and its metadata is taken from
//! the open handle, so the object that was checked is the object that is read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use static_subid_core::Diagnostics;
use static_subid_core::OpenedFile;
use static_subid_core::SystemOps;
use static_subid_core::ensure_secure_dir;
use static_subid_core::ensure_secure_file;
use static_subid_core::validate_path;

use crate::config::ConfigError;
use crate::config::ConfigKey;
use crate::config::SubidConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Shared system login policy file.
pub const LOGIN_DEFS_PATH: &str = "/etc/login.defs";
/// Primary static-subid configuration file.
pub const CONFIG_FILE_PATH: &str = "/etc/static-subid.conf";
/// Drop-in fragment directory.
pub const CONFIG_DROPIN_DIR_PATH: &str = "/etc/static-subid.conf.d";
/// Required drop-in filename suffix.
pub const CONFIG_FRAGMENT_SUFFIX: &str = ".conf";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum configuration line length in bytes (excluding the newline).
pub const MAX_LINE_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Ordered configuration sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSources {
    /// Files applied in order before the drop-in directory.
    pub files: Vec<PathBuf>,
    /// Drop-in directory applied last.
    pub dropin_dir: PathBuf,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            files: vec![PathBuf::from(LOGIN_DEFS_PATH), PathBuf::from(CONFIG_FILE_PATH)],
            dropin_dir: PathBuf::from(CONFIG_DROPIN_DIR_PATH),
        }
    }
}

impl SubidConfig {
    /// Loads the configuration from the standard system locations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the drop-in directory is insecure or
    /// cannot be read.
    pub fn load(ops: &dyn SystemOps, diagnostics: &Diagnostics) -> Result<Self, ConfigError> {
        load_configuration(ops, &ConfigSources::default(), diagnostics)
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and merges every source in `sources`.
///
/// # Errors
///
/// Returns [`ConfigError::InsecureDirectory`] when the drop-in directory fails
/// validation or the security gate, and [`ConfigError::Io`] when it exists but
/// cannot be inspected or listed.
pub fn load_configuration(
    ops: &dyn SystemOps,
    sources: &ConfigSources,
    diagnostics: &Diagnostics,
) -> Result<SubidConfig, ConfigError> {
    let mut config = SubidConfig::default();
    if diagnostics.debug_enabled() {
        diagnostics.debug("config_defaults", "loading configuration (defaults set)");
        trace_config(&config, diagnostics);
    }
    for path in &sources.files {
        apply_file(ops, path, &mut config, diagnostics);
    }
    apply_dropin_dir(ops, &sources.dropin_dir, &mut config, diagnostics)?;
    if diagnostics.debug_enabled() {
        diagnostics.debug("config_loaded", "effective configuration");
        trace_config(&config, diagnostics);
    }
    Ok(config)
}

/// Applies one file if it exists and passes the security gate.
fn apply_file(
    ops: &dyn SystemOps,
    path: &Path,
    config: &mut SubidConfig,
    diagnostics: &Diagnostics,
) {
    let Some(file) = open_secure(ops, path, diagnostics) else {
        return;
    };
    let Some(bytes) = read_bounded(file, path, diagnostics) else {
        return;
    };
    diagnostics.debug("config_parse", format!("parsing config file: {}", path.display()));
    for raw in bytes.split(|byte| *byte == b'\n') {
        if raw.len() > MAX_LINE_LENGTH {
            diagnostics.debug(
                "config_line_skipped",
                format!("skipping over-long line in {}", path.display()),
            );
            continue;
        }
        // Comments are dropped as bytes so their encoding never matters.
        let uncommented = raw.split(|byte| *byte == b'#').next().unwrap_or_default();
        let Ok(line) = std::str::from_utf8(uncommented) else {
            diagnostics.debug(
                "config_line_skipped",
                format!("skipping non-utf-8 line in {}", path.display()),
            );
            continue;
        };
        apply_line(config, line, path, diagnostics);
    }
}

/// Opens `path` and checks the open handle's type, owner, and mode.
fn open_secure(
    ops: &dyn SystemOps,
    path: &Path,
    diagnostics: &Diagnostics,
) -> Option<Box<dyn OpenedFile>> {
    if let Err(err) = validate_path(path) {
        diagnostics.error("config_path_invalid", format!("invalid config path: {err}"));
        return None;
    }
    diagnostics.debug("config_open", format!("opening config file: {}", path.display()));
    let file = match ops.open_read(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            diagnostics.debug(
                "config_missing",
                format!("config file does not exist: {}", path.display()),
            );
            return None;
        }
        Err(err) => {
            diagnostics.error("config_open_failed", format!("cannot open {}: {err}", path.display()));
            return None;
        }
    };
    let stat = match file.stat() {
        Ok(stat) => stat,
        Err(err) => {
            diagnostics.error("config_stat_failed", format!("cannot fstat {}: {err}", path.display()));
            return None;
        }
    };
    if let Err(violation) = ensure_secure_file(&stat) {
        diagnostics.error(
            "config_insecure",
            format!("ignoring config file {}: {violation}", path.display()),
        );
        return None;
    }
    Some(file)
}

/// Reads an already-vetted handle up to [`MAX_CONFIG_FILE_SIZE`].
fn read_bounded(
    file: Box<dyn OpenedFile>,
    path: &Path,
    diagnostics: &Diagnostics,
) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    if let Err(err) = file.take(MAX_CONFIG_FILE_SIZE + 1).read_to_end(&mut bytes) {
        diagnostics.error("config_read_failed", format!("cannot read {}: {err}", path.display()));
        return None;
    }
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_CONFIG_FILE_SIZE {
        diagnostics.error(
            "config_too_large",
            format!(
                "ignoring config file {}: exceeds {MAX_CONFIG_FILE_SIZE} bytes",
                path.display()
            ),
        );
        return None;
    }
    Some(bytes)
}

/// Applies one raw line to the record.
fn apply_line(config: &mut SubidConfig, line: &str, path: &Path, diagnostics: &Diagnostics) {
    let clean = normalize_config_line(line);
    if clean.is_empty() {
        return;
    }
    let Some((key, value)) = split_key_value(clean) else {
        diagnostics.debug("config_line_skipped", format!("skipping key without value: {clean}"));
        return;
    };
    match config.apply(key, value) {
        Ok(true) => {
            diagnostics.debug("config_value", format!("{}: {key} = {value}", path.display()));
        }
        Ok(false) => {}
        Err(err @ ConfigError::CountLimit { .. }) => {
            diagnostics.error("config_value_rejected", format!("file {} {err}", path.display()));
        }
        Err(err) => {
            diagnostics.debug("config_value_ignored", format!("{}: {err}", path.display()));
        }
    }
}

/// Emits the record one key per debug event.
fn trace_config(config: &SubidConfig, diagnostics: &Diagnostics) {
    for key in ConfigKey::ALL {
        diagnostics.debug("config_value", format!("  {key}: {}", config.value_of(key)));
    }
}

// ============================================================================
// SECTION: Drop-In Directory
// ============================================================================

/// Gates, scans, and applies the drop-in directory.
fn apply_dropin_dir(
    ops: &dyn SystemOps,
    dir: &Path,
    config: &mut SubidConfig,
    diagnostics: &Diagnostics,
) -> Result<(), ConfigError> {
    validate_path(dir).map_err(|err| ConfigError::InsecureDirectory {
        path: dir.display().to_string(),
        reason: err.to_string(),
    })?;
    match ops.stat(dir) {
        Ok(stat) => ensure_secure_dir(&stat).map_err(|violation| {
            diagnostics.error(
                "config_dir_insecure",
                format!("config directory {} is insecure: {violation}", dir.display()),
            );
            ConfigError::InsecureDirectory {
                path: dir.display().to_string(),
                reason: violation.to_string(),
            }
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            diagnostics.debug(
                "config_dir_missing",
                format!("config directory does not exist: {}", dir.display()),
            );
            return Ok(());
        }
        Err(err) => {
            return Err(ConfigError::Io(format!("cannot stat {}: {err}", dir.display())));
        }
    }
    diagnostics.debug("config_dir_scan", format!("scanning config directory: {}", dir.display()));
    let entries = match ops.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(ConfigError::Io(format!("cannot scan directory {}: {err}", dir.display())));
        }
    };
    let mut names: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| match entry.into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                diagnostics.debug(
                    "config_fragment_rejected",
                    format!("skipping non-utf-8 filename: {}", raw.to_string_lossy()),
                );
                None
            }
        })
        .filter(|name| is_config_fragment_name(name))
        .collect();
    names.sort_unstable();
    if !names.is_empty() {
        diagnostics.debug(
            "config_dir_found",
            format!("found {} config file(s) in {}", names.len(), dir.display()),
        );
    }
    for name in names {
        if let Some(hazard) = fragment_name_hazard(&name) {
            diagnostics.debug(
                "config_fragment_rejected",
                format!("skipping filename with {hazard}: {name}"),
            );
            continue;
        }
        let path = dir.join(&name);
        if let Err(err) = validate_path(&path) {
            diagnostics.error("config_path_invalid", format!("invalid config path: {err}"));
            continue;
        }
        diagnostics.debug("config_fragment", format!("processing config file: {}", path.display()));
        apply_file(ops, &path, config, diagnostics);
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Strips a trailing `#` comment and surrounding whitespace.
#[must_use]
pub fn normalize_config_line(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content).trim()
}

/// Splits a normalized line at the first whitespace run.
///
/// Returns `None` when there is no value after the key.
#[must_use]
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = line.split_once(char::is_whitespace)?;
    let value = rest.trim_start();
    if value.is_empty() { None } else { Some((key, value)) }
}

/// Returns true when a directory entry name qualifies as a drop-in fragment.
///
/// The name must not start with `.`, must not contain `/`, and must end in
/// [`CONFIG_FRAGMENT_SUFFIX`] with a non-empty stem.
#[must_use]
pub fn is_config_fragment_name(name: &str) -> bool {
    !name.starts_with('.')
        && !name.contains('/')
        && name.len() > CONFIG_FRAGMENT_SUFFIX.len()
        && name.ends_with(CONFIG_FRAGMENT_SUFFIX)
}

/// Second, independent check on a fragment name before it is joined.
///
/// Returns the hazard found, if any.
#[must_use]
pub fn fragment_name_hazard(name: &str) -> Option<&'static str> {
    if name.contains('/') {
        return Some("path separator");
    }
    if name.starts_with("..") {
        return Some("path traversal");
    }
    None
}
