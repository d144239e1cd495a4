// crates/static-subid-core/src/diagnostics.rs
// ============================================================================
// Module: Diagnostics
// Description: Structured diagnostic events and pluggable sinks.
// Purpose: Uniform stderr reporting for warnings, errors, and debug traces.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every component reports through a [`Diagnostics`] handle instead of
//! writing to stderr directly. The handle filters debug events unless debug
//! output was requested and forwards the rest to a [`DiagnosticSink`]. The
//! production sink renders either `static-subid: <level>: <message>` lines or
//! one JSON object per line; tests capture events in memory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Program name used as the diagnostic prefix.
pub const PROGRAM_NAME: &str = "static-subid";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Verbose trace, emitted only in debug mode.
    Debug,
    /// Recoverable problem; processing continues.
    Warning,
    /// Failure of the current operation.
    Error,
}

impl DiagnosticLevel {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Rendering used by [`StderrDiagnosticSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `static-subid: <level>: <message>`.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    /// Event severity.
    pub level: DiagnosticLevel,
    /// Stable event identifier (`config_ignored`, `command_failed`, ...).
    pub event: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
}

impl DiagnosticEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(level: DiagnosticLevel, event: &'static str, message: impl Into<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            level,
            event,
            message: message.into(),
            timestamp_ms,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic event.
    fn record(&self, event: &DiagnosticEvent);
}

/// Sink that writes events to stderr.
pub struct StderrDiagnosticSink {
    /// Output rendering.
    format: LogFormat,
}

impl StderrDiagnosticSink {
    /// Creates a stderr sink with the given rendering.
    #[must_use]
    pub const fn new(format: LogFormat) -> Self {
        Self {
            format,
        }
    }
}

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        match self.format {
            LogFormat::Text => {
                let _ = writeln!(
                    std::io::stderr(),
                    "{PROGRAM_NAME}: {}: {}",
                    event.level.as_str(),
                    event.message
                );
            }
            LogFormat::Json => {
                if let Ok(payload) = serde_json::to_string(event) {
                    let _ = writeln!(std::io::stderr(), "{payload}");
                }
            }
        }
    }
}

/// Sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryDiagnosticSink {
    /// Captured events in arrival order.
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns true if any captured event has the given identifier.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.events().iter().any(|recorded| recorded.event == event)
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

/// Sink that drops every event.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Shared reporting handle carrying the sink and the debug switch.
#[derive(Clone)]
pub struct Diagnostics {
    /// Event destination.
    sink: Arc<dyn DiagnosticSink>,
    /// Whether debug events are forwarded.
    debug: bool,
}

impl Diagnostics {
    /// Creates a handle over `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>, debug: bool) -> Self {
        Self {
            sink,
            debug,
        }
    }

    /// Creates a handle that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopDiagnosticSink), false)
    }

    /// Returns true when debug events are forwarded.
    #[must_use]
    pub const fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Reports a debug trace.
    pub fn debug(&self, event: &'static str, message: impl Into<String>) {
        if self.debug {
            self.emit(DiagnosticLevel::Debug, event, message);
        }
    }

    /// Reports a recoverable problem.
    pub fn warn(&self, event: &'static str, message: impl Into<String>) {
        self.emit(DiagnosticLevel::Warning, event, message);
    }

    /// Reports a failure.
    pub fn error(&self, event: &'static str, message: impl Into<String>) {
        self.emit(DiagnosticLevel::Error, event, message);
    }

    /// Builds and records one event.
    fn emit(&self, level: DiagnosticLevel, event: &'static str, message: impl Into<String>) {
        self.sink.record(&DiagnosticEvent::new(level, event, message));
    }
}
