//! Structured JSON logger
//!
//! - One log line = one event, written synchronously, no buffering
//! - Deterministic key ordering: component, event, severity first, then
//!   remaining fields alphabetically
//! - Severities are explicit; there is no level filtering in the core

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Debug-level detail
    Trace,
    /// Normal operations
    Info,
    /// Recoverable issues
    Warn,
    /// Operation failures
    Error,
}

impl LogSeverity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Info => "INFO",
            LogSeverity::Warn => "WARN",
            LogSeverity::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A component-tagged structured logger.
///
/// Every subsystem creates its own logger; the component tag makes one
/// store's interleaved output attributable.
#[derive(Debug, Clone)]
pub struct Logger {
    /// Component tag emitted with every event
    component: &'static str,
}

impl Logger {
    /// Creates a logger for the given component.
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Logs an informational event.
    pub fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.emit(LogSeverity::Info, event, fields, &mut io::stdout());
    }

    /// Logs a recoverable issue.
    pub fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.emit(LogSeverity::Warn, event, fields, &mut io::stderr());
    }

    /// Logs an operation failure.
    pub fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.emit(LogSeverity::Error, event, fields, &mut io::stderr());
    }

    /// Renders one event as a single JSON line.
    fn emit<W: Write>(
        &self,
        severity: LogSeverity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::render(self.component, severity, event, fields);
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Builds the JSON line; separated out so tests can assert on it.
    fn render(
        component: &str,
        severity: LogSeverity,
        event: &str,
        fields: &[(&str, &str)],
    ) -> String {
        let mut out = String::with_capacity(128);
        out.push_str("{\"component\":\"");
        Self::escape(&mut out, component);
        out.push_str("\",\"event\":\"");
        Self::escape(&mut out, event);
        out.push_str("\",\"severity\":\"");
        out.push_str(severity.as_str());
        out.push('"');

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        for (key, value) in sorted {
            out.push_str(",\"");
            Self::escape(&mut out, key);
            out.push_str("\":\"");
            Self::escape(&mut out, value);
            out.push('"');
        }

        out.push('}');
        out.push('\n');
        out
    }

    /// Escapes special characters for JSON strings.
    fn escape(out: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    use std::fmt::Write as _;
                    let _ = write!(out, "\\u{:04x}", c as u32);
                }
                c => out.push(c),
            }
        }
    }
}
