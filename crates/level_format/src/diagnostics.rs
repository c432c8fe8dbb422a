//! Structured per-line diagnostics from a level load.
//!
//! The parser never aborts on a bad line; each problem becomes one
//! [`Diagnostic`] and the offending line simply has no effect. Diagnostics
//! are also logged as they are recorded, but the report is the authoritative
//! channel so hosts and tests can inspect a whole load at once.

use bevy::prelude::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The line (or part of its effect) was skipped.
    Error,
    /// The line partially applied; some targets were ignored.
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number in the level file.
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

/// Outcome of a level load that managed to read the file.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub(crate) fn error(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        error!("level line {line}: {message}");
        self.diagnostics.push(Diagnostic {
            line,
            severity: Severity::Error,
            message,
        });
    }

    pub(crate) fn warning(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        warn!("level line {line}: {message}");
        self.diagnostics.push(Diagnostic {
            line,
            severity: Severity::Warning,
            message,
        });
    }
}
