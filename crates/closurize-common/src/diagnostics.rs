//! Diagnostics produced while rewriting a file.
//!
//! Rewrites never fail on odd-but-valid input; they leave the code alone and
//! may report a warning instead. Errors are reserved for files whose output
//! could not be produced.

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// Diagnostic codes used by closurize.
pub mod diagnostic_codes {
    /// A JSDoc comment contained redundant or malformed tags.
    pub const JSDOC_TAG_WARNING: u32 = 9001;
    /// More than one comment in the file claims to be the file overview.
    pub const DUPLICATE_FILEOVERVIEW: u32 = 9002;
    /// The renderer refused to produce output for a file.
    pub const RENDER_FAILED: u32 = 9003;
    /// The module manifest contains a dependency cycle.
    pub const MODULE_CYCLE: u32 = 9004;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            code,
            file: file.into(),
            start,
            length,
            message_text: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): {} CZ{}: {}",
            self.file, self.start, self.category, self.code, self.message_text
        )
    }
}
