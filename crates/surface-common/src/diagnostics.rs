//! Analysis diagnostics.
//!
//! The engine never prints; recoverable conditions are collected as
//! `Diagnostic` values and returned alongside the generated output so the
//! embedding tool can decide whether warnings fail a build.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// Stable numeric codes for analysis conditions.
pub mod diagnostic_codes {
    /// A type reference could not be resolved; it is left unrenamed.
    pub const UNRESOLVED_REFERENCE: u32 = 1001;
    /// Merged declarations disagree on the release tag; the first wins.
    pub const CONFLICTING_RELEASE_TAGS: u32 = 1002;
    /// An entry-point export uses a shape the engine does not support.
    pub const UNSUPPORTED_EXPORT: u32 = 1003;
    /// An ambient (global/script) symbol was filtered from emission.
    pub const AMBIENT_SYMBOL_SKIPPED: u32 = 1004;
    /// Two distinct entries claim the same exported name.
    pub const DUPLICATE_EXPORT_NAME: u32 = 2001;
    /// A declaration could not be matched to its enclosing declaration.
    pub const UNMATCHED_PARENT_DECLARATION: u32 = 2002;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
        }
    }

    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
        }
    }
}
