// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics for the RST parser.
//!
//! Every condition the parser can report is a [`MsgKind`] with a fixed
//! message template and a fixed [`Severity`]. Reports flow through the
//! message sink (see [`super::state::MsgHandler`]) as structured
//! [`RstMessage`] values; the sink renders or collects them as it likes.
//!
//! Error-class kinds additionally abort the parse: after notifying the
//! sink, the reporting site returns a [`ParseError`] that unwinds to the
//! entry point. Warnings continue with a best-effort fallback.

use std::fmt;

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

/// Severity class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Aborts the parse.
    Error,
    /// Reported; parsing continues with a fallback.
    Warning,
    /// Informational only.
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Hint => write!(f, "Hint"),
        }
    }
}

/// The kind of a parser diagnostic.
///
/// The argument slot (`$1` in the templates below) is filled from
/// [`RstMessage::arg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKind {
    /// A file named by `include`, `raw` or `code-block` could not be read.
    CannotOpenFile,
    /// A closing marker or other specific token was expected.
    Expected,
    /// A grid table was recognized; grid tables are not implemented.
    GridTableNotImplemented,
    /// The classifier found a token that cannot start any section.
    NewSectionExpected,
    /// Leftover input after the document ended.
    GeneralParseError,
    /// An unknown directive name, or a disabled directive.
    InvalidDirective,
    /// An `include` chain reached a file that is already being included.
    RecursiveInclude,
    /// A hyperlink label was registered twice with different targets.
    RedefinitionOfLabel,
    /// A substitution reference had no definition anywhere.
    UnknownSubstitution,
    /// A code block named a language the renderer will not highlight.
    UnsupportedLanguage,
    /// A directive field that no directive understands.
    UnsupportedField,
}

impl MsgKind {
    /// Returns the severity class of this kind.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::CannotOpenFile
            | Self::Expected
            | Self::GridTableNotImplemented
            | Self::NewSectionExpected
            | Self::GeneralParseError
            | Self::InvalidDirective
            | Self::RecursiveInclude => Severity::Error,
            Self::RedefinitionOfLabel
            | Self::UnknownSubstitution
            | Self::UnsupportedLanguage
            | Self::UnsupportedField => Severity::Warning,
        }
    }

    /// Renders the message template with `arg` substituted.
    #[must_use]
    pub fn message(self, arg: &str) -> String {
        match self {
            Self::CannotOpenFile => format!("cannot open '{arg}'"),
            Self::Expected => format!("'{arg}' expected"),
            Self::GridTableNotImplemented => "grid table is not implemented".to_string(),
            Self::NewSectionExpected => "new section expected".to_string(),
            Self::GeneralParseError => "general parse error".to_string(),
            Self::InvalidDirective => format!("invalid directive: '{arg}'"),
            Self::RecursiveInclude => format!("recursive inclusion of '{arg}'"),
            Self::RedefinitionOfLabel => format!("redefinition of label '{arg}'"),
            Self::UnknownSubstitution => format!("unknown substitution '{arg}'"),
            Self::UnsupportedLanguage => format!("language '{arg}' not supported"),
            Self::UnsupportedField => format!("field '{arg}' not supported"),
        }
    }
}

/// A structured diagnostic delivered to the message sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RstMessage {
    /// The file being parsed when the condition was detected.
    pub filename: EcoString,
    /// Source line, including the caller-supplied base line.
    pub line: i32,
    /// Source column, including the caller-supplied base column.
    pub col: i32,
    /// What happened.
    pub kind: MsgKind,
    /// The kind-specific argument (a file name, a marker, a label).
    pub arg: EcoString,
}

impl RstMessage {
    /// Returns the severity class of this message.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for RstMessage {
    /// Formats as `<file>(<line>, <col>) <class>: <message>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) {}: {}",
            self.filename,
            self.line,
            self.col,
            self.severity(),
            self.kind.message(&self.arg)
        )
    }
}

/// A fatal parse error.
///
/// Produced from an error-class [`RstMessage`]; carries the same location
/// and kind so callers can react programmatically, and renders identically.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{rendered}")]
#[diagnostic()]
pub struct ParseError {
    /// The fully formatted message.
    rendered: String,
    /// The kind of the underlying diagnostic.
    pub kind: MsgKind,
    /// The file the error was reported in.
    pub filename: EcoString,
    /// Source line of the error.
    pub line: i32,
    /// Source column of the error.
    pub col: i32,
}

impl From<&RstMessage> for ParseError {
    fn from(msg: &RstMessage) -> Self {
        Self {
            rendered: msg.to_string(),
            kind: msg.kind,
            filename: msg.filename.clone(),
            line: msg.line,
            col: msg.col,
        }
    }
}
