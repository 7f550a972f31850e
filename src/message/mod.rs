//! Diagnostic model: message kinds with stable ids, severity classes and
//! source attribution records.
//!
//! Rendering to the terminal (colours, source excerpts) belongs to the
//! outer driver; this module only defines the records the core emits and a
//! plain-text fallback format. Recording and counting happens on
//! [`crate::engine::GlobalCtx`].

use std::sync::Arc;

use thiserror::Error;

use crate::base::PosInfo;
use crate::lexer::Token;

/// Raised when the current job must be unwound: after a fatal diagnostic or
/// when the engine's abort flag is set. Workers catch it, drop the job and
/// keep looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("compilation aborted")]
pub struct AbortCompilation;

/// Severity classes, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageClass {
    Notification,
    Warning,
    Error,
    FatalError,
}

impl MessageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::FatalError => "fatal error",
        }
    }
}

/// All message kinds the core emits. Discriminants are the stable numeric
/// ids shown to the user; do not renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKind {
    // Fatal errors
    FerrFileNotFound = 1,
    FerrFailedPrelude = 2,

    // Parse and lex diagnostics
    ErrOrphanToken = 100,
    ErrUnfinishedExpr = 101,
    ErrSemicolonWithoutMeaning = 102,
    ErrUnexpectedEofAfter = 103,
    ErrUnexpectedEofAtStringParsing = 104,
    ErrUnexpectedEofAtLineQuery = 105,
    ErrTermWithMultipleExpr = 106,
    ErrMalformedPreludeCommand = 110,
    ErrParseMciRule = 111,
    ErrUnknownMci = 112,
    ErrNotAllowedTokenInPrelude = 113,
    ErrInvalidPrelude = 114,
    ErrParseNumber = 115,
    ErrFeatureNotSupported = 116,
    ErrArrayAccessIndex = 117,
    ErrUnknownSourceInputPref = 120,
    ErrTooManyMessages = 130,

    // Warnings
    WarnScopeAccessOperatorMissing = 300,
    WarnStaleJobOnStack = 301,
    WarnPathFoldMismatch = 302,

    // Notifications
    NoteCompilationFinished = 400,
}

impl MessageKind {
    pub fn id(&self) -> u32 {
        *self as u32
    }

    pub fn class(&self) -> MessageClass {
        match self.id() {
            0..=99 => MessageClass::FatalError,
            100..=299 => MessageClass::Error,
            300..=399 => MessageClass::Warning,
            _ => MessageClass::Notification,
        }
    }

    /// Message template; `{}` placeholders are substituted in order.
    pub fn template(&self) -> &'static str {
        match self {
            Self::FerrFileNotFound => "file \"{}\" was not found",
            Self::FerrFailedPrelude => "failed to load prelude \"{}\"",
            Self::ErrOrphanToken => "token \"{}\" could not be combined into any expression",
            Self::ErrUnfinishedExpr => "expression is not finished (missing statement divider?)",
            Self::ErrSemicolonWithoutMeaning => "statement divider without a preceding expression",
            Self::ErrUnexpectedEofAfter => "unexpected end of file",
            Self::ErrUnexpectedEofAtStringParsing => "string literal is not terminated",
            Self::ErrUnexpectedEofAtLineQuery => "file ended before the requested line range",
            Self::ErrTermWithMultipleExpr => "parenthesised term contains more than one expression",
            Self::ErrMalformedPreludeCommand => "malformed prelude command; expected {}",
            Self::ErrParseMciRule => "could not parse this meta-compiler instruction",
            Self::ErrUnknownMci => "unknown meta-compiler instruction \"{}\"",
            Self::ErrNotAllowedTokenInPrelude => "token \"{}\" is not allowed in a prelude file",
            Self::ErrInvalidPrelude => "\"{}\" does not name a known prelude",
            Self::ErrParseNumber => "expected a number literal",
            Self::ErrFeatureNotSupported => "not supported yet: {}",
            Self::ErrArrayAccessIndex => "array access requires exactly one index expression",
            Self::ErrUnknownSourceInputPref => "unknown source input preference \"{}\"",
            Self::ErrTooManyMessages => "too many {}s were printed",
            Self::WarnScopeAccessOperatorMissing => {
                "scope access operator is not defined in the prelude, using \"::\""
            }
            Self::WarnStaleJobOnStack => "found stale job ({}) on the open-job stack",
            Self::WarnPathFoldMismatch => "path folding requested with {} of {} paths",
            Self::NoteCompilationFinished => "compilation finished",
        }
    }

    pub fn format(&self, args: &[&str]) -> String {
        let mut out = String::new();
        let mut args = args.iter();
        let mut rest = self.template();
        while let Some(idx) = rest.find("{}") {
            out.push_str(&rest[..idx]);
            out.push_str(args.next().copied().unwrap_or("?"));
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// Source attribution for one message or note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    pub file: Option<Arc<str>>,
    pub line_begin: usize,
    pub line_end: usize,
    pub column: usize,
    pub length: usize,
}

impl MessageInfo {
    pub fn at(file: Arc<str>, line_begin: usize, line_end: usize, column: usize, length: usize) -> Self {
        Self {
            file: Some(file),
            line_begin,
            line_end,
            column,
            length,
        }
    }
}

impl From<&Token> for MessageInfo {
    fn from(t: &Token) -> Self {
        Self {
            file: Some(t.file.clone()),
            line_begin: t.line,
            line_end: t.line,
            column: t.column,
            length: t.length,
        }
    }
}

impl From<&PosInfo> for MessageInfo {
    fn from(p: &PosInfo) -> Self {
        Self {
            file: p.file.clone(),
            line_begin: p.line,
            line_end: p.line,
            column: p.column,
            length: p.length,
        }
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: MessageKind,
    pub info: MessageInfo,
    pub notes: Vec<MessageInfo>,
    pub text: String,
}

impl Diagnostic {
    /// Plain-text rendering: `error[E103] at file:3:7: unexpected end of file`.
    pub fn render(&self) -> String {
        let mut out = format!("{}[{}]", self.kind.class().as_str(), self.kind.id());
        if let Some(file) = &self.info.file {
            out.push_str(&format!(
                " at {}:{}:{}",
                file, self.info.line_begin, self.info.column
            ));
        }
        out.push_str(": ");
        out.push_str(&self.text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classes() {
        assert_eq!(MessageKind::FerrFileNotFound.class(), MessageClass::FatalError);
        assert_eq!(MessageKind::ErrOrphanToken.class(), MessageClass::Error);
        assert_eq!(MessageKind::WarnPathFoldMismatch.class(), MessageClass::Warning);
        assert_eq!(MessageKind::NoteCompilationFinished.class(), MessageClass::Notification);
    }

    #[test]
    fn test_format_substitution() {
        assert_eq!(
            MessageKind::FerrFileNotFound.format(&["main.push"]),
            "file \"main.push\" was not found"
        );
        assert_eq!(
            MessageKind::WarnPathFoldMismatch.format(&["1", "4"]),
            "path folding requested with 1 of 4 paths"
        );
    }

    #[test]
    fn test_format_missing_argument() {
        assert_eq!(
            MessageKind::ErrUnknownMci.format(&[]),
            "unknown meta-compiler instruction \"?\""
        );
    }

    #[test]
    fn test_render_with_location() {
        let diag = Diagnostic {
            kind: MessageKind::ErrOrphanToken,
            info: MessageInfo::at(Arc::from("a.push"), 3, 3, 7, 1),
            notes: vec![],
            text: MessageKind::ErrOrphanToken.format(&["+"]),
        };
        assert_eq!(
            diag.render(),
            "error[100] at a.push:3:7: token \"+\" could not be combined into any expression"
        );
    }
}
