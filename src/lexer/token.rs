//! Token model.

use std::sync::Arc;

use smol_str::SmolStr;

/// Where in the code a token was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenLevel {
    /// In no special area.
    #[default]
    Normal,
    /// In any comment.
    Comment,
    /// In a comment which ends at the next newline.
    CommentLine,
    /// In any string or character literal.
    StringLevel,
}

impl TokenLevel {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Comment => 1,
            Self::CommentLine => 2,
            Self::StringLevel => 3,
        }
    }

    pub const ALL: [TokenLevel; 4] = [
        Self::Normal,
        Self::Comment,
        Self::CommentLine,
        Self::StringLevel,
    ];

    /// Comments of both flavours close against each other's tables.
    pub fn same_group(self, other: TokenLevel) -> bool {
        match (self, other) {
            (Self::Comment | Self::CommentLine, Self::Comment | Self::CommentLine) => true,
            (a, b) => a == b,
        }
    }
}

/// Classification of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Statement divider, e.g. `;`.
    StatDivider,
    BlockBegin,
    BlockEnd,
    TermBegin,
    TermEnd,
    ArrayBegin,
    ArrayEnd,
    CommentBegin,
    CommentEnd,
    /// Integer literal run.
    Number,
    /// Encoded character like `\x26`.
    EncodedChar,
    /// Escaped character like `\n`.
    EscapedChar,
    StringBegin,
    StringEnd,
    /// Operator; each unconfigured operator character stands alone.
    Op,
    /// An identifier run that exactly matches a configured keyword.
    Keyword,
    /// Regular identifier that matches no other category.
    Identifier,
    /// Whitespace; never returned by the `*_token()` methods, it is folded
    /// into the following token's `leading_ws`.
    Ws,
    Eof,
}

impl TokenKind {
    /// Human readable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::StatDivider => "end of expression",
            Self::BlockBegin => "begin of block",
            Self::BlockEnd => "end of block",
            Self::TermBegin | Self::TermEnd => "parenthesis",
            Self::ArrayBegin | Self::ArrayEnd => "bracket",
            Self::CommentBegin => "begin of comment",
            Self::CommentEnd => "end of comment",
            Self::Number => "number literal",
            Self::EncodedChar => "encoded character literal",
            Self::EscapedChar => "escaped character literal",
            Self::StringBegin => "begin of string",
            Self::StringEnd => "end of string",
            Self::Op => "operator",
            Self::Keyword => "keyword",
            Self::Identifier => "identifier",
            Self::Ws => "whitespace",
            Self::Eof => "end of file",
        }
    }
}

/// Result of the lexing process.
///
/// Invariant: every non-whitespace, non-eof token carries non-empty content
/// and `length` equal to the content's length in code points. `leading_ws`
/// holds the exact whitespace in front of the token with CR and CR+LF
/// normalised to LF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub content: SmolStr,
    pub file: Arc<str>,
    /// 1-based line of the first content character.
    pub line: usize,
    /// 1-based column of the first content character, in grapheme blocks.
    pub column: usize,
    /// Content length in code points.
    pub length: usize,
    pub leading_ws: SmolStr,
    /// The token level at the time the token was emitted.
    pub level: TokenLevel,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        content: impl Into<SmolStr>,
        file: Arc<str>,
        line: usize,
        column: usize,
        length: usize,
        leading_ws: impl Into<SmolStr>,
        level: TokenLevel,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            file,
            line,
            column,
            length,
            leading_ws: leading_ws.into(),
            level,
        }
    }

    pub fn eof(file: Arc<str>, line: usize, column: usize, leading_ws: impl Into<SmolStr>) -> Self {
        Self::new(TokenKind::Eof, "", file, line, column, 0, leading_ws, TokenLevel::Normal)
    }
}
