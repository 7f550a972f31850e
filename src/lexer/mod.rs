//! Level-aware, table-driven lexer.
//!
//! Nothing about the token language is hard-coded: statement dividers,
//! bracket pairs, comment/string levels, character classes, operators and
//! keywords all come from a [`TokenConfig`] which is in turn produced by the
//! prelude loader. The lexer distinguishes two token classes:
//!
//! - **non-sticky** tokens are fixed literal strings (operators, bracket
//!   pairs, level openers/closers, escape sequences), matched greedily as
//!   the longest prefix of the input;
//! - **sticky** tokens are variable-width runs (whitespace, numbers,
//!   identifiers) whose end is found by walking forward while the character
//!   class of the run stays consistent.

mod config;
mod token;
mod tokenizer;

pub use config::{CharRangeType, LevelToken, TokenConfig};
pub use token::{Token, TokenKind, TokenLevel};
pub use tokenizer::Tokenizer;
