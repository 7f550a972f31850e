//! Token sources.
//!
//! A [`SourceInput`] owns a byte stream and a [`crate::lexer::Tokenizer`] and
//! hands out [`Token`]s with single-token lookahead×2. Concrete inputs are
//! stream-backed: [`FileInput`] over a file, [`StringInput`] over an
//! in-memory string (used by tests and the `debug` input preference).

mod file;
mod stream;
mod string;

use std::io;
use std::sync::Arc;

pub use file::FileInput;
pub use stream::StreamInput;
pub use string::StringInput;

use crate::lexer::{Token, TokenConfig};

/// Base interface to pull a token list out of a source.
pub trait SourceInput: Send {
    /// The path this input reads from.
    fn filename(&self) -> Arc<str>;

    /// Swap the token configuration. Legal whenever the input sits between
    /// two tokens; the compiled tables are rebuilt.
    fn configure(&mut self, cfg: &TokenConfig);

    /// Next token, advancing the stream head.
    fn get_token(&mut self) -> Token;

    /// Next token without advancing the stream head.
    fn preview_token(&mut self) -> Token;

    /// The token after the most recent preview. Each call advances the
    /// preview cursor by exactly one token; `get_token` is unaffected and
    /// will replay the previewed tokens in order.
    fn preview_next_token(&mut self) -> Token;

    /// Source lines in the half-open 1-indexed range `line_begin..line_end`,
    /// with tabs translated to the configured tab width. Returns fewer lines
    /// when the file ends early; the caller reports that.
    fn get_lines(&mut self, line_begin: usize, line_end: usize) -> Vec<String>;

    /// Open a fresh input of the same kind for another file.
    fn open_new_file(&self, file: &str) -> io::Result<Box<dyn SourceInput>>;
}
