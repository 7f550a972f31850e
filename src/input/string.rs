//! In-memory token input, used by tests and the `debug` input preference.

use std::io::{self, Cursor};
use std::sync::Arc;

use crate::lexer::{Token, TokenConfig};

use super::stream::{StreamInput, lines_from_bytes};
use super::SourceInput;

/// Provides token input from an in-memory string.
pub struct StringInput {
    inner: StreamInput<Cursor<Vec<u8>>>,
    source: String,
}

impl StringInput {
    pub fn new(filename: impl Into<Arc<str>>, source: impl Into<String>) -> StringInput {
        let source = source.into();
        StringInput {
            inner: StreamInput::new(Cursor::new(source.as_bytes().to_vec()), filename.into()),
            source,
        }
    }
}

impl SourceInput for StringInput {
    fn filename(&self) -> Arc<str> {
        self.inner.filename()
    }

    fn configure(&mut self, cfg: &TokenConfig) {
        self.inner.configure(cfg);
    }

    fn get_token(&mut self) -> Token {
        self.inner.get_token()
    }

    fn preview_token(&mut self) -> Token {
        self.inner.preview_token()
    }

    fn preview_next_token(&mut self) -> Token {
        self.inner.preview_next_token()
    }

    fn get_lines(&mut self, line_begin: usize, line_end: usize) -> Vec<String> {
        lines_from_bytes(self.source.as_bytes(), line_begin, line_end)
    }

    fn open_new_file(&self, file: &str) -> io::Result<Box<dyn SourceInput>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("string input cannot open \"{file}\""),
        ))
    }
}
