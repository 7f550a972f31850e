//! File-backed token input.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::lexer::{Token, TokenConfig};

use super::stream::{StreamInput, lines_from_bytes};
use super::SourceInput;

/// Provides token input from a file on disk.
pub struct FileInput {
    inner: StreamInput<BufReader<File>>,
    path: PathBuf,
}

impl FileInput {
    pub fn open(path: impl AsRef<Path>) -> io::Result<FileInput> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let filename: Arc<str> = Arc::from(path.to_string_lossy().as_ref());
        Ok(FileInput {
            inner: StreamInput::new(BufReader::new(file), filename),
            path,
        })
    }

    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }
}

impl SourceInput for FileInput {
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
        // Read from a fresh handle so the token stream position is untouched.
        let mut bytes = Vec::new();
        match File::open(&self.path).and_then(|mut f| f.read_to_end(&mut bytes)) {
            Ok(_) => lines_from_bytes(&bytes, line_begin, line_end),
            Err(err) => {
                tracing::warn!(file = %self.path.display(), %err, "could not re-read source for line excerpt");
                Vec::new()
            }
        }
    }

    fn open_new_file(&self, file: &str) -> io::Result<Box<dyn SourceInput>> {
        Ok(Box::new(FileInput::open(file)?))
    }
}
