//! The shared streaming lexer driver.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::text;
use crate::lexer::{Token, TokenConfig, TokenKind, TokenLevel, Tokenizer};

/// Lexer state snapshot taken before a preview, for rewinding.
#[derive(Clone)]
struct PreviewState {
    line: usize,
    column: usize,
    last_byte: u8,
    level_stack: Vec<(SmolStr, TokenLevel)>,
}

/// Provides token input from any byte stream.
///
/// Owns a pushback buffer of unconsumed bytes and a FIFO of previewed
/// tokens. The level stack starts with a root entry (empty opener, normal
/// level) which is never popped.
pub struct StreamInput<R: Read> {
    reader: R,
    pub(crate) tokenizer: Tokenizer,
    filename: Arc<str>,

    checked_bom: bool,
    reached_eof: bool,
    putback: VecDeque<u8>,
    /// Previewed tokens plus the raw bytes and the lexer state they were
    /// lexed from, so `configure` can rewind and re-lex them.
    preview_fifo: VecDeque<(Token, Vec<u8>, PreviewState)>,
    /// Raw bytes consumed by the current `lex_token` call.
    current_raw: Vec<u8>,

    /// Level begin token -> level class; the root entry stays at index 0.
    level_stack: Vec<(SmolStr, TokenLevel)>,
    line: usize,
    column: usize,
    /// Last consumed byte, for CR+LF accounting across token boundaries.
    last_byte: u8,
}

impl<R: Read> StreamInput<R> {
    pub fn new(reader: R, filename: Arc<str>) -> Self {
        Self {
            reader,
            tokenizer: Tokenizer::default(),
            filename,
            checked_bom: false,
            reached_eof: false,
            putback: VecDeque::new(),
            preview_fifo: VecDeque::new(),
            current_raw: Vec::new(),
            level_stack: vec![(SmolStr::default(), TokenLevel::Normal)],
            line: 1,
            column: 1,
            last_byte: 0,
        }
    }

    pub fn filename(&self) -> Arc<str> {
        self.filename.clone()
    }

    /// Swap the token tables. Tokens that were only previewed are rewound
    /// and re-lexed under the new configuration.
    pub fn configure(&mut self, cfg: &TokenConfig) {
        if let Some((_, _, state)) = self.preview_fifo.front() {
            let state = state.clone();
            let mut raw = Vec::new();
            for (_, bytes, _) in &self.preview_fifo {
                raw.extend_from_slice(bytes);
            }
            self.push_back(&raw);
            self.line = state.line;
            self.column = state.column;
            self.last_byte = state.last_byte;
            self.level_stack = state.level_stack;
            self.preview_fifo.clear();
        }
        self.tokenizer.configure(cfg);
    }

    pub fn get_token(&mut self) -> Token {
        if let Some((token, _, _)) = self.preview_fifo.pop_front() {
            return token;
        }
        self.lex_token()
    }

    pub fn preview_token(&mut self) -> Token {
        if self.preview_fifo.is_empty() {
            let record = self.lex_recorded();
            self.preview_fifo.push_back(record);
        }
        self.preview_fifo
            .front()
            .map(|(token, _, _)| token.clone())
            .unwrap_or_else(|| Token::eof(self.filename.clone(), self.line, self.column, ""))
    }

    pub fn preview_next_token(&mut self) -> Token {
        let record = self.lex_recorded();
        let token = record.0.clone();
        self.preview_fifo.push_back(record);
        token
    }

    fn lex_recorded(&mut self) -> (Token, Vec<u8>, PreviewState) {
        let state = PreviewState {
            line: self.line,
            column: self.column,
            last_byte: self.last_byte,
            level_stack: self.level_stack.clone(),
        };
        let token = self.lex_token();
        (token, std::mem::take(&mut self.current_raw), state)
    }

    fn top(&self) -> (SmolStr, TokenLevel) {
        self.level_stack
            .last()
            .cloned()
            .unwrap_or((SmolStr::default(), TokenLevel::Normal))
    }

    /// Append up to `count` bytes to `buf`, draining the pushback buffer
    /// first. Returns the number of bytes appended.
    fn load_bytes(&mut self, buf: &mut Vec<u8>, count: usize) -> usize {
        let mut appended = 0;
        while appended < count {
            if let Some(b) = self.putback.pop_front() {
                buf.push(b);
                appended += 1;
                continue;
            }
            if self.reached_eof {
                break;
            }
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    self.reached_eof = true;
                    break;
                }
                Ok(_) => {
                    buf.push(byte[0]);
                    appended += 1;
                }
                Err(err) => {
                    tracing::warn!(file = %self.filename, %err, "read error, treating as end of file");
                    self.reached_eof = true;
                    break;
                }
            }
        }
        appended
    }

    fn push_back(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.putback.push_front(b);
        }
    }

    /// Advance line/column accounting over consumed bytes. A LF not preceded
    /// by CR, or any CR, starts a new line; tabs count the configured tab
    /// width; UTF-8 continuation bytes count nothing.
    fn advance_position(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if (b == b'\n' && self.last_byte != b'\r') || b == b'\r' {
                self.line += 1;
                self.column = 1;
            } else if b == b'\n' {
                // LF of a CR+LF pair, already counted
            } else if (b & 0xC0) != 0x80 {
                if b == b'\t' {
                    self.column += text::tab_width();
                } else {
                    self.column += 1;
                }
            }
            self.last_byte = b;
        }
    }

    /// Lex one real token, folding whitespace runs into the following
    /// token's `leading_ws`.
    fn lex_token(&mut self) -> Token {
        self.current_raw.clear();
        let mut leading: Vec<u8> = Vec::new();

        loop {
            if !self.checked_bom {
                let mut head = Vec::new();
                self.load_bytes(&mut head, 3);
                if head != [0xEF, 0xBB, 0xBF] {
                    self.push_back(&head);
                }
                self.checked_bom = true;
            }

            let mut curr: Vec<u8> = Vec::new();
            self.load_bytes(&mut curr, self.tokenizer.max_op_size().max(1));
            if curr.is_empty() {
                let ws = text::normalize_newlines(&String::from_utf8_lossy(&leading));
                return Token::eof(self.filename.clone(), self.line, self.column, ws);
            }

            let level = self.top().1;

            // Part A: longest prefix that is a fixed literal token.
            let mut found = None;
            let mut slice_len = curr.len();
            while slice_len > 0 {
                if let Some(kind) = self.tokenizer.find_non_sticky(&curr[..slice_len], level) {
                    found = Some(kind);
                    break;
                }
                slice_len -= 1;
            }

            let (kind, mut content) = if let Some(kind) = found {
                let rest = curr.split_off(slice_len);
                self.push_back(&rest);
                (kind, curr)
            } else {
                // Part B: sticky run; grow one byte at a time until the
                // trailing token no longer covers the whole buffer.
                self.push_back(&curr);
                curr.clear();
                let mut eof_reached = false;
                loop {
                    if self.load_bytes(&mut curr, 1) == 0 {
                        eof_reached = true;
                        break;
                    }
                    let (_, run_len) = self.tokenizer.find_last_sticky(&curr, level);
                    if run_len != curr.len() {
                        break;
                    }
                }
                if !eof_reached {
                    if let Some(last) = curr.pop() {
                        self.push_back(&[last]);
                    }
                }
                if curr.is_empty() {
                    let ws = text::normalize_newlines(&String::from_utf8_lossy(&leading));
                    return Token::eof(self.filename.clone(), self.line, self.column, ws);
                }
                let kind = self
                    .tokenizer
                    .find_last_sticky(&curr, level)
                    .0
                    .unwrap_or(TokenKind::Identifier);
                (kind, curr)
            };

            let line = self.line;
            let column = self.column;
            let token_level = self.top().1;
            let content_str = String::from_utf8_lossy(&content).into_owned();

            // Level bookkeeping: first try to close the current level, then
            // try to open a new one whose opener matches this token.
            let mut consumed = true;
            let mut changed = false;
            let (top_opener, top_kind) = self.top();
            let at_root = self.level_stack.len() == 1;
            let mut close_hit: Option<TokenLevel> = None;
            'close: for kind_candidate in TokenLevel::ALL {
                if at_root || !kind_candidate.same_group(top_kind) {
                    continue;
                }
                for entry in self.tokenizer.config().level_entries(kind_candidate).values() {
                    if entry.begin == top_opener && entry.end.as_str() == content_str {
                        close_hit = Some(kind_candidate);
                        break 'close;
                    }
                }
            }
            if let Some(kind_candidate) = close_hit {
                self.level_stack.pop();
                changed = true;
                // A line comment's closing newline stays in the stream and
                // is re-lexed as whitespace; the emitted token is
                // normalised to a single LF.
                if kind_candidate == TokenLevel::CommentLine
                    && (content_str == "\n" || content_str == "\r")
                {
                    self.push_back(&content);
                    content = b"\n".to_vec();
                    consumed = false;
                }
            }
            if !changed {
                let overlay = self
                    .tokenizer
                    .config()
                    .allowed_level_overlay
                    .get(top_opener.as_str())
                    .cloned();
                'open: for kind_candidate in TokenLevel::ALL {
                    let entries: Vec<_> = self
                        .tokenizer
                        .config()
                        .level_entries(kind_candidate)
                        .iter()
                        .map(|(name, entry)| (name.clone(), entry.clone()))
                        .collect();
                    for (name, entry) in entries {
                        if entry.begin.as_str() != content_str {
                            continue;
                        }
                        let allowed = match &overlay {
                            Some(list) => list.iter().any(|n| *n == name),
                            None => self.level_stack.len() == 1,
                        };
                        if allowed {
                            self.level_stack.push((entry.begin.clone(), kind_candidate));
                            break 'open;
                        }
                    }
                }
            }

            if consumed {
                self.advance_position(&content);
                self.current_raw.extend_from_slice(&content);
            }

            if kind == TokenKind::Ws {
                leading.extend_from_slice(&content);
                continue;
            }

            let content_str = if consumed {
                SmolStr::from(content_str)
            } else {
                SmolStr::from(String::from_utf8_lossy(&content).into_owned())
            };
            let ws = text::normalize_newlines(&String::from_utf8_lossy(&leading));
            return Token::new(
                kind,
                content_str.clone(),
                self.filename.clone(),
                line,
                column,
                text::length_cp(content_str.as_bytes()),
                ws,
                token_level,
            );
        }
    }
}

/// Extract the half-open 1-indexed line range from raw source bytes, with
/// tabs expanded to the configured tab width and newlines normalised.
pub(crate) fn lines_from_bytes(bytes: &[u8], line_begin: usize, line_end: usize) -> Vec<String> {
    let tab = " ".repeat(text::tab_width());
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut line_no = 1usize;
    let mut last = 0u8;
    for &b in bytes {
        if (b == b'\n' && last != b'\r') || b == b'\r' {
            if line_no >= line_begin && line_no < line_end {
                lines.push(current.clone());
            }
            current.clear();
            line_no += 1;
            if line_no >= line_end {
                break;
            }
        } else if b != b'\n' {
            if b == b'\t' {
                current.push_str(&tab);
            } else {
                current.push(b as char);
            }
        }
        last = b;
    }
    if line_no >= line_begin && line_no < line_end && !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn input_for(source: &str) -> StreamInput<Cursor<Vec<u8>>> {
        let mut input = StreamInput::new(
            Cursor::new(source.as_bytes().to_vec()),
            Arc::from("test.push"),
        );
        input.configure(&TokenConfig::prelude_cfg());
        input
    }

    #[test]
    fn test_simple_tokens() {
        let mut input = input_for("abc -> def;");
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.content, "abc");
        assert_eq!((t.line, t.column), (1, 1));
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::Op);
        assert_eq!(t.content, "->");
        assert_eq!(t.leading_ws, " ");
        let t = input.get_token();
        assert_eq!(t.content, "def");
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::StatDivider);
        assert_eq!(input.get_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_preview_does_not_advance() {
        let mut input = input_for("a b c");
        assert_eq!(input.preview_token().content, "a");
        assert_eq!(input.preview_next_token().content, "b");
        assert_eq!(input.preview_next_token().content, "c");
        assert_eq!(input.get_token().content, "a");
        assert_eq!(input.get_token().content, "b");
        assert_eq!(input.get_token().content, "c");
    }

    #[test]
    fn test_bom_is_consumed() {
        let mut input = StreamInput::new(
            Cursor::new(b"\xEF\xBB\xBFabc".to_vec()),
            Arc::from("test.push"),
        );
        input.configure(&TokenConfig::prelude_cfg());
        let t = input.get_token();
        assert_eq!(t.content, "abc");
        assert_eq!(t.column, 1);
        assert_eq!(t.leading_ws, "");
    }

    #[test]
    fn test_string_level_tokens() {
        // Escape recognition needs the backslash in the operator class so
        // identifier runs stop in front of it (push.push declares this).
        let mut cfg = TokenConfig::prelude_cfg();
        cfg.push_range(crate::lexer::CharRangeType::Op, b'\\', b'\\');
        let mut input = StreamInput::new(
            Cursor::new("\"a\\n b\"".as_bytes().to_vec()),
            Arc::from("test.push"),
        );
        input.configure(&cfg);
        assert_eq!(input.get_token().kind, TokenKind::StringBegin);
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.level, TokenLevel::StringLevel);
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::EscapedChar);
        assert_eq!(t.content, "\\n");
        let t = input.get_token();
        assert_eq!(t.content, "b");
        assert_eq!(t.leading_ws, " ");
        assert_eq!(input.get_token().kind, TokenKind::StringEnd);
    }

    #[test]
    fn test_nested_block_comments() {
        let mut input = input_for("/* a /* b */ c */ d");
        assert_eq!(input.get_token().kind, TokenKind::CommentBegin);
        assert_eq!(input.get_token().content, "a");
        let t = input.get_token();
        assert_eq!(t.kind, TokenKind::CommentBegin);
        assert_eq!(t.level, TokenLevel::Comment);
        assert_eq!(input.get_token().content, "b");
        assert_eq!(input.get_token().kind, TokenKind::CommentEnd);
        assert_eq!(input.get_token().content, "c");
        assert_eq!(input.get_token().kind, TokenKind::CommentEnd);
        let t = input.get_token();
        assert_eq!(t.content, "d");
        assert_eq!(t.level, TokenLevel::Normal);
    }

    #[test]
    fn test_line_comment_newline_stays_in_stream() {
        let mut input = input_for("// c\nx");
        assert_eq!(input.get_token().kind, TokenKind::CommentBegin);
        assert_eq!(input.get_token().content, "c");
        let end = input.get_token();
        assert_eq!(end.kind, TokenKind::CommentEnd);
        assert_eq!(end.content, "\n");
        assert_eq!((end.line, end.column), (1, 5));
        let x = input.get_token();
        assert_eq!(x.content, "x");
        assert_eq!((x.line, x.column), (2, 1));
        assert_eq!(x.leading_ws, "\n");
    }

    #[test]
    fn test_crlf_normalised_in_leading_ws() {
        let mut input = input_for("a\r\nb");
        assert_eq!(input.get_token().content, "a");
        let b = input.get_token();
        assert_eq!(b.leading_ws, "\n");
        assert_eq!((b.line, b.column), (2, 1));
    }

    #[test]
    fn test_lines_from_bytes() {
        crate::base::text::set_tab_width(4);
        let lines = lines_from_bytes(b"one\n\ttwo\nthree\n", 2, 4);
        assert_eq!(lines, vec!["    two".to_string(), "three".to_string()]);
    }
}
