//! Classification tables compiled from a [`TokenConfig`].

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::config::{CharRangeType, TokenConfig};
use super::token::{TokenKind, TokenLevel};

/// Compiled lookup tables for one token configuration.
///
/// Rebuilt by [`Tokenizer::configure`]; reconfiguration is legal whenever the
/// owning input sits between two tokens.
#[derive(Debug)]
pub struct Tokenizer {
    cfg: TokenConfig,
    /// Fixed literal tokens per level.
    non_sticky: [FxHashMap<SmolStr, TokenKind>; TokenLevel::COUNT],
    /// Byte membership per character class.
    ranges: [[bool; 256]; CharRangeType::COUNT],
    /// Maximum byte width across all fixed literal tokens, at least 1.
    max_op_size: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            cfg: TokenConfig::default(),
            non_sticky: Default::default(),
            ranges: [[false; 256]; CharRangeType::COUNT],
            max_op_size: 1,
        }
    }
}

impl Tokenizer {
    pub fn new(cfg: &TokenConfig) -> Self {
        let mut t = Tokenizer::default();
        t.configure(cfg);
        t
    }

    pub fn config(&self) -> &TokenConfig {
        &self.cfg
    }

    pub fn max_op_size(&self) -> usize {
        self.max_op_size
    }

    /// Rebuild all tables from `cfg`.
    pub fn configure(&mut self, cfg: &TokenConfig) {
        self.cfg = cfg.clone();
        self.non_sticky = Default::default();
        self.ranges = [[false; 256]; CharRangeType::COUNT];
        self.max_op_size = 1;

        for (range, spans) in CharRangeType::ALL.iter().zip(cfg.char_ranges.iter()) {
            for &(from, to) in spans {
                for b in from..=to {
                    self.ranges[range.index()][b as usize] = true;
                }
            }
        }

        let dividers: Vec<_> = cfg.stat_divider.iter().cloned().collect();
        for tok in dividers {
            self.add_to_all_levels(&tok, TokenKind::StatDivider);
        }
        for (begin, end) in cfg.block.clone() {
            self.add_to_all_levels(&begin, TokenKind::BlockBegin);
            self.add_to_all_levels(&end, TokenKind::BlockEnd);
        }
        for (begin, end) in cfg.term.clone() {
            self.add_to_all_levels(&begin, TokenKind::TermBegin);
            self.add_to_all_levels(&end, TokenKind::TermEnd);
        }
        for (begin, end) in cfg.array.clone() {
            self.add_to_all_levels(&begin, TokenKind::ArrayBegin);
            self.add_to_all_levels(&end, TokenKind::ArrayEnd);
        }

        for level in TokenLevel::ALL {
            let entries: Vec<_> = cfg.level_entries(level).values().cloned().collect();
            let (begin_kind, end_kind) = match level {
                TokenLevel::Normal => (TokenKind::Op, TokenKind::Op),
                TokenLevel::Comment | TokenLevel::CommentLine => {
                    (TokenKind::CommentBegin, TokenKind::CommentEnd)
                }
                TokenLevel::StringLevel => (TokenKind::StringBegin, TokenKind::StringEnd),
            };
            for entry in entries {
                // Begin tokens must be recognised everywhere so inner levels
                // can open; end tokens only exist inside their own level.
                self.add_to_all_levels(&entry.begin, begin_kind);
                self.track_width(&entry.end);
                self.insert_op_bytes(&entry.end);
                self.non_sticky[level.index()].insert(entry.end.clone(), end_kind);
            }
        }

        for op in cfg.operators.clone() {
            self.add_to_all_levels(&op, TokenKind::Op);
        }
        for esc in cfg.char_escapes.keys() {
            let width = esc.len();
            if width > self.max_op_size {
                self.max_op_size = width;
            }
        }
    }

    fn add_to_all_levels(&mut self, token: &SmolStr, kind: TokenKind) {
        self.track_width(token);
        self.insert_op_bytes(token);
        for level in TokenLevel::ALL {
            self.non_sticky[level.index()].insert(token.clone(), kind);
        }
    }

    fn track_width(&mut self, token: &SmolStr) {
        if token.len() > self.max_op_size {
            self.max_op_size = token.len();
        }
    }

    /// Every byte of a fixed literal token counts as an operator character.
    fn insert_op_bytes(&mut self, token: &SmolStr) {
        for &b in token.as_bytes() {
            self.ranges[CharRangeType::Op.index()][b as usize] = true;
        }
    }

    pub fn in_range(&self, range: CharRangeType, byte: u8) -> bool {
        self.ranges[range.index()][byte as usize]
    }

    /// Class of a single byte, by priority. Bytes in no range (including all
    /// non-ASCII bytes) default to the identifier class.
    pub fn class_of(&self, byte: u8) -> CharRangeType {
        for range in CharRangeType::ALL {
            if self.in_range(range, byte) {
                return range;
            }
        }
        CharRangeType::Identifier
    }

    /// The non-sticky token the whole `bytes` string matches at `level`, if
    /// any. Escape sequences match at every level.
    pub fn find_non_sticky(&self, bytes: &[u8], level: TokenLevel) -> Option<TokenKind> {
        let text = std::str::from_utf8(bytes).ok()?;
        if let Some(kind) = self.non_sticky[level.index()].get(text) {
            return Some(*kind);
        }
        if self.cfg.char_escapes.contains_key(text) {
            return Some(TokenKind::EscapedChar);
        }
        None
    }

    /// Find the longest sticky token ending the string, returning its kind
    /// and byte length. The kind is `None` when the trailing run belongs to
    /// no class that forms tokens.
    pub fn find_last_sticky(&self, bytes: &[u8], level: TokenLevel) -> (Option<TokenKind>, usize) {
        if bytes.is_empty() {
            return (None, 0);
        }

        let mut expected = CharRangeType::Identifier;
        let mut offset = 0;
        while offset < bytes.len() {
            expected = self.class_of(bytes[offset]);

            if expected == CharRangeType::Op {
                // Operator characters do not chain into sticky runs; only a
                // single trailing character forms an op token.
                if offset == bytes.len() - 1 {
                    break;
                }
                offset += 1;
                continue;
            }

            let mut matches = true;
            for i in offset + 1..bytes.len() {
                let b = bytes[i];
                let in_expected = self.in_range(expected, b)
                    || (expected == CharRangeType::Identifier
                        && self.in_range(CharRangeType::OptIdentifier, b));
                if !in_expected {
                    if expected == CharRangeType::Identifier {
                        // The identifier class is the default: a byte in no
                        // other range still extends the run.
                        if self.in_range(CharRangeType::Integer, b)
                            || self.in_range(CharRangeType::Ws, b)
                            || self.in_range(CharRangeType::Op, b)
                        {
                            matches = false;
                            break;
                        }
                    } else {
                        matches = false;
                        break;
                    }
                }
                // A whitespace run ends where a fixed literal token begins,
                // e.g. the newline that closes a line comment.
                if expected == CharRangeType::Ws && self.non_sticky_starts_at(bytes, i, level) {
                    matches = false;
                    break;
                }
            }
            if matches {
                break;
            }
            offset += 1;
        }

        let run = &bytes[offset..];
        let kind = match expected {
            CharRangeType::Identifier => {
                if let Ok(text) = std::str::from_utf8(run) {
                    if self.cfg.keywords.iter().any(|k| k == text) {
                        Some(TokenKind::Keyword)
                    } else {
                        Some(TokenKind::Identifier)
                    }
                } else {
                    Some(TokenKind::Identifier)
                }
            }
            CharRangeType::Op => Some(TokenKind::Op),
            CharRangeType::Integer => Some(TokenKind::Number),
            CharRangeType::Ws => Some(TokenKind::Ws),
            CharRangeType::OptIdentifier => None,
        };
        (kind, run.len())
    }

    fn non_sticky_starts_at(&self, bytes: &[u8], pos: usize, level: TokenLevel) -> bool {
        self.non_sticky[level.index()]
            .iter()
            .any(|(tok, kind)| {
                *kind != TokenKind::Ws
                    && bytes.len() >= pos + tok.len()
                    && &bytes[pos..pos + tok.len()] == tok.as_bytes()
            })
    }
}
