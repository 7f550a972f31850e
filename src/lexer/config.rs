//! Token configuration: the data that parameterises the lexer.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::token::TokenLevel;

/// Character classes, sorted by matching priority descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharRangeType {
    /// Forced identifier.
    Identifier,
    Integer,
    Ws,
    Op,
    /// Allowed inside identifiers (but does not start one).
    OptIdentifier,
}

impl CharRangeType {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Self::Identifier => 0,
            Self::Integer => 1,
            Self::Ws => 2,
            Self::Op => 3,
            Self::OptIdentifier => 4,
        }
    }

    /// Priority order used when classifying a byte.
    pub const ALL: [CharRangeType; 5] = [
        Self::Identifier,
        Self::Integer,
        Self::Ws,
        Self::Op,
        Self::OptIdentifier,
    ];
}

/// Begin and end token of one level entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelToken {
    pub begin: SmolStr,
    pub end: SmolStr,
}

/// The rules that define how byte streams are divided into token lists.
///
/// Maps keep the insertion order of the prelude file; the lexer attempts
/// level openers in that order.
#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    pub stat_divider: Vec<SmolStr>,
    /// Begin => end pairs.
    pub block: Vec<(SmolStr, SmolStr)>,
    pub term: Vec<(SmolStr, SmolStr)>,
    pub array: Vec<(SmolStr, SmolStr)>,

    /// Level-dependent mappings: level name => begin/end pair, one table per
    /// level kind.
    pub level_map: [IndexMap<SmolStr, LevelToken>; TokenLevel::COUNT],
    /// Outer begin token => names of the levels allowed to open inside it
    /// (nested comments, raw-string brackets). The empty opener is the root.
    pub allowed_level_overlay: IndexMap<SmolStr, Vec<SmolStr>>,

    /// Escape sequence => represented value.
    pub char_escapes: IndexMap<SmolStr, SmolStr>,

    /// Byte ranges per character class.
    pub char_ranges: [Vec<(u8, u8)>; CharRangeType::COUNT],

    /// All available operators. Matched longest-first.
    pub operators: Vec<SmolStr>,
    /// All available keywords (matched against finished identifier runs).
    pub keywords: Vec<SmolStr>,
}

impl TokenConfig {
    pub fn level_entries(&self, level: TokenLevel) -> &IndexMap<SmolStr, LevelToken> {
        &self.level_map[level.index()]
    }

    pub fn push_range(&mut self, range: CharRangeType, from: u8, to: u8) {
        self.char_ranges[range.index()].push((from, to));
    }

    /// The hard-coded configuration used to tokenise prelude files.
    pub fn prelude_cfg() -> TokenConfig {
        let mut cfg = TokenConfig::default();
        cfg.stat_divider.push(";".into());
        cfg.block.push(("{".into(), "}".into()));
        cfg.term.push(("(".into(), ")".into()));
        cfg.level_map[TokenLevel::Comment.index()].insert(
            "b".into(),
            LevelToken {
                begin: "/*".into(),
                end: "*/".into(),
            },
        );
        cfg.level_map[TokenLevel::CommentLine.index()].insert(
            "ln".into(),
            LevelToken {
                begin: "//".into(),
                end: "\n".into(),
            },
        );
        cfg.level_map[TokenLevel::CommentLine.index()].insert(
            "lr".into(),
            LevelToken {
                begin: "//".into(),
                end: "\r".into(),
            },
        );
        cfg.level_map[TokenLevel::StringLevel.index()].insert(
            "s".into(),
            LevelToken {
                begin: "\"".into(),
                end: "\"".into(),
            },
        );
        cfg.char_escapes.insert("\\n".into(), "\n".into());
        cfg.char_escapes.insert("\\t".into(), "\t".into());
        cfg.char_escapes.insert("\\v".into(), "\u{b}".into());
        cfg.char_escapes.insert("\\r".into(), "\r".into());
        cfg.char_escapes.insert("\\\\".into(), "\\".into());
        cfg.char_escapes.insert("\\'".into(), "'".into());
        cfg.char_escapes.insert("\\\"".into(), "\"".into());
        cfg.char_escapes.insert("\\0".into(), "\0".into());
        cfg.allowed_level_overlay
            .insert("".into(), vec!["s".into(), "b".into(), "ln".into(), "lr".into()]);
        cfg.allowed_level_overlay.insert("/*".into(), vec!["b".into()]);
        cfg.push_range(CharRangeType::OptIdentifier, b'0', b'9');
        cfg.push_range(CharRangeType::Integer, b'0', b'9');
        cfg.push_range(CharRangeType::Ws, b' ', b' ');
        cfg.push_range(CharRangeType::Ws, b'\n', b'\n');
        cfg.push_range(CharRangeType::Ws, b'\r', b'\r');
        cfg.push_range(CharRangeType::Ws, b'\t', b'\t');
        cfg.operators.push(",".into());
        cfg.operators.push("->".into());
        cfg.operators.push("#".into());
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_cfg_levels() {
        let cfg = TokenConfig::prelude_cfg();
        assert_eq!(cfg.level_entries(TokenLevel::Comment).len(), 1);
        assert_eq!(cfg.level_entries(TokenLevel::CommentLine).len(), 2);
        assert_eq!(
            cfg.level_entries(TokenLevel::StringLevel)["s"].begin,
            SmolStr::from("\"")
        );
        assert_eq!(cfg.allowed_level_overlay[""].len(), 4);
    }

    #[test]
    fn test_prelude_cfg_escapes() {
        let cfg = TokenConfig::prelude_cfg();
        assert_eq!(cfg.char_escapes["\\n"], SmolStr::from("\n"));
        assert_eq!(cfg.char_escapes["\\\\"], SmolStr::from("\\"));
    }
}
