//! Byte-string measuring utilities.
//!
//! Source text is handled as raw bytes throughout the lexer; these helpers
//! provide the two length notions the front-end needs: code points (token
//! lengths) and grapheme columns (position accounting, tab-aware).

use std::sync::atomic::{AtomicUsize, Ordering};

/// Tab width used for column accounting, in spaces.
///
/// Written only by [`crate::engine::GlobalCtx::update_global_prefs`]; read by
/// [`length_grapheme`] on every measured run.
static TAB_WIDTH: AtomicUsize = AtomicUsize::new(4);

pub fn tab_width() -> usize {
    TAB_WIDTH.load(Ordering::Relaxed)
}

pub(crate) fn set_tab_width(width: usize) {
    TAB_WIDTH.store(width, Ordering::Relaxed);
}

/// Length of a UTF-8 byte string in code points.
///
/// Continuation bytes (`0b10xx_xxxx`) do not count.
pub fn length_cp(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count()
}

/// Length of a byte string in grapheme columns.
///
/// Simple-character approximation: every code point is one column, except
/// tabs which count [`tab_width`] columns and newline characters which count
/// zero. Combining code units therefore contribute nothing.
pub fn length_grapheme(bytes: &[u8]) -> usize {
    let tab = tab_width();
    let mut length = 0;
    for &b in bytes {
        if (b & 0xC0) != 0x80 {
            if b == b'\t' {
                length += tab;
            } else if b != b'\n' && b != b'\r' {
                length += 1;
            }
        }
    }
    length
}

/// Slice containing only the last line of the run (everything after the
/// final newline character).
pub fn trim_leading_lines(bytes: &[u8]) -> &[u8] {
    match bytes.iter().rposition(|&b| b == b'\n' || b == b'\r') {
        Some(idx) => &bytes[idx + 1..],
        None => bytes,
    }
}

/// Normalise CR and CR+LF line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_cp_ascii() {
        assert_eq!(length_cp(b"hello"), 5);
        assert_eq!(length_cp(b""), 0);
    }

    #[test]
    fn test_length_cp_multibyte() {
        // One emoji is four bytes but a single code point
        assert_eq!(length_cp("\u{1F984}\u{1F993}and\u{1F98C}".as_bytes()), 6);
        assert_eq!(length_cp("caf\u{e9}".as_bytes()), 4);
    }

    #[test]
    fn test_length_grapheme_tabs() {
        set_tab_width(4);
        assert_eq!(length_grapheme(b"\ta"), 5);
        assert_eq!(length_grapheme(b"a\tb"), 6);
    }

    #[test]
    fn test_length_grapheme_ignores_newlines() {
        assert_eq!(length_grapheme(b"\n  "), 2);
        assert_eq!(length_grapheme(b"\r\nx"), 1);
    }

    #[test]
    fn test_trim_leading_lines() {
        assert_eq!(trim_leading_lines(b"a\nbc"), b"bc");
        assert_eq!(trim_leading_lines(b"abc"), b"abc");
        assert_eq!(trim_leading_lines(b"a\n"), b"");
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
