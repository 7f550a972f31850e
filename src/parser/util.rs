//! Token-stream helpers shared by the prelude loader and the scope parser.

use crate::engine::Worker;
use crate::input::SourceInput;
use crate::lexer::{Token, TokenKind, TokenLevel};
use crate::message::{AbortCompilation, MessageInfo, MessageKind};

/// Consume any amount of comments. Relies on the token level reported by
/// the lexer, so nested block comments and line comments both work.
pub fn consume_comment(input: &mut dyn SourceInput) {
    while input.preview_token().kind == TokenKind::CommentBegin {
        input.get_token();
        loop {
            let token = input.preview_token();
            if token.kind == TokenKind::Eof {
                return;
            }
            if !matches!(token.level, TokenLevel::Comment | TokenLevel::CommentLine) {
                break;
            }
            input.get_token();
        }
    }
}

/// Check for an expected token and return it. All preceding comments are
/// ignored; a mismatch is reported with the given message kind.
pub fn expect_token_or_comment(
    kind: TokenKind,
    message: MessageKind,
    input: &mut dyn SourceInput,
    w_ctx: &Worker,
) -> Result<Token, AbortCompilation> {
    consume_comment(input);
    let token = input.get_token();
    if token.kind != kind {
        w_ctx.report(message, MessageInfo::from(&token), vec![], &[kind.name()])?;
    }
    Ok(token)
}

/// Parse a string literal: joins every token the lexer emits inside the
/// string level, translating escape sequences and preserving the interior
/// whitespace exactly.
pub fn parse_string(input: &mut dyn SourceInput, w_ctx: &Worker) -> Result<String, AbortCompilation> {
    let token = input.get_token();
    if token.kind != TokenKind::StringBegin {
        tracing::error!("string does not start with a string begin token");
        return Ok(String::new());
    }

    let escapes = w_ctx.unit_ctx().prelude_conf().token_conf.char_escapes.clone();
    let mut ret = String::new();
    loop {
        let next = input.preview_token();
        match next.kind {
            TokenKind::StringEnd => {
                ret.push_str(&input.get_token().leading_ws);
                break;
            }
            TokenKind::Eof => {
                w_ctx.report(
                    MessageKind::ErrUnexpectedEofAtStringParsing,
                    MessageInfo::from(&next),
                    vec![],
                    &[],
                )?;
                return Ok(String::new());
            }
            _ => {
                let token = input.get_token();
                let content = if token.kind == TokenKind::EscapedChar {
                    escapes
                        .get(token.content.as_str())
                        .cloned()
                        .unwrap_or_else(|| token.content.clone())
                } else {
                    token.content.clone()
                };
                if !ret.is_empty() {
                    ret.push_str(&token.leading_ws);
                }
                ret.push_str(&content);
            }
        }
    }
    Ok(ret)
}

/// Parse a number literal token into its value.
pub fn parse_number(input: &mut dyn SourceInput, w_ctx: &Worker) -> Result<u64, AbortCompilation> {
    let token = input.get_token();
    if token.kind == TokenKind::Number {
        match token.content.parse::<u64>() {
            Ok(value) => Ok(value),
            Err(_) => {
                w_ctx.report(
                    MessageKind::ErrParseNumber,
                    MessageInfo::from(&token),
                    vec![],
                    &[],
                )?;
                Ok(0)
            }
        }
    } else {
        w_ctx.report(
            MessageKind::ErrParseNumber,
            MessageInfo::from(&token),
            vec![],
            &[],
        )?;
        Ok(0)
    }
}

/// A very rough classification: a quoted grammar item is an operator unless
/// it starts like an identifier.
pub fn is_operator_token(token: &str) -> bool {
    match token.bytes().next() {
        None => {
            tracing::error!("empty token string in is_operator_token");
            true
        }
        Some(b) => !(b.is_ascii_alphanumeric() || b >= 128),
    }
}
