//! Loads prelude files: parses `define_mci_rule(...)` directives into a
//! [`PreludeConfig`].

use std::path::PathBuf;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::engine::{JobsBuilder, UnitCtx, Worker};
use crate::input::SourceInput;
use crate::lexer::{CharRangeType, LevelToken, TokenKind, TokenLevel};
use crate::message::{AbortCompilation, MessageInfo, MessageKind};
use crate::parser::util::{consume_comment, is_operator_token, parse_number, parse_string};
use crate::queries::get_source_input;

use super::{Operator, PreludeConfig, RangeOperatorType, StringRule, Syntax, SyntaxType};

/// Directory holding the standard library (and the shipped preludes).
/// Overridable with the `PUSH_STD_DIR` environment variable.
pub fn get_std_dir() -> PathBuf {
    match std::env::var_os("PUSH_STD_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/lang")),
    }
}

/// Query: resolve a named prelude ("prelude", "push", "project") and load
/// it.
pub fn load_prelude(name: Arc<str>, jb: &mut JobsBuilder<Arc<PreludeConfig>>, _ctx: &Arc<UnitCtx>) {
    jb.add_job(move |w_ctx| {
        if name.as_ref() == "prelude" {
            return Ok(Arc::new(PreludeConfig::prelude_prelude()));
        }

        let mut path = get_std_dir();
        match name.as_ref() {
            "push" => path.push("prelude/push.push"),
            "project" => path.push("prelude/project.push"),
            other => {
                w_ctx.report(
                    MessageKind::ErrInvalidPrelude,
                    MessageInfo::default(),
                    vec![],
                    &[other],
                )?;
                path.push("prelude/push.push");
            }
        }

        // Prelude files are tokenised with the prelude-prelude.
        w_ctx
            .unit_ctx()
            .set_prelude_conf(Arc::new(PreludeConfig::prelude_prelude()));
        let conf = w_ctx
            .do_query(load_prelude_file, Arc::<str>::from(path.to_string_lossy()))?
            .first_result()?;
        Ok(conf)
    });
}

/// Query: run the MCI parser over a prelude file.
pub fn load_prelude_file(
    path: Arc<str>,
    jb: &mut JobsBuilder<Arc<PreludeConfig>>,
    _ctx: &Arc<UnitCtx>,
) {
    jb.add_job(move |w_ctx| {
        let mut input = get_source_input(path.clone(), w_ctx)?;
        input.configure(&w_ctx.unit_ctx().prelude_conf().token_conf);

        let mut conf = PreludeConfig::default();
        loop {
            let token = input.preview_token();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::CommentBegin => consume_comment(&mut *input),
                TokenKind::Identifier if token.content == "define_mci_rule" => {
                    let ok = {
                        let mut parser = MciParser {
                            input: &mut *input,
                            w_ctx,
                        };
                        parser.parse_rule(&mut conf)?
                    };
                    if !ok {
                        w_ctx.report(
                            MessageKind::FerrFailedPrelude,
                            MessageInfo::default(),
                            vec![],
                            &[&path],
                        )?;
                    }
                }
                _ => {
                    input.get_token();
                    w_ctx.report(
                        MessageKind::ErrNotAllowedTokenInPrelude,
                        MessageInfo::from(&token),
                        vec![],
                        &[&token.content],
                    )?;
                }
            }
        }

        // Derive THE scope access operator from the last SCOPE_ACCESS
        // syntax's "op" slot.
        let derived = conf
            .syntaxes
            .get(&SyntaxType::ScopeAccess)
            .and_then(|ops| ops.last())
            .and_then(|op| {
                op.syntax
                    .iter()
                    .find(|(_, label)| label == "op")
                    .map(|(slot, _)| slot.clone())
            });
        match derived {
            Some(op) => conf.scope_access_operator = op,
            None => {
                conf.scope_access_operator = "::".into();
                tracing::warn!("scope access operator is not defined in the prelude, using \"::\"");
                w_ctx.report(
                    MessageKind::WarnScopeAccessOperatorMissing,
                    MessageInfo::default(),
                    vec![],
                    &[],
                )?;
            }
        }

        Ok(Arc::new(conf))
    });
}

struct MciParser<'a> {
    input: &'a mut dyn SourceInput,
    w_ctx: &'a Worker,
}

impl MciParser<'_> {
    fn error(&self, token: &crate::lexer::Token) -> Result<(), AbortCompilation> {
        self.w_ctx.report(
            MessageKind::ErrParseMciRule,
            MessageInfo::from(token),
            vec![],
            &[],
        )
    }

    fn not_supported(
        &self,
        token: &crate::lexer::Token,
        feature: &str,
    ) -> Result<(), AbortCompilation> {
        self.w_ctx.report(
            MessageKind::ErrFeatureNotSupported,
            MessageInfo::from(token),
            vec![],
            &[feature],
        )
    }

    /// Consume a separating comma. `Ok(false)` on any other token.
    fn consume_comma(&mut self) -> Result<bool, AbortCompilation> {
        let token = self.input.get_token();
        if token.content != "," {
            self.error(&token)?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Translate a quoted string or a named literal like `semicolon` into
    /// its text. `Ok(None)` marks a parse error.
    fn parse_string_literal(&mut self) -> Result<Option<String>, AbortCompilation> {
        let token = self.input.preview_token();
        if token.kind == TokenKind::StringBegin {
            let text = parse_string(self.input, self.w_ctx)?;
            return Ok(Some(text));
        }
        if token.kind == TokenKind::Identifier {
            self.input.get_token();
            let text = match token.content.as_str() {
                "semicolon" => ";",
                "left_brace" => "{",
                "right_brace" => "}",
                "left_parenthesis" => "(",
                "right_parenthesis" => ")",
                "left_bracket" => "[",
                "right_bracket" => "]",
                "newline" => "\n",
                "horizontal_tab" => "\t",
                "vertical_tab" => "\u{b}",
                "carriage_return" => "\r",
                "backslash" => "\\",
                "quote" => "'",
                "double_quotes" => "\"",
                "null" => "\0",
                "triple_double_quotes" => "\"\"\"",
                "operators" | "keywords" | "ascii_oct" | "ascii_hex" | "unicode_32_hex" => {
                    // Special identifiers carry a sentinel byte prefix.
                    return Ok(Some(format!("\u{2}{}", token.content)));
                }
                _ => {
                    self.error(&token)?;
                    return Ok(None);
                }
            };
            return Ok(Some(text.to_string()));
        }
        self.error(&token)?;
        Ok(None)
    }

    /// Size of a syntax list (`single_list` .. `sextuple_list`).
    fn parse_list_size(&mut self) -> usize {
        let token = self.input.get_token();
        match token.content.as_str() {
            "single_list" => 1,
            "double_list" => 2,
            "triple_list" => 3,
            "quadruple_list" => 4,
            "quintuple_list" => 5,
            "sextuple_list" => 6,
            _ => 0,
        }
    }

    /// Parse a syntax definition, registering quoted strings as operators
    /// or keywords of the token configuration.
    fn parse_syntax(
        &mut self,
        conf: &mut PreludeConfig,
        list_size: usize,
    ) -> Result<Option<Syntax>, AbortCompilation> {
        let mut syntax = Syntax::new();
        for i in 0..list_size {
            let token = self.input.preview_token();
            let slot: SmolStr;
            if token.kind == TokenKind::StringBegin {
                let text = parse_string(self.input, self.w_ctx)?;
                if is_operator_token(&text) {
                    if !conf.token_conf.operators.iter().any(|op| op == &text) {
                        conf.token_conf.operators.push(text.clone().into());
                    }
                } else if !conf.token_conf.keywords.iter().any(|kw| kw == &text) {
                    conf.token_conf.keywords.push(text.clone().into());
                }
                slot = text.into();
            } else {
                let token = self.input.get_token();
                if token.kind != TokenKind::Identifier {
                    self.error(&token)?;
                    return Ok(None);
                }
                slot = token.content.clone();
            }

            let next = self.input.preview_token();
            if next.kind == TokenKind::Op && next.content == "->" {
                self.input.get_token();
                let label = self.input.get_token();
                if label.kind != TokenKind::Identifier {
                    self.error(&label)?;
                    return Ok(None);
                }
                syntax.push((slot, label.content.clone()));
            } else {
                syntax.push((slot, SmolStr::default()));
            }

            if i + 1 < list_size && !self.consume_comma()? {
                return Ok(None);
            }
        }
        Ok(Some(syntax))
    }

    /// Parse an operator record: `[AMBIGUOUS,] precedence [CLASS n]
    /// [FROM n] [BIAS n], ltr|rtl, <list size>, syntax...`.
    fn parse_operator(
        &mut self,
        conf: &mut PreludeConfig,
        op: &mut Operator,
    ) -> Result<bool, AbortCompilation> {
        if self.input.preview_token().content == "AMBIGUOUS" {
            self.input.get_token();
            op.ambiguous = true;
            if !self.consume_comma()? {
                return Ok(false);
            }
        }

        op.precedence = parse_number(self.input, self.w_ctx)? as u32;
        if self.input.preview_token().content == "CLASS" {
            self.input.get_token();
            op.prec_class.0 = parse_number(self.input, self.w_ctx)? as u32;
        }
        if self.input.preview_token().content == "FROM" {
            self.input.get_token();
            op.prec_class.1 = parse_number(self.input, self.w_ctx)? as u32;
        }
        if self.input.preview_token().content == "BIAS" {
            self.input.get_token();
            op.prec_bias = parse_number(self.input, self.w_ctx)? as u32;
        }
        if !self.consume_comma()? {
            return Ok(false);
        }

        let alignment = self.input.get_token();
        if alignment.kind != TokenKind::Identifier
            || (alignment.content != "ltr" && alignment.content != "rtl")
        {
            self.error(&alignment)?;
            return Ok(false);
        }
        op.ltr = alignment.content == "ltr";
        if !self.consume_comma()? {
            return Ok(false);
        }

        let list_size = self.parse_list_size();
        if !self.consume_comma()? {
            return Ok(false);
        }

        match self.parse_syntax(conf, list_size)? {
            Some(syntax) => {
                op.syntax = syntax;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Extract one `define_mci_rule(...)` into the configuration.
    /// `Ok(false)` marks a parse error.
    fn parse_rule(&mut self, conf: &mut PreludeConfig) -> Result<bool, AbortCompilation> {
        let token = self.input.get_token();
        if token.kind != TokenKind::Identifier || token.content != "define_mci_rule" {
            self.error(&token)?;
            return Ok(false);
        }
        let token = self.input.get_token();
        if token.kind != TokenKind::TermBegin {
            self.error(&token)?;
            return Ok(false);
        }

        let token = self.input.get_token();
        if token.kind != TokenKind::Identifier {
            self.error(&token)?;
            return Ok(false);
        }
        let mci = token.content.clone();

        let mut token = self.input.preview_token();
        if token.kind != TokenKind::Op || token.content != "," {
            self.error(&token)?;
            return Ok(false);
        }

        while token.kind == TokenKind::Op && token.content == "," {
            self.input.get_token();
            if !self.parse_mci_argument(conf, &mci)? {
                return Ok(false);
            }
            token = self.input.preview_token();
        }

        let token = self.input.get_token();
        if token.kind != TokenKind::TermEnd {
            self.error(&token)?;
            return Ok(false);
        }
        let token = self.input.get_token();
        if token.kind != TokenKind::StatDivider {
            self.error(&token)?;
            return Ok(false);
        }
        Ok(true)
    }

    fn parse_mci_argument(
        &mut self,
        conf: &mut PreludeConfig,
        mci: &str,
    ) -> Result<bool, AbortCompilation> {
        macro_rules! literal {
            () => {
                match self.parse_string_literal()? {
                    Some(text) if !text.is_empty() => text,
                    _ => return Ok(false),
                }
            };
        }

        match mci {
            "EXPRESSION_RULES" => {
                let kind = self.input.get_token();
                match kind.content.as_str() {
                    "divide" => {
                        let divider = literal!();
                        conf.token_conf.stat_divider.push(divider.into());
                    }
                    "block" => {
                        let begin = literal!();
                        let end = literal!();
                        conf.token_conf.block.push((begin.into(), end.into()));
                    }
                    "term" => {
                        let begin = literal!();
                        let end = literal!();
                        conf.token_conf.term.push((begin.into(), end.into()));
                    }
                    "array" => {
                        let begin = literal!();
                        let end = literal!();
                        conf.token_conf.array.push((begin.into(), end.into()));
                    }
                    _ => {
                        self.error(&kind)?;
                        return Ok(false);
                    }
                }
            }
            "IDENTIFIER_RULES" => {
                let kind = self.input.get_token();
                match kind.content.as_str() {
                    "no_spaces" => conf.spaces_bind_identifiers = false,
                    "spaces" => conf.spaces_bind_identifiers = true,
                    "unused" => {
                        if self.input.get_token().content != "begin" {
                            self.not_supported(&kind, "unused variable not with prefix")?;
                            return Ok(false);
                        }
                        let prefix = literal!();
                        conf.unused_prefix.push(prefix.into());
                    }
                    _ => {
                        self.error(&kind)?;
                        return Ok(false);
                    }
                }
            }
            "IDENTIFIER_CASE" => {
                let category = self.input.get_token();
                if category.kind != TokenKind::Identifier {
                    self.error(&category)?;
                    return Ok(false);
                }
                let case_token = self.input.get_token();
                if case_token.kind != TokenKind::Identifier {
                    self.error(&case_token)?;
                    return Ok(false);
                }
                let case = match case_token.content.as_str() {
                    "snake" => super::IdentifierCase::Snake,
                    "pascal" => super::IdentifierCase::Pascal,
                    "camel" => super::IdentifierCase::Camel,
                    _ => {
                        self.error(&case_token)?;
                        return Ok(false);
                    }
                };
                match category.content.as_str() {
                    "functions" => conf.function_case = case,
                    "method" => conf.method_case = case,
                    "variable" => conf.variable_case = case,
                    "module" => conf.module_case = case,
                    "struct" => conf.struct_case = case,
                    "trait" => conf.trait_case = case,
                    _ => {}
                }
            }
            "LITERAL_CHARACTER_ESCAPES" => {
                let escape = literal!();
                let value = literal!();
                conf.token_conf
                    .char_escapes
                    .insert(escape.into(), value.into());
            }
            "NEW_RANGE" => {
                let kind = self.input.get_token();
                if kind.kind != TokenKind::Identifier {
                    self.error(&kind)?;
                    return Ok(false);
                }
                let range = match kind.content.as_str() {
                    "identifier" => CharRangeType::Identifier,
                    "operator" => CharRangeType::Op,
                    "integer" => CharRangeType::Integer,
                    "whitespace" => CharRangeType::Ws,
                    "opt_identifier" => CharRangeType::OptIdentifier,
                    _ => {
                        self.error(&kind)?;
                        return Ok(false);
                    }
                };
                while self.input.preview_token().kind != TokenKind::TermEnd {
                    if !self.consume_comma()? {
                        return Ok(false);
                    }
                    let from = literal!();
                    let next = self.input.preview_token();
                    if next.kind != TokenKind::TermEnd && next.content != "," {
                        let to = literal!();
                        conf.token_conf
                            .push_range(range, from.as_bytes()[0], to.as_bytes()[0]);
                    } else {
                        conf.token_conf
                            .push_range(range, from.as_bytes()[0], from.as_bytes()[0]);
                    }
                }
            }
            "NEW_LEVEL" => {
                let kind = self.input.get_token();
                let level = match kind.content.as_str() {
                    "NORMAL" => TokenLevel::Normal,
                    "COMMENT" => TokenLevel::Comment,
                    "COMMENT_LINE" => TokenLevel::CommentLine,
                    "STRING" => TokenLevel::StringLevel,
                    _ => {
                        self.error(&kind)?;
                        return Ok(false);
                    }
                };
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let name = self.input.get_token().content.clone();

                let mut string_rule = StringRule {
                    escaped: true,
                    utf8: true,
                    ..StringRule::default()
                };
                while self.input.preview_token().content == "," {
                    self.input.get_token();
                    let group = self.input.preview_token();
                    match group.content.as_str() {
                        "overlay" => {
                            self.input.get_token();
                            loop {
                                let inner = self.input.get_token();
                                let outer_begin = conf.token_conf.level_map[level.index()]
                                    .get(name.as_str())
                                    .map(|entry| entry.begin.clone())
                                    .unwrap_or_default();
                                conf.token_conf
                                    .allowed_level_overlay
                                    .entry(outer_begin)
                                    .or_default()
                                    .push(inner.content.clone());
                                let next = self.input.preview_token();
                                if next.kind == TokenKind::TermEnd || next.content == "," {
                                    break;
                                }
                            }
                        }
                        "prefix" => {
                            if level != TokenLevel::StringLevel {
                                self.error(&group)?;
                                return Ok(false);
                            }
                            self.input.get_token();
                            let prefix = literal!();
                            string_rule.prefix = prefix.into();
                        }
                        "rep_delimiter" => {
                            if level != TokenLevel::StringLevel {
                                self.error(&group)?;
                                return Ok(false);
                            }
                            self.input.get_token();
                            let rep_begin = literal!();
                            let rep_end = literal!();
                            string_rule.rep_begin = rep_begin.into();
                            string_rule.rep_end = rep_end.into();
                        }
                        _ => {
                            let begin = literal!();
                            let end = literal!();
                            string_rule.begin = begin.clone().into();
                            string_rule.end = end.clone().into();
                            conf.token_conf.level_map[level.index()].insert(
                                name.clone(),
                                LevelToken {
                                    begin: begin.into(),
                                    end: end.into(),
                                },
                            );
                        }
                    }
                }
                if level == TokenLevel::StringLevel {
                    conf.string_rules.push(string_rule);
                }
            }
            "SYNTAX" => {
                let mut op = Operator::new();

                let type_token = self.input.get_token();
                if type_token.kind != TokenKind::Identifier {
                    self.error(&type_token)?;
                    return Ok(false);
                }
                if !self.consume_comma()? {
                    return Ok(false);
                }

                let syntax_type = match type_token.content.as_str() {
                    "OPERATOR" | "ASSIGNMENT" | "IMPLICATION" => {
                        let syntax_type = match type_token.content.as_str() {
                            "ASSIGNMENT" => SyntaxType::Assignment,
                            "IMPLICATION" => SyntaxType::Implication,
                            _ => SyntaxType::Op,
                        };
                        let fn_token = self.input.get_token();
                        if fn_token.kind != TokenKind::Identifier {
                            self.error(&fn_token)?;
                            return Ok(false);
                        }
                        op.fn_name = fn_token.content.clone();
                        if !self.consume_comma()? {
                            return Ok(false);
                        }
                        syntax_type
                    }
                    "FUNCTION_DEFINITION" => {
                        let fn_token = self.input.get_token();
                        if fn_token.kind != TokenKind::Identifier {
                            self.error(&fn_token)?;
                            return Ok(false);
                        }
                        op.fn_name = fn_token.content.clone();
                        if !self.consume_comma()? {
                            return Ok(false);
                        }
                        SyntaxType::FuncDef
                    }
                    "RANGE" => {
                        let range_token = self.input.get_token();
                        op.range = Some(match range_token.content.as_str() {
                            "EXCLUDING" => RangeOperatorType::Exclude,
                            "FROM_EXCLUDING" => RangeOperatorType::ExcludeFrom,
                            "TO_EXCLUDING" => RangeOperatorType::ExcludeTo,
                            "INCLUDING" => RangeOperatorType::Include,
                            "TO_INCLUDING" => RangeOperatorType::IncludeTo,
                            _ => {
                                self.error(&range_token)?;
                                return Ok(false);
                            }
                        });
                        if !self.consume_comma()? {
                            return Ok(false);
                        }
                        SyntaxType::Range
                    }
                    "SCOPE_ACCESS" => SyntaxType::ScopeAccess,
                    "MODULE_SPECIFIER" => SyntaxType::ModuleSpec,
                    "MEMBER_ACCESS" => SyntaxType::MemberAccess,
                    "ARRAY_ACCESS" => SyntaxType::ArrayAccess,
                    "FUNCTION_HEAD" => SyntaxType::FuncHead,
                    "MACRO" => SyntaxType::Macro,
                    "ANNOTATION" => SyntaxType::Annotation,
                    "UNSAFE_BLOCK" => SyntaxType::UnsafeBlock,
                    "STATIC_STATEMENT" => SyntaxType::StaticStatement,
                    "REFERENCE_ATTR" => SyntaxType::ReferenceAttr,
                    "MUTABLE_ATTR" => SyntaxType::MutableAttr,
                    "TYPED" => SyntaxType::Typed,
                    "TYPE_OF" => SyntaxType::TypeOf,
                    "DECLARATION_ATTR" => SyntaxType::DeclAttr,
                    "PUBLIC_ATTR" => SyntaxType::PublicAttr,
                    "COMMA_OPERATOR" => SyntaxType::Comma,
                    "STRUCTURE" => SyntaxType::Structure,
                    "TRAIT" => SyntaxType::Trait,
                    "IMPLEMENTATION" => SyntaxType::Implementation,
                    "SIMPLE_BINDING" => SyntaxType::SimpleBinding,
                    "ALIAS_BINDING" => SyntaxType::AliasBinding,
                    "IF_EXPRESSION" => SyntaxType::IfCond,
                    "IF_ELSE_EXPRESSION" => SyntaxType::IfElse,
                    "PRE_CONDITION_LOOP_CONTINUE" => SyntaxType::PreCondLoopContinue,
                    "PRE_CONDITION_LOOP_ABORT" => SyntaxType::PreCondLoopAbort,
                    "POST_CONDITION_LOOP_CONTINUE" => SyntaxType::PostCondLoopContinue,
                    "POST_CONDITION_LOOP_ABORT" => SyntaxType::PostCondLoopAbort,
                    "INFINITE_LOOP" => SyntaxType::InfLoop,
                    "ITERATOR_LOOP" => SyntaxType::ItrLoop,
                    "MATCH_EXPRESSION" => SyntaxType::Match,
                    "TEMPLATE_POSTFIX" => SyntaxType::TemplatePostfix,
                    _ => {
                        self.error(&type_token)?;
                        return Ok(false);
                    }
                };

                if !self.parse_operator(conf, &mut op)? {
                    return Ok(false);
                }
                conf.syntaxes.entry(syntax_type).or_default().push(op);
            }
            "BASE_TYPE" => {
                let slot = self.input.get_token();
                if slot.kind != TokenKind::Identifier {
                    self.error(&slot)?;
                    return Ok(false);
                }
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let name = self.input.get_token();
                if name.kind != TokenKind::Identifier {
                    self.error(&name)?;
                    return Ok(false);
                }
                let target = match slot.content.as_str() {
                    "INTEGER" => &mut conf.integer_trait,
                    "STRING" => &mut conf.string_trait,
                    "TUPLE" => &mut conf.tuple_trait,
                    "ARRAY" => &mut conf.array_trait,
                    "ITERATOR" => &mut conf.iterator_trait,
                    "IMPLICATION" => &mut conf.implication_trait,
                    "NEVER" => &mut conf.never_trait,
                    "DROP" => &mut conf.drop_fn,
                    "EQUALS" => &mut conf.equals_fn,
                    "ITR_VALID" => &mut conf.itr_valid_fn,
                    "ITR_GET" => &mut conf.itr_get_fn,
                    "ITR_NEXT" => &mut conf.itr_next_fn,
                    _ => {
                        self.error(&slot)?;
                        return Ok(false);
                    }
                };
                *target = name.content.clone();
            }
            "SPECIAL_TYPE" => {
                let intrinsic = self.input.get_token();
                if intrinsic.kind != TokenKind::Identifier {
                    self.error(&intrinsic)?;
                    return Ok(false);
                }
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let name = literal!();
                conf.special_types
                    .insert(name.into(), intrinsic.content.clone());
            }
            "TYPE_MEMORY_BLOB" => {
                let name = literal!();
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let size = parse_number(self.input, self.w_ctx)?;
                conf.memblob_types.insert(name.into(), size as u8);
            }
            "NEW_LITERAL" => {
                let name = literal!();
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let type_name = literal!();
                if !self.consume_comma()? {
                    return Ok(false);
                }
                let value = parse_number(self.input, self.w_ctx)?;
                conf.literals
                    .insert(name.into(), (type_name.into(), value));
            }
            _ => {
                let info = MessageInfo::default();
                self.w_ctx
                    .report(MessageKind::ErrUnknownMci, info, vec![], &[mci])?;
                return Ok(false);
            }
        }
        Ok(true)
    }
}
