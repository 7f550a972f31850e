//! The scope parser: a data-driven precedence parser producing AST nodes.
//!
//! The parser holds a list of tentative *paths*; ambiguous rules fork a
//! path, committed precedence classes fold sibling paths back together, and
//! the closing token selects the path with the lexicographically smallest
//! precedence-class history.

pub mod rules;
pub mod util;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::ast::{AstNode, ExprKind, ExprProperty};
use crate::engine::{JobsBuilder, UnitCtx, Worker};
use crate::input::SourceInput;
use crate::lexer::TokenKind;
use crate::message::{AbortCompilation, MessageInfo, MessageKind};
use crate::prelude::{NO_BIAS_VALUE, PreludeConfig, loader};
use crate::queries::get_source_input;

use rules::SyntaxRule;
use util::{consume_comment, expect_token_or_comment, parse_string};

/// Context built up while parsing one crate.
#[derive(Default)]
pub struct CrateCtx {
    /// The abstract syntax tree of the crate's root scope.
    pub ast: AstNode,
    /// Pre-sorted grammar rules.
    pub rules: Vec<SyntaxRule>,
    /// Literal keywords mapped to their type name and memory value.
    pub literals_map: FxHashMap<SmolStr, (SmolStr, u64)>,
    /// Type name of integer literals.
    pub int_type: SmolStr,
    /// Type name of string literals.
    pub str_type: SmolStr,
}

impl CrateCtx {
    pub fn new() -> CrateCtx {
        CrateCtx::default()
    }
}

/// Pull the basic type bindings the parser needs out of the prelude.
pub fn load_base_types(c_ctx: &mut CrateCtx, conf: &PreludeConfig) {
    c_ctx.int_type = conf.integer_trait.clone();
    c_ctx.str_type = conf.string_trait.clone();
    for (name, (type_name, value)) in &conf.literals {
        c_ctx
            .literals_map
            .insert(name.clone(), (type_name.clone(), *value));
    }
}

/// One tentative parse state: an expression stack plus the history of
/// precedence classes as (from, to) pairs used for path folding.
#[derive(Clone)]
struct Path {
    stack: Vec<AstNode>,
    history: Vec<(u32, u32)>,
}

impl Path {
    fn root() -> Path {
        Path {
            stack: Vec::new(),
            history: vec![(u32::MAX, u32::MAX)],
        }
    }
}

/// Checks if a prelude is defined and loads the proper prelude. Should be
/// called at the beginning of a file.
pub fn select_prelude(
    input: &mut dyn SourceInput,
    w_ctx: &Worker,
) -> Result<(), AbortCompilation> {
    // Load the prelude-prelude first so the directive itself can be lexed.
    let ctx = w_ctx.unit_ctx();
    let boot = w_ctx
        .do_query(loader::load_prelude, Arc::<str>::from("prelude"))?
        .first_result()?;
    ctx.set_prelude_conf(boot);
    input.configure(&ctx.prelude_conf().token_conf);

    consume_comment(input);

    // A `#prelude(...)` directive selects the grammar; any other leading
    // `#` belongs to the code (e.g. an annotation) and is left previewed
    // for the parser.
    let token = input.preview_token();
    let directive = token.kind == TokenKind::Op && token.content == "#" && {
        let name_token = input.preview_next_token();
        name_token.kind == TokenKind::Identifier && name_token.content == "prelude"
    };
    let conf;
    if directive {
        input.get_token();
        input.get_token();

        expect_token_or_comment(
            TokenKind::TermBegin,
            MessageKind::ErrMalformedPreludeCommand,
            input,
            w_ctx,
        )?;

        let selector = input.preview_token();
        if selector.kind == TokenKind::Identifier {
            input.get_token();
            conf = w_ctx
                .do_query(
                    loader::load_prelude,
                    Arc::<str>::from(selector.content.as_str()),
                )?
                .last_result()?;
        } else if selector.kind == TokenKind::StringBegin {
            let path = parse_string(input, w_ctx)?;
            conf = w_ctx
                .do_query(loader::load_prelude_file, Arc::<str>::from(path))?
                .last_result()?;
        } else {
            w_ctx.report(
                MessageKind::ErrMalformedPreludeCommand,
                MessageInfo::from(&selector),
                vec![],
                &["prelude name or path"],
            )?;
            conf = w_ctx
                .do_query(loader::load_prelude, Arc::<str>::from("push"))?
                .last_result()?;
        }

        expect_token_or_comment(
            TokenKind::TermEnd,
            MessageKind::ErrMalformedPreludeCommand,
            input,
            w_ctx,
        )?;
    } else if let Some(path) = explicit_prelude_pref(w_ctx)? {
        conf = w_ctx
            .do_query(loader::load_prelude_file, Arc::<str>::from(path))?
            .last_result()?;
    } else {
        conf = w_ctx
            .do_query(loader::load_prelude, Arc::<str>::from("push"))?
            .last_result()?;
    }

    ctx.set_prelude_conf(conf);
    input.configure(&ctx.prelude_conf().token_conf);
    Ok(())
}

fn explicit_prelude_pref(w_ctx: &Worker) -> Result<Option<String>, AbortCompilation> {
    use crate::engine::{PrefType, PrefValue};
    let pref = w_ctx
        .global_ctx()?
        .get_pref_or_set(PrefType::PreludePath, PrefValue::Str(String::new()));
    let path = pref.as_str();
    Ok(if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    })
}

/// Parse a scope into the AST. Used recursively; `last_token` is the
/// opening token of the scope, when there is one.
pub fn parse_scope(
    input: &mut dyn SourceInput,
    w_ctx: &Worker,
    c_ctx: &CrateCtx,
    end_token: TokenKind,
    last_token: Option<&crate::lexer::Token>,
) -> Result<AstNode, AbortCompilation> {
    let mut paths = vec![Path::root()];

    loop {
        consume_comment(input);
        let token = input.preview_token();

        let mut add_to_all_paths: Option<AstNode> = None;
        if token.kind == end_token {
            break;
        } else if token.kind == TokenKind::Eof {
            let info = last_token
                .map(MessageInfo::from)
                .unwrap_or_else(|| MessageInfo::from(&token));
            w_ctx.report(MessageKind::ErrUnexpectedEofAfter, info, vec![], &[])?;
            break;
        } else if matches!(
            token.kind,
            TokenKind::BlockBegin | TokenKind::TermBegin | TokenKind::ArrayBegin
        ) {
            input.get_token();
            let close = match token.kind {
                TokenKind::BlockBegin => TokenKind::BlockEnd,
                TokenKind::TermBegin => TokenKind::TermEnd,
                _ => TokenKind::ArrayEnd,
            };
            add_to_all_paths = Some(parse_scope(input, w_ctx, c_ctx, close, Some(&token))?);
        } else if token.kind == TokenKind::Identifier {
            input.get_token();
            let mut expr;
            if let Some((type_name, value)) = c_ctx.literals_map.get(token.content.as_str()) {
                expr = AstNode::new(ExprKind::NumericLiteral);
                expr.literal_type = type_name.clone();
                expr.literal_number = *value;
            } else {
                expr = AstNode::new(ExprKind::AtomicSymbol);
                expr.symbol_name = token.content.clone();
            }
            expr.pos = token_pos(&token);
            add_to_all_paths = Some(expr);
        } else if token.kind == TokenKind::Number {
            input.get_token();
            let mut expr = AstNode::new(ExprKind::NumericLiteral);
            expr.literal_type = c_ctx.int_type.clone();
            expr.literal_number = token.content.parse().unwrap_or_else(|_| {
                tracing::trace!(content = %token.content, "number literal out of range");
                0
            });
            expr.pos = token_pos(&token);
            add_to_all_paths = Some(expr);
        } else if token.kind == TokenKind::StatDivider {
            input.get_token();
            let mut reported = false;
            for (idx, path) in paths.iter_mut().enumerate() {
                if path.stack.is_empty() {
                    if idx == 0 && !reported {
                        w_ctx.report(
                            MessageKind::ErrSemicolonWithoutMeaning,
                            MessageInfo::from(&token),
                            vec![],
                            &[],
                        )?;
                        reported = true;
                    }
                } else {
                    let mut expr = AstNode::new(ExprKind::SingleCompleted);
                    expr.pos = token_pos(&token);
                    let top = path.stack.pop().unwrap_or_default();
                    expr.children.push(top);
                    path.stack.push(expr);
                }
            }
        } else if token.kind == TokenKind::StringBegin {
            let mut expr = AstNode::new(ExprKind::StringLiteral);
            expr.literal_string = parse_string(input, w_ctx)?;
            expr.literal_type = c_ctx.str_type.clone();
            expr.pos = token_pos(&token);
            add_to_all_paths = Some(expr);
        } else {
            input.get_token();
            let mut expr = AstNode::new(ExprKind::Token);
            expr.pos = token_pos(&token);
            expr.token = Some(token.clone());
            add_to_all_paths = Some(expr);
        }

        if let Some(expr) = add_to_all_paths {
            for path in &mut paths {
                path.stack.push(expr.clone());
            }
        }

        // Test the new token against the grammar for all paths.
        let mut fold_counter = 0usize;
        let old_paths_count = paths.len();
        for i in 0..old_paths_count {
            apply_rules_on_path(&mut paths, i, old_paths_count, c_ctx, w_ctx, &mut fold_counter)?;
        }

        // Path folding: pair each path with the sibling from the most
        // recent ambiguous fork and keep the one with the smaller class.
        if fold_counter > 0 {
            let half = paths.len() / 2;
            if fold_counter != half {
                tracing::warn!(
                    requested = fold_counter,
                    paths = paths.len(),
                    "path folding requested with mismatching path count"
                );
            } else {
                for i in 0..half {
                    let first = paths[i]
                        .history
                        .last()
                        .copied()
                        .unwrap_or((u32::MAX, u32::MAX));
                    let second = paths[i + half]
                        .history
                        .last()
                        .copied()
                        .unwrap_or((u32::MAX, u32::MAX));
                    if first.0 > second.0 {
                        paths[i] = paths[i + half].clone();
                    }
                    paths[i].history.pop();
                }
                paths.truncate(half);
            }
        }
    }

    let ending_token = input.get_token();

    // Select the path with the smallest history, component-wise.
    let mut best_idx = 0;
    for idx in 1..paths.len() {
        let (mut better, mut equal) = (true, true);
        let candidate = &paths[idx].history;
        let best = &paths[best_idx].history;
        for (c, b) in candidate.iter().zip(best.iter()) {
            if c > b {
                better = false;
                break;
            }
            if c != b {
                equal = false;
            }
        }
        if better && !equal {
            best_idx = idx;
        }
    }
    let expr_list = std::mem::take(&mut paths[best_idx].stack);

    // Build the scope node.
    let open_pos = last_token.map(token_pos).unwrap_or_default();
    let full_pos = open_pos.merge(&token_pos(&ending_token));
    match end_token {
        TokenKind::Eof => {
            let mut scope = AstNode::new(ExprKind::DeclScope);
            scope.children = expr_list;
            Ok(scope)
        }
        TokenKind::BlockEnd => {
            if expr_list.len() == 1 && expr_list[0].kind == ExprKind::CommaList {
                let mut set = AstNode::new(ExprKind::Set);
                set.pos = open_pos;
                set.children = expr_list.into_iter().next().unwrap_or_default().children;
                Ok(set)
            } else {
                let mut block = AstNode::new(ExprKind::Block);
                block.pos = open_pos;
                block.children = expr_list;
                Ok(block)
            }
        }
        TokenKind::TermEnd => {
            if expr_list.len() > 1 {
                w_ctx.report(
                    MessageKind::ErrTermWithMultipleExpr,
                    MessageInfo::from(&expr_list[1].pos),
                    vec![],
                    &[],
                )?;
                Ok(AstNode::new(ExprKind::Tuple))
            } else if expr_list.is_empty() {
                let mut unit = AstNode::new(ExprKind::Unit);
                unit.pos = full_pos;
                Ok(unit)
            } else if expr_list[0].kind == ExprKind::CommaList {
                let mut tuple = AstNode::new(ExprKind::Tuple);
                tuple.pos = full_pos;
                tuple.children = expr_list.into_iter().next().unwrap_or_default().children;
                Ok(tuple)
            } else {
                let mut term = AstNode::new(ExprKind::Term);
                term.pos = full_pos;
                term.children = expr_list;
                Ok(term)
            }
        }
        TokenKind::ArrayEnd => {
            let mut array = AstNode::new(ExprKind::ArraySpecifier);
            array.pos = full_pos;
            array.children = expr_list;
            Ok(array)
        }
        _ => {
            tracing::error!("trying to parse a scope which is no scope");
            Ok(AstNode::new(ExprKind::None))
        }
    }
}

fn token_pos(token: &crate::lexer::Token) -> crate::base::PosInfo {
    crate::base::PosInfo::new(token.file.clone(), token.line, token.column, token.length)
}

/// Run the rule-matching loop for one path until no rule matches any more.
fn apply_rules_on_path(
    paths: &mut Vec<Path>,
    i: usize,
    old_paths_count: usize,
    c_ctx: &CrateCtx,
    w_ctx: &Worker,
    fold_counter: &mut usize,
) -> Result<(), AbortCompilation> {
    let mut skip_ctr = 0usize;
    loop {
        // Find the best matching rule for the stack tail. The rule list is
        // pre-sorted (bias desc, precedence desc); the best match is the
        // smallest bias when biases are comparable, otherwise the smallest
        // precedence.
        let mut best: Option<usize> = None;
        let mut best_rev: Vec<AstNode> = Vec::new();
        let mut best_stst: Vec<AstNode> = Vec::new();
        let mut best_cutout = 0usize;

        for (rule_idx, rule) in c_ctx.rules.iter().enumerate() {
            let acceptable = match best {
                None => true,
                Some(best_idx) => {
                    let current = &c_ctx.rules[best_idx];
                    let use_bias = rule.prec_bias != NO_BIAS_VALUE
                        && current.prec_bias != NO_BIAS_VALUE
                        && rule.prec_bias != current.prec_bias;
                    (!use_bias && rule.precedence <= current.precedence)
                        || (use_bias && rule.prec_bias < current.prec_bias)
                }
            };
            if !acceptable {
                continue;
            }

            let rule_length = rule.pattern.len();
            let mut rev_list: Vec<AstNode> = Vec::new();
            let mut stst_set: Vec<AstNode> = Vec::new();
            let mut cutout = 0usize;
            for expr in paths[i].stack.iter().rev() {
                if rev_list.len() >= rule_length {
                    break;
                }
                if expr.kind == ExprKind::StaticStatement {
                    stst_set.push(expr.clone());
                } else if cutout >= skip_ctr
                    && expr.has_prop(ExprProperty::Separable)
                    && (rule.precedence < expr.precedence
                        || (!rule.ltr && rule.precedence == expr.precedence))
                {
                    expr.split_prepend_recursively(
                        &mut rev_list,
                        &mut stst_set,
                        rule.precedence,
                        rule.ltr,
                        rule_length,
                    );
                } else {
                    rev_list.push(expr.clone());
                }
                cutout += 1;
            }

            if rule.matches_reversed(&rev_list) {
                best = Some(rule_idx);
                best_rev = rev_list;
                best_stst = stst_set;
                best_cutout = cutout;
            }
        }

        let Some(best_idx) = best else { return Ok(()) };
        let rule = &c_ctx.rules[best_idx];
        if rule.ambiguous && skip_ctr > 0 {
            return Ok(());
        }

        let mut update_precedence_to_path = false;
        if rule.ambiguous {
            // Fork: the unchanged copy waits for a later resolution, the
            // original path applies the rule now.
            let mut unchanged = paths[i].clone();
            unchanged.history.push((u32::MAX, rule.prec_class.0));
            paths.push(unchanged);
            paths[i]
                .history
                .push((rule.prec_class.0, rule.prec_class.0));
        } else if old_paths_count > 1 {
            if let Some(back) = paths[i].history.last_mut() {
                if back.1 == rule.prec_class.1 && back.0 == u32::MAX {
                    back.0 = rule.prec_class.0;
                    update_precedence_to_path = true;
                    *fold_counter += 1;
                }
            }
        }

        // Apply: drop the consumed expressions, re-push separable
        // remainders, then push the constructed node.
        {
            let stack = &mut paths[i].stack;
            stack.truncate(stack.len() - best_cutout);
            for expr in best_rev[rule.pattern.len()..].iter().rev() {
                stack.push(expr.clone());
            }
        }
        best_rev.truncate(rule.pattern.len());
        best_rev.reverse();
        let mut result = rule.create(&best_rev, w_ctx)?;
        result.static_statements = best_stst;
        if result.has_prop(ExprProperty::Separable) && update_precedence_to_path {
            result.precedence = rule.prec_class.0;
        }
        paths[i].stack.push(result);

        // One expression is always skipped on the recheck so the same
        // ambiguous rule is not applied to its own result.
        skip_ctr = 1;
    }
}

// ----------------------------------------------------------------------
// Queries
// ----------------------------------------------------------------------

/// Query: the parsed crate context for the unit's root file.
pub fn get_ast(_args: (), jb: &mut JobsBuilder<Arc<CrateCtx>>, _ctx: &Arc<UnitCtx>) {
    jb.add_job(|w_ctx| Ok(w_ctx.do_query(parse_ast, ())?.last_result()?));
}

/// Query: run the prelude selection and the scope parser over the unit's
/// root file.
pub fn parse_ast(_args: (), jb: &mut JobsBuilder<Arc<CrateCtx>>, _ctx: &Arc<UnitCtx>) {
    jb.add_job(|w_ctx| {
        let start = std::time::Instant::now();
        let file = w_ctx.unit_ctx().root_file.clone();
        let mut input = get_source_input(file, w_ctx)?;

        select_prelude(&mut *input, w_ctx)?;

        let conf = w_ctx.unit_ctx().prelude_conf();
        let mut c_ctx = CrateCtx::new();
        load_base_types(&mut c_ctx, &conf);
        rules::load_syntax_rules(w_ctx, &mut c_ctx);

        c_ctx.ast = parse_scope(&mut *input, w_ctx, &c_ctx, TokenKind::Eof, None)?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            ast = %c_ctx.ast.debug_repr(),
            "parsed crate"
        );
        Ok(Arc::new(c_ctx))
    });
}
