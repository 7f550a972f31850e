//! Grammar table: translating prelude operator records into matchable
//! syntax rules and constructing AST nodes from matched slots.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::ast::{AstChild, AstNode, ExprKind, ExprProperty, NodePattern};
use crate::engine::Worker;
use crate::message::{AbortCompilation, MessageInfo, MessageKind};
use crate::prelude::{Operator, RangeOperatorType, Syntax, SyntaxType};

use super::CrateCtx;

/// Checks whether an expression list matches a syntax and translates it.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
    pub syntax_type: SyntaxType,
    pub expr_kind: ExprKind,
    /// Precedence of this syntax matching; lower binds tighter.
    pub precedence: u32,
    /// Associativity.
    pub ltr: bool,
    /// Whether this syntax has an ambiguous interpretation.
    pub ambiguous: bool,
    /// Precedence-update class as a (class, from) pair; `u32::MAX` = unset.
    pub prec_class: (u32, u32),
    /// Optional value to prefer one syntax over another despite the
    /// precedence.
    pub prec_bias: u32,
    /// The slot patterns which have to be matched, in source order.
    pub pattern: Vec<NodePattern>,
    /// Maps syntax item labels to their slot position. Iterated in
    /// alphabetical label order during construction.
    pub labels: BTreeMap<SmolStr, usize>,
    /// Function to call for this operator.
    pub fn_name: SmolStr,
    pub range: Option<RangeOperatorType>,
}

impl SyntaxRule {
    /// Checks if a reversed expression list matches this rule.
    pub fn matches_reversed(&self, rev_list: &[AstNode]) -> bool {
        if rev_list.len() < self.pattern.len() {
            return false;
        }
        self.pattern
            .iter()
            .rev()
            .zip(rev_list.iter())
            .all(|(pattern, node)| pattern.matches(node))
    }

    /// Create a new expression from the matched slots (in pattern order).
    pub fn create(&self, matched: &[AstNode], w_ctx: &Worker) -> Result<AstNode, AbortCompilation> {
        let mut node = AstNode::new(self.expr_kind);
        node.precedence = self.precedence;
        node.original_list = matched.to_vec();
        if let Some(first) = matched.first() {
            node.pos = first.pos.clone();
        }

        for (label, &slot) in &self.labels {
            let part = &matched[slot];
            match label.as_str() {
                "" | "op2" => {}
                "child" => node.children.push(part.clone()),
                "head" => {
                    if self.expr_kind == ExprKind::Func || self.expr_kind == ExprKind::Annotation {
                        node.children.extend(part.children.iter().cloned());
                        for (key, value) in &part.named {
                            node.named.insert(*key, value.clone());
                        }
                    } else {
                        node.children.push(part.clone());
                    }
                }
                "op" => node.token = part.token.clone(),
                "op1" => {
                    let mut token = part.token.clone();
                    if let (Some(tok), Some(&op2_idx)) = (token.as_mut(), self.labels.get("op2")) {
                        let mut content = tok.content.to_string();
                        content.push_str(matched[op2_idx].token_content());
                        tok.content = SmolStr::from(content);
                    }
                    node.token = token;
                }
                other => {
                    let Some(child) = ast_child_for_label(other) else {
                        tracing::warn!(label = other, "unknown syntax slot label, ignoring");
                        continue;
                    };
                    if self.expr_kind == ExprKind::CommaList {
                        // Merge nested comma lists flat.
                        if part.kind == ExprKind::CommaList {
                            node.children.extend(part.children.iter().cloned());
                            node.original_list.remove(slot);
                            node.original_list
                                .extend(part.original_list.iter().cloned());
                        } else {
                            node.children.push(part.clone());
                        }
                    } else if self.expr_kind == ExprKind::ArrayAccess && child == AstChild::Index {
                        if part.children.len() != 1 {
                            w_ctx.report(
                                MessageKind::ErrArrayAccessIndex,
                                MessageInfo::from(&part.pos),
                                vec![],
                                &[],
                            )?;
                        }
                        node.named.insert(child, part.clone());
                    } else {
                        node.named.insert(child, part.clone());
                    }
                }
            }
        }

        node.symbol_name = self.fn_name.clone();
        node.range_kind = self.range;
        match self.syntax_type {
            SyntaxType::PreCondLoopAbort | SyntaxType::PostCondLoopAbort => {
                node.continue_eval = false;
            }
            SyntaxType::Assignment => node.props.insert(ExprProperty::Assignment),
            SyntaxType::Implication => node.props.insert(ExprProperty::Implication),
            _ => {}
        }

        Ok(node)
    }
}

fn ast_child_for_label(label: &str) -> Option<AstChild> {
    Some(match label {
        "symbol" => AstChild::Symbol,
        "symbol_like" => AstChild::SymbolLike,
        "struct_symbol" => AstChild::StructSymbol,
        "trait_symbol" => AstChild::TraitSymbol,
        "condition" => AstChild::Cond,
        "iterator" => AstChild::Itr,
        "selector" => AstChild::Select,
        "parameters" => AstChild::Parameters,
        "return_type" => AstChild::ReturnType,
        "left" => AstChild::LeftExpr,
        "right" => AstChild::RightExpr,
        "true_expr" => AstChild::TrueExpr,
        "false_expr" => AstChild::FalseExpr,
        "base" => AstChild::Base,
        "index" => AstChild::Index,
        "member" => AstChild::Member,
        "from" => AstChild::From,
        "to" => AstChild::To,
        _ => return None,
    })
}

/// Translate a syntax item list into slot patterns and a label map.
pub fn parse_rule(syntax: &Syntax) -> (Vec<NodePattern>, BTreeMap<SmolStr, usize>) {
    let mut pattern = Vec::new();
    let mut labels = BTreeMap::new();
    for (idx, (slot, label)) in syntax.iter().enumerate() {
        if !label.is_empty() {
            labels.insert(label.clone(), idx);
        }
        pattern.push(match slot.as_str() {
            "expr" => NodePattern::with_props(&[ExprProperty::Operand]),
            "symbol" => NodePattern::with_props(&[ExprProperty::Symbol]),
            "symbol_like" => NodePattern::with_props(&[ExprProperty::SymbolLike]),
            "completed" => NodePattern::with_props(&[ExprProperty::Completed]),
            "assignment" => NodePattern::with_props(&[ExprProperty::Assignment]),
            "implication" => NodePattern::with_props(&[ExprProperty::Implication]),
            "fn_head" => NodePattern::with_kind(ExprKind::FuncHead),
            "comma_list" => NodePattern::with_kind(ExprKind::CommaList),
            "unit" => NodePattern::with_kind(ExprKind::Unit),
            "term" => NodePattern::with_kind(ExprKind::Term),
            "tuple" => NodePattern::with_kind(ExprKind::Tuple),
            "integer" => NodePattern::with_kind(ExprKind::NumericLiteral),
            "array_spec" => NodePattern::with_kind(ExprKind::ArraySpecifier),
            // Keyword or operator literal
            _ => NodePattern::with_token(slot.clone()),
        });
    }
    (pattern, labels)
}

fn expr_kind_for(syntax_type: SyntaxType) -> ExprKind {
    match syntax_type {
        SyntaxType::Op | SyntaxType::Assignment | SyntaxType::Implication => ExprKind::Op,
        SyntaxType::ScopeAccess => ExprKind::ScopeAccess,
        SyntaxType::ModuleSpec => ExprKind::Module,
        SyntaxType::MemberAccess => ExprKind::MemberAccess,
        SyntaxType::ArrayAccess => ExprKind::ArrayAccess,
        SyntaxType::FuncHead => ExprKind::FuncHead,
        SyntaxType::FuncDef => ExprKind::Func,
        SyntaxType::Macro => ExprKind::MacroCall,
        SyntaxType::Annotation => ExprKind::Annotation,
        SyntaxType::UnsafeBlock => ExprKind::UnsafeBlock,
        SyntaxType::StaticStatement => ExprKind::StaticStatement,
        SyntaxType::ReferenceAttr => ExprKind::Reference,
        SyntaxType::MutableAttr => ExprKind::MutableAttr,
        SyntaxType::Typed => ExprKind::TypedOp,
        SyntaxType::TypeOf => ExprKind::TypeofOp,
        SyntaxType::Range => ExprKind::Range,
        SyntaxType::DeclAttr => ExprKind::Declaration,
        SyntaxType::PublicAttr => ExprKind::PublicAttr,
        SyntaxType::Comma => ExprKind::CommaList,
        SyntaxType::Structure => ExprKind::Structure,
        SyntaxType::Trait => ExprKind::TraitDef,
        SyntaxType::Implementation => ExprKind::Implementation,
        SyntaxType::SimpleBinding => ExprKind::SimpleBind,
        SyntaxType::AliasBinding => ExprKind::AliasBind,
        SyntaxType::IfCond => ExprKind::IfCond,
        SyntaxType::IfElse => ExprKind::IfElse,
        SyntaxType::PreCondLoopContinue | SyntaxType::PreCondLoopAbort => ExprKind::PreLoop,
        SyntaxType::PostCondLoopContinue | SyntaxType::PostCondLoopAbort => ExprKind::PostLoop,
        SyntaxType::InfLoop => ExprKind::InfLoop,
        SyntaxType::ItrLoop => ExprKind::ItrLoop,
        SyntaxType::Match => ExprKind::Match,
        SyntaxType::TemplatePostfix => ExprKind::TemplatePostfix,
    }
}

/// Build the sorted rule table from the unit's prelude configuration.
pub fn load_syntax_rules(w_ctx: &Worker, c_ctx: &mut CrateCtx) {
    let conf = w_ctx.unit_ctx().prelude_conf();

    for (&syntax_type, operators) in &conf.syntaxes {
        for op in operators {
            c_ctx.rules.push(rule_from_operator(syntax_type, op));
        }
    }

    // Sort so that higher bias comes first, ties broken by higher
    // precedence; the matching loop iterates this fixed order.
    c_ctx
        .rules
        .sort_by(|a, b| {
            b.prec_bias
                .cmp(&a.prec_bias)
                .then(b.precedence.cmp(&a.precedence))
        });
}

fn rule_from_operator(syntax_type: SyntaxType, op: &Operator) -> SyntaxRule {
    let (pattern, labels) = parse_rule(&op.syntax);
    SyntaxRule {
        syntax_type,
        expr_kind: expr_kind_for(syntax_type),
        precedence: op.precedence,
        ltr: op.ltr,
        ambiguous: op.ambiguous,
        prec_class: op.prec_class,
        prec_bias: op.prec_bias,
        pattern,
        labels,
        fn_name: op.fn_name.clone(),
        range: op.range,
    }
}
