//! The typed expression tree the scope parser produces.
//!
//! Nodes are plain values; the parser clones freely while it keeps multiple
//! tentative paths alive. A node built by a grammar rule remembers the exact
//! expression list it was built from (`original_list`) so a later rule with
//! lower precedence can re-enter it (see `split_prepend_recursively`).

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::base::PosInfo;
use crate::lexer::Token;
use crate::prelude::RangeOperatorType;

mod debug;

/// Specifies the type of an AST node expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Only used for patterns.
    None,
    Token,

    DeclScope,
    SingleCompleted,
    Block,
    Set,
    Unit,
    Term,
    Tuple,
    ArraySpecifier,
    CommaList,

    NumericLiteral,
    StringLiteral,

    AtomicSymbol,
    FuncHead,
    Func,

    Op,
    SimpleBind,
    AliasBind,

    IfCond,
    IfElse,
    PreLoop,
    PostLoop,
    InfLoop,
    ItrLoop,
    Match,

    Structure,
    TraitDef,
    Implementation,

    MemberAccess,
    ScopeAccess,
    ArrayAccess,

    Range,
    Reference,
    MutableAttr,
    TypeofOp,
    TypedOp,

    Module,
    Declaration,
    PublicAttr,
    StaticStatement,
    Annotation,
    MacroCall,
    UnsafeBlock,
    TemplatePostfix,
}

/// Properties different kinds of expressions may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprProperty {
    /// May be used as an operand.
    Operand = 0,
    /// Is completed (a block or a statement closed by a divider).
    Completed,
    /// Surrounds its content with parentheses.
    Parenthesis,
    Braces,
    Brackets,
    /// Can be used as a symbol, e.g. in a symbol path.
    Symbol,
    /// Includes specifiers like `mut` and `&` (usable as a type position).
    SymbolLike,
    Literal,
    /// Can be divided back into its sub-expressions.
    Separable,
    /// Specialisation of an operator.
    Assignment,
    Implication,
    /// Children live in a declarative scope.
    DeclParent,
    NamedScope,
    AnonymousScope,
}

/// A small set of [`ExprProperty`] values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropSet(u32);

impl PropSet {
    pub const fn empty() -> PropSet {
        PropSet(0)
    }

    pub fn of(props: &[ExprProperty]) -> PropSet {
        let mut set = PropSet::empty();
        for &p in props {
            set.insert(p);
        }
        set
    }

    pub fn insert(&mut self, prop: ExprProperty) {
        self.0 |= 1 << prop as u32;
    }

    pub fn contains(&self, prop: ExprProperty) -> bool {
        self.0 & (1 << prop as u32) != 0
    }

    /// True when every property in `self` is also in `other`.
    pub fn is_subset_of(&self, other: &PropSet) -> bool {
        self.0 & other.0 == self.0
    }
}

/// Indices to access named entries in AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AstChild {
    Symbol,
    SymbolLike,
    StructSymbol,
    TraitSymbol,
    Cond,
    Itr,
    Select,
    Parameters,
    ReturnType,
    LeftExpr,
    RightExpr,
    TrueExpr,
    FalseExpr,
    Base,
    Index,
    Member,
    From,
    To,
}

/// The nodes of which the AST is built up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstNode {
    pub kind: ExprKind,
    pub props: PropSet,
    pub pos: PosInfo,
    pub static_statements: Vec<AstNode>,

    /// The expressions this node was built from, if separable.
    pub original_list: Vec<AstNode>,
    /// Scratch precedence used during construction.
    pub precedence: u32,
    pub named: BTreeMap<AstChild, AstNode>,
    pub children: Vec<AstNode>,

    /// Only for token and operator nodes.
    pub token: Option<Token>,
    /// Only for atomic symbols and operators (called function).
    pub symbol_name: SmolStr,
    /// Type name, only for literals whose type is known.
    pub literal_type: SmolStr,
    /// Only for numeric/boolean literals.
    pub literal_number: u64,
    /// Only for string literals.
    pub literal_string: String,
    /// Only for loops: for which condition value the loop continues.
    pub continue_eval: bool,
    /// Only for ranges.
    pub range_kind: Option<RangeOperatorType>,
}

impl Default for ExprKind {
    fn default() -> Self {
        ExprKind::None
    }
}

/// Default property set for each expression kind.
pub fn generate_props(kind: ExprKind) -> PropSet {
    use ExprProperty::*;
    match kind {
        ExprKind::None | ExprKind::Token => PropSet::empty(),
        ExprKind::DeclScope => PropSet::of(&[DeclParent]),
        ExprKind::SingleCompleted => PropSet::of(&[Completed]),
        ExprKind::Block => PropSet::of(&[Operand, Completed, Braces, AnonymousScope]),
        ExprKind::Set => PropSet::of(&[Operand, Braces]),
        ExprKind::Unit => PropSet::of(&[Operand, Parenthesis]),
        ExprKind::Term => PropSet::of(&[Operand, Parenthesis]),
        ExprKind::Tuple => PropSet::of(&[Operand, Parenthesis]),
        ExprKind::ArraySpecifier => PropSet::of(&[Operand, Brackets]),
        ExprKind::CommaList => PropSet::of(&[Operand, Separable]),
        ExprKind::NumericLiteral | ExprKind::StringLiteral => PropSet::of(&[Operand, Literal]),
        ExprKind::AtomicSymbol => PropSet::of(&[Operand, Symbol, SymbolLike]),
        ExprKind::FuncHead => PropSet::of(&[Operand, Separable]),
        ExprKind::Func => PropSet::of(&[Operand, Completed]),
        ExprKind::Op => PropSet::of(&[Operand, Separable]),
        ExprKind::SimpleBind => PropSet::of(&[Separable]),
        ExprKind::AliasBind => PropSet::of(&[Completed]),
        ExprKind::IfCond => PropSet::of(&[Completed, Separable]),
        ExprKind::IfElse => PropSet::of(&[Completed]),
        // A post-condition loop ends in its condition expression, which a
        // later operator may still need to reach into.
        ExprKind::PostLoop => PropSet::of(&[Completed, Separable]),
        ExprKind::PreLoop | ExprKind::InfLoop | ExprKind::ItrLoop | ExprKind::Match => {
            PropSet::of(&[Completed])
        }
        ExprKind::Structure
        | ExprKind::TraitDef
        | ExprKind::Implementation
        | ExprKind::Module => PropSet::of(&[Completed, NamedScope]),
        ExprKind::MemberAccess => PropSet::of(&[Operand, Symbol, SymbolLike]),
        // Separable so the global-access rule can regroup `::A::B` into
        // `<global>::(A::B)`.
        ExprKind::ScopeAccess => PropSet::of(&[Operand, Symbol, SymbolLike, Separable]),
        ExprKind::ArrayAccess => PropSet::of(&[Operand]),
        // A from-only range is re-opened when the `to` expression arrives.
        ExprKind::Range => PropSet::of(&[Operand, Separable]),
        ExprKind::Reference | ExprKind::MutableAttr => PropSet::of(&[Operand, SymbolLike]),
        ExprKind::TypeofOp => PropSet::of(&[Operand]),
        ExprKind::TypedOp => PropSet::of(&[Operand, SymbolLike]),
        ExprKind::Declaration | ExprKind::PublicAttr => PropSet::of(&[Operand]),
        ExprKind::StaticStatement => PropSet::empty(),
        ExprKind::Annotation => PropSet::of(&[Completed]),
        ExprKind::MacroCall => PropSet::of(&[Operand]),
        ExprKind::UnsafeBlock => PropSet::of(&[Operand, Completed]),
        ExprKind::TemplatePostfix => PropSet::of(&[Operand, Symbol, SymbolLike]),
    }
}

impl AstNode {
    pub fn new(kind: ExprKind) -> AstNode {
        AstNode {
            kind,
            props: generate_props(kind),
            continue_eval: true,
            ..AstNode::default()
        }
    }

    pub fn has_prop(&self, prop: ExprProperty) -> bool {
        self.props.contains(prop)
    }

    pub fn token_content(&self) -> &str {
        self.token.as_ref().map(|t| t.content.as_str()).unwrap_or("")
    }

    /// Separate this expression and all sub-expressions depending on their
    /// precedence, pushing the parts onto the reversed expression list.
    /// Static statements are siphoned into `stst_set`. Splitting only
    /// happens while the rule still needs expressions (`rule_length`);
    /// remaining parts are pushed whole.
    pub fn split_prepend_recursively(
        &self,
        rev_list: &mut Vec<AstNode>,
        stst_set: &mut Vec<AstNode>,
        prec: u32,
        ltr: bool,
        rule_length: usize,
    ) {
        for stst in &self.static_statements {
            stst_set.push(stst.clone());
        }
        for expr in self.original_list.iter().rev() {
            if expr.kind == ExprKind::StaticStatement {
                stst_set.push(expr.clone());
            } else if rev_list.len() < rule_length
                && expr.has_prop(ExprProperty::Separable)
                && (prec < expr.precedence || (!ltr && prec == expr.precedence))
            {
                expr.split_prepend_recursively(rev_list, stst_set, prec, ltr, rule_length);
            } else {
                rev_list.push(expr.clone());
            }
        }
    }
}

/// One slot of a grammar rule's pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    /// Required node kind; `None` matches any kind.
    pub kind: Option<ExprKind>,
    /// Required properties (must be a subset of the candidate's).
    pub props: PropSet,
    /// Required token content (only with kind `Token`).
    pub token: Option<SmolStr>,
}

impl NodePattern {
    pub fn with_props(props: &[ExprProperty]) -> NodePattern {
        NodePattern {
            kind: None,
            props: PropSet::of(props),
            token: None,
        }
    }

    pub fn with_kind(kind: ExprKind) -> NodePattern {
        NodePattern {
            kind: Some(kind),
            ..NodePattern::default()
        }
    }

    pub fn with_token(content: SmolStr) -> NodePattern {
        NodePattern {
            kind: Some(ExprKind::Token),
            props: PropSet::empty(),
            token: Some(content),
        }
    }

    pub fn matches(&self, node: &AstNode) -> bool {
        if let Some(kind) = self.kind {
            if kind != node.kind {
                return false;
            }
        }
        if let Some(token) = &self.token {
            if node.token_content() != token.as_str() {
                return false;
            }
        }
        self.props.is_subset_of(&node.props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym() -> AstNode {
        AstNode::new(ExprKind::AtomicSymbol)
    }

    #[test]
    fn test_prop_set() {
        let mut props = PropSet::empty();
        assert!(!props.contains(ExprProperty::Operand));
        props.insert(ExprProperty::Operand);
        props.insert(ExprProperty::Symbol);
        assert!(props.contains(ExprProperty::Operand));
        assert!(PropSet::of(&[ExprProperty::Operand]).is_subset_of(&props));
        assert!(!PropSet::of(&[ExprProperty::Completed]).is_subset_of(&props));
    }

    #[test]
    fn test_pattern_wildcard_matches_any_kind() {
        let pattern = NodePattern::with_props(&[ExprProperty::Operand]);
        assert!(pattern.matches(&sym()));
        assert!(pattern.matches(&AstNode::new(ExprKind::NumericLiteral)));
        assert!(!pattern.matches(&AstNode::new(ExprKind::Token)));
    }

    #[test]
    fn test_pattern_token_content() {
        use crate::lexer::{Token, TokenKind, TokenLevel};
        use std::sync::Arc;
        let mut node = AstNode::new(ExprKind::Token);
        node.token = Some(Token::new(
            TokenKind::Op,
            "+",
            Arc::from("t"),
            1,
            1,
            1,
            "",
            TokenLevel::Normal,
        ));
        assert!(NodePattern::with_token("+".into()).matches(&node));
        assert!(!NodePattern::with_token("-".into()).matches(&node));
    }

    #[test]
    fn test_split_prepend_recursively() {
        // OP(6 + 5) with precedence 110; a rule of precedence 100 re-opens it
        let mut op = AstNode::new(ExprKind::Op);
        op.precedence = 110;
        let six = {
            let mut n = AstNode::new(ExprKind::NumericLiteral);
            n.literal_number = 6;
            n
        };
        let five = {
            let mut n = AstNode::new(ExprKind::NumericLiteral);
            n.literal_number = 5;
            n
        };
        let plus = AstNode::new(ExprKind::Token);
        op.original_list = vec![six, plus, five];

        let mut rev = Vec::new();
        let mut stst = Vec::new();
        op.split_prepend_recursively(&mut rev, &mut stst, 100, true, 3);
        assert_eq!(rev.len(), 3);
        assert_eq!(rev[0].literal_number, 5);
        assert_eq!(rev[2].literal_number, 6);
        assert!(stst.is_empty());
    }

    #[test]
    fn test_split_equal_precedence_needs_rtl() {
        let mut op = AstNode::new(ExprKind::Op);
        op.precedence = 160;
        op.original_list = vec![sym(), AstNode::new(ExprKind::Token), sym()];

        // ltr rule of the same precedence must not split
        let mut rev = Vec::new();
        let mut stst = Vec::new();
        let probe = |rev: &mut Vec<AstNode>, stst: &mut Vec<AstNode>, ltr: bool| {
            rev.clear();
            stst.clear();
            if op.has_prop(ExprProperty::Separable) && (160 < op.precedence || (!ltr && 160 == op.precedence)) {
                op.split_prepend_recursively(rev, stst, 160, ltr, 3);
            } else {
                rev.push(op.clone());
            }
        };
        probe(&mut rev, &mut stst, true);
        assert_eq!(rev.len(), 1);
        probe(&mut rev, &mut stst, false);
        assert_eq!(rev.len(), 3);
    }

    #[test]
    fn test_static_statements_are_siphoned() {
        let mut op = AstNode::new(ExprKind::Op);
        op.precedence = 110;
        op.original_list = vec![
            sym(),
            AstNode::new(ExprKind::StaticStatement),
            AstNode::new(ExprKind::Token),
            sym(),
        ];
        let mut rev = Vec::new();
        let mut stst = Vec::new();
        op.split_prepend_recursively(&mut rev, &mut stst, 100, true, 3);
        assert_eq!(rev.len(), 3);
        assert_eq!(stst.len(), 1);
    }
}
