//! Text rendering of AST nodes for logs and parser tests.

use super::{AstChild, AstNode, ExprKind};

impl AstNode {
    /// A compact, parenthesised representation of this node.
    pub fn debug_repr(&self) -> String {
        let mut out = self.repr_impl();
        if !self.static_statements.is_empty() {
            out.push_str("$(");
            for stst in &self.static_statements {
                out.push_str(&stst.debug_repr());
                out.push_str(", ");
            }
            out.push(')');
        }
        out
    }

    fn named_repr(&self, child: AstChild) -> String {
        self.named
            .get(&child)
            .map(|n| n.debug_repr())
            .unwrap_or_else(|| "<undefined>".to_string())
    }

    fn children_joined(&self) -> String {
        self.children
            .iter()
            .map(|c| c.debug_repr())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn children_listed(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.debug_repr());
            out.push_str(", ");
        }
        out
    }

    fn repr_impl(&self) -> String {
        match self.kind {
            ExprKind::None => "<none>".to_string(),
            ExprKind::Token => format!("TOKEN \"{}\"", self.token_content()),
            ExprKind::DeclScope => {
                if self.children.is_empty() {
                    "GLOBAL { }".to_string()
                } else {
                    format!("GLOBAL {{ {} }}", self.children_joined())
                }
            }
            ExprKind::SingleCompleted => format!(
                "SC {};",
                self.children
                    .first()
                    .map(|c| c.debug_repr())
                    .unwrap_or_default()
            ),
            ExprKind::Block => {
                if self.children.is_empty() {
                    "BLOCK { }".to_string()
                } else {
                    format!("BLOCK {{ {} }}", self.children_joined())
                }
            }
            ExprKind::Set => format!("SET {{ {}}}", self.children_listed()),
            ExprKind::Unit => "UNIT()".to_string(),
            ExprKind::Term => format!("TERM( {} )", self.children_joined()),
            ExprKind::Tuple => format!("TUPLE( {})", self.children_listed()),
            ExprKind::ArraySpecifier => format!("ARRAY[ {} ]", self.children_joined()),
            ExprKind::CommaList => format!("COMMA( {})", self.children_listed()),
            ExprKind::NumericLiteral => "BLOB_LITERAL()".to_string(),
            ExprKind::StringLiteral => format!("STR \"{}\"", self.literal_string),
            ExprKind::AtomicSymbol => "SYM()".to_string(),
            ExprKind::FuncHead => format!(
                "FUNC_HEAD({} {})",
                self.named_repr(AstChild::Parameters),
                self.named_repr(AstChild::Symbol)
            ),
            ExprKind::Func => {
                let mut parts = Vec::new();
                if let Some(params) = self.named.get(&AstChild::Parameters) {
                    parts.push(params.debug_repr());
                }
                if let Some(symbol) = self.named.get(&AstChild::Symbol) {
                    parts.push(symbol.debug_repr());
                }
                if let Some(return_type) = self.named.get(&AstChild::ReturnType) {
                    parts.push(format!("-> {}", return_type.debug_repr()));
                }
                for child in &self.children {
                    parts.push(child.debug_repr());
                }
                format!("FUNC({})", parts.join(" "))
            }
            ExprKind::Op => {
                let tok = self.token_content();
                let left = self.named.get(&AstChild::LeftExpr);
                let right = self.named.get(&AstChild::RightExpr);
                match (left, right) {
                    (Some(l), Some(r)) => {
                        format!("OP({} {} {})", l.debug_repr(), tok, r.debug_repr())
                    }
                    (Some(l), None) => format!("OP({} {})", l.debug_repr(), tok),
                    (None, Some(r)) => format!("OP({} {})", tok, r.debug_repr()),
                    (None, None) => format!("OP({})", tok),
                }
            }
            ExprKind::SimpleBind => format!(
                "BINDING({})",
                self.children
                    .first()
                    .map(|c| c.debug_repr())
                    .unwrap_or_default()
            ),
            ExprKind::AliasBind => format!(
                "ALIAS({})",
                self.children
                    .first()
                    .map(|c| c.debug_repr())
                    .unwrap_or_default()
            ),
            ExprKind::IfCond => format!(
                "IF({} THEN {} )",
                self.named_repr(AstChild::Cond),
                self.children_joined()
            ),
            ExprKind::IfElse => format!(
                "IF({} THEN {} ELSE {} )",
                self.named_repr(AstChild::Cond),
                self.named_repr(AstChild::TrueExpr),
                self.named_repr(AstChild::FalseExpr)
            ),
            ExprKind::PreLoop => format!(
                "PRE_LOOP({}: {} DO {} )",
                if self.continue_eval { "TRUE" } else { "FALSE" },
                self.named_repr(AstChild::Cond),
                self.children_joined()
            ),
            ExprKind::PostLoop => format!(
                "POST_LOOP({}: {} DO {} )",
                if self.continue_eval { "TRUE" } else { "FALSE" },
                self.named_repr(AstChild::Cond),
                self.children_joined()
            ),
            ExprKind::InfLoop => format!("INF_LOOP({})", self.children_joined()),
            ExprKind::ItrLoop => format!(
                "ITR_LOOP({} IN {} DO {})",
                self.named_repr(AstChild::Symbol),
                self.named_repr(AstChild::Itr),
                self.children_joined()
            ),
            ExprKind::Match => format!(
                "MATCH({} WITH {})",
                self.named_repr(AstChild::Select),
                self.children_joined()
            ),
            ExprKind::Structure => format!(
                "STRUCT {} {}",
                self.named_repr(AstChild::StructSymbol),
                self.children_joined()
            ),
            ExprKind::TraitDef => format!(
                "TRAIT {} {}",
                self.named_repr(AstChild::TraitSymbol),
                self.children_joined()
            ),
            ExprKind::Implementation => {
                if self.named.contains_key(&AstChild::TraitSymbol) {
                    format!(
                        "IMPL {} FOR {} {}",
                        self.named_repr(AstChild::TraitSymbol),
                        self.named_repr(AstChild::StructSymbol),
                        self.children_joined()
                    )
                } else {
                    format!(
                        "IMPL {} {}",
                        self.named_repr(AstChild::StructSymbol),
                        self.children_joined()
                    )
                }
            }
            ExprKind::MemberAccess => format!(
                "MEMBER({}.{})",
                self.named_repr(AstChild::Base),
                self.named_repr(AstChild::Member)
            ),
            ExprKind::ScopeAccess => {
                let base = self
                    .named
                    .get(&AstChild::Base)
                    .map(|n| n.debug_repr())
                    .unwrap_or_else(|| "<global>".to_string());
                format!("SCOPE({}::{})", base, self.named_repr(AstChild::Member))
            }
            ExprKind::ArrayAccess => format!(
                "ARR_ACC {}[{}]",
                self.named_repr(AstChild::Base),
                self.named_repr(AstChild::Index)
            ),
            ExprKind::Range => {
                let kind = self.range_kind.map(|r| r.name()).unwrap_or("UNKNOWN");
                match (
                    self.named.get(&AstChild::From),
                    self.named.get(&AstChild::To),
                ) {
                    (Some(from), Some(to)) => {
                        format!("RANGE {} {}..{}", kind, from.debug_repr(), to.debug_repr())
                    }
                    (Some(from), None) => format!("RANGE {} {}", kind, from.debug_repr()),
                    (None, Some(to)) => format!("RANGE {} {}", kind, to.debug_repr()),
                    (None, None) => format!("RANGE {}", kind),
                }
            }
            ExprKind::Reference => format!(
                "REF({})",
                self.children
                    .first()
                    .map(|c| c.debug_repr())
                    .unwrap_or_default()
            ),
            ExprKind::MutableAttr => format!(
                "MUT({})",
                self.children
                    .first()
                    .map(|c| c.debug_repr())
                    .unwrap_or_default()
            ),
            ExprKind::TypeofOp => format!("TYPE_OF({})", self.children_joined()),
            ExprKind::TypedOp => format!(
                "TYPED({}:{})",
                self.named_repr(AstChild::LeftExpr),
                self.named_repr(AstChild::RightExpr)
            ),
            ExprKind::Module => format!(
                "MODULE {} {}",
                self.named_repr(AstChild::Symbol),
                self.children_joined()
            ),
            ExprKind::Declaration => format!("DECL({})", self.children_joined()),
            ExprKind::PublicAttr => format!("PUBLIC({})", self.children_joined()),
            ExprKind::StaticStatement => format!("STST {}", self.children_joined()),
            ExprKind::Annotation => format!(
                "ANNOTATE({} {})",
                self.named_repr(AstChild::Symbol),
                self.named_repr(AstChild::Parameters)
            ),
            ExprKind::MacroCall => format!(
                "MACRO({}! {})",
                self.named_repr(AstChild::Symbol),
                self.named_repr(AstChild::Parameters)
            ),
            ExprKind::UnsafeBlock => format!("UNSAFE {}", self.children_joined()),
            ExprKind::TemplatePostfix => {
                let mut args = String::new();
                for child in &self.children {
                    args.push_str(&child.debug_repr());
                    args.push_str(", ");
                }
                format!("TEMPLATE {}<{}>", self.named_repr(AstChild::Base), args)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::ExprKind;
    use super::*;

    #[test]
    fn test_global_and_sc() {
        let mut sc = AstNode::new(ExprKind::SingleCompleted);
        sc.children.push(AstNode::new(ExprKind::AtomicSymbol));
        let mut global = AstNode::new(ExprKind::DeclScope);
        global.children.push(sc);
        assert_eq!(global.debug_repr(), "GLOBAL { SC SYM(); }");
    }

    #[test]
    fn test_binary_op() {
        let mut op = AstNode::new(ExprKind::Op);
        op.token = Some(crate::lexer::Token::new(
            crate::lexer::TokenKind::Op,
            "+",
            std::sync::Arc::from("t"),
            1,
            1,
            1,
            "",
            crate::lexer::TokenLevel::Normal,
        ));
        op.named
            .insert(AstChild::LeftExpr, AstNode::new(ExprKind::AtomicSymbol));
        op.named
            .insert(AstChild::RightExpr, AstNode::new(ExprKind::AtomicSymbol));
        assert_eq!(op.debug_repr(), "OP(SYM() + SYM())");
    }

    #[test]
    fn test_tuple_trailing_commas() {
        let mut tuple = AstNode::new(ExprKind::Tuple);
        tuple.children.push(AstNode::new(ExprKind::AtomicSymbol));
        tuple.children.push(AstNode::new(ExprKind::NumericLiteral));
        assert_eq!(tuple.debug_repr(), "TUPLE( SYM(), BLOB_LITERAL(), )");
    }

    #[test]
    fn test_static_statement_suffix() {
        let mut stst = AstNode::new(ExprKind::StaticStatement);
        stst.children.push(AstNode::new(ExprKind::Block));
        let mut op = AstNode::new(ExprKind::Op);
        op.token = Some(crate::lexer::Token::new(
            crate::lexer::TokenKind::Op,
            "/",
            std::sync::Arc::from("t"),
            1,
            1,
            1,
            "",
            crate::lexer::TokenLevel::Normal,
        ));
        op.named
            .insert(AstChild::LeftExpr, AstNode::new(ExprKind::NumericLiteral));
        op.named
            .insert(AstChild::RightExpr, AstNode::new(ExprKind::AtomicSymbol));
        op.static_statements.push(stst);
        assert_eq!(
            op.debug_repr(),
            "OP(BLOB_LITERAL() / SYM())$(STST BLOCK { }, )"
        );
    }
}
