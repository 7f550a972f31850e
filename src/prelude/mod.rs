//! The prelude: a data-driven grammar and operator specification that
//! parameterises the lexer and the scope parser.
//!
//! A prelude file is a sequence of `define_mci_rule(NAME, …);` calls — see
//! [`loader`] for the meta-language. The result is a [`PreludeConfig`].

pub mod loader;

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::lexer::TokenConfig;

/// Format case for identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierCase {
    #[default]
    Snake,
    Pascal,
    Camel,
}

/// The rules for one type of string literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRule {
    pub begin: SmolStr,
    pub end: SmolStr,
    pub prefix: SmolStr,
    /// Delimiters limiting raw strings.
    pub rep_begin: SmolStr,
    pub rep_end: SmolStr,
    /// May contain escape sequences.
    pub escaped: bool,
    /// Use a whole block as a single literal.
    pub block: bool,
    pub utf8: bool,
}

/// A syntax is an ordered list of slot-type -> label pairs.
pub type Syntax = Vec<(SmolStr, SmolStr)>;

pub const NO_BIAS_VALUE: u32 = 0;

/// Which range a range operator describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOperatorType {
    Exclude,
    ExcludeFrom,
    ExcludeTo,
    Include,
    IncludeTo,
}

impl RangeOperatorType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exclude => "EXCLUDE",
            Self::ExcludeFrom => "EXCLUDE_FROM",
            Self::ExcludeTo => "EXCLUDE_TO",
            Self::Include => "INCLUDE",
            Self::IncludeTo => "INCLUDE_TO",
        }
    }
}

/// Syntax rules for one operator (unary, binary or wider).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operator {
    /// How operators are combined; lower binds tighter.
    pub precedence: u32,
    /// Left-to-right associativity.
    pub ltr: bool,
    /// Whether this operator has an ambiguous interpretation.
    pub ambiguous: bool,
    /// Precedence-update class as a (class, from) pair; `u32::MAX` means
    /// unset.
    pub prec_class: (u32, u32),
    /// Optional value to prefer one syntax over another despite the
    /// precedence; lower wins when set on both.
    pub prec_bias: u32,
    /// Slot-type -> label pairs.
    pub syntax: Syntax,
    /// Function to call for this operator.
    pub fn_name: SmolStr,
    pub range: Option<RangeOperatorType>,
}

impl Operator {
    pub fn new() -> Operator {
        Operator {
            precedence: 0,
            ltr: true,
            ambiguous: false,
            prec_class: (u32::MAX, u32::MAX),
            prec_bias: NO_BIAS_VALUE,
            syntax: Vec::new(),
            fn_name: SmolStr::default(),
            range: None,
        }
    }
}

/// Available types of syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxType {
    Op,
    ScopeAccess,
    ModuleSpec,
    MemberAccess,
    ArrayAccess,
    FuncHead,
    FuncDef,
    Macro,
    Annotation,
    UnsafeBlock,
    StaticStatement,
    ReferenceAttr,
    MutableAttr,
    Typed,
    TypeOf,
    Range,
    Assignment,
    Implication,
    DeclAttr,
    PublicAttr,
    Comma,
    Structure,
    Trait,
    Implementation,
    SimpleBinding,
    AliasBinding,
    IfCond,
    IfElse,
    PreCondLoopContinue,
    PreCondLoopAbort,
    PostCondLoopContinue,
    PostCondLoopAbort,
    InfLoop,
    ItrLoop,
    Match,
    TemplatePostfix,
}

/// The configuration which defines most compiler rules.
#[derive(Debug, Clone, Default)]
pub struct PreludeConfig {
    /// Whether special prelude options are activated.
    pub is_prelude: bool,
    /// Set when included by a prelude file.
    pub is_prelude_library: bool,
    pub token_conf: TokenConfig,

    /// Whether a space combines two identifiers.
    pub spaces_bind_identifiers: bool,
    pub function_case: IdentifierCase,
    pub method_case: IdentifierCase,
    pub variable_case: IdentifierCase,
    pub module_case: IdentifierCase,
    pub struct_case: IdentifierCase,
    pub trait_case: IdentifierCase,
    /// Prefixes for unused variables.
    pub unused_prefix: Vec<SmolStr>,
    pub string_rules: Vec<StringRule>,

    /// Available syntaxes, in the fixed syntax-type order.
    pub syntaxes: BTreeMap<SyntaxType, Vec<Operator>>,
    /// THE scope access operator, derived after parsing.
    pub scope_access_operator: SmolStr,

    /// Basic trait to define an integer.
    pub integer_trait: SmolStr,
    pub string_trait: SmolStr,
    pub tuple_trait: SmolStr,
    pub array_trait: SmolStr,
    pub iterator_trait: SmolStr,
    pub implication_trait: SmolStr,
    pub never_trait: SmolStr,
    pub drop_fn: SmolStr,
    pub equals_fn: SmolStr,
    pub itr_valid_fn: SmolStr,
    pub itr_get_fn: SmolStr,
    pub itr_next_fn: SmolStr,

    /// Maps special type keywords/operators to their meaning.
    pub special_types: BTreeMap<SmolStr, SmolStr>,
    /// Maps memory-blob type names to their byte size.
    pub memblob_types: BTreeMap<SmolStr, u8>,
    /// Each literal keyword mapped to its type name and memory value.
    pub literals: BTreeMap<SmolStr, (SmolStr, u64)>,
}

impl PreludeConfig {
    /// The special prelude used to load prelude files themselves.
    pub fn prelude_prelude() -> PreludeConfig {
        let mut conf = PreludeConfig {
            is_prelude: true,
            token_conf: TokenConfig::prelude_cfg(),
            ..PreludeConfig::default()
        };
        conf.string_rules.push(StringRule {
            begin: "\"".into(),
            end: "\"".into(),
            escaped: true,
            block: false,
            utf8: true,
            ..StringRule::default()
        });
        conf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_prelude() {
        let conf = PreludeConfig::prelude_prelude();
        assert!(conf.is_prelude);
        assert!(!conf.is_prelude_library);
        assert_eq!(conf.string_rules.len(), 1);
        assert!(conf.syntaxes.is_empty());
        assert_eq!(conf.token_conf.operators.len(), 3);
    }
}
