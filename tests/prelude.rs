//! Prelude loader scenarios: the shipped push prelude and inline MCI
//! parsing through the query pipeline.

use std::sync::Arc;

use pushc::engine::{GlobalCtx, PrefType, PrefValue};
use pushc::lexer::TokenLevel;
use pushc::prelude::{PreludeConfig, SyntaxType, loader};
use pushc::queries::register_debug_source;

#[test]
fn test_load_push_prelude() {
    let g_ctx = GlobalCtx::new();
    let worker = g_ctx.setup(1, 32).expect("setup");

    let conf = worker
        .do_query(loader::load_prelude, Arc::<str>::from("push"))
        .expect("query")
        .first_result()
        .expect("result");

    // Token structure
    assert_eq!(conf.token_conf.stat_divider.len(), 1);
    assert_eq!(conf.token_conf.stat_divider[0], ";");
    assert_eq!(conf.token_conf.block.len(), 1);
    assert_eq!(conf.token_conf.term.len(), 1);
    assert_eq!(conf.token_conf.array.len(), 1);
    assert_eq!(conf.token_conf.level_map[TokenLevel::Comment.index()].len(), 1);
    assert_eq!(
        conf.token_conf.level_map[TokenLevel::CommentLine.index()].len(),
        2
    );
    assert_eq!(
        conf.token_conf.level_map[TokenLevel::StringLevel.index()].len(),
        1
    );
    assert_eq!(conf.token_conf.allowed_level_overlay["/*"], vec!["b"]);

    // Escapes built from the escaped-backslash spelling
    assert_eq!(conf.token_conf.char_escapes["\\n"], "\n");
    assert_eq!(conf.token_conf.char_escapes["\\\\"], "\\");

    // Operators and keywords registered by the syntax rules
    assert!(conf.token_conf.operators.iter().any(|op| op == "+"));
    assert!(conf.token_conf.operators.iter().any(|op| op == "::"));
    assert!(conf.token_conf.operators.iter().any(|op| op == "..="));
    assert!(!conf.token_conf.operators.iter().any(|op| op == ">>"));
    assert!(conf.token_conf.keywords.iter().any(|kw| kw == "let"));
    assert!(conf.token_conf.keywords.iter().any(|kw| kw == "if"));

    // Grammar table
    assert!(conf.syntaxes[&SyntaxType::Op].len() >= 10);
    assert_eq!(conf.syntaxes[&SyntaxType::TemplatePostfix].len(), 1);
    let template = &conf.syntaxes[&SyntaxType::TemplatePostfix][0];
    assert_eq!(template.prec_class, (50, 100));
    let less_than = conf.syntaxes[&SyntaxType::Op]
        .iter()
        .find(|op| op.syntax.iter().any(|(slot, _)| slot == "<"))
        .expect("less-than rule");
    assert!(less_than.ambiguous);

    // Derived data
    assert_eq!(conf.scope_access_operator, "::");
    assert_eq!(conf.literals["true"], ("bool".into(), 1));
    assert_eq!(conf.literals["false"], ("bool".into(), 0));
    assert_eq!(conf.memblob_types["u32"], 4);
    assert_eq!(conf.integer_trait, "int");
    assert_eq!(conf.string_trait, "str");

    g_ctx.wait_finished();
}

#[test]
fn test_parse_inline_mci_rules() {
    let g_ctx = GlobalCtx::new();
    let worker = g_ctx.setup(1, 16).expect("setup");
    g_ctx.set_pref(PrefType::InputSource, PrefValue::Str("debug".into()));

    let source = concat!(
        "// inline grammar\n",
        "define_mci_rule(EXPRESSION_RULES, divide semicolon);\n",
        "define_mci_rule(NEW_RANGE, integer, \"0\" \"9\");\n",
        "define_mci_rule(SYNTAX, OPERATOR, add, 110, ltr, triple_list, expr -> left, \"+\" -> op, expr -> right);\n",
        "define_mci_rule(SYNTAX, ASSIGNMENT, assign, 160, rtl, triple_list, expr -> left, \"=\" -> op, expr -> right);\n",
        "define_mci_rule(NEW_LITERAL, \"yes\", \"bool\", 1);\n",
    );
    register_debug_source("inline.push", source);

    // Prelude files are tokenised with the prelude-prelude.
    worker
        .unit_ctx()
        .set_prelude_conf(Arc::new(PreludeConfig::prelude_prelude()));
    let conf = worker
        .do_query(loader::load_prelude_file, Arc::<str>::from("inline.push"))
        .expect("query")
        .first_result()
        .expect("result");

    assert_eq!(conf.token_conf.stat_divider.len(), 1);
    assert_eq!(
        conf.token_conf.char_ranges[pushc::lexer::CharRangeType::Integer.index()],
        vec![(b'0', b'9')]
    );
    let add = &conf.syntaxes[&SyntaxType::Op][0];
    assert_eq!(add.precedence, 110);
    assert!(add.ltr);
    assert_eq!(add.fn_name, "add");
    assert_eq!(add.syntax.len(), 3);
    assert_eq!(add.syntax[1], ("+".into(), "op".into()));
    let assign = &conf.syntaxes[&SyntaxType::Assignment][0];
    assert!(!assign.ltr);
    assert_eq!(conf.literals["yes"], ("bool".into(), 1));
    assert!(conf.token_conf.operators.iter().any(|op| op == "+"));

    // No SCOPE_ACCESS defined: the fallback kicks in with a warning.
    assert_eq!(conf.scope_access_operator, "::");
    assert!(g_ctx.warning_count.load(std::sync::atomic::Ordering::SeqCst) >= 1);

    g_ctx.wait_finished();
}
