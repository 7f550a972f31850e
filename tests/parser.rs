//! End-to-end scope parser scenarios against the push prelude.
//!
//! Each case parses a source snippet through the full query pipeline
//! (prelude selection, grammar table, scope parser) and compares the AST's
//! debug representation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::rstest;

use pushc::engine::{GlobalCtx, PrefType, PrefValue, UnitCtx};
use pushc::parser::get_ast;
use pushc::queries::register_debug_source;

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

fn parse(source: &str) -> String {
    let g_ctx = GlobalCtx::new();
    let worker = g_ctx.setup(1, 32).expect("engine setup");
    g_ctx.set_pref(PrefType::InputSource, PrefValue::Str("debug".into()));

    let file = format!("ast-test-{}.push", NEXT_FILE.fetch_add(1, Ordering::Relaxed));
    register_debug_source(&file, source);

    let unit = UnitCtx::new(Arc::from(file.as_str()), &g_ctx);
    let jc = g_ctx
        .query_for_unit(get_ast, &worker, &unit, ())
        .expect("query");
    jc.execute(&worker, true).expect("execute");
    jc.wait().expect("wait");
    let crate_ctx = jc.last_result().expect("result");
    g_ctx.wait_finished();
    crate_ctx.ast.debug_repr()
}

#[rstest]
// Plain operators and statement dividers
#[case("a+b;", "GLOBAL { SC OP(SYM() + SYM()); }")]
#[case("-5;", "GLOBAL { SC OP(- BLOB_LITERAL()); }")]
#[case("5.4", "GLOBAL { OP(BLOB_LITERAL() . BLOB_LITERAL()) }")]
#[case(
    "let val = 5 * 3 + 2;",
    "GLOBAL { SC BINDING(OP(SYM() = OP(OP(BLOB_LITERAL() * BLOB_LITERAL()) + BLOB_LITERAL()))); }"
)]
// Right-to-left assignment chains over separable operators
#[case(
    "let v = val = 5 * 3 + 2 + 1",
    "GLOBAL { BINDING(OP(SYM() = OP(SYM() = OP(OP(OP(BLOB_LITERAL() * BLOB_LITERAL()) + BLOB_LITERAL()) + BLOB_LITERAL())))) }"
)]
#[case(
    "let v = val = 6 + 5 * 3 + 2 + 1",
    "GLOBAL { BINDING(OP(SYM() = OP(SYM() = OP(OP(OP(BLOB_LITERAL() + OP(BLOB_LITERAL() * BLOB_LITERAL())) + BLOB_LITERAL()) + BLOB_LITERAL())))) }"
)]
#[case(
    "let v = val = 6 + 5 * (3 + 2) + 1",
    "GLOBAL { BINDING(OP(SYM() = OP(SYM() = OP(OP(BLOB_LITERAL() + OP(BLOB_LITERAL() * TERM( OP(BLOB_LITERAL() + BLOB_LITERAL()) ))) + BLOB_LITERAL())))) }"
)]
// Named literals land as numeric literals
#[case(
    "let val = 42 + 5 * (3 + 2) + true",
    "GLOBAL { BINDING(OP(SYM() = OP(OP(BLOB_LITERAL() + OP(BLOB_LITERAL() * TERM( OP(BLOB_LITERAL() + BLOB_LITERAL()) ))) + BLOB_LITERAL()))) }"
)]
// String literals keep their interior exactly
#[case(
    "let val = 42 + \"this is a string \";",
    "GLOBAL { SC BINDING(OP(SYM() = OP(BLOB_LITERAL() + STR \"this is a string \"))); }"
)]
// Terms, tuples, unit
#[case(
    "(a, b, c, d, 5, (4%2));",
    "GLOBAL { SC TUPLE( SYM(), SYM(), SYM(), SYM(), BLOB_LITERAL(), TERM( OP(BLOB_LITERAL() % BLOB_LITERAL()) ), ); }"
)]
// Function definitions and heads
#[case(
    "function {let val = 5;}",
    "GLOBAL { FUNC(SYM() BLOCK { SC BINDING(OP(SYM() = BLOB_LITERAL())); }) }"
)]
#[case(
    "function (a, b) { (a, b, 5); } ",
    "GLOBAL { FUNC(TUPLE( SYM(), SYM(), ) SYM() BLOCK { SC TUPLE( SYM(), SYM(), BLOB_LITERAL(), ); }) }"
)]
#[case("function(c, d);", "GLOBAL { SC FUNC_HEAD(TUPLE( SYM(), SYM(), ) SYM()); }")]
#[case("fn (s) { }", "GLOBAL { FUNC(TERM( SYM() ) SYM() BLOCK { }) }")]
// Control flow
#[case(
    "if true { let val = 4; }",
    "GLOBAL { IF(BLOB_LITERAL() THEN BLOCK { SC BINDING(OP(SYM() = BLOB_LITERAL())); } ) }"
)]
#[case(
    "if var { let val = 4; }",
    "GLOBAL { IF(SYM() THEN BLOCK { SC BINDING(OP(SYM() = BLOB_LITERAL())); } ) }"
)]
#[case(
    "do { function(c, d); } until true;",
    "GLOBAL { SC POST_LOOP(FALSE: BLOB_LITERAL() DO BLOCK { SC FUNC_HEAD(TUPLE( SYM(), SYM(), ) SYM()); } ); }"
)]
#[case(
    "fn (s) { if true let a = 2; else let a = 3; }",
    "GLOBAL { FUNC(TERM( SYM() ) SYM() BLOCK { IF(BLOB_LITERAL() THEN SC BINDING(OP(SYM() = BLOB_LITERAL())); ELSE SC BINDING(OP(SYM() = BLOB_LITERAL())); ) }) }"
)]
#[case(
    "fn { (a,b); match a 1=>x, 2=>y; }",
    "GLOBAL { FUNC(SYM() BLOCK { SC TUPLE( SYM(), SYM(), ); MATCH(SYM() WITH SC COMMA( OP(BLOB_LITERAL() => SYM()), OP(BLOB_LITERAL() => SYM()), );) }) }"
)]
// Sets vs blocks
#[case(
    "let a = { a, b, c };",
    "GLOBAL { SC BINDING(OP(SYM() = SET { SYM(), SYM(), SYM(), })); }"
)]
// Member and scope access
#[case(
    "s.b; A::B; ::C;",
    "GLOBAL { SC MEMBER(SYM().SYM()); SC SCOPE(SYM()::SYM()); SC SCOPE(<global>::SYM()); }"
)]
#[case(
    "A::B::C; ::A::B;",
    "GLOBAL { SC SCOPE(SCOPE(SYM()::SYM())::SYM()); SC SCOPE(<global>::SCOPE(SYM()::SYM())); }"
)]
// Typed bindings, references, type_of
#[case(
    "let a:&int = type_of s;",
    "GLOBAL { SC BINDING(OP(TYPED(SYM():REF(SYM())) = TYPE_OF(SYM()))); }"
)]
// Modules, structures, traits, implementations
#[case("mod modulename {}", "GLOBAL { MODULE SYM() BLOCK { } }")]
#[case(
    "trait Addable { } struct A { } impl A { } impl Addable for A { }",
    "GLOBAL { TRAIT SYM() BLOCK { } STRUCT SYM() BLOCK { } IMPL SYM() BLOCK { } IMPL SYM() FOR SYM() BLOCK { } }"
)]
#[case(
    "struct A { val1:int, val2:int } ",
    "GLOBAL { STRUCT SYM() SET { TYPED(SYM():SYM()), TYPED(SYM():SYM()), } }"
)]
// Ranges
#[case(
    "a..b; a..; ..b; a..=b; ..=b; ",
    "GLOBAL { SC RANGE EXCLUDE SYM()..SYM(); SC RANGE EXCLUDE_FROM SYM(); SC RANGE EXCLUDE_TO SYM(); SC RANGE INCLUDE SYM()..SYM(); SC RANGE INCLUDE_TO SYM(); }"
)]
// Static statements ride along on the next expression
#[case(
    "let result = 40 ${val != 0} / val;",
    "GLOBAL { SC BINDING(OP(SYM() = OP(BLOB_LITERAL() / SYM())$(STST BLOCK { OP(SYM() != BLOB_LITERAL()) }, ))); }"
)]
// Declarations and visibility
#[case(
    "decl fn1(arg:int); pub fn2(arg:int);",
    "GLOBAL { SC DECL(FUNC_HEAD(TERM( TYPED(SYM():SYM()) ) SYM())); SC PUBLIC(FUNC_HEAD(TERM( TYPED(SYM():SYM()) ) SYM())); }"
)]
// Annotations, macros, unsafe blocks
#[case(
    "#not_inline() fn { } ",
    "GLOBAL { ANNOTATE(SYM() UNIT()) FUNC(SYM() BLOCK { }) }"
)]
#[case(
    "fn { println!(\"Hello World\"); } ",
    "GLOBAL { FUNC(SYM() BLOCK { SC MACRO(SYM()! TERM( STR \"Hello World\" )); }) }"
)]
#[case(
    "fn { unsafe { C::printf(\"hello\"); } } ",
    "GLOBAL { FUNC(SYM() BLOCK { UNSAFE BLOCK { SC FUNC_HEAD(TERM( STR \"hello\" ) SCOPE(SYM()::SYM())); } }) }"
)]
// Array specifiers and array access
#[case(
    "function { let var[4] = [0,1,2]; var[2] } ",
    "GLOBAL { FUNC(SYM() BLOCK { SC BINDING(OP(ARR_ACC SYM()[ARRAY[ BLOB_LITERAL() ]] = ARRAY[ COMMA( BLOB_LITERAL(), BLOB_LITERAL(), BLOB_LITERAL(), ) ])); ARR_ACC SYM()[ARRAY[ BLOB_LITERAL() ]] }) }"
)]
// Template postfix vs comparison and shift (ambiguity folding)
#[case("a < b;", "GLOBAL { SC OP(SYM() < SYM()); }")]
#[case("a >> b;", "GLOBAL { SC OP(SYM() >> SYM()); }")]
#[case(
    "Vec1<Vec2<a> >;",
    "GLOBAL { SC TEMPLATE SYM()<TEMPLATE SYM()<SYM(), >, >; }"
)]
#[case(
    "Vec1<Vec2<a>>(); a >> b;",
    "GLOBAL { SC FUNC_HEAD(UNIT() TEMPLATE SYM()<TEMPLATE SYM()<SYM(), >, >); SC OP(SYM() >> SYM()); }"
)]
#[case(
    "f(g<a>(c));",
    "GLOBAL { SC FUNC_HEAD(TERM( FUNC_HEAD(TERM( SYM() ) TEMPLATE SYM()<SYM(), >) ) SYM()); }"
)]
#[case(
    "fn<A, B>() { a+fn(a+b, c); }",
    "GLOBAL { FUNC(UNIT() TEMPLATE SYM()<COMMA( SYM(), SYM(), ), > BLOCK { SC OP(SYM() + FUNC_HEAD(TUPLE( OP(SYM() + SYM()), SYM(), ) SYM())); }) }"
)]
fn test_ast_parser(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(parse(source), expected, "source: {source}");
}

#[test]
fn test_explicit_prelude_directive() {
    assert_eq!(
        parse("#prelude(push) a+b;"),
        "GLOBAL { SC OP(SYM() + SYM()); }"
    );
}

#[test]
fn test_comments_do_not_reach_the_ast() {
    assert_eq!(
        parse("/* leading /*nested*/ comment */ a+b; // trailing\n"),
        "GLOBAL { SC OP(SYM() + SYM()); }"
    );
}

#[test]
fn test_doc_comment_before_function() {
    assert_eq!(
        parse("/// Basic function without anything special\n function {let val = 5;}"),
        "GLOBAL { FUNC(SYM() BLOCK { SC BINDING(OP(SYM() = BLOB_LITERAL())); }) }"
    );
}
