// tests/parser_tests.rs

use sutra_check::ast::{AstNode, Expr};
use sutra_check::errors::{ErrorKind, Phase, SourceContext};
use sutra_check::parse;

fn parse_text(text: &str) -> Vec<AstNode> {
    parse(&SourceContext::from_file("test", text), Phase::Execution).unwrap()
}

fn pretty(text: &str) -> Vec<String> {
    parse_text(text).iter().map(|n| n.value.pretty()).collect()
}

#[test]
fn test_parse_simple_s_expression() {
    let items = parse_text("(+ 1 2)");
    assert_eq!(items.len(), 1);

    if let Expr::List(inner_items, _) = &*items[0].value {
        assert_eq!(inner_items.len(), 3);
        assert!(matches!(&*inner_items[0].value, Expr::Symbol(s, _) if s == "+"));
        assert!(matches!(*inner_items[1].value, Expr::Number(n, _) if n == 1.0));
        assert!(matches!(*inner_items[2].value, Expr::Number(n, _) if n == 2.0));
    } else {
        panic!("Expected a list");
    }
}

#[test]
fn test_parse_nested_s_expression() {
    assert_eq!(pretty("(+ 1 (* 2 3))"), vec!["(+ 1 (* 2 3))"]);
}

#[test]
fn test_parse_brace_block_equivalent() {
    assert_eq!(pretty("{+ 1 2}"), pretty("(+ 1 2)"));
}

#[test]
fn test_parse_string_escapes() {
    let items = parse_text(r#""line\nbreak \"quoted\"""#);
    assert!(matches!(&*items[0].value, Expr::String(s, _) if s == "line\nbreak \"quoted\""));
}

#[test]
fn test_parse_comments_and_commas() {
    assert_eq!(pretty("; leading comment\n(list 1, 2, 3) ; trailing"), vec!["(list 1 2 3)"]);
}

#[test]
fn test_parse_quote_and_spread() {
    assert_eq!(pretty("'(a b) (f ...args)"), vec!["'(a b)", "(f ...args)"]);
}

#[test]
fn test_parse_invocation_unit() {
    let text = sutra_check::harness::assemble::unit_text("(define (f x) x)", "f");
    let items = parse_text(&text);
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].value.pretty(), "(define result (f ...args))");
}

#[test]
fn test_parse_spans_point_into_source() {
    let items = parse_text("  (f)");
    assert_eq!(items[0].span.start, 2);
    assert_eq!(items[0].span.end, 5);
}

#[test]
fn test_parse_error_carries_phase() {
    let err = parse(&SourceContext::from_file("test_case", "(list 1"), Phase::TestCase).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingElement { .. }));
    assert_eq!(err.phase(), Phase::TestCase);
    assert!(err.diagnostic_info.error_code.starts_with("sutra::test_case::"));
}

#[test]
fn test_parse_stray_closer_is_unexpected() {
    let err = parse(&SourceContext::from_file("test", "(f))"), Phase::Execution).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
}
