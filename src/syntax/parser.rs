//! Sutra Parser
//!
//! Converts Sutra source code into AST nodes with source location tracking.
//! This parser is purely syntactic: special forms such as `define` are
//! ordinary lists here and get their meaning from the evaluator.

use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{node, AstNode, Expr, Span};
use crate::errors::{
    to_source_span, ErrorKind, ErrorReporting, ErrorSite, Phase, SourceContext, SutraError,
};
use crate::runtime::path::Path;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SutraParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses the whole of `source` into top-level AST nodes. Errors are tagged
/// with `phase`, the stage of the run the text belongs to.
pub fn parse(source: &SourceContext, phase: Phase) -> Result<Vec<AstNode>, SutraError> {
    let site = ErrorSite::new(source.clone(), phase);
    let text: &str = &source.content;
    if text.trim().is_empty() {
        return Ok(vec![]);
    }

    let mut pairs =
        SutraParser::parse(Rule::program, text).map_err(|e| convert_parse_error(e, &site))?;

    let Some(program) = pairs.next() else {
        return Err(site.missing_element("program", to_source_span(Span::default())));
    };

    program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_ast_node(p, &site))
        .collect()
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_ast_node(pair: Pair<Rule>, site: &ErrorSite) -> Result<AstNode, SutraError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::number => {
            let text = pair.as_str();
            let value = text
                .parse::<f64>()
                .map_err(|_| invalid_literal(site, "number", text, span))?;
            Ok(node(Expr::Number(value, span)))
        }

        Rule::boolean => Ok(node(Expr::Bool(pair.as_str() == "true", span))),

        Rule::nil => Ok(node(Expr::Nil(span))),

        Rule::string => {
            let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            let content = unescape_string(inner, site, span)?;
            Ok(node(Expr::String(content, span)))
        }

        Rule::symbol => Ok(node(Expr::Symbol(pair.as_str().to_string(), span))),

        Rule::path => {
            let text = pair.as_str();
            let path = Path::parse(text).ok_or_else(|| invalid_literal(site, "path", text, span))?;
            Ok(node(Expr::Path(path, span)))
        }

        Rule::list | Rule::block => {
            let children = pair
                .into_inner()
                .map(|p| build_ast_node(p, site))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(node(Expr::List(children, span)))
        }

        Rule::quote => {
            let inner = pair
                .into_inner()
                .next()
                .ok_or_else(|| site.missing_element("expression after quote", to_source_span(span)))?;
            let quoted = build_ast_node(inner, site)?;
            Ok(node(Expr::Quote(Box::new(quoted), span)))
        }

        Rule::spread => {
            let target = pair
                .into_inner()
                .next()
                .ok_or_else(|| site.missing_element("symbol after spread", to_source_span(span)))?;
            let target = build_ast_node(target, site)?;
            Ok(node(Expr::Spread(Box::new(target))))
        }

        rule => Err(site.report(
            ErrorKind::MalformedConstruct {
                construct: format!("unsupported rule: {:?}", rule),
            },
            to_source_span(span),
        )),
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn invalid_literal(site: &ErrorSite, literal_type: &str, value: &str, span: Span) -> SutraError {
    site.report(
        ErrorKind::InvalidLiteral {
            literal_type: literal_type.into(),
            value: value.into(),
        },
        to_source_span(span),
    )
}

fn unescape_string(inner: &str, site: &ErrorSite, span: Span) -> Result<String, SutraError> {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                return Err(invalid_literal(
                    site,
                    "escape sequence",
                    &format!("\\{}", other),
                    span,
                ))
            }
            None => return Err(invalid_literal(site, "escape sequence", "\\", span)),
        }
    }

    Ok(result)
}

fn rule_label(rule: &Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::program => "program",
        Rule::list => "list",
        Rule::block => "block",
        Rule::quote => "quoted expression",
        Rule::spread => "spread",
        Rule::number => "number",
        Rule::boolean => "boolean",
        Rule::nil => "nil",
        Rule::string | Rule::string_inner => "string",
        Rule::path => "path",
        Rule::symbol => "symbol",
        _ => "expression",
    }
}

fn convert_parse_error(error: pest::error::Error<Rule>, site: &ErrorSite) -> SutraError {
    let span = match error.location {
        InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        InputLocation::Span((start, end)) => Span { start, end },
    };
    let at_end = span.start >= site.source.content.trim_end().len();

    let kind = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            let mut labels: Vec<&str> = positives.iter().map(rule_label).collect();
            labels.dedup();
            if at_end && !labels.is_empty() && labels != ["end of input"] {
                ErrorKind::MissingElement {
                    element: "closing bracket".into(),
                }
            } else if labels.is_empty() || labels == ["end of input"] {
                ErrorKind::UnexpectedToken {
                    expected: "an expression or end of input".into(),
                }
            } else {
                ErrorKind::UnexpectedToken {
                    expected: labels.join(" or "),
                }
            }
        }
        ErrorVariant::CustomError { message } => ErrorKind::MalformedConstruct {
            construct: message.clone(),
        },
    };

    site.report(kind, to_source_span(span))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Result<Vec<AstNode>, SutraError> {
        parse(&SourceContext::from_file("test", text), Phase::Execution)
    }

    #[test]
    fn empty_input_is_empty_program() {
        assert!(parse_str("  ; only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn paths_and_spreads() {
        let nodes = parse_str("(f ...args stats.calls)").unwrap();
        let Expr::List(items, _) = &*nodes[0].value else {
            panic!("expected list");
        };
        assert!(matches!(&*items[1].value, Expr::Spread(_)));
        assert!(matches!(&*items[2].value, Expr::Path(p, _) if p.to_string() == "stats.calls"));
    }

    #[test]
    fn negative_numbers_and_minus_symbol() {
        let nodes = parse_str("(- -5 2)").unwrap();
        let Expr::List(items, _) = &*nodes[0].value else {
            panic!("expected list");
        };
        assert_eq!(items[0].value.as_symbol(), Some("-"));
        assert!(matches!(&*items[1].value, Expr::Number(n, _) if *n == -5.0));
    }

    #[test]
    fn unmatched_paren_is_missing_element() {
        let err = parse_str("(a b").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingElement { .. }));
        assert_eq!(err.phase(), Phase::Execution);
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let err = parse_str(r#""bad \q""#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidLiteral { .. }));
    }
}
