//! Payload assembly: build the executable unit and materialise the test table.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::value::Value;
use crate::ast::{AstNode, Expr, Span};
use crate::atoms::{AtomRegistry, SharedOutput};
use crate::errors::{
    to_source_span, unspanned, ErrorKind, ErrorReporting, ErrorSite, Phase, SourceContext,
    SutraError,
};
use crate::harness::payload::TestPayload;
use crate::runtime::eval::{evaluate_program, EvaluationContext};
use crate::runtime::scope::{ExecutionScope, ARGS_BINDING, RESULT_BINDING};
use crate::runtime::world::World;
use crate::syntax::parse;

/// One `(args expected)` pair of the test table.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub args: Vec<Value>,
    pub expected: Value,
}

/// The candidate program with the invocation form appended, parsed once and
/// reused for every test case.
#[derive(Debug, Clone)]
pub struct ExecutableUnit {
    pub function_name: String,
    pub source: SourceContext,
    pub program: Vec<AstNode>,
}

impl ExecutableUnit {
    /// Appends `(define result (<function_name> ...args))` to `code` and
    /// parses the result.
    pub fn build(code: &str, function_name: &str) -> Result<Self, SutraError> {
        let text = unit_text(code, function_name);
        let source = SourceContext::from_file("unit", text);
        let program = parse(&source, Phase::Execution)?;
        Ok(Self {
            function_name: function_name.to_string(),
            source,
            program,
        })
    }

    /// Full text of the unit, including the appended invocation.
    pub fn text(&self) -> &str {
        &self.source.content
    }
}

/// Text of the assembled unit.
///
/// # Examples
///
/// ```rust
/// use sutra_check::harness::assemble::unit_text;
/// assert_eq!(
///     unit_text("(define (f x) x)", "f"),
///     "(define (f x) x)\n(define result (f ...args))"
/// );
/// ```
pub fn unit_text(code: &str, function_name: &str) -> String {
    format!(
        "{}\n(define {} ({} ...{}))",
        code, RESULT_BINDING, function_name, ARGS_BINDING
    )
}

/// Parses stdin, builds the executable unit and evaluates the test-case
/// expression. The program itself is not run. `max_depth` follows the same
/// stack rule as `runner::run`.
pub fn assemble(
    raw_input: &str,
    function_name: &str,
    template: &World,
    atoms: &AtomRegistry,
    max_depth: usize,
) -> Result<(ExecutableUnit, Vec<TestCase>), SutraError> {
    let payload = TestPayload::from_input(raw_input)?;
    validate_entry_point(function_name, atoms)?;

    let unit = ExecutableUnit::build(&payload.code, function_name)?;
    tracing::debug!(
        function = function_name,
        forms = unit.program.len(),
        "assembled executable unit"
    );

    let cases = evaluate_test_cases(&payload.test_case, template, atoms, max_depth)?;
    tracing::debug!(cases = cases.len(), "materialised test table");
    Ok((unit, cases))
}

/// Checks that `function_name` is a single symbol that can appear in call
/// position.
pub fn validate_entry_point(function_name: &str, atoms: &AtomRegistry) -> Result<(), SutraError> {
    let source = SourceContext::from_file("func", function_name);
    let site = ErrorSite::new(source.clone(), Phase::Payload);
    let invalid = |reason: &str| {
        site.report(
            ErrorKind::InvalidEntryPoint {
                name: function_name.to_string(),
                reason: reason.to_string(),
            },
            to_source_span(Span {
                start: 0,
                end: function_name.len(),
            }),
        )
    };

    let Ok(nodes) = parse(&source, Phase::Payload) else {
        return Err(invalid("not a valid symbol"));
    };
    match nodes.as_slice() {
        [node] => match &*node.value {
            Expr::Symbol(name, _) if atoms.is_special_form(name) => {
                Err(invalid("names a special form, not a function"))
            }
            Expr::Symbol(_, _) => Ok(()),
            _ => Err(invalid("not a valid symbol")),
        },
        [] => Err(invalid("empty function name")),
        _ => Err(invalid("must be a single symbol")),
    }
}

/// Evaluates the `test_case` text against a copy of the template world with
/// an empty scope and turns the value into a table.
pub fn evaluate_test_cases(
    test_case: &str,
    template: &World,
    atoms: &AtomRegistry,
    max_depth: usize,
) -> Result<Vec<TestCase>, SutraError> {
    let source = SourceContext::from_file("test_case", test_case);
    let program = parse(&source, Phase::TestCase)?;

    let mut context = EvaluationContext::new(
        Rc::new(RefCell::new(template.clone())),
        Rc::new(RefCell::new(ExecutionScope::new())),
        atoms,
        SharedOutput::default(),
        source.clone(),
        Phase::TestCase,
    )
    .with_max_depth(max_depth);
    let table = evaluate_program(&program, &mut context)?;
    tracing::trace!(table = %table, "test_case evaluated");

    table_from_value(table, &ErrorSite::new(source, Phase::TestCase))
}

/// Converts an evaluated table into test cases: a list of two-element lists
/// whose first element is the argument list.
pub fn table_from_value(table: Value, site: &ErrorSite) -> Result<Vec<TestCase>, SutraError> {
    let whole = to_source_span(Span {
        start: 0,
        end: site.source.content.len(),
    });
    let rows = match table {
        Value::List(rows) => rows,
        other => {
            return Err(site.type_mismatch(
                "list of (args expected) pairs",
                other.type_name(),
                whole,
            ))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let malformed = |reason: String| {
                site.report(ErrorKind::MalformedTestCase { index, reason }, unspanned())
            };
            let pair = match row {
                Value::List(pair) => pair,
                other => return Err(malformed(format!("expected a list, found {}", other))),
            };
            let [args, expected]: [Value; 2] = pair.try_into().map_err(|pair: Vec<Value>| {
                malformed(format!("expected 2 elements, found {}", pair.len()))
            })?;
            match args {
                Value::List(args) => Ok(TestCase { args, expected }),
                other => Err(malformed(format!("args must be a list, found {}", other))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Fault;

    fn setup() -> (AtomRegistry, World) {
        let atoms = AtomRegistry::standard();
        let world = World::standard(&atoms, Some(0)).unwrap();
        (atoms, world)
    }

    #[test]
    fn test_table_may_call_helpers() {
        let (atoms, world) = setup();
        let cases = evaluate_test_cases(
            "(map (lambda (n) (list (list n) (square n))) (range 1 4))",
            &world,
            &atoms,
            64,
        )
        .unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[2].args, vec![Value::Number(3.0)]);
        assert_eq!(cases[2].expected, Value::Number(9.0));
    }

    #[test]
    fn rows_must_be_pairs() {
        let (atoms, world) = setup();
        let err = evaluate_test_cases("'(((1) 2) ((3)))", &world, &atoms, 64).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedTestCase { index: 1, .. }));
        assert_eq!(err.fault(), Fault::TestCaseEvaluation);
    }

    #[test]
    fn program_names_are_not_visible_to_the_table() {
        let (atoms, world) = setup();
        let raw = r#"{"code": "(define (f x) x)", "test_case": "(list (list (list 1) (f 1)))"}"#;
        let err = assemble(raw, "f", &world, &atoms, 64).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UndefinedSymbol { .. }));
        assert_eq!(err.phase(), Phase::TestCase);
    }

    #[test]
    fn entry_point_must_be_one_symbol() {
        let atoms = AtomRegistry::standard();
        assert!(validate_entry_point("double", &atoms).is_ok());
        for bad in ["", "two words", "(f)", "42", "if"] {
            let err = validate_entry_point(bad, &atoms).unwrap_err();
            assert_eq!(err.fault(), Fault::MalformedPayload, "{bad:?}");
        }
    }

    #[test]
    fn unit_syntax_errors_surface_at_assembly() {
        let (atoms, world) = setup();
        let raw = r#"{"code": "(define (f x) x", "test_case": "'()"}"#;
        let err = assemble(raw, "f", &world, &atoms, 64).unwrap_err();
        assert_eq!(err.fault(), Fault::Execution);
    }
}
