//! Execution and comparison: run the unit once per test case and compare the
//! bound result with the expected value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::value::Value;
use crate::ast::Span;
use crate::atoms::{AtomRegistry, SharedOutput};
use crate::errors::{to_source_span, ErrorKind, ErrorReporting, Phase, SutraError};
use crate::harness::assemble::{ExecutableUnit, TestCase};
use crate::runtime::eval::{evaluate_program, EvaluationContext};
use crate::runtime::scope::{ExecutionScope, RESULT_BINDING};
use crate::runtime::world::World;

/// Exit code for a value mismatch.
pub const EXIT_MISMATCH: i32 = 2;

/// Result of a run that did not crash.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    AllPassed,
    /// The first case whose result differed from its expected value.
    Failed {
        args: Vec<Value>,
        expected: Value,
        actual: Value,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::AllPassed)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::AllPassed => 0,
            Outcome::Failed { .. } => EXIT_MISMATCH,
        }
    }
}

/// The report line written to stdout, without a trailing newline.
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AllPassed => write!(f, "All test cases passed!"),
            Outcome::Failed {
                args,
                expected,
                actual,
            } => write!(
                f,
                "Test case failed on input `{}`: Expected \n`{}`\nbut got \n`{}`",
                Value::List(args.clone()),
                expected,
                actual
            ),
        }
    }
}

/// Runs every case in order, stopping at the first mismatch. Each case gets
/// a fresh scope holding only `args` and its own copy of `template`.
///
/// Evaluation recurses on the calling thread's stack. `max_depth` above
/// `runtime::eval::DEFAULT_MAX_DEPTH` needs a thread with a larger stack,
/// as `cli::run` provides.
pub fn run(
    unit: &ExecutableUnit,
    cases: &[TestCase],
    template: &World,
    atoms: &AtomRegistry,
    output: SharedOutput,
    max_depth: usize,
) -> Result<Outcome, SutraError> {
    tracing::info!(
        function = %unit.function_name,
        cases = cases.len(),
        "running test cases"
    );

    for (index, case) in cases.iter().enumerate() {
        let shown = Value::List(case.args.clone());
        tracing::debug!(case = index, args = %shown, "running case");
        let actual = run_case(unit, case, template, atoms, output.clone(), max_depth)?;

        if actual != case.expected {
            tracing::info!(case = index, "mismatch");
            return Ok(Outcome::Failed {
                args: case.args.clone(),
                expected: case.expected.clone(),
                actual,
            });
        }
    }

    tracing::info!("all test cases passed");
    Ok(Outcome::AllPassed)
}

/// Executes the unit for one case and returns the value bound to `result`.
pub fn run_case(
    unit: &ExecutableUnit,
    case: &TestCase,
    template: &World,
    atoms: &AtomRegistry,
    output: SharedOutput,
    max_depth: usize,
) -> Result<Value, SutraError> {
    let scope = Rc::new(RefCell::new(ExecutionScope::with_args(case.args.clone())));
    let mut context = EvaluationContext::new(
        Rc::new(RefCell::new(template.clone())),
        Rc::clone(&scope),
        atoms,
        output,
        unit.source.clone(),
        Phase::Execution,
    )
    .with_max_depth(max_depth);

    evaluate_program(&unit.program, &mut context)?;

    let result = scope.borrow().get(RESULT_BINDING).cloned();
    result.ok_or_else(|| {
        let end = unit.text().len();
        context.report(
            ErrorKind::MissingResult {
                name: RESULT_BINDING.to_string(),
            },
            to_source_span(Span { start: end, end }),
        )
    })
}
