//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sutra_check::atoms::{OutputSink, SharedOutput};
use sutra_check::cli::output::OutputBuffer;
use sutra_check::{assemble, evaluate_source, run, AtomRegistry, Outcome, SutraError, Value, World};

pub const TEST_SEED: u64 = 7;
pub const TEST_MAX_DEPTH: usize = 32;

/// Standard atoms and a seeded template world with the prelude loaded.
pub fn standard() -> (AtomRegistry, World) {
    let atoms = AtomRegistry::standard();
    let world = World::standard(&atoms, Some(TEST_SEED)).expect("prelude loads");
    (atoms, world)
}

/// Builds the stdin JSON for a program and a test-case expression.
pub fn payload(code: &str, test_case: &str) -> String {
    serde_json::json!({ "code": code, "test_case": test_case }).to_string()
}

/// Evaluates a snippet against the standard template world.
pub fn eval(text: &str) -> Result<Value, SutraError> {
    let (atoms, world) = standard();
    evaluate_source(text, &world, &atoms)
}

pub fn eval_ok(text: &str) -> Value {
    match eval(text) {
        Ok(value) => value,
        Err(e) => panic!("evaluation of {text:?} failed: {e}"),
    }
}

/// Runs the whole harness on a payload and returns the outcome together with
/// everything the program printed.
pub fn check(code: &str, test_case: &str, func: &str) -> (Result<Outcome, SutraError>, String) {
    let (atoms, world) = standard();
    let buffer = Rc::new(RefCell::new(OutputBuffer::new()));
    let sink: Rc<RefCell<dyn OutputSink>> = buffer.clone();

    let outcome = assemble(&payload(code, test_case), func, &world, &atoms, TEST_MAX_DEPTH)
        .and_then(|(unit, cases)| {
            run(&unit, &cases, &world, &atoms, SharedOutput(sink), TEST_MAX_DEPTH)
        });
    let printed = buffer.borrow().as_str().to_string();
    (outcome, printed)
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}
