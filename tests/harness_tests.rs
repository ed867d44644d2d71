//! End-to-end harness behaviour through the library API.

mod common;

use common::{check, list, num, payload, standard, TEST_MAX_DEPTH};
use sutra_check::errors::{ErrorKind, Fault, Phase};
use sutra_check::harness::assemble::evaluate_test_cases;
use sutra_check::{assemble, Outcome};

const DOUBLE: &str = "(define (double x) (* x 2))";

#[test]
fn all_cases_pass() {
    let (outcome, _) = check(DOUBLE, "'(((1) 2) ((3) 6))", "double");
    let outcome = outcome.unwrap();
    assert_eq!(outcome, Outcome::AllPassed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.to_string(), "All test cases passed!");
}

#[test]
fn empty_table_passes() {
    let (outcome, _) = check(DOUBLE, "'()", "double");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn first_mismatch_is_reported() {
    let (outcome, _) = check(DOUBLE, "'(((1) 3) ((3) 6))", "double");
    let outcome = outcome.unwrap();
    assert_eq!(
        outcome,
        Outcome::Failed {
            args: vec![num(1.0)],
            expected: num(3.0),
            actual: num(2.0),
        }
    );
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(
        outcome.to_string(),
        "Test case failed on input `(1)`: Expected \n`3`\nbut got \n`2`"
    );
}

#[test]
fn cases_after_a_mismatch_never_run() {
    let code = "(define (shout x) (print \"ran\" x) x)";
    let (outcome, printed) = check(code, "'(((1) 1) ((2) 0) ((3) 3))", "shout");
    assert!(matches!(outcome.unwrap(), Outcome::Failed { .. }));
    assert_eq!(printed, "ran 1\nran 2");
}

#[test]
fn ambient_mutations_do_not_leak_between_cases() {
    let code = "(define (visit x) (inc! visits) (get visits))";
    let (outcome, _) = check(code, "'(((a) 1) ((b) 1) ((c) 1))", "visit");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn program_defines_do_not_leak_between_cases() {
    let code = r#"
        (define (seen? x) (exists? marker))
        (define (mark x) (let ((before (seen? x))) (set! marker x) before))
    "#;
    let (outcome, _) = check(code, "'(((1) false) ((2) false))", "mark");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn arity_mismatch_is_fatal() {
    let (outcome, _) = check(DOUBLE, "'(((1 2) 2))", "double");
    let err = outcome.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { actual: 2, .. }));
    assert_eq!(err.fault(), Fault::Execution);
}

#[test]
fn rest_parameters_accept_any_arity() {
    let code = "(define (total ...xs) (sum xs))";
    let (outcome, _) = check(code, "'((() 0) ((1) 1) ((1 2 3) 6))", "total");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn comparison_is_structural() {
    let code = "(define (pairs n) (map (lambda (i) (list i (* i i))) (range n)))";
    let (outcome, _) = check(code, "'(((2) ((0 0) (1 1))) ((0) ()))", "pairs");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);

    let (outcome, _) = check(code, "'(((2) ((0 0) (1 2))))", "pairs");
    match outcome.unwrap() {
        Outcome::Failed { actual, .. } => assert_eq!(
            actual,
            list(vec![
                list(vec![num(0.0), num(0.0)]),
                list(vec![num(1.0), num(1.0)])
            ])
        ),
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[test]
fn strings_and_numbers_never_compare_equal() {
    let code = "(define (as-text n) (str n))";
    let (outcome, _) = check(code, "'(((1) 1))", "as-text");
    let outcome = outcome.unwrap();
    assert_eq!(
        outcome.to_string(),
        "Test case failed on input `(1)`: Expected \n`1`\nbut got \n`\"1\"`"
    );
}

#[test]
fn malformed_payload_is_fatal() {
    let (atoms, world) = standard();
    for raw in [
        "not json".to_string(),
        r#"{"code": "(define (f) 1)"}"#.to_string(),
        r#"["(define (f) 1)", "'()"]"#.to_string(),
    ] {
        let err = assemble(&raw, "f", &world, &atoms, TEST_MAX_DEPTH).unwrap_err();
        assert_eq!(err.fault(), Fault::MalformedPayload, "{raw}");
        assert_eq!(err.phase(), Phase::Payload);
    }
}

#[test]
fn test_case_errors_are_their_own_fault() {
    let (outcome, _) = check(DOUBLE, "(list (list (list 1) (/ 1 0)))", "double");
    let err = outcome.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
    assert_eq!(err.fault(), Fault::TestCaseEvaluation);
}

#[test]
fn runtime_errors_in_the_program_are_fatal() {
    let code = "(define (boom x) (error \"bad input:\" x))";
    let (outcome, _) = check(code, "'(((1) 1))", "boom");
    let err = outcome.unwrap_err();
    assert!(err.to_string().contains("bad input: 1"));
    assert_eq!(err.fault(), Fault::Execution);
}

#[test]
fn undefined_entry_point_is_reported() {
    let (outcome, _) = check(DOUBLE, "'(((1) 2))", "triple");
    let err = outcome.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol { ref symbol } if symbol == "triple"));
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let code = "(define (forever n) (forever (+ n 1)))";
    let (outcome, _) = check(code, "'(((0) 0))", "forever");
    let err = outcome.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RecursionLimit { limit } if limit == TEST_MAX_DEPTH));
}

#[test]
fn recursive_programs_run() {
    let code = r#"
        (define (fact n)
          (if (<= n 1)
              1
              (* n (fact (- n 1)))))
    "#;
    let (outcome, _) = check(code, "'(((0) 1) ((5) 120) ((10) 3628800))", "fact");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn program_may_call_prelude_helpers() {
    let code = "(define (sum-squares xs) (sum (map square xs)))";
    let (outcome, _) = check(code, "'((((1 2 3)) 14))", "sum-squares");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn test_table_can_be_computed() {
    let (atoms, world) = standard();
    let cases = evaluate_test_cases(
        "(map (lambda (n) (list (list n) (* n 2))) (range 4))",
        &world,
        &atoms,
        TEST_MAX_DEPTH,
    )
    .unwrap();
    assert_eq!(cases.len(), 4);
    assert_eq!(cases[3].args, vec![num(3.0)]);
    assert_eq!(cases[3].expected, num(6.0));

    let (outcome, _) = check(
        DOUBLE,
        "(map (lambda (n) (list (list n) (* n 2))) (range 4))",
        "double",
    );
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn string_arguments_round_trip() {
    let code = r#"(define (greet name) (str+ "hello, " name))"#;
    let (outcome, _) = check(code, r#"'((("ada") "hello, ada"))"#, "greet");
    assert_eq!(outcome.unwrap(), Outcome::AllPassed);
}

#[test]
fn payload_builder_escapes_quotes() {
    let raw = payload("(define (f) \"x\")", "'((() \"x\"))");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["code"], "(define (f) \"x\")");
}
