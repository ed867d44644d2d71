//! Evaluation pipeline and atom contract tests.

mod common;

use common::{eval, eval_ok, list, num, standard};
use sutra_check::errors::ErrorKind;
use sutra_check::runtime::eval::DEFAULT_MAX_DEPTH;
use sutra_check::runtime::path::Path;
use sutra_check::{evaluate_source, Value};

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

// ---
// Arithmetic and comparison
// ---

#[test]
fn arithmetic() {
    assert_eq!(eval_ok("(+ 1 2 3)"), num(6.0));
    assert_eq!(eval_ok("(- 5)"), num(-5.0));
    assert_eq!(eval_ok("(/ 10 4)"), num(2.5));
    assert_eq!(eval_ok("(mod -1 3)"), num(2.0));
    assert_eq!(eval_ok("(pow 2 10)"), num(1024.0));
    assert_eq!(eval_ok("(max 3 9 4)"), num(9.0));
}

#[test]
fn division_by_zero_is_an_error() {
    let err = eval("(/ 1 0)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
}

#[test]
fn arithmetic_rejects_strings() {
    let err = eval("(+ 1 \"2\")").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn comparisons_chain() {
    assert_eq!(eval_ok("(< 1 2 3)"), Value::Bool(true));
    assert_eq!(eval_ok("(< 1 3 2)"), Value::Bool(false));
    assert_eq!(eval_ok("(eq? '(1 (2)) (list 1 (list 2)))"), Value::Bool(true));
    assert_eq!(eval_ok("(gte? \"b\" \"a\")"), Value::Bool(true));
}

// ---
// Special forms
// ---

#[test]
fn truthiness() {
    assert_eq!(eval_ok("(if 0 'yes 'no)"), string("no"));
    assert_eq!(eval_ok("(if '() 'yes 'no)"), string("no"));
    assert_eq!(eval_ok("(if \"\" 'yes 'no)"), string("no"));
    assert_eq!(eval_ok("(if '(0) 'yes 'no)"), string("yes"));
    assert_eq!(eval_ok("(if false 1)"), Value::Nil);
}

#[test]
fn cond_picks_first_truthy_clause() {
    let program = r#"
        (define (sign n)
          (cond ((< n 0) -1)
                ((= n 0) 0)
                (else 1)))
        (list (sign -4) (sign 0) (sign 9))
    "#;
    assert_eq!(eval_ok(program), list(vec![num(-1.0), num(0.0), num(1.0)]));
}

#[test]
fn and_or_short_circuit() {
    assert_eq!(eval_ok("(and 1 false (error \"unreached\"))"), Value::Bool(false));
    assert_eq!(eval_ok("(or nil 7 (error \"unreached\"))"), num(7.0));
}

#[test]
fn let_bindings_are_sequential() {
    assert_eq!(eval_ok("(let ((a 2) (b (* a 3))) (+ a b))"), num(8.0));
}

#[test]
fn lambdas_close_over_their_environment() {
    let program = r#"
        (define (adder n) (lambda (x) (+ x n)))
        (define add5 (adder 5))
        (add5 10)
    "#;
    assert_eq!(eval_ok(program), num(15.0));
}

#[test]
fn mutual_recursion_through_globals() {
    let program = r#"
        (define (even? n) (if (= n 0) true (odd? (- n 1))))
        (define (odd? n) (if (= n 0) false (even? (- n 1))))
        (list (even? 10) (odd? 7))
    "#;
    assert_eq!(eval_ok(program), list(vec![Value::Bool(true), Value::Bool(true)]));
}

const COUNTDOWN: &str = "(define (down n) (if (<= n 0) 0 (down (- n 1))))";

#[test]
fn default_depth_fits_the_test_thread_stack() {
    let below = DEFAULT_MAX_DEPTH - 8;
    assert_eq!(eval_ok(&format!("{COUNTDOWN} (down {below})")), num(0.0));

    let err = eval(&format!("{COUNTDOWN} (down 500)")).unwrap_err();
    assert!(
        matches!(err.kind, ErrorKind::RecursionLimit { limit } if limit == DEFAULT_MAX_DEPTH)
    );
}

#[test]
fn error_form_raises_user_error() {
    let err = eval("(error \"expected\" 3 \"items\")").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UserError { ref message } if message == "expected 3 items"));
}

#[test]
fn special_forms_are_not_values() {
    let err = eval("(map if '(1))").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidOperation { .. }));
}

#[test]
fn calling_a_number_is_a_type_error() {
    let err = eval("(1 2)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn undefined_symbol() {
    let err = eval("(nope 1)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol { ref symbol } if symbol == "nope"));
    assert_eq!(err.diagnostic_info.error_code, "sutra::execution::undefined_symbol");
}

#[test]
fn lambda_arity_is_checked() {
    let err = eval("((lambda (a b) a) 1)").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { actual: 1, .. }));
}

// ---
// Collections and strings
// ---

#[test]
fn list_operations() {
    assert_eq!(eval_ok("(len '(1 2 3))"), num(3.0));
    assert_eq!(eval_ok("(first '())"), Value::Nil);
    assert_eq!(eval_ok("(rest '(1 2 3))"), list(vec![num(2.0), num(3.0)]));
    assert_eq!(eval_ok("(cons 0 '(1))"), list(vec![num(0.0), num(1.0)]));
    assert_eq!(eval_ok("(reverse (range 3))"), list(vec![num(2.0), num(1.0), num(0.0)]));
    assert_eq!(eval_ok("(sort '(3 1 2))"), list(vec![num(1.0), num(2.0), num(3.0)]));
    assert_eq!(eval_ok("(nth '(4 5 6) 1)"), num(5.0));
}

#[test]
fn range_counts_steps_instead_of_accumulating() {
    assert_eq!(eval_ok("(range 5 0 -2)"), list(vec![num(5.0), num(3.0), num(1.0)]));
    assert_eq!(eval_ok("(range 0 1 0.25)"), list(vec![num(0.0), num(0.25), num(0.5), num(0.75)]));
    assert_eq!(eval_ok("(range 3 1)"), list(vec![]));
    // Near 2^53 adding 1 no longer changes the float.
    assert_eq!(eval_ok("(len (range 9007199254740992 9007199254740994))"), num(2.0));
}

#[test]
fn range_rejects_unbounded_requests() {
    for src in ["(range 0 1 0)", "(range 0 1e300)", "(range 0 1 1e-300)"] {
        let err = eval(src).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidOperation { .. }), "{src}");
    }
}

#[test]
fn higher_order_atoms_take_natives_and_lambdas() {
    assert_eq!(
        eval_ok("(map + '(1 2) '(10 20 30))"),
        list(vec![num(11.0), num(22.0)])
    );
    assert_eq!(
        eval_ok("(filter (lambda (n) (> n 1)) '(0 1 2 3))"),
        list(vec![num(2.0), num(3.0)])
    );
    assert_eq!(eval_ok("(fold * 1 '(1 2 3 4))"), num(24.0));
    assert_eq!(eval_ok("(apply + 1 '(2 3))"), num(6.0));
}

#[test]
fn spread_splices_arguments() {
    assert_eq!(eval_ok("(define xs '(1 2 3)) (+ ...xs)"), num(6.0));
}

#[test]
fn maps() {
    assert_eq!(eval_ok("(map/get (map/new \"a\" 1) \"a\")"), num(1.0));
    assert_eq!(eval_ok("(map/get (map/new) \"a\" 0)"), num(0.0));
    assert_eq!(
        eval_ok("(map/keys (map/set (map/new \"b\" 1) \"a\" 2))"),
        list(vec![string("a"), string("b")])
    );
}

#[test]
fn strings() {
    assert_eq!(eval_ok("(str \"n=\" 3)"), string("n=3"));
    assert_eq!(eval_ok("(upper \"abc\")"), string("ABC"));
    assert_eq!(
        eval_ok("(split \"a,b\" \",\")"),
        list(vec![string("a"), string("b")])
    );
    assert_eq!(eval_ok("(join '(\"a\" \"b\") \"-\")"), string("a-b"));
}

// ---
// Prelude and world state
// ---

#[test]
fn prelude_helpers() {
    assert_eq!(eval_ok("(sum '(1 2 3))"), num(6.0));
    assert_eq!(eval_ok("(product '(2 3))"), num(6.0));
    assert_eq!(eval_ok("(count (lambda (x) (> x 1)) '(1 2 3))"), num(2.0));
    assert_eq!(
        eval_ok("(zip '(1 2) '(a b))"),
        list(vec![
            list(vec![num(1.0), string("a")]),
            list(vec![num(2.0), string("b")])
        ])
    );
}

#[test]
fn world_paths() {
    assert_eq!(eval_ok("(set! stats.calls 2) (inc! stats.calls) (get stats.calls)"), num(3.0));
    assert_eq!(eval_ok("(exists? stats.calls)"), Value::Bool(false));
    assert_eq!(eval_ok("(dec! fresh)"), num(-1.0));
    assert_eq!(eval_ok("(set! a.b 1) (del! a.b) (get a.b)"), Value::Nil);
}

#[test]
fn evaluation_does_not_touch_the_template() {
    let (atoms, world) = standard();
    evaluate_source("(set! touched true)", &world, &atoms).unwrap();
    assert!(world.get(&Path::single("touched")).is_none());
}

#[test]
fn seeded_worlds_draw_the_same_numbers() {
    let (atoms, world) = standard();
    let first = evaluate_source("(list (rand 100) (rand 100))", &world, &atoms).unwrap();
    let second = evaluate_source("(list (rand 100) (rand 100))", &world, &atoms).unwrap();
    assert_eq!(first, second);
}
