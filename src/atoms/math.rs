//! # Mathematical Operations
//!
//! All atoms here are pure: they read their arguments and touch no state.
//!
//! ## Atoms Provided
//!
//! - **Arithmetic**: `+`, `-`, `*`, `/`, `mod`
//! - **Math Functions**: `abs`, `min`, `max`, `floor`, `ceil`, `round`, `sqrt`, `pow`

use crate::ast::value::Value;
use crate::ast::Span;
use crate::atoms::helpers::{check_arity, check_min_arity, AtomResult, ExtractValue};
use crate::atoms::{AtomRegistry, EagerFn};
use crate::errors::{ErrorKind, ErrorReporting, SutraError};
use crate::runtime::eval::EvaluationContext;

fn numbers(args: &[Value], context: &EvaluationContext, span: Span) -> Result<Vec<f64>, SutraError> {
    args.iter()
        .map(|arg| ExtractValue::<f64>::extract(arg, context, span))
        .collect()
}

fn division_by_zero(context: &EvaluationContext, span: Span) -> SutraError {
    context.report(ErrorKind::DivisionByZero, context.span_for_span(span))
}

// ============================================================================
// ARITHMETIC OPERATIONS
// ============================================================================

/// Adds numbers.
///
/// Usage: (+ <a> <b> ...)
///
/// Example:
///   (+ 1 2 3) ; => 6
pub const ATOM_ADD: EagerFn = |args, context, span| {
    Ok(Value::Number(numbers(args, context, span)?.iter().sum()))
};

/// Subtracts the remaining numbers from the first; negates a single number.
///
/// Usage: (- <a> <b> ...)
///
/// Example:
///   (- 5 2) ; => 3
///   (- 5)   ; => -5
pub const ATOM_SUB: EagerFn = |args, context, span| {
    check_min_arity(args, 1, context, span)?;
    let nums = numbers(args, context, span)?;
    if let [only] = nums.as_slice() {
        return Ok(Value::Number(-only));
    }
    Ok(Value::Number(nums[1..].iter().fold(nums[0], |acc, n| acc - n)))
};

/// Multiplies numbers.
///
/// Usage: (* <a> <b> ...)
pub const ATOM_MUL: EagerFn = |args, context, span| {
    Ok(Value::Number(numbers(args, context, span)?.iter().product()))
};

/// Divides the first number by the remaining ones; a single number gives its
/// reciprocal.
///
/// Usage: (/ <a> <b> ...)
///
/// Example:
///   (/ 10 4) ; => 2.5
pub const ATOM_DIV: EagerFn = |args, context, span| {
    check_min_arity(args, 1, context, span)?;
    let nums = numbers(args, context, span)?;
    let (first, rest) = match nums.as_slice() {
        [only] => (1.0, std::slice::from_ref(only)),
        [first, rest @ ..] => (*first, rest),
        [] => return Err(division_by_zero(context, span)),
    };
    let mut result = first;
    for divisor in rest {
        if *divisor == 0.0 {
            return Err(division_by_zero(context, span));
        }
        result /= divisor;
    }
    Ok(Value::Number(result))
};

/// Remainder of integer division, with the sign of the divisor.
///
/// Usage: (mod <a> <b>)
///
/// Example:
///   (mod 7 3)  ; => 1
///   (mod -1 3) ; => 2
pub const ATOM_MOD: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let a: f64 = args[0].extract(context, span)?;
    let b: f64 = args[1].extract(context, span)?;
    if b == 0.0 {
        return Err(division_by_zero(context, span));
    }
    let r = a % b;
    let r = if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r };
    Ok(Value::Number(r))
};

// ============================================================================
// MATH FUNCTIONS
// ============================================================================

fn unary(
    args: &[Value],
    context: &EvaluationContext,
    span: Span,
    op: fn(f64) -> f64,
) -> AtomResult {
    check_arity(args, 1, context, span)?;
    let n: f64 = args[0].extract(context, span)?;
    Ok(Value::Number(op(n)))
}

pub const ATOM_ABS: EagerFn = |args, context, span| unary(args, context, span, f64::abs);
pub const ATOM_FLOOR: EagerFn = |args, context, span| unary(args, context, span, f64::floor);
pub const ATOM_CEIL: EagerFn = |args, context, span| unary(args, context, span, f64::ceil);
pub const ATOM_ROUND: EagerFn = |args, context, span| unary(args, context, span, f64::round);

/// Square root; negative input is an invalid operation.
pub const ATOM_SQRT: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let n: f64 = args[0].extract(context, span)?;
    if n < 0.0 {
        return Err(context.invalid_operation("sqrt", "negative number", context.span_for_span(span)));
    }
    Ok(Value::Number(n.sqrt()))
};

/// Usage: (pow <base> <exponent>)
pub const ATOM_POW: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let base: f64 = args[0].extract(context, span)?;
    let exp: f64 = args[1].extract(context, span)?;
    Ok(Value::Number(base.powf(exp)))
};

/// Smallest of one or more numbers.
pub const ATOM_MIN: EagerFn = |args, context, span| {
    check_min_arity(args, 1, context, span)?;
    let nums = numbers(args, context, span)?;
    Ok(Value::Number(nums.into_iter().fold(f64::INFINITY, f64::min)))
};

/// Largest of one or more numbers.
pub const ATOM_MAX: EagerFn = |args, context, span| {
    check_min_arity(args, 1, context, span)?;
    let nums = numbers(args, context, span)?;
    Ok(Value::Number(nums.into_iter().fold(f64::NEG_INFINITY, f64::max)))
};

pub fn register_math_atoms(registry: &mut AtomRegistry) {
    registry.register_eager("+", ATOM_ADD);
    registry.register_eager("-", ATOM_SUB);
    registry.register_eager("*", ATOM_MUL);
    registry.register_eager("/", ATOM_DIV);
    registry.register_eager("mod", ATOM_MOD);
    registry.register_eager("abs", ATOM_ABS);
    registry.register_eager("floor", ATOM_FLOOR);
    registry.register_eager("ceil", ATOM_CEIL);
    registry.register_eager("round", ATOM_ROUND);
    registry.register_eager("sqrt", ATOM_SQRT);
    registry.register_eager("pow", ATOM_POW);
    registry.register_eager("min", ATOM_MIN);
    registry.register_eager("max", ATOM_MAX);
}
