//! # Logic and Comparison
//!
//! `eq?` and `neq?` use structural equality, the same equality the harness
//! uses to compare a result with its expected value. Ordering comparisons
//! accept numbers or strings and chain across all arguments.

use std::cmp::Ordering;

use crate::ast::value::Value;
use crate::ast::Span;
use crate::atoms::helpers::{check_arity, check_min_arity, AtomResult};
use crate::atoms::{AtomRegistry, EagerFn};
use crate::errors::{ErrorReporting, SutraError};
use crate::runtime::eval::EvaluationContext;

/// Usage: (eq? <a> <b> ...), true when all arguments are equal.
pub const ATOM_EQ: EagerFn = |args, context, span| {
    check_min_arity(args, 2, context, span)?;
    Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
};

/// Usage: (neq? <a> <b>)
pub const ATOM_NEQ: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    Ok(Value::Bool(args[0] != args[1]))
};

/// Usage: (not <a>), negates truthiness.
pub const ATOM_NOT: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    Ok(Value::Bool(!args[0].is_truthy()))
};

pub const ATOM_GT: EagerFn =
    |args, context, span| chain(args, context, span, |o| o == Ordering::Greater);
pub const ATOM_LT: EagerFn =
    |args, context, span| chain(args, context, span, |o| o == Ordering::Less);
pub const ATOM_GTE: EagerFn =
    |args, context, span| chain(args, context, span, |o| o != Ordering::Less);
pub const ATOM_LTE: EagerFn =
    |args, context, span| chain(args, context, span, |o| o != Ordering::Greater);

/// Orders two numbers or two strings.
pub fn compare_values(
    a: &Value,
    b: &Value,
    context: &EvaluationContext,
    span: Span,
) -> Result<Ordering, SutraError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).ok_or_else(|| {
            context.invalid_operation("compare", "NaN", context.span_for_span(span))
        }),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Number(_), other) | (Value::String(_), other) => Err(context.type_mismatch(
            a.type_name(),
            other.type_name(),
            context.span_for_span(span),
        )),
        (other, _) => Err(context.type_mismatch(
            "Number or String",
            other.type_name(),
            context.span_for_span(span),
        )),
    }
}

fn chain(
    args: &[Value],
    context: &EvaluationContext,
    span: Span,
    holds: fn(Ordering) -> bool,
) -> AtomResult {
    check_min_arity(args, 2, context, span)?;
    for pair in args.windows(2) {
        if !holds(compare_values(&pair[0], &pair[1], context, span)?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn register_logic_atoms(registry: &mut AtomRegistry) {
    registry.register_eager("eq?", ATOM_EQ);
    registry.register_eager("=", ATOM_EQ);
    registry.register_eager("neq?", ATOM_NEQ);
    registry.register_eager("not", ATOM_NOT);
    registry.register_eager("gt?", ATOM_GT);
    registry.register_eager(">", ATOM_GT);
    registry.register_eager("lt?", ATOM_LT);
    registry.register_eager("<", ATOM_LT);
    registry.register_eager("gte?", ATOM_GTE);
    registry.register_eager(">=", ATOM_GTE);
    registry.register_eager("lte?", ATOM_LTE);
    registry.register_eager("<=", ATOM_LTE);
}
