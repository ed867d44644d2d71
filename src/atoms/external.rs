//! External interface atoms
//!
//! These atoms break the pure functional model by writing output or drawing
//! from the world's PRNG.
//!
//! ## Atoms Provided
//!
//! - **I/O**: `print`, `display`
//! - **Randomness**: `rand`

use crate::ast::value::Value;
use crate::atoms::helpers::{check_arity, check_arity_range, ExtractValue};
use crate::atoms::{AtomRegistry, EagerFn};
use crate::errors::ErrorReporting;

// ============================================================================
// I/O OPERATIONS
// ============================================================================

/// Emits its arguments, space separated, with strings unquoted.
///
/// Usage: (print <value> ...)
///
/// Example:
///   (print "total:" 3) ; emits `total: 3`
pub const ATOM_PRINT: EagerFn = |args, context, span| {
    let text = args
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(" ");
    context.output.emit(&text, Some(&span));
    Ok(Value::Nil)
};

/// Emits the printed representation of one value, strings quoted.
///
/// Usage: (display <value>)
pub const ATOM_DISPLAY: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    context.output.emit(&args[0].to_string(), Some(&span));
    Ok(Value::Nil)
};

// ============================================================================
// RANDOMNESS OPERATIONS
// ============================================================================

/// Draws from the world's PRNG.
///
/// Usage: (rand) | (rand <n>)
///   - no argument: a float in [0, 1)
///   - `n`: an integer in [0, n)
pub const ATOM_RAND: EagerFn = |args, context, span| {
    check_arity_range(args, 0, 1, context, span)?;
    let sample = context.world.borrow_mut().next_f64();
    let Some(bound) = args.first() else {
        return Ok(Value::Number(sample));
    };
    let bound: f64 = bound.extract(context, span)?;
    if bound <= 0.0 {
        return Err(context.invalid_operation(
            "rand",
            "non-positive bound",
            context.span_for_span(span),
        ));
    }
    Ok(Value::Number((sample * bound.floor()).floor()))
};

pub fn register_external_atoms(registry: &mut AtomRegistry) {
    registry.register_eager("print", ATOM_PRINT);
    registry.register_eager("display", ATOM_DISPLAY);
    registry.register_eager("rand", ATOM_RAND);
}
