//! World state atoms
//!
//! Read and modify the ambient global namespace, a nested key-value store
//! addressed by dot-separated paths. Each test case runs against its own copy
//! of this store, so writes made here never reach the next case.
//!
//! ## Atoms Provided
//!
//! - **State Operations**: `set!`, `get`, `del!`
//! - **State Queries**: `exists?`
//! - **Arithmetic Updates**: `inc!`, `dec!`
//!
//! These are special forms: a bare symbol or path in the first position names
//! the location and is not evaluated. Any other expression is evaluated and
//! must produce a path or a dotted string.

use crate::ast::value::Value;
use crate::ast::{AstNode, Expr, Span};
use crate::atoms::helpers::{validate_special_form_arity, ExtractValue};
use crate::atoms::{AtomRegistry, LazyFn};
use crate::errors::{ErrorReporting, SutraError};
use crate::runtime::eval::{evaluate_ast_node, EvaluationContext};
use crate::runtime::path::Path;

// ============================================================================
// CORE UTILITIES
// ============================================================================

fn resolve_path(node: &AstNode, context: &mut EvaluationContext) -> Result<Path, SutraError> {
    match &*node.value {
        Expr::Symbol(s, _) => Ok(Path::single(s.clone())),
        Expr::Path(p, _) => Ok(p.clone()),
        _ => {
            let value = evaluate_ast_node(node, context)?;
            value.extract(context, node.span)
        }
    }
}

fn apply_step(
    args: &[AstNode],
    context: &mut EvaluationContext,
    span: Span,
    step: f64,
) -> Result<Value, SutraError> {
    validate_special_form_arity(args, 1, context, span)?;
    let path = resolve_path(&args[0], context)?;
    let current = context.world.borrow().get(&path).cloned();

    let new_value = match current {
        None | Some(Value::Nil) => Value::Number(step),
        Some(Value::Number(n)) => Value::Number(n + step),
        Some(other) => {
            return Err(context.type_mismatch(
                "Number",
                other.type_name(),
                context.span_for_node(&args[0]),
            ))
        }
    };

    context.world.borrow_mut().set(&path, new_value.clone());
    Ok(new_value)
}

// ============================================================================
// WORLD STATE ATOMS
// ============================================================================

/// Sets a value at a path in the world state and returns it.
/// `(set! <path> <value>)`
pub const ATOM_SET: LazyFn = |args, context, span| {
    validate_special_form_arity(args, 2, context, span)?;
    let path = resolve_path(&args[0], context)?;
    let value = evaluate_ast_node(&args[1], context)?;
    context.world.borrow_mut().set(&path, value.clone());
    Ok(value)
};

/// Gets a value at a path in the world state, nil when absent.
/// `(get <path>)`
pub const ATOM_GET: LazyFn = |args, context, span| {
    validate_special_form_arity(args, 1, context, span)?;
    let path = resolve_path(&args[0], context)?;
    let value = context.world.borrow().get(&path).cloned();
    Ok(value.unwrap_or_default())
};

/// Deletes a value at a path in the world state.
/// `(del! <path>)`
pub const ATOM_DEL: LazyFn = |args, context, span| {
    validate_special_form_arity(args, 1, context, span)?;
    let path = resolve_path(&args[0], context)?;
    context.world.borrow_mut().del(&path);
    Ok(Value::Nil)
};

/// Returns true if a path exists in the world state.
/// `(exists? <path>)`
pub const ATOM_EXISTS: LazyFn = |args, context, span| {
    validate_special_form_arity(args, 1, context, span)?;
    let path = resolve_path(&args[0], context)?;
    let exists = context.world.borrow().state.exists(&path);
    Ok(Value::Bool(exists))
};

/// Adds one to the number at a path; an unset path counts from zero.
/// `(inc! <path>)`
pub const ATOM_INC: LazyFn = |args, context, span| apply_step(args, context, span, 1.0);

/// Subtracts one from the number at a path; an unset path counts from zero.
/// `(dec! <path>)`
pub const ATOM_DEC: LazyFn = |args, context, span| apply_step(args, context, span, -1.0);

pub fn register_world_atoms(registry: &mut AtomRegistry) {
    registry.register_special_form("set!", ATOM_SET);
    registry.register_special_form("get", ATOM_GET);
    registry.register_special_form("del!", ATOM_DEL);
    registry.register_special_form("exists?", ATOM_EXISTS);
    registry.register_special_form("inc!", ATOM_INC);
    registry.register_special_form("dec!", ATOM_DEC);
}
