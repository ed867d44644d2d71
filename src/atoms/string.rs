//! # String Operations
//!
//! - **Conversion**: `str` renders any values as text
//! - **Concatenation**: `str+` joins strings only
//! - **Case**: `upper`, `lower`
//! - **Splitting**: `split`, `join`

use crate::ast::value::Value;
use crate::atoms::helpers::{check_arity, ExtractValue};
use crate::atoms::{AtomRegistry, EagerFn};

/// Concatenates the display form of every argument.
///
/// Example:
///   (str "n=" 3) ; => "n=3"
pub const ATOM_STR: EagerFn = |args, _context, _span| {
    Ok(Value::String(
        args.iter().map(Value::to_display_string).collect(),
    ))
};

/// Concatenates strings; any other argument is a type error.
pub const ATOM_STR_PLUS: EagerFn = |args, context, span| {
    let mut result = String::new();
    for arg in args {
        let s: String = arg.extract(context, span)?;
        result.push_str(&s);
    }
    Ok(Value::String(result))
};

pub const ATOM_UPPER: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let s: String = args[0].extract(context, span)?;
    Ok(Value::String(s.to_uppercase()))
};

pub const ATOM_LOWER: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let s: String = args[0].extract(context, span)?;
    Ok(Value::String(s.to_lowercase()))
};

/// Usage: (split <string> <separator>)
///
/// An empty separator splits into characters.
pub const ATOM_SPLIT: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let s: String = args[0].extract(context, span)?;
    let sep: String = args[1].extract(context, span)?;
    let parts = if sep.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(sep.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect()
    };
    Ok(Value::List(parts))
};

/// Usage: (join <list> <separator>)
pub const ATOM_JOIN: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let items: Vec<Value> = args[0].extract(context, span)?;
    let sep: String = args[1].extract(context, span)?;
    let parts: Vec<String> = items.iter().map(Value::to_display_string).collect();
    Ok(Value::String(parts.join(&sep)))
};

pub fn register_string_atoms(registry: &mut AtomRegistry) {
    registry.register_eager("str", ATOM_STR);
    registry.register_eager("str+", ATOM_STR_PLUS);
    registry.register_eager("upper", ATOM_UPPER);
    registry.register_eager("lower", ATOM_LOWER);
    registry.register_eager("split", ATOM_SPLIT);
    registry.register_eager("join", ATOM_JOIN);
}
