//! # Atom Helper Infrastructure
//!
//! Arity checks and typed argument extraction shared by every atom module.

use im::OrdMap;

use crate::ast::value::Value;
use crate::ast::{AstNode, Span};
use crate::errors::{ErrorReporting, SutraError};
use crate::runtime::eval::EvaluationContext;
use crate::runtime::path::Path;

/// Convenient type alias for atom return values.
pub type AtomResult = Result<Value, SutraError>;

// ============================================================================
// TRAIT-BASED TYPE EXTRACTION
// ============================================================================

/// Extracts a typed Rust value from a `Value`, reporting a type mismatch at
/// `span` otherwise.
pub trait ExtractValue<T> {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<T, SutraError>;
}

impl ExtractValue<f64> for Value {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<f64, SutraError> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(mismatch(context, "Number", self, span)),
        }
    }
}

impl ExtractValue<bool> for Value {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<bool, SutraError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch(context, "Bool", self, span)),
        }
    }
}

impl ExtractValue<String> for Value {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<String, SutraError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch(context, "String", self, span)),
        }
    }
}

impl ExtractValue<Vec<Value>> for Value {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<Vec<Value>, SutraError> {
        match self {
            Value::List(items) => Ok(items.clone()),
            _ => Err(mismatch(context, "List", self, span)),
        }
    }
}

impl ExtractValue<OrdMap<String, Value>> for Value {
    fn extract(
        &self,
        context: &EvaluationContext,
        span: Span,
    ) -> Result<OrdMap<String, Value>, SutraError> {
        match self {
            Value::Map(map) => Ok(map.clone()),
            _ => Err(mismatch(context, "Map", self, span)),
        }
    }
}

/// Paths may be written as path literals (`stats.calls`) or as strings
/// (`"stats.calls"`, `'counter`).
impl ExtractValue<Path> for Value {
    fn extract(&self, context: &EvaluationContext, span: Span) -> Result<Path, SutraError> {
        match self {
            Value::Path(path) => Ok(path.clone()),
            Value::String(text) => {
                Path::parse(text).ok_or_else(|| mismatch(context, "Path", self, span))
            }
            _ => Err(mismatch(context, "Path", self, span)),
        }
    }
}

fn mismatch(context: &EvaluationContext, expected: &str, found: &Value, span: Span) -> SutraError {
    context.type_mismatch(expected, found.type_name(), context.span_for_span(span))
}

/// Extracts a non-negative integral number, for indices and counts.
pub fn extract_index(
    value: &Value,
    context: &EvaluationContext,
    span: Span,
) -> Result<usize, SutraError> {
    let n: f64 = value.extract(context, span)?;
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(context.type_mismatch(
            "non-negative integer",
            &Value::Number(n).to_string(),
            context.span_for_span(span),
        ));
    }
    Ok(n as usize)
}

// ============================================================================
// ARITY CHECKS
// ============================================================================

pub fn check_arity(
    args: &[Value],
    expected: usize,
    context: &EvaluationContext,
    span: Span,
) -> Result<(), SutraError> {
    if args.len() != expected {
        return Err(context.arity_mismatch(
            &expected.to_string(),
            args.len(),
            context.span_for_span(span),
        ));
    }
    Ok(())
}

pub fn check_min_arity(
    args: &[Value],
    min: usize,
    context: &EvaluationContext,
    span: Span,
) -> Result<(), SutraError> {
    if args.len() < min {
        return Err(context.arity_mismatch(
            &format!("at least {}", min),
            args.len(),
            context.span_for_span(span),
        ));
    }
    Ok(())
}

pub fn check_arity_range(
    args: &[Value],
    min: usize,
    max: usize,
    context: &EvaluationContext,
    span: Span,
) -> Result<(), SutraError> {
    if args.len() < min || args.len() > max {
        return Err(context.arity_mismatch(
            &format!("{} to {}", min, max),
            args.len(),
            context.span_for_span(span),
        ));
    }
    Ok(())
}

pub fn validate_special_form_arity(
    args: &[AstNode],
    expected: usize,
    context: &EvaluationContext,
    span: Span,
) -> Result<(), SutraError> {
    if args.len() != expected {
        return Err(context.arity_mismatch(
            &expected.to_string(),
            args.len(),
            context.span_for_span(span),
        ));
    }
    Ok(())
}

pub fn validate_special_form_min_arity(
    args: &[AstNode],
    min: usize,
    context: &EvaluationContext,
    span: Span,
) -> Result<(), SutraError> {
    if args.len() < min {
        return Err(context.arity_mismatch(
            &format!("at least {}", min),
            args.len(),
            context.span_for_span(span),
        ));
    }
    Ok(())
}
