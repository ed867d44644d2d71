//! # Special Forms
//!
//! Forms that receive their arguments unevaluated: binding (`define`, `let`,
//! `lambda`), control flow (`if`, `cond`, `and`, `or`, `do`), `quote` and
//! `error`.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use crate::ast::value::{Lambda, Value};
use crate::ast::{AstNode, Expr, ParamList, Span, Spanned};
use crate::atoms::helpers::{validate_special_form_arity, validate_special_form_min_arity};
use crate::atoms::{AtomRegistry, LazyFn};
use crate::errors::{ErrorKind, ErrorReporting, SutraError};
use crate::runtime::eval::{evaluate_ast_node, evaluate_quote, EvaluationContext};

// ============================================================================
// BINDING FORMS
// ============================================================================

/// Implements `(define name value)` and `(define (name params...) body...)`.
///
/// At the top level the binding lands in the execution scope; inside a
/// lambda or `let` body it lands in the innermost lexical frame.
pub const ATOM_DEFINE: LazyFn = |args, context, span| {
    validate_special_form_min_arity(args, 2, context, span)?;

    match &*args[0].value {
        Expr::Symbol(name, _) => {
            validate_special_form_arity(args, 2, context, span)?;
            let value = name_lambda(evaluate_ast_node(&args[1], context)?, name);
            context.define_var(name, value.clone());
            Ok(value)
        }
        Expr::List(items, list_span) => {
            let Some((name_node, param_nodes)) = items.split_first() else {
                return Err(context.missing_element(
                    "function name",
                    context.span_for_span(*list_span),
                ));
            };
            let Some(name) = name_node.value.as_symbol() else {
                return Err(context.type_mismatch(
                    "function name symbol",
                    name_node.value.type_name(),
                    context.span_for_node(name_node),
                ));
            };
            let params = build_param_list(param_nodes, *list_span, context)?;
            let lambda = make_lambda(Some(name.to_string()), params, &args[1..], span, context);
            context.define_var(name, lambda.clone());
            Ok(lambda)
        }
        other => Err(context.type_mismatch(
            "symbol or (name params...)",
            other.type_name(),
            context.span_for_node(&args[0]),
        )),
    }
};

/// Implements `(lambda (params...) body...)`.
pub const ATOM_LAMBDA: LazyFn = |args, context, span| {
    validate_special_form_min_arity(args, 2, context, span)?;
    let Expr::List(param_nodes, params_span) = &*args[0].value else {
        return Err(context.report(
            ErrorKind::InvalidOperation {
                operation: "lambda".to_string(),
                operand_type: "first argument must be a parameter list".to_string(),
            },
            context.span_for_node(&args[0]),
        ));
    };
    let params = build_param_list(param_nodes, *params_span, context)?;
    Ok(make_lambda(None, params, &args[1..], span, context))
};

/// Implements `(let ((name value)...) body...)`. Bindings are evaluated in
/// order and each one is visible to the next.
pub const ATOM_LET: LazyFn = |args, context, span| {
    validate_special_form_min_arity(args, 2, context, span)?;
    let Expr::List(bindings, _) = &*args[0].value else {
        return Err(context.report(
            ErrorKind::InvalidOperation {
                operation: "let".to_string(),
                operand_type: "first argument must be a list of bindings".to_string(),
            },
            context.span_for_node(&args[0]),
        ));
    };

    let mut let_context = context.clone_with_new_lexical_frame();

    for pair in bindings {
        let (name, value_expr) = match &*pair.value {
            Expr::List(items, _) if items.len() == 2 => match items[0].value.as_symbol() {
                Some(name) => (name, &items[1]),
                None => {
                    return Err(context.type_mismatch(
                        "symbol",
                        items[0].value.type_name(),
                        context.span_for_node(&items[0]),
                    ))
                }
            },
            _ => {
                return Err(context.report(
                    ErrorKind::InvalidOperation {
                        operation: "let".to_string(),
                        operand_type: "each binding must be a (name value) pair".to_string(),
                    },
                    context.span_for_node(pair),
                ))
            }
        };
        let value = name_lambda(evaluate_ast_node(value_expr, &mut let_context)?, name);
        let_context.set_lexical_var(name, value);
    }

    evaluate_sequence(&args[1..], &mut let_context)
};

// ============================================================================
// CONTROL FLOW
// ============================================================================

/// Implements `(if condition then else?)`; a missing else branch yields nil.
pub const ATOM_IF: LazyFn = |args, context, span| {
    if args.len() != 2 && args.len() != 3 {
        return Err(context.arity_mismatch("2 or 3", args.len(), context.span_for_span(span)));
    }
    if evaluate_ast_node(&args[0], context)?.is_truthy() {
        evaluate_ast_node(&args[1], context)
    } else if let Some(else_branch) = args.get(2) {
        evaluate_ast_node(else_branch, context)
    } else {
        Ok(Value::Nil)
    }
};

/// Implements `(cond (test expr...)... (else expr...))`.
pub const ATOM_COND: LazyFn = |args, context, _span| {
    for clause_node in args {
        let Expr::List(clause, _) = &*clause_node.value else {
            return Err(context.report(
                ErrorKind::InvalidOperation {
                    operation: "cond".to_string(),
                    operand_type: "each clause must be a list".to_string(),
                },
                context.span_for_node(clause_node),
            ));
        };

        let Some((condition, body)) = clause.split_first() else {
            continue;
        };

        let is_else = condition.value.as_symbol() == Some("else");
        if is_else || evaluate_ast_node(condition, context)?.is_truthy() {
            if body.is_empty() {
                return Ok(Value::Bool(true));
            }
            return evaluate_sequence(body, context);
        }
    }

    Ok(Value::Nil)
};

/// Implements `(and ...)` with short-circuiting.
pub const ATOM_AND: LazyFn = |args, context, _span| {
    let mut last_val = Value::Bool(true);
    for arg in args {
        let val = evaluate_ast_node(arg, context)?;
        if !val.is_truthy() {
            return Ok(Value::Bool(false));
        }
        last_val = val;
    }
    Ok(last_val)
};

/// Implements `(or ...)` with short-circuiting.
pub const ATOM_OR: LazyFn = |args, context, _span| {
    for arg in args {
        let val = evaluate_ast_node(arg, context)?;
        if val.is_truthy() {
            return Ok(val);
        }
    }
    Ok(Value::Bool(false))
};

/// Implements `(do ...)`: evaluates each form, returns the last value.
pub const ATOM_DO: LazyFn = |args, context, _span| evaluate_sequence(args, context);

/// Implements `(quote expr)`, the long form of `'expr`.
pub const ATOM_QUOTE: LazyFn = |args, context, span| {
    validate_special_form_arity(args, 1, context, span)?;
    evaluate_quote(&args[0], context)
};

/// Implements `(error message...)`: raises a user error whose message is the
/// arguments joined by spaces.
pub const ATOM_ERROR: LazyFn = |args, context, span| {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(evaluate_ast_node(arg, context)?.to_display_string());
    }
    Err(context.report(
        ErrorKind::UserError {
            message: parts.join(" "),
        },
        context.span_for_span(span),
    ))
};

// ============================================================================
// HELPERS
// ============================================================================

fn evaluate_sequence(
    forms: &[AstNode],
    context: &mut EvaluationContext,
) -> Result<Value, SutraError> {
    let mut last = Value::Nil;
    for form in forms {
        last = evaluate_ast_node(form, context)?;
    }
    Ok(last)
}

/// Gives an anonymous lambda the name it is being bound to.
fn name_lambda(value: Value, name: &str) -> Value {
    match value {
        Value::Lambda(lambda) if lambda.name.is_none() => Value::Lambda(Rc::new(Lambda {
            name: Some(name.to_string()),
            ..(*lambda).clone()
        })),
        other => other,
    }
}

fn make_lambda(
    name: Option<String>,
    params: ParamList,
    body: &[AstNode],
    span: Span,
    context: &EvaluationContext,
) -> Value {
    Value::Lambda(Rc::new(Lambda {
        name,
        params,
        body: wrap_in_do(body, span),
        captured_env: context.capture_lexical_env(),
        source: context.source.clone(),
    }))
}

/// Wraps multiple body forms in a `(do ...)` form.
fn wrap_in_do(body: &[AstNode], span: Span) -> AstNode {
    if let [single] = body {
        return single.clone();
    }
    let do_symbol = Spanned {
        value: Arc::new(Expr::Symbol("do".to_string(), span)),
        span,
    };
    let items = std::iter::once(do_symbol).chain(body.iter().cloned()).collect();
    Spanned {
        value: Arc::new(Expr::List(items, span)),
        span,
    }
}

/// Reads `(a b ...rest)` into a parameter list. The rest parameter must come
/// last and names may not repeat.
fn build_param_list(
    items: &[AstNode],
    span: Span,
    context: &EvaluationContext,
) -> Result<ParamList, SutraError> {
    let mut required = Vec::new();
    let mut rest = None;
    let mut seen = HashSet::new();

    for item in items {
        if rest.is_some() {
            return Err(context.report(
                ErrorKind::MalformedConstruct {
                    construct: "parameter list: rest parameter must be last".to_string(),
                },
                context.span_for_node(item),
            ));
        }
        let name = match &*item.value {
            Expr::Symbol(name, _) => name.as_str(),
            Expr::Spread(inner) => match inner.value.as_symbol() {
                Some(name) => name,
                None => {
                    return Err(context.type_mismatch(
                        "rest parameter symbol",
                        inner.value.type_name(),
                        context.span_for_node(inner),
                    ))
                }
            },
            other => {
                return Err(context.type_mismatch(
                    "parameter symbol",
                    other.type_name(),
                    context.span_for_node(item),
                ))
            }
        };
        if !seen.insert(name.to_string()) {
            return Err(context.report(
                ErrorKind::MalformedConstruct {
                    construct: format!("parameter list: duplicate parameter '{}'", name),
                },
                context.span_for_node(item),
            ));
        }
        if matches!(&*item.value, Expr::Spread(_)) {
            rest = Some(name.to_string());
        } else {
            required.push(name.to_string());
        }
    }

    Ok(ParamList {
        required,
        rest,
        span,
    })
}

pub fn register_special_forms(registry: &mut AtomRegistry) {
    registry.register_special_form("define", ATOM_DEFINE);
    registry.register_special_form("lambda", ATOM_LAMBDA);
    registry.register_special_form("let", ATOM_LET);
    registry.register_special_form("if", ATOM_IF);
    registry.register_special_form("cond", ATOM_COND);
    registry.register_special_form("and", ATOM_AND);
    registry.register_special_form("or", ATOM_OR);
    registry.register_special_form("do", ATOM_DO);
    registry.register_special_form("quote", ATOM_QUOTE);
    registry.register_special_form("error", ATOM_ERROR);
}
