//! Core evaluation engine: AST nodes in, runtime values out.
//!
//! ## Calling Conventions
//!
//! A list whose head names a special form is handed to that form unevaluated.
//! Any other list evaluates its head to a callable (`Lambda` or `Native`),
//! evaluates the arguments left to right, splices `...spread` arguments, and
//! applies the callee.
//!
//! ## Name Resolution
//!
//! Symbols are looked up innermost-first through the lexical frames, then the
//! execution scope (top-level definitions of the running program), then the
//! world state (ambient globals such as the prelude), and finally the atom
//! registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use miette::SourceSpan;

use crate::ast::value::{Lambda, Value};
use crate::ast::{AstNode, Expr, Span};
use crate::atoms::{Atom, AtomRegistry, SharedOutput};
use crate::errors::{
    build_error, to_source_span, ErrorKind, ErrorReporting, Phase, SourceContext, SutraError,
};
use crate::runtime::path::Path;
use crate::runtime::scope::ExecutionScope;
use crate::runtime::world::World;

/// Call depth used when no explicit limit is configured. Low enough to stay
/// within a default 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// One lexical frame: parameters and `let`/inner `define` bindings.
pub type Frame = HashMap<String, Value>;

// ============================================================================
// CORE DATA STRUCTURES: Evaluation Context
// ============================================================================

/// The context for a single evaluation, passed to atoms and all evaluation
/// functions.
pub struct EvaluationContext<'a> {
    pub world: Rc<RefCell<World>>,
    pub scope: Rc<RefCell<ExecutionScope>>,
    pub lexical_env: Vec<Frame>,
    pub atoms: &'a AtomRegistry,
    pub output: SharedOutput,
    pub source: SourceContext,
    pub phase: Phase,
    pub max_depth: usize,
    pub depth: usize,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        world: Rc<RefCell<World>>,
        scope: Rc<RefCell<ExecutionScope>>,
        atoms: &'a AtomRegistry,
        output: SharedOutput,
        source: SourceContext,
        phase: Phase,
    ) -> Self {
        Self {
            world,
            scope,
            lexical_env: Vec::new(),
            atoms,
            output,
            source,
            phase,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // ------------------------------------------------------------------------
    // Lexical environment
    // ------------------------------------------------------------------------

    pub fn get_lexical_var(&self, name: &str) -> Option<&Value> {
        self.lexical_env.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn set_lexical_var(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.lexical_env.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    /// Binds `name` in the innermost lexical frame, or in the execution scope
    /// when evaluating at the top level.
    pub fn define_var(&mut self, name: &str, value: Value) {
        if self.lexical_env.is_empty() {
            self.scope.borrow_mut().set(name, value);
        } else {
            self.set_lexical_var(name, value);
        }
    }

    /// Flattened copy of the lexical frames, inner bindings winning.
    pub fn capture_lexical_env(&self) -> Frame {
        let mut captured = Frame::new();
        for frame in &self.lexical_env {
            for (name, value) in frame {
                captured.insert(name.clone(), value.clone());
            }
        }
        captured
    }

    /// Child context sharing world, scope and output, with one extra frame.
    pub fn clone_with_new_lexical_frame(&self) -> EvaluationContext<'a> {
        let mut lexical_env = self.lexical_env.clone();
        lexical_env.push(Frame::new());
        EvaluationContext {
            world: Rc::clone(&self.world),
            scope: Rc::clone(&self.scope),
            lexical_env,
            atoms: self.atoms,
            output: self.output.clone(),
            source: self.source.clone(),
            phase: self.phase,
            max_depth: self.max_depth,
            depth: self.depth,
        }
    }

    // ------------------------------------------------------------------------
    // Symbol resolution
    // ------------------------------------------------------------------------

    pub fn resolve_symbol(&self, name: &str, span: Span) -> Result<Value, SutraError> {
        if let Some(value) = self.get_lexical_var(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.scope.borrow().get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.world.borrow().get(&Path::single(name)) {
            return Ok(value.clone());
        }
        if let Some(native) = self.atoms.native(name) {
            return Ok(Value::Native(native));
        }
        if self.atoms.is_special_form(name) {
            return Err(self.invalid_operation(
                "use as a value",
                &format!("special form '{}'", name),
                self.span_for_span(span),
            ));
        }
        Err(self.undefined_symbol(name, self.span_for_span(span)))
    }

    // ------------------------------------------------------------------------
    // Application
    // ------------------------------------------------------------------------

    /// Applies a callable value to already evaluated arguments.
    pub fn apply(&mut self, callee: &Value, args: &[Value], span: Span) -> Result<Value, SutraError> {
        match callee {
            Value::Native(native) => (native.func)(args, self, span),
            Value::Lambda(lambda) => call_lambda(lambda, args, self, span),
            other => Err(self.type_mismatch(
                "callable",
                other.type_name(),
                self.span_for_span(span),
            )),
        }
    }

    // ------------------------------------------------------------------------
    // Spans
    // ------------------------------------------------------------------------

    pub fn span_for_node(&self, node: &AstNode) -> SourceSpan {
        to_source_span(node.span)
    }

    pub fn span_for_span(&self, span: Span) -> SourceSpan {
        to_source_span(span)
    }
}

impl ErrorReporting for EvaluationContext<'_> {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> SutraError {
        build_error(kind, &self.source, span, self.phase)
    }
}

// ============================================================================
// PUBLIC API: Expression Evaluation Interface
// ============================================================================

/// Evaluates a single AST node.
pub fn evaluate_ast_node(
    expr: &AstNode,
    context: &mut EvaluationContext,
) -> Result<Value, SutraError> {
    match &*expr.value {
        Expr::List(items, span) => evaluate_list(items, *span, context),
        Expr::Symbol(name, span) => context.resolve_symbol(name, *span),
        Expr::Path(path, _) => Ok(Value::Path(path.clone())),
        Expr::String(s, _) => Ok(Value::String(s.clone())),
        Expr::Number(n, _) => Ok(Value::Number(*n)),
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Nil(_) => Ok(Value::Nil),
        Expr::Quote(inner, _) => evaluate_quote(inner, context),
        Expr::Spread(_) => Err(context.invalid_operation(
            "spread",
            "expression outside of call position",
            context.span_for_node(expr),
        )),
    }
}

/// Evaluates a sequence of top-level forms, returning the last value (or
/// `nil` for an empty program).
pub fn evaluate_program(
    program: &[AstNode],
    context: &mut EvaluationContext,
) -> Result<Value, SutraError> {
    let mut last = Value::Nil;
    for form in program {
        last = evaluate_ast_node(form, context)?;
    }
    Ok(last)
}

/// Parses and evaluates `text` against a copy of `world` with a fresh scope
/// and no output.
///
/// # Examples
///
/// ```rust
/// use sutra_check::{evaluate_source, AtomRegistry, Value, World};
/// let atoms = AtomRegistry::standard();
/// let world = World::standard(&atoms, Some(0)).unwrap();
/// let value = evaluate_source("(define (double x) (* x 2)) (double 21)", &world, &atoms).unwrap();
/// assert_eq!(value, Value::Number(42.0));
/// ```
pub fn evaluate_source(
    text: &str,
    world: &World,
    atoms: &AtomRegistry,
) -> Result<Value, SutraError> {
    let source = SourceContext::from_file("eval", text);
    let program = crate::syntax::parse(&source, Phase::Execution)?;
    let mut context = EvaluationContext::new(
        Rc::new(RefCell::new(world.clone())),
        Rc::new(RefCell::new(ExecutionScope::new())),
        atoms,
        SharedOutput::default(),
        source,
        Phase::Execution,
    );
    evaluate_program(&program, &mut context)
}

// ============================================================================
// INTERNAL HELPERS: Expression-Specific Evaluation
// ============================================================================

fn evaluate_list(
    items: &[AstNode],
    span: Span,
    context: &mut EvaluationContext,
) -> Result<Value, SutraError> {
    let Some((head, tail)) = items.split_first() else {
        return Ok(Value::List(vec![]));
    };

    if let Expr::Symbol(name, _) = &*head.value {
        if let Some(Atom::SpecialForm(form)) = context.atoms.get(name) {
            return form(tail, context, span);
        }
    }

    let callee = evaluate_ast_node(head, context)?;
    if !callee.is_callable() {
        return Err(context.report(
            ErrorKind::TypeMismatch {
                expected: "callable in call position".into(),
                actual: callee.type_name().into(),
            },
            context.span_for_node(head),
        ));
    }
    let args = evaluate_call_args(tail, context)?;
    context.apply(&callee, &args, span)
}

/// Evaluates call arguments left to right, splicing `...spread` lists.
pub fn evaluate_call_args(
    args: &[AstNode],
    context: &mut EvaluationContext,
) -> Result<Vec<Value>, SutraError> {
    let mut values = Vec::with_capacity(args.len());

    for arg in args {
        let Expr::Spread(inner) = &*arg.value else {
            values.push(evaluate_ast_node(arg, context)?);
            continue;
        };

        match evaluate_ast_node(inner, context)? {
            Value::List(items) => values.extend(items),
            other => {
                return Err(context.type_mismatch(
                    "List for spread argument",
                    other.type_name(),
                    context.span_for_node(inner),
                ))
            }
        }
    }

    Ok(values)
}

/// Applies a lambda: binds parameters in a fresh frame on top of the captured
/// environment and evaluates the body one call level deeper.
pub fn call_lambda(
    lambda: &Lambda,
    args: &[Value],
    context: &mut EvaluationContext,
    span: Span,
) -> Result<Value, SutraError> {
    if !lambda.params.accepts(args.len()) {
        let err = context.arity_mismatch(
            &lambda.params.arity_label(),
            args.len(),
            context.span_for_span(span),
        );
        return Err(match &lambda.name {
            Some(name) => err.with_help(format!(
                "'{}' takes {} argument(s)",
                name,
                lambda.params.arity_label()
            )),
            None => err,
        });
    }
    if context.depth >= context.max_depth {
        return Err(context.report(
            ErrorKind::RecursionLimit {
                limit: context.max_depth,
            },
            context.span_for_span(span),
        ));
    }

    let mut frame = Frame::new();
    let fixed = lambda.params.required.len();
    for (name, value) in lambda.params.required.iter().zip(args) {
        frame.insert(name.clone(), value.clone());
    }
    if let Some(rest) = &lambda.params.rest {
        frame.insert(rest.clone(), Value::List(args[fixed..].to_vec()));
    }

    let mut call_context = EvaluationContext {
        world: Rc::clone(&context.world),
        scope: Rc::clone(&context.scope),
        lexical_env: vec![lambda.captured_env.clone(), frame],
        atoms: context.atoms,
        output: context.output.clone(),
        source: lambda.source.clone(),
        phase: context.phase,
        max_depth: context.max_depth,
        depth: context.depth + 1,
    };
    evaluate_ast_node(&lambda.body, &mut call_context)
}

/// Converts quoted syntax into data: symbols become strings, lists become lists.
pub fn evaluate_quote(inner: &AstNode, context: &EvaluationContext) -> Result<Value, SutraError> {
    match &*inner.value {
        Expr::Symbol(s, _) => Ok(Value::String(s.clone())),
        Expr::List(items, _) => items
            .iter()
            .map(|item| evaluate_quote(item, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Path(p, _) => Ok(Value::Path(p.clone())),
        Expr::String(s, _) => Ok(Value::String(s.clone())),
        Expr::Number(n, _) => Ok(Value::Number(*n)),
        Expr::Bool(b, _) => Ok(Value::Bool(*b)),
        Expr::Nil(_) => Ok(Value::Nil),
        Expr::Quote(quoted, _) => evaluate_quote(quoted, context),
        Expr::Spread(_) => Err(context.invalid_operation(
            "spread",
            "quoted expression",
            context.span_for_node(inner),
        )),
    }
}
