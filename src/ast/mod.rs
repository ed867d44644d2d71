//! AST module for the Sutra language
//!
//! This module provides the core Abstract Syntax Tree types for representing
//! Sutra expressions with source location tracking. Both the candidate program
//! and the test-case expression of a payload are parsed into these types.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::runtime::path::Path;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source code.
///
/// All AST nodes carry a span for source tracking; enables better errors.
///
/// # Examples
///
/// ```rust
/// use sutra_check::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.start, 0);
/// assert_eq!(span.end, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Returns a span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

/// Canonical AST node type with shared ownership so the assembled unit can
/// be evaluated once per test case without being rebuilt.
pub type AstNode = Spanned<Arc<Expr>>;

/// The core AST node for Sutra expressions.
///
/// # Examples
///
/// ```rust
/// use sutra_check::ast::{Expr, Span};
/// let expr = Expr::Number(42.0, Span { start: 0, end: 2 });
/// assert_eq!(expr.span().start, 0);
/// assert_eq!(expr.span().end, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    List(Vec<AstNode>, Span),
    Symbol(String, Span),
    Path(Path, Span),
    String(String, Span),
    Number(f64, Span),
    Bool(bool, Span),
    Nil(Span),
    Quote(Box<AstNode>, Span),
    /// Spread argument (e.g., `...args`) for use in call position
    Spread(Box<AstNode>),
}

/// Parameter list for `lambda` and function-style `define`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamList {
    pub required: Vec<String>,
    pub rest: Option<String>,
    pub span: Span,
}

impl ParamList {
    /// Human-readable arity used by arity errors: `"2"` or `"at least 2"`.
    pub fn arity_label(&self) -> String {
        match self.rest {
            Some(_) => format!("at least {}", self.required.len()),
            None => self.required.len().to_string(),
        }
    }

    /// Returns true if `count` positional arguments satisfy this list.
    pub fn accepts(&self, count: usize) -> bool {
        match self.rest {
            Some(_) => count >= self.required.len(),
            None => count == self.required.len(),
        }
    }
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Expr {
    /// Returns the span of this expression.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::ast::{Expr, Span};
    /// let expr = Expr::Bool(true, Span { start: 1, end: 2 });
    /// assert_eq!(expr.span(), Span { start: 1, end: 2 });
    /// ```
    pub fn span(&self) -> Span {
        match self {
            Expr::List(_, span)
            | Expr::Symbol(_, span)
            | Expr::Path(_, span)
            | Expr::String(_, span)
            | Expr::Number(_, span)
            | Expr::Bool(_, span)
            | Expr::Nil(span)
            | Expr::Quote(_, span) => *span,
            Expr::Spread(expr) => expr.span,
        }
    }

    /// Returns the symbol name if this expression is a plain symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name, _) => Some(name),
            _ => None,
        }
    }

    /// Name of the expression variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::List(..) => "list",
            Expr::Symbol(..) => "symbol",
            Expr::Path(..) => "path",
            Expr::String(..) => "string",
            Expr::Number(..) => "number",
            Expr::Bool(..) => "boolean",
            Expr::Nil(..) => "nil",
            Expr::Quote(..) => "quote",
            Expr::Spread(..) => "spread",
        }
    }

    /// Pretty-prints the expression as source text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::ast::{Expr, Span};
    /// let expr = Expr::Symbol("foo".to_string(), Span::default());
    /// assert_eq!(expr.pretty(), "foo");
    /// let expr2 = Expr::Number(3.14, Span::default());
    /// assert_eq!(expr2.pretty(), "3.14");
    /// ```
    pub fn pretty(&self) -> String {
        match self {
            Expr::List(exprs, _) => Self::pretty_list(exprs),
            Expr::Symbol(s, _) => s.clone(),
            Expr::Path(p, _) => p.to_string(),
            Expr::String(s, _) => format!("{:?}", s),
            Expr::Number(n, _) => n.to_string(),
            Expr::Bool(b, _) => b.to_string(),
            Expr::Nil(_) => "nil".to_string(),
            Expr::Quote(expr, _) => format!("'{}", expr.value.pretty()),
            Expr::Spread(expr) => format!("...{}", expr.value.pretty()),
        }
    }

    fn pretty_list(exprs: &[AstNode]) -> String {
        let inner = exprs
            .iter()
            .map(|e| e.value.pretty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("({})", inner)
    }
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

/// Wraps an expression into an [`AstNode`] carrying the expression's span.
pub fn node(expr: Expr) -> AstNode {
    let span = expr.span();
    Spanned {
        value: Arc::new(expr),
        span,
    }
}

pub mod value;
