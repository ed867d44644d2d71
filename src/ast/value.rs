use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use im::OrdMap;

use crate::ast::{AstNode, ParamList};
use crate::atoms::NativeFn;
use crate::errors::SourceContext;
use crate::runtime::path::Path;

/// Represents a value in the Sutra engine.
///
/// Test-case arguments, expected values and function results are all
/// `Value`s, and pass/fail is decided by this type's structural equality.
///
/// # Examples
///
/// ```rust
/// use sutra_check::ast::value::Value;
/// let n = Value::Number(3.14);
/// assert_eq!(n.type_name(), "Number");
/// let s = Value::String("hello".to_string());
/// assert_eq!(s.type_name(), "String");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Number(f64),
    String(String),
    Bool(bool),
    List(Vec<Value>),
    Map(OrdMap<String, Value>),
    Path(Path),
    /// User-defined function (parameter list, body and captured lexical frames).
    Lambda(Rc<Lambda>),
    /// Eager atom used as a first-class value, e.g. `(map + xs ys)`.
    Native(NativeFn),
}

/// A user-defined lambda.
///
/// `source` is the text the body was parsed from, so errors raised while the
/// body runs point into the right file even when the caller lives elsewhere.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub name: Option<String>,
    pub params: ParamList,
    pub body: AstNode,
    pub captured_env: HashMap<String, Value>,
    pub source: SourceContext,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Value {
    /// Returns the type name of the value as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::ast::value::Value;
    /// let v = Value::Bool(true);
    /// assert_eq!(v.type_name(), "Bool");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Path(_) => "Path",
            Value::Lambda(_) => "Lambda",
            Value::Native(_) => "Native",
        }
    }

    /// Returns true if the value is Nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns true if the value is considered "truthy" in a boolean context.
    /// `nil`, `false`, `0`, empty strings and empty collections are falsy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::ast::value::Value;
    /// assert!(!Value::Number(0.0).is_truthy());
    /// assert!(Value::List(vec![Value::Nil]).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
            _ => true,
        }
    }

    /// Returns true if the value can be applied to arguments.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Lambda(_) | Value::Native(_))
    }

    /// Returns the contained number if this is a Number value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::ast::value::Value;
    /// assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
    /// assert_eq!(Value::String("nope".to_string()).as_number(), None);
    /// ```
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained items if this is a List value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text used by `print` and `str`: strings are written without quotes,
    /// everything else uses the `Display` form.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "(")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &OrdMap<String, Value>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
            Value::Path(p) => write!(f, "{}", p),
            Value::Lambda(lambda) => match &lambda.name {
                Some(name) => write!(f, "<lambda {}>", name),
                None => write!(f, "<lambda>"),
            },
            Value::Native(native) => write!(f, "<native {}>", native.name),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_compare_structurally() {
        let a = Value::List(vec![Value::Number(1.0), Value::Number(2.0)]);
        let b = Value::List(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::List(vec![Value::Number(1.0)]));
    }

    #[test]
    fn display_matches_source_syntax() {
        let v = Value::List(vec![
            Value::Number(1.0),
            Value::Number(2.5),
            Value::String("hi".into()),
            Value::Bool(false),
            Value::Nil,
        ]);
        assert_eq!(v.to_string(), r#"(1 2.5 "hi" false nil)"#);
        assert_eq!(Value::String("hi".into()).to_display_string(), "hi");
    }
}
