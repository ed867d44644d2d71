//! Top-level ("local") namespace of one execution.

use std::collections::HashMap;

use crate::ast::value::Value;

/// Name the case's argument list is bound to.
pub const ARGS_BINDING: &str = "args";

/// Name the assembled unit binds the function's return value to.
pub const RESULT_BINDING: &str = "result";

/// Fresh name-to-value map that receives the top-level `define`s of one
/// run of a program.
///
/// # Examples
///
/// ```rust
/// use sutra_check::ast::value::Value;
/// use sutra_check::runtime::scope::{ExecutionScope, ARGS_BINDING, RESULT_BINDING};
/// let scope = ExecutionScope::with_args(vec![Value::Number(1.0)]);
/// assert!(scope.get(ARGS_BINDING).is_some());
/// assert!(scope.get(RESULT_BINDING).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionScope {
    bindings: HashMap<String, Value>,
}

impl ExecutionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope pre-seeded with exactly one binding, `args`.
    pub fn with_args(args: Vec<Value>) -> Self {
        let mut scope = Self::new();
        scope.set(ARGS_BINDING, Value::List(args));
        scope
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
