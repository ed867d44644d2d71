//! # Sutra Atom System
//!
//! Atoms are the primitive operations every Sutra program is built from. The
//! candidate program, the prelude and the `test_case` expression all bottom
//! out in calls to atoms registered here.
//!
//! ## Module Structure
//!
//! - **`helpers`**: argument checking and type extraction shared by all atoms
//! - **`special_forms`**: lazily evaluated forms (`define`, `lambda`, `if`, ...)
//! - **`math`**: arithmetic (`+`, `-`, `mod`, `sqrt`, ...)
//! - **`logic`**: comparison and negation (`eq?`, `gt?`, `not`, ...)
//! - **`collections`**: lists and maps (`list`, `map`, `fold`, `map/get`, ...)
//! - **`string`**: string building (`str`, `upper`, `split`, ...)
//! - **`world`**: ambient state through paths (`set!`, `get`, `inc!`, ...)
//! - **`external`**: effects (`print`, `display`, `rand`)
//!
//! ## Calling Conventions
//!
//! An [`Atom::Eager`] receives its arguments already evaluated, left to right,
//! with spreads spliced in. An [`Atom::SpecialForm`] receives the raw argument
//! nodes and decides itself what to evaluate and when. Only eager atoms can be
//! used as first-class values; special forms exist in call position only.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::value::Value;
use crate::ast::{AstNode, Span};
use crate::errors::SutraError;
use crate::runtime::eval::EvaluationContext;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Eager atoms: arguments are evaluated before the call.
pub type EagerFn =
    fn(args: &[Value], context: &mut EvaluationContext, span: Span) -> Result<Value, SutraError>;

/// Special forms: arguments are passed unevaluated.
pub type LazyFn =
    fn(args: &[AstNode], context: &mut EvaluationContext, span: Span) -> Result<Value, SutraError>;

#[derive(Clone, Copy)]
pub enum Atom {
    Eager(EagerFn),
    SpecialForm(LazyFn),
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Eager(_) => f.write_str("Atom::Eager"),
            Atom::SpecialForm(_) => f.write_str("Atom::SpecialForm"),
        }
    }
}

/// An eager atom lifted into a value, e.g. the `+` in `(fold + 0 xs)`.
#[derive(Clone, Copy)]
pub struct NativeFn {
    pub name: &'static str,
    pub func: EagerFn,
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Output sink for `print` and `display`, injectable so tests can capture it.
pub trait OutputSink {
    fn emit(&mut self, text: &str, span: Option<&Span>);
}

/// A null output sink for running without output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str, _span: Option<&Span>) {}
}

/// Shared handle to an output sink, cloned into every evaluation context of
/// a run.
#[derive(Clone)]
pub struct SharedOutput(pub Rc<RefCell<dyn OutputSink>>);

impl SharedOutput {
    pub fn new(sink: impl OutputSink + 'static) -> Self {
        Self(Rc::new(RefCell::new(sink)))
    }

    pub fn emit(&self, text: &str, span: Option<&Span>) {
        self.0.borrow_mut().emit(text, span);
    }
}

impl Default for SharedOutput {
    fn default() -> Self {
        Self::new(NullSink)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Registry for all atoms, inspectable at runtime.
#[derive(Default, Clone)]
pub struct AtomRegistry {
    atoms: HashMap<&'static str, Atom>,
}

impl AtomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full standard library.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_all_atoms(&mut registry);
        registry
    }

    pub fn get(&self, name: &str) -> Option<Atom> {
        self.atoms.get(name).copied()
    }

    /// Returns the atom as a first-class value, if it is an eager one.
    pub fn native(&self, name: &str) -> Option<NativeFn> {
        let (key, atom) = self.atoms.get_key_value(name)?;
        match atom {
            Atom::Eager(func) => Some(NativeFn {
                name: *key,
                func: *func,
            }),
            Atom::SpecialForm(_) => None,
        }
    }

    pub fn is_special_form(&self, name: &str) -> bool {
        matches!(self.atoms.get(name), Some(Atom::SpecialForm(_)))
    }

    pub fn register_eager(&mut self, name: &'static str, func: EagerFn) {
        self.atoms.insert(name, Atom::Eager(func));
    }

    pub fn register_special_form(&mut self, name: &'static str, func: LazyFn) {
        self.atoms.insert(name, Atom::SpecialForm(func));
    }

    pub fn has(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.atoms.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

// ============================================================================
// MODULAR ATOM IMPLEMENTATIONS
// ============================================================================

pub mod helpers;

pub mod collections;
pub mod external;
pub mod logic;
pub mod math;
pub mod special_forms;
pub mod string;
pub mod world;

/// Registers all standard atoms from all modules with the given registry.
pub fn register_all_atoms(registry: &mut AtomRegistry) {
    special_forms::register_special_forms(registry);
    math::register_math_atoms(registry);
    logic::register_logic_atoms(registry);
    collections::register_collection_atoms(registry);
    string::register_string_atoms(registry);
    world::register_world_atoms(registry);
    external::register_external_atoms(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_forms_are_not_values() {
        let registry = AtomRegistry::standard();
        assert!(registry.native("+").is_some());
        assert!(registry.native("if").is_none());
        assert!(registry.is_special_form("define"));
        assert!(!registry.has("no-such-atom"));
    }
}
