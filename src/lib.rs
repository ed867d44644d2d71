//! Sutra check: run a function written in Sutra against a table of example
//! cases and report the first mismatch.
//!
//! The crate is both the `sutra-check` binary and a library for embedding the
//! harness:
//!
//! ```rust
//! use sutra_check::{assemble, run, AtomRegistry, Outcome, World};
//! use sutra_check::atoms::SharedOutput;
//!
//! let atoms = AtomRegistry::standard();
//! let world = World::standard(&atoms, Some(7)).unwrap();
//! let input = r#"{"code": "(define (double x) (* x 2))", "test_case": "'(((1) 2) ((3) 6))"}"#;
//!
//! let (unit, cases) = assemble(input, "double", &world, &atoms, 64).unwrap();
//! let outcome = run(&unit, &cases, &world, &atoms, SharedOutput::default(), 64).unwrap();
//! assert_eq!(outcome, Outcome::AllPassed);
//! ```

pub use crate::ast::value::Value;
pub use crate::atoms::AtomRegistry;
pub use crate::errors::SutraError;
pub use crate::harness::{assemble, run, ExecutableUnit, Outcome, TestCase, TestPayload};
pub use crate::runtime::{evaluate_source, World};
pub use crate::syntax::parse;

pub mod ast;
pub mod atoms;
pub mod cli;
pub mod config;
pub mod errors;
pub mod harness;
pub mod logging;
pub mod runtime;
pub mod syntax;
