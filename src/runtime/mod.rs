//! Runtime: the evaluator, the ambient world, per-execution scopes and paths.

pub mod eval;
pub mod path;
pub mod scope;
pub mod world;

pub use eval::{evaluate_ast_node, evaluate_program, evaluate_source, EvaluationContext};
pub use scope::ExecutionScope;
pub use world::World;
