//! Sutra syntax: the pest grammar and the parser that lowers it into AST nodes.

pub mod parser;

pub use parser::parse;
