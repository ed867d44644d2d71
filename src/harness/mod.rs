//! The test harness: payload decoding, assembly, and the execution and
//! comparison engine.
//!
//! ```text
//! stdin -> TestPayload -> assemble -> (ExecutableUnit, Vec<TestCase>) -> run -> Outcome
//! ```

pub mod assemble;
pub mod payload;
pub mod runner;

pub use assemble::{assemble, ExecutableUnit, TestCase};
pub use payload::TestPayload;
pub use runner::{run, Outcome};
