//! Command-line arguments for `sutra-check`.
//!
//! The payload arrives on stdin; the only argument names the function under
//! test. Tunables are read from the environment (see `crate::config`).

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "sutra-check",
    version,
    about = "Run a Sutra function against a table of example cases read from stdin."
)]
pub struct CheckArgs {
    /// Name of the function the program defines and the test cases call.
    #[arg(required = true)]
    pub func: String,
}
