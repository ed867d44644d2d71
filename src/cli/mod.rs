//! The `sutra-check` command-line interface.
//!
//! Reads the payload from stdin, assembles the unit and the test table, runs
//! every case and writes the report to stdout. Exit codes: 0 when every case
//! passes, 2 on the first mismatch, 1 on any error.

use std::io::Read;

use clap::Parser;

use crate::atoms::{AtomRegistry, SharedOutput};
use crate::cli::args::CheckArgs;
use crate::cli::output::{print_outcome, StdoutSink};
use crate::config::HarnessConfig;
use crate::errors::{
    print_error, unspanned, ErrorKind, ErrorReporting, ErrorSite, Phase, SourceContext,
    SutraError,
};
use crate::harness::{assemble, run as run_cases, Outcome};
use crate::runtime::world::World;

pub mod args;
pub mod output;

/// Exit code for any error.
pub const EXIT_ERROR: i32 = 1;

/// Deep recursion in user programs needs more than the default thread stack.
const EVAL_STACK_SIZE: usize = 256 * 1024 * 1024;

/// The main entry point for the CLI. Returns the process exit code.
pub fn run() -> i32 {
    let args = CheckArgs::parse();

    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            print_error(e);
            return EXIT_ERROR;
        }
    };
    crate::logging::init(&config.log_filter);

    let spawned = std::thread::Builder::new()
        .name("sutra-check".into())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || execute(&args.func, &config));

    match spawned {
        Ok(handle) => handle.join().unwrap_or_else(|_| {
            tracing::error!("evaluation thread panicked");
            EXIT_ERROR
        }),
        Err(e) => {
            tracing::error!(error = %e, "could not spawn evaluation thread");
            EXIT_ERROR
        }
    }
}

fn execute(func: &str, config: &HarnessConfig) -> i32 {
    match check(func, config) {
        Ok(code) => code,
        Err(e) => {
            print_error(e);
            EXIT_ERROR
        }
    }
}

fn check(func: &str, config: &HarnessConfig) -> Result<i32, SutraError> {
    let input = read_stdin()?;

    let atoms = AtomRegistry::standard();
    let template = World::standard(&atoms, config.seed)?;

    let (unit, cases) = assemble(&input, func, &template, &atoms, config.max_depth)?;
    let outcome = run_cases(
        &unit,
        &cases,
        &template,
        &atoms,
        SharedOutput::new(StdoutSink),
        config.max_depth,
    )?;

    Ok(exit_code_after_report(&outcome, print_outcome(&outcome)))
}

/// The outcome's exit code, or `EXIT_ERROR` when the report never made it
/// to stdout.
fn exit_code_after_report(outcome: &Outcome, written: std::io::Result<()>) -> i32 {
    match written {
        Ok(()) => outcome.exit_code(),
        Err(e) => {
            tracing::error!(error = %e, "could not write the report");
            EXIT_ERROR
        }
    }
}

fn read_stdin() -> Result<String, SutraError> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input).map_err(|e| {
        ErrorSite::new(SourceContext::fallback("stdin"), Phase::Payload).report(
            ErrorKind::MalformedPayload {
                reason: format!("could not read stdin: {e}"),
            },
            unspanned(),
        )
    })?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::value::Value;

    #[test]
    fn report_write_failure_is_an_error_exit() {
        let broken = || Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        let failed = Outcome::Failed {
            args: vec![],
            expected: Value::Nil,
            actual: Value::Bool(true),
        };
        assert_eq!(exit_code_after_report(&Outcome::AllPassed, broken()), EXIT_ERROR);
        assert_eq!(exit_code_after_report(&failed, broken()), EXIT_ERROR);
        assert_eq!(exit_code_after_report(&failed, Ok(())), 2);
        assert_eq!(exit_code_after_report(&Outcome::AllPassed, Ok(())), 0);
    }
}
