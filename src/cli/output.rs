//! Output sinks for program output and the final report.

use std::io::{self, Write};

use crate::ast::Span;
use crate::atoms::OutputSink;
use crate::harness::Outcome;

/// OutputBuffer: collects output into a String for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pub buffer: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Emitted lines, in order.
    pub fn lines(&self) -> Vec<&str> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        self.buffer.split('\n').collect()
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(text);
    }
}

/// StdoutSink: writes program output to stdout, one line per emission.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        println!("{}", text);
    }
}

/// Writes the report without a trailing newline and flushes `out`.
pub fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> io::Result<()> {
    write!(out, "{outcome}")?;
    out.flush()
}

pub fn print_outcome(outcome: &Outcome) -> io::Result<()> {
    write_outcome(&mut io::stdout().lock(), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_joins_emissions_with_newlines() {
        let mut buffer = OutputBuffer::new();
        assert!(buffer.lines().is_empty());
        buffer.emit("one", None);
        buffer.emit("two", None);
        assert_eq!(buffer.as_str(), "one\ntwo");
        assert_eq!(buffer.lines(), vec!["one", "two"]);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_has_no_trailing_newline() {
        let mut out = Vec::new();
        write_outcome(&mut out, &Outcome::AllPassed).unwrap();
        assert_eq!(out, b"All test cases passed!");
    }

    #[test]
    fn failed_report_write_is_surfaced() {
        let err = write_outcome(&mut ClosedPipe, &Outcome::AllPassed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
