//! Sutra Error Handling - Unified Encapsulated API
//!
//! Every failure the harness can hit, from malformed stdin to a type error
//! deep inside the candidate program, is a [`SutraError`]. The error carries
//! the source it happened in, so `miette` can render a labelled excerpt, and
//! the [`Phase`] it happened in, so callers can tell a broken payload from a
//! broken test table from a crashing program.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::ast::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named source text that errors point into.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: Arc<str>,
    pub content: Arc<str>,
}

impl SourceContext {
    /// Create a source context from real content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            content: Arc::from(content.into()),
        }
    }

    /// Create a fallback when real source is unavailable.
    pub fn fallback(context: &str) -> Self {
        Self::from_file("fallback", format!("; {}", context))
    }

    /// Convert to NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(
            self.name.to_string(),
            self.content.to_string(),
        ))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("default context")
    }
}

// ============================================================================
// PHASES AND FAULTS
// ============================================================================

/// Where in a harness run an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Reading and deserialising stdin, validating the entry point.
    Payload,
    /// Evaluating the `test_case` expression into a table.
    TestCase,
    /// Parsing or running the assembled unit.
    Execution,
    /// Loading harness configuration.
    Config,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Phase::Payload => "payload",
            Phase::TestCase => "test_case",
            Phase::Execution => "execution",
            Phase::Config => "config",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of fatal harness errors.
///
/// A value mismatch is not a fault; it is reported as
/// [`Outcome::Failed`](crate::harness::Outcome::Failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    MalformedPayload,
    TestCaseEvaluation,
    Execution,
    Config,
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// All error types as a clean enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Parse errors - structural and syntactic issues
    #[error("Parse error: missing {element}")]
    MissingElement { element: String },
    #[error("Parse error: malformed {construct}")]
    MalformedConstruct { construct: String },
    #[error("Parse error: invalid {literal_type} '{value}'")]
    InvalidLiteral { literal_type: String, value: String },
    #[error("Parse error: expected {expected}")]
    UnexpectedToken { expected: String },

    // Runtime errors - evaluation failures
    #[error("Runtime error: undefined symbol '{symbol}'")]
    UndefinedSymbol { symbol: String },
    #[error("Type error: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    #[error("Runtime error: incorrect arity, expected {expected}, got {actual}")]
    ArityMismatch { expected: String, actual: usize },
    #[error("Runtime error: invalid operation '{operation}' on {operand_type}")]
    InvalidOperation {
        operation: String,
        operand_type: String,
    },
    #[error("Runtime error: division by zero")]
    DivisionByZero,
    #[error("Runtime error: recursion limit of {limit} exceeded")]
    RecursionLimit { limit: usize },
    #[error("Runtime error: {message}")]
    UserError { message: String },
    #[error("Runtime error: '{name}' was not bound after execution")]
    MissingResult { name: String },

    // Harness errors - payload, test table and configuration
    #[error("Malformed payload: {reason}")]
    MalformedPayload { reason: String },
    #[error("Invalid entry point '{name}': {reason}")]
    InvalidEntryPoint { name: String, reason: String },
    #[error("Malformed test case {index}: {reason}")]
    MalformedTestCase { index: usize, reason: String },
    #[error("Invalid configuration {key}='{value}': {reason}")]
    InvalidConfig {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Runtime,
    Harness,
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingElement { .. }
            | Self::MalformedConstruct { .. }
            | Self::InvalidLiteral { .. }
            | Self::UnexpectedToken { .. } => ErrorCategory::Parse,

            Self::UndefinedSymbol { .. }
            | Self::TypeMismatch { .. }
            | Self::ArityMismatch { .. }
            | Self::InvalidOperation { .. }
            | Self::DivisionByZero
            | Self::RecursionLimit { .. }
            | Self::UserError { .. }
            | Self::MissingResult { .. } => ErrorCategory::Runtime,

            Self::MalformedPayload { .. }
            | Self::InvalidEntryPoint { .. }
            | Self::MalformedTestCase { .. }
            | Self::InvalidConfig { .. } => ErrorCategory::Harness,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MissingElement { .. } => "missing_element",
            Self::MalformedConstruct { .. } => "malformed_construct",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::UndefinedSymbol { .. } => "undefined_symbol",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::InvalidOperation { .. } => "invalid_operation",
            Self::DivisionByZero => "division_by_zero",
            Self::RecursionLimit { .. } => "recursion_limit",
            Self::UserError { .. } => "user_error",
            Self::MissingResult { .. } => "missing_result",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::InvalidEntryPoint { .. } => "invalid_entry_point",
            Self::MalformedTestCase { .. } => "malformed_test_case",
            Self::InvalidConfig { .. } => "invalid_config",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Parse => "syntax error here",
            ErrorCategory::Runtime => match self {
                Self::UndefinedSymbol { .. } => "undefined symbol",
                Self::TypeMismatch { .. } => "type mismatch",
                Self::ArityMismatch { .. } => "arity mismatch",
                _ => "raised here",
            },
            ErrorCategory::Harness => "here",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::ArityMismatch { .. } => Some(
                "every test case must supply exactly as many arguments as the function takes"
                    .into(),
            ),
            Self::MissingResult { name } => Some(format!(
                "the assembled unit binds '{}' on its last line; do not rebind or delete it",
                name
            )),
            Self::MalformedPayload { .. } => Some(
                r#"stdin must hold a JSON object: {"code": "<source>", "test_case": "<expression>"}"#
                    .into(),
            ),
            Self::MalformedTestCase { .. } => Some(
                "test_case must evaluate to a list of (args expected) pairs, e.g. '(((1) 2) ((3) 6))"
                    .into(),
            ),
            Self::RecursionLimit { .. } => {
                Some("raise SUTRA_MAX_DEPTH if the recursion is intended".into())
            }
            _ => None,
        }
    }
}

// ============================================================================
// THE ERROR TYPE
// ============================================================================

/// The single error type: what went wrong, where, and how to help.
#[derive(Debug)]
pub struct SutraError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: Phase,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl SutraError {
    pub fn phase(&self) -> Phase {
        self.source_info.phase
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Maps the error onto the harness fault taxonomy.
    pub fn fault(&self) -> Fault {
        match (&self.kind, self.phase()) {
            (ErrorKind::MalformedPayload { .. } | ErrorKind::InvalidEntryPoint { .. }, _) => {
                Fault::MalformedPayload
            }
            (_, Phase::Payload) => Fault::MalformedPayload,
            (_, Phase::TestCase) => Fault::TestCaseEvaluation,
            (_, Phase::Execution) => Fault::Execution,
            (_, Phase::Config) => Fault::Config,
        }
    }

    /// Replaces the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl std::error::Error for SutraError {}

impl fmt::Display for SutraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for SutraError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation - each context knows its source and phase.
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> SutraError;

    fn missing_element(&self, element: &str, span: SourceSpan) -> SutraError {
        self.report(
            ErrorKind::MissingElement {
                element: element.into(),
            },
            span,
        )
    }

    fn type_mismatch(&self, expected: &str, actual: &str, span: SourceSpan) -> SutraError {
        self.report(
            ErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            },
            span,
        )
    }

    fn undefined_symbol(&self, symbol: &str, span: SourceSpan) -> SutraError {
        self.report(
            ErrorKind::UndefinedSymbol {
                symbol: symbol.into(),
            },
            span,
        )
    }

    fn arity_mismatch(&self, expected: &str, actual: usize, span: SourceSpan) -> SutraError {
        self.report(
            ErrorKind::ArityMismatch {
                expected: expected.into(),
                actual,
            },
            span,
        )
    }

    fn invalid_operation(
        &self,
        operation: &str,
        operand_type: &str,
        span: SourceSpan,
    ) -> SutraError {
        self.report(
            ErrorKind::InvalidOperation {
                operation: operation.into(),
                operand_type: operand_type.into(),
            },
            span,
        )
    }
}

/// Builds a [`SutraError`] from its parts, filling in the error code and
/// default help.
pub fn build_error(
    kind: ErrorKind,
    source: &SourceContext,
    span: SourceSpan,
    phase: Phase,
) -> SutraError {
    let error_code = format!("sutra::{}::{}", phase, kind.code_suffix());
    let help = kind.default_help();
    SutraError {
        kind,
        source_info: SourceInfo {
            source: source.to_named_source(),
            primary_span: span,
            phase,
        },
        diagnostic_info: DiagnosticInfo { help, error_code },
    }
}

/// General-purpose error site for code that has a source and a phase but no
/// evaluation context (payload decoding, parsing, configuration).
#[derive(Debug, Clone)]
pub struct ErrorSite {
    pub source: SourceContext,
    pub phase: Phase,
}

impl ErrorSite {
    pub fn new(source: SourceContext, phase: Phase) -> Self {
        Self { source, phase }
    }
}

impl ErrorReporting for ErrorSite {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> SutraError {
        build_error(kind, &self.source, span, self.phase)
    }
}

/// Creates a placeholder span for errors not tied to a specific source
/// location.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Converts a Sutra AST Span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a SutraError with full miette diagnostics to stderr.
pub fn print_error(error: SutraError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
