//! The stdin payload: program source plus a test-case expression.

use serde::Deserialize;

use crate::ast::Span;
use crate::errors::{
    to_source_span, unspanned, ErrorKind, ErrorReporting, ErrorSite, Phase, SourceContext,
    SutraError,
};

/// Deserialised stdin. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestPayload {
    /// Source text of the program under test.
    pub code: String,
    /// Sutra expression that evaluates to the table of test cases.
    pub test_case: String,
}

impl TestPayload {
    /// Joins the input lines, trims the result and deserialises it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_check::harness::TestPayload;
    /// let payload = TestPayload::from_input("{\"code\": \"(define x 1)\",\n \"test_case\": \"'()\"}\n").unwrap();
    /// assert_eq!(payload.code, "(define x 1)");
    /// assert!(TestPayload::from_input("{\"code\": \"\"}").is_err());
    /// ```
    pub fn from_input(raw_input: &str) -> Result<Self, SutraError> {
        let text = normalize_input(raw_input);
        let site = ErrorSite::new(SourceContext::from_file("stdin", text.clone()), Phase::Payload);

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            let offset = offset_of(&text, e.line(), e.column());
            malformed(&site, e.to_string(), Span { start: offset, end: offset })
        })?;

        if !value.is_object() {
            return Err(malformed(
                &site,
                format!("expected a JSON object, found {}", json_type_name(&value)),
                Span { start: 0, end: text.len() },
            ));
        }

        serde_json::from_value(value).map_err(|e| {
            site.report(
                ErrorKind::MalformedPayload {
                    reason: e.to_string(),
                },
                unspanned(),
            )
        })
    }
}

/// Reads input as lines, joins them with `\n` and trims surrounding
/// whitespace.
pub fn normalize_input(raw_input: &str) -> String {
    raw_input
        .lines()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn malformed(site: &ErrorSite, reason: String, span: Span) -> SutraError {
    site.report(ErrorKind::MalformedPayload { reason }, to_source_span(span))
}

// serde_json reports 1-based line and column; 0 means "no position".
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = text
        .split('\n')
        .take(line - 1)
        .map(|l| l.len() + 1)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Fault;

    #[test]
    fn multi_line_input_is_joined_and_trimmed() {
        let raw = "\n  {\"code\": \"(define (f x) x)\",\n   \"test_case\": \"'(((1) 1))\"}  \n\n";
        let payload = TestPayload::from_input(raw).unwrap();
        assert_eq!(payload.code, "(define (f x) x)");
        assert_eq!(payload.test_case, "'(((1) 1))");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let raw = r#"{"code": "", "test_case": "'()", "language": "sutra"}"#;
        assert!(TestPayload::from_input(raw).is_ok());
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = TestPayload::from_input(r#"{"code": "(define x 1)"}"#).unwrap_err();
        assert_eq!(err.fault(), Fault::MalformedPayload);
        assert!(err.to_string().contains("test_case"));
    }

    #[test]
    fn non_string_field_is_malformed() {
        let err = TestPayload::from_input(r#"{"code": 5, "test_case": "'()"}"#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedPayload { .. }));
    }

    #[test]
    fn arrays_are_not_payloads() {
        let err = TestPayload::from_input(r#"["(define x 1)", "'()"]"#).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn syntax_error_points_into_the_input() {
        let err = TestPayload::from_input("{\"code\": \"x\",\n\"test_case\" 1}").unwrap_err();
        assert_eq!(err.phase(), Phase::Payload);
        assert!(err.source_info.primary_span.offset() > 0);
    }
}
