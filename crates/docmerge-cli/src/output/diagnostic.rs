//! Miette diagnostic wrapper for field expression parse errors.

use docmerge::{FunctionRegistry, ParseError};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic for expression parse errors.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid expression: {message}")]
#[diagnostic(code(docmerge::expression))]
pub struct ExpressionDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    message: String,

    #[help]
    help: Option<String>,
}

impl ExpressionDiagnostic {
    /// Create a diagnostic from a ParseError, labelling the offending part of
    /// `expression`.
    pub fn from_parse_error(
        expression: &str,
        err: &ParseError,
        functions: &FunctionRegistry,
    ) -> Self {
        let (span, help) = match err {
            ParseError::Empty => (
                (0, expression.len()).into(),
                Some("start the expression with a field name or a quoted literal".to_string()),
            ),
            ParseError::UnterminatedLiteral { text } => (
                span_of(expression, text),
                Some("close the literal with '\"'".to_string()),
            ),
            ParseError::UnclosedCall { segment } => (
                span_of(expression, segment),
                Some("close the function application with ')'".to_string()),
            ),
            ParseError::UnknownFunction { name } => {
                let available: Vec<&str> = functions.names().collect();
                (
                    span_of_call(expression, name),
                    Some(format!("available functions: {}", available.join(", "))),
                )
            }
            ParseError::ArgumentCount { name, expected, .. } => (
                span_of_call(expression, name),
                Some(format!("'{name}' takes {expected} argument(s)")),
            ),
            ParseError::MissingFunctionName { segment } => (
                span_of(expression, segment),
                Some("name a function after '('".to_string()),
            ),
        };

        ExpressionDiagnostic {
            src: NamedSource::new("expression", expression.to_string()),
            span,
            message: err.to_string(),
            help,
        }
    }
}

/// Span of the last occurrence of `needle`, or the whole expression.
fn span_of(expression: &str, needle: &str) -> SourceSpan {
    match expression.rfind(needle) {
        Some(start) if !needle.is_empty() => (start, needle.len()).into(),
        _ => (0, expression.len()).into(),
    }
}

/// Span of a function name inside the applications, skipping the primary.
fn span_of_call(expression: &str, name: &str) -> SourceSpan {
    let Some(first_call) = expression.find('(') else {
        return span_of(expression, name);
    };
    match expression[first_call..].find(name) {
        Some(offset) if !name.is_empty() => (first_call + offset, name.len()).into(),
        _ => (first_call, expression.len() - first_call).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_function_points_at_name() {
        let expression = "род (род Подписант)";
        let span = span_of_call(expression, "род");
        assert_eq!(span.offset(), expression.find('(').unwrap() + 1);
        assert_eq!(span.len(), "род".len());
    }

    #[test]
    fn missing_needle_spans_whole_expression() {
        let span = span_of("abc", "xyz");
        assert_eq!((span.offset(), span.len()), (0, 3));
    }

    #[test]
    fn diagnostic_lists_available_functions() {
        let functions = FunctionRegistry::new()
            .with_unary("upper", str::to_uppercase)
            .with_unary("lower", str::to_lowercase);
        let err = ParseError::UnknownFunction {
            name: "title".to_string(),
        };
        let diagnostic = ExpressionDiagnostic::from_parse_error("Имя (title)", &err, &functions);
        assert_eq!(
            diagnostic.help.as_deref(),
            Some("available functions: lower, upper")
        );
        assert_eq!(diagnostic.span.offset(), "Имя (".len());
    }

    #[test]
    fn missing_function_name_points_at_application() {
        let err = ParseError::MissingFunctionName {
            segment: "Фамилия)".to_string(),
        };
        let diagnostic =
            ExpressionDiagnostic::from_parse_error("Имя (Фамилия)", &err, &FunctionRegistry::new());
        assert_eq!(diagnostic.span.offset(), "Имя (".len());
        assert_eq!(diagnostic.span.len(), "Фамилия)".len());
    }
}
