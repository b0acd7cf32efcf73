//! Parse error types for field expressions.

use thiserror::Error;

/// An error that occurred while parsing a field expression.
///
/// Parsing never yields a partial tree: any failure rejects the whole
/// expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing precedes the first function application.
    #[error("expression is empty")]
    Empty,

    /// A literal opens with `"` but has no closing quote.
    #[error("unterminated literal: {text}")]
    UnterminatedLiteral { text: String },

    /// A function application is not closed by `)`.
    #[error("function application '({segment}' is missing ')'")]
    UnclosedCall { segment: String },

    /// The function name is not registered.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// The function was applied to the wrong number of arguments.
    #[error("function '{name}' expects {expected} arguments, got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A function application names no function, as in `Имя ()` or
    /// `Имя (Фамилия)`.
    #[error("function application '({segment}' names no function")]
    MissingFunctionName { segment: String },
}
