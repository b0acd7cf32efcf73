//! Recoverable per-field merge errors and their rendering.

use thiserror::Error;

/// A problem with one field, collected during a merge.
///
/// Merge errors never abort a merge: the affected field is left as it was and
/// every other field is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The field's expression did not parse.
    #[error("invalid expression: {expression}")]
    InvalidExpression { expression: String },

    /// The field references a property that was not supplied.
    #[error("missing value for field '{name}'")]
    MissingField { name: String },
}

impl MergeError {
    /// Render this error with `visitor`.
    pub fn accept(&self, visitor: &dyn MergeErrorVisitor) -> String {
        match self {
            MergeError::InvalidExpression { expression } => visitor.invalid_expression(expression),
            MergeError::MissingField { name } => visitor.missing_field(name),
        }
    }

    /// The expression text or field name this error is about.
    pub fn subject(&self) -> &str {
        match self {
            MergeError::InvalidExpression { expression } => expression,
            MergeError::MissingField { name } => name,
        }
    }
}

/// Renders merge errors into user-facing messages, one method per kind.
pub trait MergeErrorVisitor {
    fn invalid_expression(&self, expression: &str) -> String;
    fn missing_field(&self, name: &str) -> String;
}

/// English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl MergeErrorVisitor for EnglishMessages {
    fn invalid_expression(&self, expression: &str) -> String {
        format!("Invalid expression: {expression}.")
    }

    fn missing_field(&self, name: &str) -> String {
        format!("Field {name} is not filled in.")
    }
}

/// Russian messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct RussianMessages;

impl MergeErrorVisitor for RussianMessages {
    fn invalid_expression(&self, expression: &str) -> String {
        format!("Ошибка в выражении: {expression}.")
    }

    fn missing_field(&self, name: &str) -> String {
        format!("Не заполнено поле {name}.")
    }
}
