//! Integration tests for rendering merge errors.

use docmerge::{EnglishMessages, MergeError, MergeErrorVisitor, RussianMessages};
use insta::assert_snapshot;

fn missing() -> MergeError {
    MergeError::MissingField {
        name: "Подписант".to_string(),
    }
}

fn invalid() -> MergeError {
    MergeError::InvalidExpression {
        expression: "\"действующий\" (род Подписант)".to_string(),
    }
}

// =========================================================================
// Visitors
// =========================================================================

#[test]
fn russian_missing_field() {
    assert_snapshot!(missing().accept(&RussianMessages), @"Не заполнено поле Подписант.");
}

#[test]
fn russian_invalid_expression() {
    assert_snapshot!(
        invalid().accept(&RussianMessages),
        @r#"Ошибка в выражении: "действующий" (род Подписант)."#
    );
}

#[test]
fn english_messages() {
    assert_snapshot!(missing().accept(&EnglishMessages), @"Field Подписант is not filled in.");
    assert_snapshot!(
        invalid().accept(&EnglishMessages),
        @r#"Invalid expression: "действующий" (род Подписант)."#
    );
}

struct Codes;

impl MergeErrorVisitor for Codes {
    fn invalid_expression(&self, expression: &str) -> String {
        format!("E001 {expression}")
    }

    fn missing_field(&self, name: &str) -> String {
        format!("E002 {name}")
    }
}

#[test]
fn custom_visitor_dispatches_on_kind() {
    assert_eq!(missing().accept(&Codes), "E002 Подписант");
    assert!(invalid().accept(&Codes).starts_with("E001 "));
}

// =========================================================================
// Error values
// =========================================================================

#[test]
fn subject_names_field_or_expression() {
    assert_eq!(missing().subject(), "Подписант");
    assert_eq!(invalid().subject(), "\"действующий\" (род Подписант)");
}

#[test]
fn display_is_plain_english() {
    assert_eq!(missing().to_string(), "missing value for field 'Подписант'");
}
