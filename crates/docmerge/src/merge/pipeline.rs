//! The shared parse, analyze, evaluate, format, write-back pipeline.
//!
//! Document formats differ only in how fields are found and how results are
//! written back. Each format implements [`FieldSource`]; [`merge_fields`] runs
//! the same steps over any of them.

use std::ops::Range;

use tracing::{debug, info, warn};

use crate::interpreter::{Engine, PropertyStore, apply_format, evaluate, find_missing};
use crate::merge::MergeError;

/// One placeholder inside a field's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Byte range of the whole placeholder (brackets included) in the field text.
    pub span: Range<usize>,
    /// The expression naming the placeholder's value.
    pub expression: String,
    /// Format modifiers, in declaration order.
    pub modifiers: Vec<String>,
}

/// A document format's view of its merge fields.
pub trait FieldSource {
    /// Handle to one located field.
    type Field;

    /// All fields, in document order.
    fn locate(&self) -> Vec<Self::Field>;

    /// The field's current text, or `None` if the field can no longer be read.
    fn read(&self, field: &Self::Field) -> Option<String>;

    /// Placeholders in `text`, left to right.
    fn placeholders(&self, text: &str) -> Vec<Placeholder>;

    /// Build the field's new text from the resolved placeholder values.
    ///
    /// `values` is parallel to `placeholders`; `None` marks a placeholder that
    /// must stay as written. The default substitutes each resolved value for
    /// its placeholder span.
    fn render(&self, text: &str, placeholders: &[Placeholder], values: &[Option<String>]) -> String {
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        for (placeholder, value) in placeholders.iter().zip(values) {
            output.push_str(&text[cursor..placeholder.span.start]);
            match value {
                Some(value) => output.push_str(value),
                None => output.push_str(&text[placeholder.span.clone()]),
            }
            cursor = placeholder.span.end;
        }
        output.push_str(&text[cursor..]);
        output
    }

    /// Write the field's new text.
    fn write(&mut self, field: &Self::Field, value: &str);

    /// Store a numeric result natively instead of as text.
    ///
    /// Called when the rendered text changed and parses as a number. Returns
    /// `true` if the source handled the value, in which case [`write`] is
    /// skipped.
    ///
    /// [`write`]: FieldSource::write
    fn commit_number(&mut self, _field: &Self::Field, _number: f64) -> bool {
        false
    }
}

/// Merge `properties` into every field of `source`.
///
/// For each placeholder: parse its expression, check for missing properties,
/// then evaluate and format it. A placeholder whose expression does not parse
/// or references a missing property is left untouched and reported; the
/// merge continues with the next one. Errors are returned in document order.
pub fn merge_fields<S: FieldSource>(
    source: &mut S,
    engine: &Engine,
    properties: &PropertyStore,
) -> Vec<MergeError> {
    let mut errors = Vec::new();
    let fields = source.locate();

    for field in &fields {
        let Some(text) = source.read(field) else {
            continue;
        };
        let placeholders = source.placeholders(&text);
        debug!(text = %text, placeholders = placeholders.len(), "located field");

        let values: Vec<Option<String>> = placeholders
            .iter()
            .map(|placeholder| resolve(placeholder, engine, properties, &mut errors))
            .collect();
        if values.iter().all(Option::is_none) {
            continue;
        }

        let rendered = source.render(&text, &placeholders, &values);
        let committed = rendered != text
            && parse_number(&rendered).is_some_and(|number| source.commit_number(field, number));
        if !committed {
            source.write(field, &rendered);
        }
    }

    info!(fields = fields.len(), errors = errors.len(), "merged fields");
    errors
}

/// Resolve one placeholder to its formatted value, recording any errors.
fn resolve(
    placeholder: &Placeholder,
    engine: &Engine,
    properties: &PropertyStore,
    errors: &mut Vec<MergeError>,
) -> Option<String> {
    let expression = match engine.parse(&placeholder.expression) {
        Ok(expression) => expression,
        Err(e) => {
            debug!(expression = %placeholder.expression, error = %e, "invalid expression");
            errors.push(MergeError::InvalidExpression {
                expression: placeholder.expression.clone(),
            });
            return None;
        }
    };

    let missing = find_missing(&expression, properties);
    if !missing.is_empty() {
        errors.extend(
            missing
                .into_iter()
                .map(|name| MergeError::MissingField { name }),
        );
        return None;
    }

    match evaluate(&expression, properties, engine.functions()) {
        Ok(value) => {
            let value = apply_format(&value, &placeholder.modifiers);
            debug!(expression = %placeholder.expression, value = %value, "resolved placeholder");
            Some(value)
        }
        Err(e) => {
            warn!(expression = %placeholder.expression, error = %e, "evaluation failed");
            None
        }
    }
}

/// Parse text that is entirely a finite number, ignoring surrounding whitespace.
fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
