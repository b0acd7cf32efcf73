//! Expression evaluation and missing-property analysis.

use crate::expression::Expression;
use crate::interpreter::error::compute_suggestions;
use crate::interpreter::{EvalError, FunctionRegistry, PropertyStore};

/// Reduce an expression to a string.
///
/// - Literals yield their text.
/// - Field references yield the stored property value.
/// - Calls evaluate their arguments left to right, then invoke the function.
///
/// Run [`find_missing`] first: the merge pipeline only evaluates expressions
/// whose properties are all present, and a missing property here is reported
/// as [`EvalError::UnresolvedField`].
///
/// # Example
///
/// ```
/// use docmerge::{Expression, FunctionRegistry, PropertyStore, evaluate};
///
/// let functions = FunctionRegistry::new().with_unary("upper", |s| s.to_uppercase());
/// let properties: PropertyStore = [("Name", "ivanov")].into_iter().collect();
/// let expression = Expression::call("upper", vec![Expression::field("Name")]);
///
/// assert_eq!(evaluate(&expression, &properties, &functions).unwrap(), "IVANOV");
/// ```
pub fn evaluate(
    expression: &Expression,
    properties: &PropertyStore,
    functions: &FunctionRegistry,
) -> Result<String, EvalError> {
    match expression {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Field(name) => properties
            .get(name)
            .map(ToString::to_string)
            .ok_or_else(|| {
                let available: Vec<&str> = properties.names().collect();
                EvalError::UnresolvedField {
                    name: name.clone(),
                    suggestions: compute_suggestions(name, &available),
                }
            }),
        Expression::Call { function, args } => {
            let definition = functions
                .get(function)
                .ok_or_else(|| EvalError::UnknownFunction {
                    name: function.clone(),
                })?;
            let values = args
                .iter()
                .map(|arg| evaluate(arg, properties, functions))
                .collect::<Result<Vec<_>, _>>()?;
            definition
                .call(&values)
                .ok_or_else(|| EvalError::ArgumentCount {
                    name: function.clone(),
                    expected: definition.arity(),
                    got: values.len(),
                })
        }
    }
}

/// Collect property names referenced by `expression` but absent from `properties`.
///
/// Names are deduplicated and returned in first-reference order. Nothing is
/// evaluated.
pub fn find_missing(expression: &Expression, properties: &PropertyStore) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing(expression, properties, &mut missing);
    missing
}

fn collect_missing(expression: &Expression, properties: &PropertyStore, missing: &mut Vec<String>) {
    match expression {
        Expression::Literal(_) => {}
        Expression::Field(name) => {
            if !properties.contains(name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        Expression::Call { args, .. } => {
            for arg in args {
                collect_missing(arg, properties, missing);
            }
        }
    }
}
