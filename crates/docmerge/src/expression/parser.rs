//! Field expression parser.
//!
//! Grammar, informally:
//!
//! ```text
//! expression  = primary application*
//! primary     = '"' text '"' | field-name
//! application = '(' function-name primary? ')'
//! ```
//!
//! The input is split on `(`. The first segment is the primary; every later
//! segment is one function application whose output feeds the next. Inside an
//! application the function name runs up to the first upper-case letter or
//! `"`, and whatever follows is the optional second argument. Function names
//! may therefore contain spaces (`род как у`), and second arguments must start
//! with a capital letter or a quote.

use winnow::ascii::multispace0;
use winnow::prelude::*;
use winnow::token::{rest, take_till};

use super::ast::Expression;
use super::error::ParseError;
use crate::interpreter::FunctionRegistry;

/// Parse a field expression, resolving function names against `functions`.
///
/// Fails if any application is unclosed, names an unregistered function, or
/// passes a different number of arguments than the function declares.
pub fn parse_expression(
    input: &str,
    functions: &FunctionRegistry,
) -> Result<Expression, ParseError> {
    let mut segments = input.split('(').map(str::trim);
    let Some(first) = segments.next() else {
        return Err(ParseError::Empty);
    };
    let mut expression = primary(first)?;

    for segment in segments {
        let Some(body) = segment.strip_suffix(')') else {
            return Err(ParseError::UnclosedCall {
                segment: segment.to_string(),
            });
        };

        let mut remaining = body;
        let (name, second) =
            application(&mut remaining).map_err(|_| ParseError::MissingFunctionName {
                segment: segment.to_string(),
            })?;

        let mut args = vec![expression];
        if !second.is_empty() {
            args.push(primary(second)?);
        }

        let function = functions
            .get(name)
            .ok_or_else(|| ParseError::UnknownFunction {
                name: name.to_string(),
            })?;
        if function.arity() != args.len() {
            return Err(ParseError::ArgumentCount {
                name: name.to_string(),
                expected: function.arity(),
                got: args.len(),
            });
        }

        expression = Expression::call(name, args);
    }

    Ok(expression)
}

/// Parse a literal or a field reference from an already trimmed segment.
fn primary(segment: &str) -> Result<Expression, ParseError> {
    if segment.is_empty() {
        return Err(ParseError::Empty);
    }
    let Some(quoted) = segment.strip_prefix('"') else {
        return Ok(Expression::field(segment));
    };
    // The literal runs to the last quote in the segment.
    match quoted.rfind('"') {
        Some(end) => Ok(Expression::literal(&quoted[..end])),
        None => Err(ParseError::UnterminatedLiteral {
            text: segment.to_string(),
        }),
    }
}

/// Split an application body into function name and second argument.
///
/// Fails when the body does not start with a function name.
fn application<'i>(input: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    multispace0.parse_next(input)?;
    let name = take_till(1.., is_argument_start).parse_next(input)?;
    let second = rest.parse_next(input)?;
    Ok((name.trim(), second.trim()))
}

/// Check if a character starts the second argument of an application.
fn is_argument_start(c: char) -> bool {
    c.is_uppercase() || c == '"'
}
