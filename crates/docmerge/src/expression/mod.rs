//! Field expression language.
//!
//! An expression names the value a merge field produces: a quoted literal, a
//! property reference, or a chain of function applications written as
//! `Property (function Argument)`. The parser produces an AST that the
//! interpreter evaluates against a property store.

pub mod ast;
pub mod error;
mod parser;

pub use ast::Expression;
pub use error::ParseError;
pub use parser::parse_expression;
