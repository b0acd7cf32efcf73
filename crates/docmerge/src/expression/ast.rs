//! AST types for field expressions.

/// A parsed field expression.
///
/// Trees are finite and acyclic. A `Call` always carries as many arguments as
/// the named function declares; the parser enforces this against the function
/// registry it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Quoted literal text: `"value"`.
    Literal(String),
    /// Reference to a property by name. Names may contain interior spaces.
    Field(String),
    /// Application of a registered function: `argument (function second?)`.
    Call {
        function: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Create a literal expression.
    pub fn literal(value: impl Into<String>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a property reference.
    pub fn field(name: impl Into<String>) -> Self {
        Expression::Field(name.into())
    }

    /// Create a function application.
    pub fn call(function: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            function: function.into(),
            args,
        }
    }
}
