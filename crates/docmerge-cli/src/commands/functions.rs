//! Functions available to expressions evaluated from the command line.

use docmerge::FunctionRegistry;

/// The built-in function set.
///
/// - `upper`, `lower`, `trim`: one argument.
/// - `or`: the second argument when the first is blank.
/// - `join`: both arguments separated by a space.
pub fn builtin_functions() -> FunctionRegistry {
    FunctionRegistry::new()
        .with_unary("upper", str::to_uppercase)
        .with_unary("lower", str::to_lowercase)
        .with_unary("trim", |value| value.trim().to_string())
        .with_binary("or", |value, fallback| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        })
        .with_binary("join", |left, right| format!("{left} {right}"))
}
