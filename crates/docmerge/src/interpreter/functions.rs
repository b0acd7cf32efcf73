//! Function registry for user-supplied expression functions.
//!
//! Functions transform strings (e.g. inflect a name into the genitive case).
//! Each function has a fixed arity of one or two, chosen at registration time
//! and checked when an expression is parsed.

use std::collections::BTreeMap;
use std::fmt;

/// Boxed one-argument function.
pub type UnaryFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Boxed two-argument function.
pub type BinaryFn = Box<dyn Fn(&str, &str) -> String + Send + Sync>;

/// A registered expression function.
///
/// Functions may return an empty string to signal that no transformation
/// applies; the evaluator passes it through unchanged.
pub enum Function {
    /// Takes the value it is applied to.
    Unary(UnaryFn),
    /// Takes the value it is applied to and the second argument.
    Binary(BinaryFn),
}

impl Function {
    /// Wrap a one-argument closure.
    pub fn unary(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Function::Unary(Box::new(f))
    }

    /// Wrap a two-argument closure.
    pub fn binary(f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Function::Binary(Box::new(f))
    }

    /// Number of arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::Unary(_) => 1,
            Function::Binary(_) => 2,
        }
    }

    /// Invoke the function, or return `None` if `args` does not match the arity.
    pub fn call(&self, args: &[String]) -> Option<String> {
        match (self, args) {
            (Function::Unary(f), [value]) => Some(f(value)),
            (Function::Binary(f), [value, second]) => Some(f(value, second)),
            _ => None,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Unary(_) => f.write_str("Function::Unary"),
            Function::Binary(_) => f.write_str("Function::Binary"),
        }
    }
}

/// Registry of named expression functions.
///
/// Names are matched exactly and may contain spaces. The registry is built
/// before the engine and is read-only afterwards.
///
/// # Example
///
/// ```
/// use docmerge::FunctionRegistry;
///
/// let functions = FunctionRegistry::new()
///     .with_unary("upper", |s| s.to_uppercase())
///     .with_binary("or else", |s, fallback| {
///         if s.is_empty() { fallback.to_string() } else { s.to_string() }
///     });
///
/// assert_eq!(functions.get("upper").map(|f| f.arity()), Some(1));
/// assert_eq!(functions.get("or else").map(|f| f.arity()), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Function>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a one-argument function, replacing any function of that name.
    pub fn with_unary(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, Function::unary(f));
        self
    }

    /// Register a two-argument function, replacing any function of that name.
    pub fn with_binary(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, Function::binary(f));
        self
    }

    /// Insert a function. Returns the function previously registered under
    /// `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, function: Function) -> Option<Function> {
        self.functions.insert(name.into(), function)
    }

    /// Get a function by name.
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Check if a function is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered function names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if there are no registered functions.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Function)> for FunctionRegistry {
    fn from_iter<I: IntoIterator<Item = (K, Function)>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl<K: Into<String>> Extend<(K, Function)> for FunctionRegistry {
    fn extend<I: IntoIterator<Item = (K, Function)>>(&mut self, iter: I) {
        for (name, function) in iter {
            self.insert(name, function);
        }
    }
}
