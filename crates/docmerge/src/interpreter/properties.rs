//! Named string properties supplied as merge input.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::expression::Expression;
use crate::interpreter::{EvalError, FunctionRegistry, evaluate, find_missing};

/// Mapping from property name to value.
///
/// Names match exactly: case-sensitive, embedded spaces significant. A store
/// is built once per merge and only read while fields are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    values: BTreeMap<String, String>,
}

impl PropertyStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Get a property value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Check if a property is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Property names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluate an expression against this store.
    pub fn eval(
        &self,
        expression: &Expression,
        functions: &FunctionRegistry,
    ) -> Result<String, EvalError> {
        evaluate(expression, self, functions)
    }

    /// Names referenced by `expression` that this store lacks.
    pub fn missing_fields(&self, expression: &Expression) -> Vec<String> {
        find_missing(expression, self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyStore {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl From<HashMap<String, String>> for PropertyStore {
    fn from(map: HashMap<String, String>) -> Self {
        Self {
            values: map.into_iter().collect(),
        }
    }
}
