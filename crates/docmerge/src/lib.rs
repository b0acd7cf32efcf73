//! Mail-merge field substitution for Office Open XML documents.
//!
//! A template marks fields with Word `MERGEFIELD`s (`.docx`) or `[[Name]]`
//! placeholders in cell text (`.xlsx`). Each field names an expression over
//! string properties, optionally passed through user-supplied functions:
//!
//! ```text
//! Buyer                          property value
//! "acting"                       literal text
//! Buyer (genitive)               one-argument function
//! "acting" (gender of Signer)    two-argument function
//! ```
//!
//! [`Engine::merge`] copies a template and writes every resolvable field;
//! fields that fail are reported as [`MergeError`]s and left untouched.

pub mod document;
pub mod expression;
pub mod interpreter;
pub mod merge;

pub use document::{DocumentError, DocumentKind};
pub use expression::{Expression, ParseError, parse_expression};
pub use interpreter::{
    Engine, EvalError, Function, FunctionRegistry, PropertyStore, apply_format,
    compute_suggestions, evaluate, find_missing,
};
pub use merge::{EnglishMessages, MergeError, MergeErrorVisitor, RussianMessages};

/// Creates a [`PropertyStore`] from name/value pairs.
///
/// # Example
///
/// ```
/// use docmerge::properties;
///
/// let p = properties! { "Name" => "Ivanov", "Price" => "1500" };
/// assert_eq!(p.len(), 2);
/// assert_eq!(p.get("Price"), Some("1500"));
/// ```
#[macro_export]
macro_rules! properties {
    {} => {
        $crate::PropertyStore::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut store = $crate::PropertyStore::new();
            $(
                store.insert($key, $value);
            )+
            store
        }
    };
}
