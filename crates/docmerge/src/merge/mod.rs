//! Field substitution over located document fields.

mod error;
mod pipeline;

pub use error::{EnglishMessages, MergeError, MergeErrorVisitor, RussianMessages};
pub use pipeline::{FieldSource, Placeholder, merge_fields};
