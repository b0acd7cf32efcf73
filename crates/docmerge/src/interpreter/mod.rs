//! Expression interpreter and merge engine.
//!
//! This module evaluates parsed expressions against a property store, checks
//! expressions for properties the store lacks, applies post-evaluation format
//! modifiers, and hosts the [`Engine`] that ties these to document merging.

mod engine;
mod error;
mod evaluator;
mod format;
mod functions;
mod properties;

pub use engine::Engine;
pub use error::{EvalError, compute_suggestions};
pub use evaluator::{evaluate, find_missing};
pub use format::apply_format;
pub use functions::{Function, FunctionRegistry};
pub use properties::PropertyStore;
