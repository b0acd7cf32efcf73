//! CLI command implementations.

mod eval;
mod fields;
mod functions;
mod merge;
mod values;

pub use eval::{EvalArgs, run_eval};
pub use fields::{FieldsArgs, run_fields};
pub use merge::{MergeArgs, run_merge};
