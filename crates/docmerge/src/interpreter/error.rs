//! Error types for the expression interpreter.

use strsim::levenshtein;
use thiserror::Error;

/// An error that occurred during expression evaluation.
///
/// The merge pipeline checks expressions for missing properties before it
/// evaluates them, so these errors surface only when evaluating a tree
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Property not present in the store.
    #[error("unresolved field '{name}'{}", format_suggestions(suggestions))]
    UnresolvedField {
        name: String,
        suggestions: Vec<String>,
    },

    /// Function not present in the registry.
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    /// Function called with the wrong number of arguments.
    #[error("function '{name}' expects {expected} arguments, got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}?", suggestions.join(", "))
    }
}

/// Return up to three names from `available` close to `name`.
///
/// Closest matches come first. Short names tolerate one edit, longer names
/// two. Comparison counts characters, so Cyrillic names are not penalized for
/// their byte length.
pub fn compute_suggestions<S: AsRef<str>>(name: &str, available: &[S]) -> Vec<String> {
    let max_distance = if name.chars().count() > 3 { 2 } else { 1 };
    let mut candidates: Vec<(usize, &str)> = available
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| *candidate != name)
        .map(|candidate| (levenshtein(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    candidates
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
