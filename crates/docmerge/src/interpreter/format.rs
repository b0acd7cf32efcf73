//! Post-evaluation format modifiers (`\* FirstCap`).

use unicode_segmentation::UnicodeSegmentation;

/// Apply format modifiers to an evaluated value, in declaration order.
///
/// Modifier names match case-insensitively. Unknown modifiers (including
/// Word's own `MERGEFORMAT`) are ignored.
///
/// - `FIRSTCAP`: upper-case the first character, leave the rest untouched.
///   An empty value stays empty.
pub fn apply_format<S: AsRef<str>>(value: &str, modifiers: &[S]) -> String {
    let mut result = value.to_string();
    for modifier in modifiers {
        let modifier = modifier.as_ref();
        if modifier.eq_ignore_ascii_case("FIRSTCAP") {
            result = first_cap(&result);
        }
    }
    result
}

/// Upper-case the first character of `value`, keeping any combining marks
/// of its grapheme. A character without a single-character upper-case form
/// (e.g. `ß`) is left as is.
fn first_cap(value: &str) -> String {
    let mut graphemes = value.graphemes(true);
    let Some(first) = graphemes.next() else {
        return String::new();
    };
    let mut chars = first.chars();
    let mut result = String::with_capacity(value.len());
    if let Some(base) = chars.next() {
        result.push(upper_single(base));
    }
    result.push_str(chars.as_str());
    result.push_str(graphemes.as_str());
    result
}

fn upper_single(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}
