//! Integration tests for post-evaluation format modifiers.

use docmerge::apply_format;

#[test]
fn first_cap_upper_cases_first_character() {
    assert_eq!(apply_format("иванов", &["FirstCap"]), "Иванов");
}

#[test]
fn first_cap_is_case_insensitive() {
    assert_eq!(apply_format("abc", &["FIRSTCAP"]), "Abc");
    assert_eq!(apply_format("abc", &["firstcap"]), "Abc");
}

#[test]
fn first_cap_of_empty_value_is_empty() {
    assert_eq!(apply_format("", &["FirstCap"]), "");
}

#[test]
fn first_cap_keeps_already_capitalized_value() {
    assert_eq!(apply_format("ООО Тюльпан", &["FirstCap"]), "ООО Тюльпан");
}

#[test]
fn unknown_modifiers_are_ignored() {
    assert_eq!(apply_format("abc", &["MERGEFORMAT"]), "abc");
    assert_eq!(apply_format("abc", &["MERGEFORMAT", "FirstCap"]), "Abc");
}

#[test]
fn no_modifiers_leave_value_unchanged() {
    let none: [&str; 0] = [];
    assert_eq!(apply_format("abc", &none), "abc");
}

#[test]
fn first_cap_never_grows_the_value() {
    let value = apply_format("ßtraße", &["FirstCap"]);
    assert_eq!(value, "ßtraße");
    assert_eq!(value.chars().count(), "ßtraße".chars().count());
}
