//! Integration tests for parsing and evaluating field expressions.

use docmerge::{
    Engine, EvalError, Expression, FunctionRegistry, ParseError, PropertyStore, compute_suggestions,
    evaluate, find_missing, properties,
};

fn gender_engine() -> Engine {
    Engine::with_functions(
        FunctionRegistry::new()
            .with_binary("род как у", |word, owner| {
                if word == "действующий" && owner == "Иванова В.П." {
                    "действующая".to_string()
                } else if word == "беременный" && owner == "женщина" {
                    "беременная".to_string()
                } else {
                    String::new()
                }
            })
            .with_unary("родительный", |s| match s {
                "Иванов В.П." => "Иванова В.П.".to_string(),
                "действующая" => "действующей".to_string(),
                _ => String::new(),
            }),
    )
}

// =========================================================================
// Primaries
// =========================================================================

#[test]
fn literal_evaluates_to_its_text() {
    assert_eq!(
        Engine::new().eval(" \"действующий\"", &PropertyStore::new()).as_deref(),
        Some("действующий")
    );
}

#[test]
fn property_evaluates_to_its_value() {
    let values = properties! { "Подписант" => "Иванов В.П." };
    assert_eq!(
        Engine::new().eval("Подписант", &values).as_deref(),
        Some("Иванов В.П.")
    );
}

#[test]
fn property_name_with_inner_space() {
    let values = properties! { "ФИО Покупателя" => "Иванов В.П." };
    assert_eq!(
        Engine::new().eval("ФИО Покупателя", &values).as_deref(),
        Some("Иванов В.П.")
    );
}

#[test]
fn property_name_with_trailing_space() {
    let values = properties! { "ФИО Покупателя" => "Иванов В.П." };
    assert_eq!(
        Engine::new().eval("ФИО Покупателя ", &values).as_deref(),
        Some("Иванов В.П.")
    );
}

#[test]
fn missing_property_evaluates_to_none() {
    assert_eq!(Engine::new().eval("Подписант", &PropertyStore::new()), None);
}

// =========================================================================
// Function application
// =========================================================================

#[test]
fn unary_function_of_property() {
    let values = properties! { "ФИО Покупателя" => "Иванов В.П." };
    assert_eq!(
        gender_engine()
            .eval("ФИО Покупателя (родительный)", &values)
            .as_deref(),
        Some("Иванова В.П.")
    );
}

#[test]
fn binary_function_of_literal_and_property() {
    let values = properties! { "Подписант" => "Иванова В.П." };
    assert_eq!(
        gender_engine()
            .eval("\"действующий\" (род как у Подписант)", &values)
            .as_deref(),
        Some("действующая")
    );
}

#[test]
fn binary_function_of_two_literals() {
    assert_eq!(
        gender_engine()
            .eval("\"беременный\" (род как у \"женщина\")", &PropertyStore::new())
            .as_deref(),
        Some("беременная")
    );
}

#[test]
fn chained_applications_feed_left_to_right() {
    let values = properties! { "Подписант" => "Иванова В.П." };
    assert_eq!(
        gender_engine()
            .eval("\"действующий\" (род как у Подписант) (родительный)", &values)
            .as_deref(),
        Some("действующей")
    );
}

#[test]
fn binary_function_with_one_argument_is_rejected() {
    assert_eq!(
        gender_engine().eval("\"действующий\" (род как у )", &PropertyStore::new()),
        None
    );
    assert_eq!(
        gender_engine().parse("\"действующий\" (род как у )"),
        Err(ParseError::ArgumentCount {
            name: "род как у".to_string(),
            expected: 2,
            got: 1,
        })
    );
}

#[test]
fn unknown_function_is_rejected() {
    let values = properties! { "Подписант" => "Иванова В.П." };
    assert_eq!(
        gender_engine().eval("\"действующий\" (род Подписант)", &values),
        None
    );
    assert_eq!(
        gender_engine().parse("\"действующий\" (род Подписант)"),
        Err(ParseError::UnknownFunction {
            name: "род".to_string()
        })
    );
}

// =========================================================================
// Parse errors
// =========================================================================

#[test]
fn empty_expression_is_rejected() {
    assert_eq!(Engine::new().parse("   "), Err(ParseError::Empty));
    assert_eq!(
        gender_engine().parse("(родительный)"),
        Err(ParseError::Empty)
    );
}

#[test]
fn unclosed_application_is_rejected() {
    assert!(matches!(
        gender_engine().parse("Подписант (родительный"),
        Err(ParseError::UnclosedCall { .. })
    ));
}

#[test]
fn application_without_function_name_is_rejected() {
    assert_eq!(
        gender_engine().parse("Имя (Фамилия)"),
        Err(ParseError::MissingFunctionName {
            segment: "Фамилия)".to_string()
        })
    );
    assert!(matches!(
        gender_engine().parse("Имя ()"),
        Err(ParseError::MissingFunctionName { .. })
    ));
}

#[test]
fn unterminated_literal_is_rejected() {
    assert!(matches!(
        Engine::new().parse("\""),
        Err(ParseError::UnterminatedLiteral { .. })
    ));
}

#[test]
fn literal_runs_to_last_quote() {
    assert_eq!(
        Engine::new().parse("\"a\"b\""),
        Ok(Expression::literal("a\"b"))
    );
}

#[test]
fn parsed_call_tree() {
    assert_eq!(
        gender_engine().parse("\"действующий\" (род как у Подписант) (родительный)"),
        Ok(Expression::call(
            "родительный",
            vec![Expression::call(
                "род как у",
                vec![
                    Expression::literal("действующий"),
                    Expression::field("Подписант"),
                ],
            )],
        ))
    );
}

// =========================================================================
// Missing-field analysis
// =========================================================================

#[test]
fn missing_fields_in_first_reference_order() {
    let expression = Expression::call(
        "род как у",
        vec![
            Expression::field("Должность"),
            Expression::call("родительный", vec![Expression::field("Подписант")]),
        ],
    );
    let values = properties! { "Должность" => "директор" };
    assert_eq!(find_missing(&expression, &values), vec!["Подписант"]);
    assert_eq!(
        find_missing(&expression, &PropertyStore::new()),
        vec!["Должность", "Подписант"]
    );
}

#[test]
fn missing_fields_are_deduplicated() {
    let expression = Expression::call(
        "род как у",
        vec![Expression::field("Подписант"), Expression::field("Подписант")],
    );
    assert_eq!(
        find_missing(&expression, &PropertyStore::new()),
        vec!["Подписант"]
    );
}

#[test]
fn literals_never_miss() {
    assert!(find_missing(&Expression::literal("x"), &PropertyStore::new()).is_empty());
}

#[test]
fn engine_reports_missing_fields() {
    let values = properties! { "Подписант" => "Иванова В.П." };
    assert_eq!(
        gender_engine()
            .missing_fields("Должность (род как у Подписант)", &values)
            .unwrap(),
        vec!["Должность"]
    );
}

// =========================================================================
// Direct evaluation
// =========================================================================

#[test]
fn evaluate_unresolved_field_suggests_close_names() {
    let values = properties! { "Подписант" => "Иванова В.П." };
    let err = evaluate(
        &Expression::field("Подписан"),
        &values,
        &FunctionRegistry::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        EvalError::UnresolvedField {
            name: "Подписан".to_string(),
            suggestions: vec!["Подписант".to_string()],
        }
    );
    assert!(err.to_string().contains("did you mean: Подписант"));
}

#[test]
fn evaluate_wrong_arity_call() {
    let functions = FunctionRegistry::new().with_unary("upper", |s| s.to_uppercase());
    let expression = Expression::call(
        "upper",
        vec![Expression::literal("a"), Expression::literal("b")],
    );
    assert!(matches!(
        evaluate(&expression, &PropertyStore::new(), &functions),
        Err(EvalError::ArgumentCount {
            expected: 1,
            got: 2,
            ..
        })
    ));
}

#[test]
fn suggestions_are_limited_by_distance() {
    let available = ["Цена", "Дата", "Продукт"];
    assert_eq!(compute_suggestions("Цна", &available), vec!["Цена"]);
    assert!(compute_suggestions("Цена", &available).is_empty());
    assert!(compute_suggestions("Адрес", &available).is_empty());
}
