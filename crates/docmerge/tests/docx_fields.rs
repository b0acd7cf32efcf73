//! Integration tests for locating and merging Word merge fields.

use docmerge::document::docx::{DocxDocument, INSTRUCTION_LOOKAHEAD, parse_instruction};
use docmerge::merge::merge_fields;
use docmerge::{Engine, FunctionRegistry, MergeError, RussianMessages, properties};

const COMPLEX_FIELDS: &str = include_str!("fixtures/complex_fields.xml");
const COMPLEX_FIELD_SPLIT: &str = include_str!("fixtures/complex_field_split.xml");
const COMPLEX_FIELD_LONG: &str = include_str!("fixtures/complex_field_long.xml");
const SIMPLE_FIELD: &str = include_str!("fixtures/simple_field.xml");
const CONTRACT: &str = include_str!("fixtures/contract.xml");

const PRICE_INSTRUCTION: &str = r#" MERGEFIELD  "Цена прописью"  \* MERGEFORMAT "#;

fn instructions(document: &DocxDocument) -> Vec<String> {
    document
        .fields()
        .iter()
        .filter_map(|field| document.instruction(field))
        .collect()
}

fn genitive_engine() -> Engine {
    Engine::with_functions(FunctionRegistry::new().with_unary("родительный", |s| {
        if s == "Иванов В.П." {
            "Иванова В.П.".to_string()
        } else {
            format!("{s} (р.п.)")
        }
    }))
}

// =========================================================================
// Instruction parsing
// =========================================================================

#[test]
fn instruction_with_bare_name() {
    let instruction = parse_instruction("  MERGEFIELD Должность ").unwrap();
    assert_eq!(instruction.name, "Должность");
    assert!(instruction.modifiers.is_empty());
}

#[test]
fn instruction_with_quoted_name() {
    let instruction =
        parse_instruction("  MERGEFIELD \"Должность представителя Лицензиата\" ").unwrap();
    assert_eq!(instruction.name, "Должность представителя Лицензиата");
}

#[test]
fn instruction_with_one_modifier() {
    let instruction =
        parse_instruction(r#"  MERGEFIELD "Должность представителя Лицензиата" \* MERGEFORMAT"#)
            .unwrap();
    assert_eq!(instruction.name, "Должность представителя Лицензиата");
    assert_eq!(instruction.modifiers, ["MERGEFORMAT"]);
}

#[test]
fn instruction_with_two_modifiers() {
    let instruction = parse_instruction(
        r#"  MERGEFIELD "Должность представителя Лицензиата" \* MERGEFORMAT \* FirstCap"#,
    )
    .unwrap();
    assert_eq!(instruction.modifiers, ["MERGEFORMAT", "FirstCap"]);
}

#[test]
fn instruction_name_containing_application() {
    let instruction = parse_instruction(
        r#"  MERGEFIELD  "Родительный (Должность представителя Лицензиата)"  \* MERGEFORMAT "#,
    )
    .unwrap();
    assert_eq!(
        instruction.name,
        "Родительный (Должность представителя Лицензиата)"
    );
    assert_eq!(instruction.modifiers, ["MERGEFORMAT"]);
}

#[test]
fn other_field_codes_are_not_instructions() {
    assert_eq!(parse_instruction(" PAGE "), None);
    assert_eq!(parse_instruction(" MERGEFIELD "), None);
}

// =========================================================================
// Field location
// =========================================================================

#[test]
fn complex_fields_in_document_order() {
    let document = DocxDocument::parse(COMPLEX_FIELDS).unwrap();
    assert_eq!(
        instructions(&document),
        [
            r#" MERGEFIELD  "Родительный (Должность представителя Лицензиата)"  \* MERGEFORMAT "#,
            r#" MERGEFIELD  "Родительный (ФИО представителя Лицензиата)"  \* MERGEFORMAT "#,
            r#" MERGEFIELD  "Полное наименование компании Лицензиата"  \* MERGEFORMAT "#,
        ]
    );
}

#[test]
fn complex_field_instruction_split_across_runs() {
    let document = DocxDocument::parse(COMPLEX_FIELD_SPLIT).unwrap();
    assert_eq!(
        instructions(&document),
        [r" MERGEFIELD  Продукт  \* MERGEFORMAT "]
    );
}

#[test]
fn instruction_beyond_lookahead_is_truncated() {
    assert_eq!(INSTRUCTION_LOOKAHEAD, 5);
    let document = DocxDocument::parse(COMPLEX_FIELD_LONG).unwrap();
    let instruction = instructions(&document).remove(0);
    assert_eq!(instruction, " MERGEFIELD Фамили");
    assert_eq!(parse_instruction(&instruction).unwrap().name, "Фамили");
}

#[test]
fn simple_field_instruction() {
    let document = DocxDocument::parse(SIMPLE_FIELD).unwrap();
    assert_eq!(
        instructions(&document),
        [r#" MERGEFIELD  "№ паспорта Лицензиара"  \* MERGEFORMAT "#]
    );
}

#[test]
fn field_values_are_displayed_text() {
    let document = DocxDocument::parse(COMPLEX_FIELDS).unwrap();
    let values: Vec<String> = document
        .fields()
        .iter()
        .filter_map(|field| document.value(field))
        .collect();
    assert_eq!(
        values,
        [
            "«Родительный (Должность представителя Лицензиата)»",
            "«Родительный (ФИО представителя Лицензиата)»",
            "«Полное наименование компании Лицензиата»",
        ]
    );
}

#[test]
fn namespace_prefix_is_read_from_root() {
    let source = r#"<x:document xmlns:x="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><x:body><x:p><x:fldSimple x:instr=" MERGEFIELD Имя "><x:r><x:t>«Имя»</x:t></x:r></x:fldSimple></x:p></x:body></x:document>"#;
    let document = DocxDocument::parse(source).unwrap();
    let fields = document.fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(document.value(&fields[0]).as_deref(), Some("«Имя»"));
}

#[test]
fn cdata_value_is_read() {
    let source = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:fldSimple w:instr=" MERGEFIELD Имя "><w:r><w:t><![CDATA[«Имя»]]></w:t></w:r></w:fldSimple></w:p></w:body></w:document>"#;
    let document = DocxDocument::parse(source).unwrap();
    let field = document.fields().remove(0);
    assert_eq!(document.value(&field).as_deref(), Some("«Имя»"));
}

// =========================================================================
// Value replacement
// =========================================================================

#[test]
fn simple_field_set_value() {
    let mut document = DocxDocument::parse(SIMPLE_FIELD).unwrap();
    let field = document.fields().remove(0);
    assert!(document.set_value(&field, "new value"));
    assert_eq!(document.value(&field).as_deref(), Some("new value"));
}

#[test]
fn complex_field_set_value() {
    let mut document = DocxDocument::parse(COMPLEX_FIELDS).unwrap();
    let field = document.fields().remove(0);
    assert!(document.set_value(&field, "Иванов И.И."));
    assert_eq!(document.value(&field).as_deref(), Some("Иванов И.И."));
}

#[test]
fn set_value_survives_serialization() {
    let mut document = DocxDocument::parse(CONTRACT).unwrap();
    let field = document
        .fields()
        .into_iter()
        .find(|field| document.instruction(field).as_deref() == Some(PRICE_INSTRUCTION))
        .unwrap();
    assert!(document.set_value(&field, "123456"));

    let reloaded = DocxDocument::parse(&document.to_xml().unwrap()).unwrap();
    let field = reloaded
        .fields()
        .into_iter()
        .find(|field| reloaded.instruction(field).as_deref() == Some(PRICE_INSTRUCTION))
        .unwrap();
    assert_eq!(reloaded.value(&field).as_deref(), Some("123456"));
}

#[test]
fn surrounding_whitespace_is_preserved() {
    let mut document = DocxDocument::parse(SIMPLE_FIELD).unwrap();
    let field = document.fields().remove(0);
    document.set_value(&field, " 12 34 ");
    assert!(
        document
            .to_xml()
            .unwrap()
            .contains(r#"<w:t xml:space="preserve"> 12 34 </w:t>"#)
    );
}

#[test]
fn untouched_markup_round_trips() {
    let document = DocxDocument::parse(CONTRACT).unwrap();
    assert_eq!(document.to_xml().unwrap(), CONTRACT);
}

// =========================================================================
// Merging
// =========================================================================

#[test]
fn merge_fills_resolvable_fields_and_reports_the_rest() {
    let mut document = DocxDocument::parse(CONTRACT).unwrap();
    let values = properties! {
        "Лицензиат" => "ООО \"Тюльпан\"",
        "Основание" => "устава",
        "Цена прописью" => "1500 (одна тысяча пятьсот) рублей",
    };

    let errors = merge_fields(&mut document, &genitive_engine(), &values);

    assert_eq!(
        errors,
        [
            MergeError::MissingField {
                name: "Подписант".to_string()
            },
            MergeError::MissingField {
                name: "Подписант".to_string()
            },
        ]
    );
    assert_eq!(
        errors[0].accept(&RussianMessages),
        "Не заполнено поле Подписант."
    );

    let fields = document.fields();
    let values: Vec<String> = fields
        .iter()
        .filter_map(|field| document.value(field))
        .collect();
    assert_eq!(
        values,
        [
            "ООО \"Тюльпан\"",
            "«Подписант (родительный)»",
            "Устава",
            "1500 (одна тысяча пятьсот) рублей",
            "«Подписант»",
            "1",
        ]
    );
}

#[test]
fn merge_applies_functions() {
    let mut document = DocxDocument::parse(CONTRACT).unwrap();
    let values = properties! {
        "Лицензиат" => "ООО Тюльпан",
        "Основание" => "устава",
        "Цена прописью" => "1500",
        "Подписант" => "Иванов В.П.",
    };

    let errors = merge_fields(&mut document, &genitive_engine(), &values);

    assert!(errors.is_empty());
    let fields = document.fields();
    assert_eq!(document.value(&fields[1]).as_deref(), Some("Иванова В.П."));
    assert_eq!(document.value(&fields[3]).as_deref(), Some("1500"));
    assert_eq!(document.value(&fields[4]).as_deref(), Some("Иванов В.П."));
}

#[test]
fn merge_reports_invalid_expression() {
    let source = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:fldSimple w:instr=" MERGEFIELD &quot;Подписант (дательный)&quot; "><w:r><w:t>«Подписант»</w:t></w:r></w:fldSimple></w:p></w:body></w:document>"#;
    let mut document = DocxDocument::parse(source).unwrap();
    let values = properties! { "Подписант" => "Иванов В.П." };

    let errors = merge_fields(&mut document, &genitive_engine(), &values);

    assert_eq!(
        errors,
        [MergeError::InvalidExpression {
            expression: "Подписант (дательный)".to_string()
        }]
    );
    assert_eq!(document.to_xml().unwrap(), source);
}
