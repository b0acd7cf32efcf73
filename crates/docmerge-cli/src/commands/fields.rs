//! Implementation of the `docmerge fields` command.

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::Args;
use docmerge::document::docx::{self, DocxDocument, DocxField};
use docmerge::document::xlsx::{self, XlsxDocument};
use docmerge::document::{DocumentError, Package};
use docmerge::{DocumentKind, Engine};
use miette::{IntoDiagnostic, Result, WrapErr, miette};

use super::functions::builtin_functions;
use crate::output::table::{FieldRow, format_fields_table};

/// Arguments for the fields command.
#[derive(Debug, Args)]
pub struct FieldsArgs {
    /// Document to inspect (.docx or .xlsx)
    pub document: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the fields command.
pub fn run_fields(args: FieldsArgs) -> Result<i32> {
    let kind = args
        .document
        .extension()
        .and_then(OsStr::to_str)
        .and_then(DocumentKind::from_extension)
        .ok_or_else(|| miette!("Unsupported document type: {}", args.document.display()))?;

    let package = Package::open(&args.document)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open {}", args.document.display()))?;
    let mut rows = match kind {
        DocumentKind::Word => word_fields(&package),
        DocumentKind::Spreadsheet => spreadsheet_fields(&package),
    }
    .into_diagnostic()?;

    let engine = Engine::with_functions(builtin_functions());
    for row in &mut rows {
        row.error = engine.parse(&row.expression).err().map(|e| e.to_string());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
    } else if rows.is_empty() {
        println!("No merge fields in {}", args.document.display());
    } else {
        println!("{}", format_fields_table(&rows));
    }
    Ok(exitcode::OK)
}

fn word_fields(package: &Package) -> Result<Vec<FieldRow>, DocumentError> {
    let document = DocxDocument::parse(package.part_text(docx::DOCUMENT_PART)?).map_err(
        |source| DocumentError::Xml {
            part: docx::DOCUMENT_PART.to_string(),
            source,
        },
    )?;
    Ok(document
        .fields()
        .iter()
        .filter_map(|field| {
            let instruction = docx::parse_instruction(&document.instruction(field)?)?;
            let location = match field {
                DocxField::Complex { .. } => "complex field",
                DocxField::Simple { .. } => "simple field",
            };
            Some(FieldRow {
                location: location.to_string(),
                expression: instruction.name,
                modifiers: instruction.modifiers,
                error: None,
            })
        })
        .collect())
}

fn spreadsheet_fields(package: &Package) -> Result<Vec<FieldRow>, DocumentError> {
    if package.part(xlsx::SHARED_STRINGS_PART).is_none() {
        return Ok(Vec::new());
    }
    let document = XlsxDocument::parse(package.part_text(xlsx::SHARED_STRINGS_PART)?).map_err(
        |source| DocumentError::Xml {
            part: xlsx::SHARED_STRINGS_PART.to_string(),
            source,
        },
    )?;
    Ok(document
        .fields()
        .iter()
        .flat_map(|field| {
            let text = document.text(field).unwrap_or_default();
            xlsx::find_placeholders(&text)
                .into_iter()
                .map(|placeholder| FieldRow {
                    location: format!("shared string {}", field.index),
                    expression: placeholder.expression,
                    modifiers: placeholder.modifiers,
                    error: None,
                })
                .collect::<Vec<_>>()
        })
        .collect())
}
