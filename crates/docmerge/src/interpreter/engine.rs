//! The merge engine: parsing, evaluation, and document merge entry points.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use bon::Builder;

use crate::document::{DocumentError, DocumentKind, docx, xlsx};
use crate::expression::{Expression, ParseError, parse_expression};
use crate::interpreter::{FunctionRegistry, PropertyStore, evaluate, find_missing};
use crate::merge::MergeError;

/// Templating engine holding the functions field expressions may call.
///
/// # Example
///
/// ```
/// use docmerge::{Engine, FunctionRegistry, properties};
///
/// let engine = Engine::builder()
///     .functions(FunctionRegistry::new().with_unary("upper", |s| s.to_uppercase()))
///     .build();
///
/// let values = properties! { "Buyer" => "Ivanov" };
/// assert_eq!(engine.eval("Buyer (upper)", &values).as_deref(), Some("IVANOV"));
/// assert_eq!(engine.eval("Seller", &values), None);
/// ```
#[derive(Debug, Builder)]
pub struct Engine {
    /// Functions available to field expressions.
    #[builder(default)]
    functions: FunctionRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::builder().build()
    }
}

impl Engine {
    /// Create an engine with no functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given functions.
    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Engine::builder().functions(functions).build()
    }

    /// The functions expressions are resolved against.
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Parse a field expression against this engine's functions.
    pub fn parse(&self, text: &str) -> Result<Expression, ParseError> {
        parse_expression(text, &self.functions)
    }

    /// Parse and evaluate a field expression.
    ///
    /// Returns `None` if the expression does not parse or references a
    /// property `properties` lacks.
    pub fn eval(&self, text: &str, properties: &PropertyStore) -> Option<String> {
        let expression = self.parse(text).ok()?;
        if !find_missing(&expression, properties).is_empty() {
            return None;
        }
        evaluate(&expression, properties, &self.functions).ok()
    }

    /// Properties referenced by an expression that `properties` lacks.
    pub fn missing_fields(
        &self,
        text: &str,
        properties: &PropertyStore,
    ) -> Result<Vec<String>, ParseError> {
        Ok(find_missing(&self.parse(text)?, properties))
    }

    /// Copy `template` to `output` and merge `replacements` into the copy.
    ///
    /// The document kind is chosen from the template's file extension.
    /// Returns the per-field errors; fields with errors are left as they were.
    pub fn merge<I, K, V>(
        &self,
        template: impl AsRef<Path>,
        replacements: I,
        output: impl AsRef<Path>,
    ) -> Result<Vec<MergeError>, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let template = template.as_ref();
        let kind = template
            .extension()
            .and_then(OsStr::to_str)
            .and_then(DocumentKind::from_extension)
            .ok_or_else(|| DocumentError::UnsupportedFormat {
                path: template.to_path_buf(),
            })?;
        match kind {
            DocumentKind::Word => self.merge_docx(template, replacements, output),
            DocumentKind::Spreadsheet => self.merge_xlsx(template, replacements, output),
        }
    }

    /// Copy a Word `template` to `output` and merge `replacements` into it.
    pub fn merge_docx<I, K, V>(
        &self,
        template: impl AsRef<Path>,
        replacements: I,
        output: impl AsRef<Path>,
    ) -> Result<Vec<MergeError>, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let output = output.as_ref();
        copy_template(template.as_ref(), output)?;
        let properties: PropertyStore = replacements.into_iter().collect();
        docx::merge_in_place(self, output, &properties)
    }

    /// Copy a spreadsheet `template` to `output` and merge `replacements` into it.
    pub fn merge_xlsx<I, K, V>(
        &self,
        template: impl AsRef<Path>,
        replacements: I,
        output: impl AsRef<Path>,
    ) -> Result<Vec<MergeError>, DocumentError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let output = output.as_ref();
        copy_template(template.as_ref(), output)?;
        let properties: PropertyStore = replacements.into_iter().collect();
        xlsx::merge_in_place(self, output, &properties)
    }
}

fn copy_template(template: &Path, output: &Path) -> Result<(), DocumentError> {
    fs::copy(template, output).map_err(|source| DocumentError::Io {
        path: template.to_path_buf(),
        source,
    })?;
    Ok(())
}
